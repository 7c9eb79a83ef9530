use std::sync::Arc;

use super::Editor;
use super::EditorSlot;
use super::HostObject;
use super::SubscriptionTable;

/// One page load of the hosted SDK.
///
/// Owns the root namespace that patch paths are resolved against, the
/// subscription table shared by every object it creates, and the slot the
/// SDK installs its editor into. A page reload is a new `Realm`.
#[derive(Debug)]
pub struct Realm {
    root: Arc<HostObject>,
    subscriptions: Arc<SubscriptionTable>,
    editor: EditorSlot,
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}

impl Realm {
    pub fn new() -> Self {
        let subscriptions = SubscriptionTable::new();
        Self {
            root: HostObject::new("window", Arc::clone(&subscriptions)),
            subscriptions,
            editor: EditorSlot::default(),
        }
    }

    pub fn root(&self) -> &Arc<HostObject> {
        &self.root
    }

    /// Creates a detached object sharing this realm's subscription table
    pub fn object(
        &self,
        name: impl Into<String>,
    ) -> Arc<HostObject> {
        HostObject::new(name, Arc::clone(&self.subscriptions))
    }

    /// Creates the object chain for a dotted path under the root, reusing
    /// intermediate objects that already exist. Returns the last object.
    pub fn ensure_path(
        &self,
        path: &str,
    ) -> Arc<HostObject> {
        let mut current = Arc::clone(&self.root);
        for segment in path.split(crate::constants::PATH_SEPARATOR) {
            current = match current.child(segment) {
                Some(child) => child,
                None => {
                    let child = self.object(segment);
                    current.set(segment, Arc::clone(&child));
                    child
                }
            };
        }
        current
    }

    pub fn subscriptions(&self) -> &Arc<SubscriptionTable> {
        &self.subscriptions
    }

    pub fn install_editor(
        &self,
        editor: Arc<dyn Editor>,
    ) {
        self.editor.install(editor);
    }

    pub fn editor(&self) -> Option<Arc<dyn Editor>> {
        self.editor.get()
    }

    pub fn editor_slot(&self) -> &EditorSlot {
        &self.editor
    }
}
