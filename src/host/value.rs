//! Values and objects of the hosted page.
//!
//! [`HostObject`] is a named bag of properties. A property is either a stored
//! value or an accessor installed by some other party. Writes to stored
//! values notify the shared [`SubscriptionTable`]; writes through accessors
//! do not, since their semantics belong to whoever installed them.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::trace;

use super::SubscriptionTable;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`HostObject`] within the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone)]
pub enum HostValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Bytes(Bytes),
    Object(Arc<HostObject>),
}

impl HostValue {
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    pub fn as_object(&self) -> Option<&Arc<HostObject>> {
        match self {
            HostValue::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            HostValue::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Debug for HostValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            HostValue::Null => f.write_str("Null"),
            HostValue::Bool(b) => write!(f, "Bool({b})"),
            HostValue::Number(n) => write!(f, "Number({n})"),
            HostValue::Text(t) => write!(f, "Text({t:?})"),
            HostValue::Bytes(b) => write!(f, "Bytes(len={})", b.len()),
            HostValue::Object(o) => write!(f, "Object({}#{:?})", o.name(), o.id()),
        }
    }
}

impl From<Arc<HostObject>> for HostValue {
    fn from(object: Arc<HostObject>) -> Self {
        HostValue::Object(object)
    }
}

impl From<&str> for HostValue {
    fn from(text: &str) -> Self {
        HostValue::Text(text.to_string())
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

pub type Getter = Arc<dyn Fn() -> Option<HostValue> + Send + Sync>;
pub type Setter = Arc<dyn Fn(HostValue) + Send + Sync>;

/// Custom read/write behaviour installed on a property by another party
#[derive(Clone)]
pub struct Accessor {
    pub get: Getter,
    pub set: Option<Setter>,
}

#[derive(Clone)]
enum Property {
    Value(HostValue),
    Accessor(Accessor),
}

pub struct HostObject {
    id: ObjectId,
    name: String,
    properties: RwLock<HashMap<String, Property>>,
    subscriptions: Arc<SubscriptionTable>,
}

impl fmt::Debug for HostObject {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("HostObject")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("properties", &self.properties.read().len())
            .finish()
    }
}

impl HostObject {
    pub(crate) fn new(
        name: impl Into<String>,
        subscriptions: Arc<SubscriptionTable>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: ObjectId::next(),
            name: name.into(),
            properties: RwLock::new(HashMap::new()),
            subscriptions,
        })
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn subscriptions(&self) -> &Arc<SubscriptionTable> {
        &self.subscriptions
    }

    /// Reads a property. Accessor-backed properties run their getter, which
    /// may itself report the value as not yet present.
    pub fn get(
        &self,
        key: &str,
    ) -> Option<HostValue> {
        let property = self.properties.read().get(key).cloned()?;
        match property {
            Property::Value(v) => Some(v),
            Property::Accessor(accessor) => (accessor.get)(),
        }
    }

    pub fn has(
        &self,
        key: &str,
    ) -> bool {
        self.get(key).is_some()
    }

    pub fn has_accessor(
        &self,
        key: &str,
    ) -> bool {
        matches!(self.properties.read().get(key), Some(Property::Accessor(_)))
    }

    /// Returns the property as an object, if it is one
    pub fn child(
        &self,
        key: &str,
    ) -> Option<Arc<HostObject>> {
        match self.get(key)? {
            HostValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Writes a property.
    ///
    /// Stored values fire and drop every one-shot subscription registered
    /// for this (object, property); later writes fire nothing. Accessor
    /// properties forward to their setter and notify no one.
    pub fn set(
        &self,
        key: &str,
        value: impl Into<HostValue>,
    ) {
        let value = value.into();
        let accessor = {
            let mut properties = self.properties.write();
            match properties.get(key) {
                Some(Property::Accessor(accessor)) => Some(accessor.clone()),
                _ => {
                    properties.insert(key.to_string(), Property::Value(value.clone()));
                    None
                }
            }
        };

        match accessor {
            Some(Accessor { set: Some(setter), .. }) => setter(value),
            Some(Accessor { set: None, .. }) => {
                trace!(object = %self.name, key, "write to read-only accessor ignored");
            }
            None => {
                self.subscriptions.fire(self.id, key, &value);
            }
        }
    }

    /// Installs custom read/write behaviour on a property, replacing any
    /// stored value.
    pub fn define_accessor(
        &self,
        key: &str,
        accessor: Accessor,
    ) {
        self.properties
            .write()
            .insert(key.to_string(), Property::Accessor(accessor));
    }

    pub fn remove(
        &self,
        key: &str,
    ) {
        self.properties.write().remove(key);
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.properties.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}
