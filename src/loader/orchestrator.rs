//! Single-fire document load gated on the readiness barrier.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::SystemTime;

use bytes::Bytes;
use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::derive_title;
use super::detect_format;
use super::resolve_base_url;
use super::DocumentEvent;
use super::DocumentLoadRequest;
use super::EventSink;
use super::PayloadEncoding;
use crate::constants::POST_OPEN_HOOKS_TASK;
use crate::constants::TITLE_UPDATE_TASK;
use crate::metrics;
use crate::utils::async_task::spawn_deferred;
use crate::Editor;
use crate::HostBridge;
use crate::HostValue;
use crate::LoadError;
use crate::LoaderConfig;
use crate::OpenedDocument;
use crate::ReadinessBarrier;
use crate::Realm;
use crate::SessionInfo;

/// Why a load sequence stopped before dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    MissingEditor,
    EmptyPayload,
    ReferenceUnresolved,
    DecodeFailed,
    OpenFailed,
    /// The runtime shut down under the load task
    Cancelled,
}

impl From<&LoadError> for HaltReason {
    fn from(error: &LoadError) -> Self {
        match error {
            LoadError::MissingEditor => HaltReason::MissingEditor,
            LoadError::EmptyPayload => HaltReason::EmptyPayload,
            LoadError::ReferenceUnresolved { .. } => HaltReason::ReferenceUnresolved,
            LoadError::Decode(_) => HaltReason::DecodeFailed,
            LoadError::Open(_) => HaltReason::OpenFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninvoked,
    /// Suspended on the readiness barrier
    Waiting,
    Resolving,
    Dispatched,
    Halted(HaltReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Dispatched,
    Halted(HaltReason),
    /// An earlier invocation already owns the load
    Duplicate,
}

/// Entry point the hosted SDK calls to open its document.
///
/// Only the first call does anything. It waits for the readiness barrier,
/// then runs the open sequence without suspending again. The wait and the
/// sequence run on their own task, so dropping the caller's future does not
/// cancel a load that already claimed the single invocation. Follow-ups that
/// must not block the sequence (title update, plugin refresh) are spawned
/// as deferred tasks; [`Self::join_deferred`] waits for them.
pub struct DocumentLoader {
    started: AtomicBool,
    sequence: Arc<LoadSequence>,
}

/// Everything the spawned load task owns
struct LoadSequence {
    realm: Arc<Realm>,
    barrier: ReadinessBarrier,
    bridge: Arc<dyn HostBridge>,
    events: Arc<dyn EventSink>,
    config: LoaderConfig,
    state: watch::Sender<LoadState>,
    deferred: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for DocumentLoader {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("DocumentLoader")
            .field("state", &self.state())
            .field("started", &self.has_started())
            .field("config", &self.sequence.config)
            .finish()
    }
}

impl LoadState {
    /// No further transition will happen
    pub fn is_settled(&self) -> bool {
        matches!(self, LoadState::Dispatched | LoadState::Halted(_))
    }
}

impl DocumentLoader {
    pub fn new(
        realm: Arc<Realm>,
        barrier: ReadinessBarrier,
        bridge: Arc<dyn HostBridge>,
        events: Arc<dyn EventSink>,
        config: LoaderConfig,
    ) -> Self {
        let (state, _) = watch::channel(LoadState::Uninvoked);
        Self {
            started: AtomicBool::new(false),
            sequence: Arc::new(LoadSequence {
                realm,
                barrier,
                bridge,
                events,
                config,
                state,
                deferred: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn state(&self) -> LoadState {
        *self.sequence.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<LoadState> {
        self.sequence.state.subscribe()
    }

    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Waits until the load has dispatched or halted
    pub async fn settled(&self) -> LoadState {
        let mut state = self.subscribe_state();
        let settled = match state.wait_for(LoadState::is_settled).await {
            Ok(settled) => *settled,
            // the sender lives in `self`, it cannot be gone
            Err(_) => self.state(),
        };
        settled
    }

    /// `(locator, payload, length)` form of [`Self::load`]
    pub async fn load_from_host(
        &self,
        locator: &str,
        payload: HostValue,
        length: usize,
    ) -> LoadOutcome {
        let request = DocumentLoadRequest::from_host(
            locator,
            payload,
            length,
            &self.sequence.config.reference_prefix,
        );
        self.load(request).await
    }

    pub async fn load(
        &self,
        request: DocumentLoadRequest,
    ) -> LoadOutcome {
        if self.started.swap(true, Ordering::AcqRel) {
            warn!(locator = %request.source_locator, "document load already started, ignoring call");
            metrics::DOCUMENT_LOADS.with_label_values(&["duplicate"]).inc();
            return LoadOutcome::Duplicate;
        }

        self.sequence.state.send_replace(LoadState::Waiting);
        let sequence = Arc::clone(&self.sequence);
        let handle = tokio::spawn(async move { sequence.run(request).await });

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => match e.try_into_panic() {
                Ok(payload) => std::panic::resume_unwind(payload),
                Err(e) => {
                    error!("document load task cancelled: {:?}", e);
                    LoadOutcome::Halted(HaltReason::Cancelled)
                }
            },
        }
    }

    /// Waits for every follow-up task spawned so far
    pub async fn join_deferred(&self) {
        let handles = std::mem::take(&mut *self.sequence.deferred.lock());
        for result in join_all(handles).await {
            if let Err(e) = result {
                error!("deferred task panicked: {:?}", e);
            }
        }
    }
}

impl LoadSequence {
    async fn run(
        &self,
        request: DocumentLoadRequest,
    ) -> LoadOutcome {
        let waiting_since = Instant::now();
        let mut signal = self.barrier.completion();
        if !signal.wait().await {
            warn!("readiness barrier dropped before completing, loading anyway");
        }
        let waited = waiting_since.elapsed();
        metrics::READINESS_WAIT_MS.observe(waited.as_secs_f64() * 1000.0);
        debug!(?waited, "readiness barrier passed");

        self.state.send_replace(LoadState::Resolving);
        match self.resolve(&request) {
            Ok(()) => {
                info!(locator = %request.source_locator, "document dispatched to editor");
                self.state.send_replace(LoadState::Dispatched);
                metrics::DOCUMENT_LOADS.with_label_values(&["dispatched"]).inc();
                LoadOutcome::Dispatched
            }
            Err(e) => {
                self.report(&e);
                let reason = HaltReason::from(&e);
                self.state.send_replace(LoadState::Halted(reason));
                metrics::DOCUMENT_LOADS.with_label_values(&["halted"]).inc();
                LoadOutcome::Halted(reason)
            }
        }
    }

    /// The open sequence. Step order matters: later steps rely on what the
    /// earlier ones told the editor.
    fn resolve(
        &self,
        request: &DocumentLoadRequest,
    ) -> Result<(), LoadError> {
        // 1
        let editor = self.realm.editor().ok_or(LoadError::MissingEditor)?;

        // 2
        let base_url = resolve_base_url(
            &request.source_locator,
            self.bridge.base_url_override().as_deref(),
            &self.config.reference_prefix,
        );
        debug!(%base_url, "base url resolved");

        // 3
        editor.set_session(SessionInfo {
            user_id: self.bridge.user_id(),
            load_started_at: SystemTime::now(),
        });

        // 4
        if request.is_empty() {
            return Err(LoadError::EmptyPayload);
        }

        // 5
        let (data, leading) = self.resolve_payload(&request.payload)?;

        // 6
        let format = detect_format(&leading, &self.config.native_signature);
        debug!(?format, bytes = data.len(), "opening document");
        editor
            .open_document(OpenedDocument {
                base_url,
                data,
                format,
            })
            .map_err(|e| LoadError::Open(e.to_string()))?;

        // 7
        editor.set_fast_collaborative(false);

        // 8
        self.schedule_title_update(&editor, &request.source_locator);

        // 9
        self.run_post_open_hooks(&editor);

        // 10
        self.events.emit(DocumentEvent::PasswordPrompt {
            has_password: editor.has_password(),
        });

        Ok(())
    }

    /// Decoded content plus the bytes the native-format signature is
    /// checked against: the raw text for encoded payloads, since their
    /// header precedes the base64 body.
    fn resolve_payload(
        &self,
        payload: &PayloadEncoding,
    ) -> Result<(Bytes, Bytes), LoadError> {
        match payload {
            PayloadEncoding::Binary(data) => Ok((data.clone(), data.clone())),
            PayloadEncoding::Reference(token) => {
                let data = self
                    .bridge
                    .resolve_reference(token)
                    .filter(|data| !data.is_empty())
                    .ok_or_else(|| LoadError::ReferenceUnresolved {
                        token: token.clone(),
                    })?;
                Ok((data.clone(), data))
            }
            PayloadEncoding::Encoded { text, length } => {
                let data = self.bridge.decode_content(text, *length)?;
                Ok((data, Bytes::copy_from_slice(text.as_bytes())))
            }
        }
    }

    fn schedule_title_update(
        &self,
        editor: &Arc<dyn Editor>,
        locator: &str,
    ) {
        let Some(title) = derive_title(self.bridge.source_path().as_deref(), locator) else {
            debug!(%locator, "no title segment, keeping editor default");
            return;
        };

        let editor = Arc::clone(editor);
        let events = Arc::clone(&self.events);
        spawn_deferred(
            TITLE_UPDATE_TASK,
            self.config.title_update_delay(),
            async move {
                editor.set_document_name(&title);
                events.emit(DocumentEvent::DocumentNameChanged(title));
                Ok(())
            },
            Some(&mut *self.deferred.lock()),
        );
    }

    /// Spell-check languages go out straight away; the plugin refresh is
    /// deferred. Neither gates the rest of the sequence.
    fn run_post_open_hooks(
        &self,
        editor: &Arc<dyn Editor>,
    ) {
        match self.bridge.spellcheck_languages() {
            Ok(languages) => self.events.emit(DocumentEvent::SpellCheckLanguages(languages)),
            Err(e) => warn!("spell-check languages unavailable: {:?}", e),
        }

        let editor = Arc::clone(editor);
        let bridge = Arc::clone(&self.bridge);
        spawn_deferred(
            POST_OPEN_HOOKS_TASK,
            self.config.post_open_hooks_delay(),
            async move {
                let plugins = bridge.plugins()?;
                debug!(count = plugins.len(), "refreshing plugins");
                editor.refresh_plugins(plugins);
                Ok(())
            },
            Some(&mut *self.deferred.lock()),
        );
    }

    fn report(
        &self,
        error: &LoadError,
    ) {
        match error.classification() {
            None => error!("document load aborted: {}", error),
            Some(kind) => {
                warn!(?kind, "document open failed: {}", error);
                self.events.emit(DocumentEvent::OpenError {
                    kind,
                    critical: true,
                });
            }
        }
    }
}
