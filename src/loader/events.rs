#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;
use tracing::info;
use tracing::warn;

use crate::OpenErrorKind;

/// Notification raised towards the hosted SDK
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    OpenError { kind: OpenErrorKind, critical: bool },
    DocumentNameChanged(String),
    /// Whether the opened document already carries a password
    PasswordPrompt { has_password: bool },
    SpellCheckLanguages(Vec<u32>),
}

/// Fire-and-forget receiver of [`DocumentEvent`]s
#[cfg_attr(test, automock)]
pub trait EventSink: Send + Sync + 'static {
    fn emit(
        &self,
        event: DocumentEvent,
    );
}

/// Forwards events into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<DocumentEvent>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DocumentEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(
        &self,
        event: DocumentEvent,
    ) {
        if let Err(e) = self.tx.send(event) {
            warn!("event receiver dropped: {:?}", e.0);
        }
    }
}

/// Logs every event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(
        &self,
        event: DocumentEvent,
    ) {
        info!(?event, "document event");
    }
}
