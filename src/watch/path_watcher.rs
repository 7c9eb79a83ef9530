use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval_at;
use tokio::time::timeout_at;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::Armed;
use crate::constants::PATH_SEPARATOR;
use crate::metrics;
use crate::HostObject;
use crate::HostValue;
use crate::ReadinessBarrier;
use crate::WatchConfig;
use crate::WatchError;

/// State of one outstanding path watch
#[derive(Debug)]
pub struct WatchRequest {
    path: String,
    /// Object the next segment is looked up on
    target: Arc<HostObject>,
    path_remaining: VecDeque<String>,
    started_at: Instant,
    deadline: Instant,
}

/// Result of one synchronous resolution pass
#[derive(Debug)]
pub enum Step {
    Resolved(HostValue),
    /// Waiting on the named segment
    Blocked(String),
}

impl WatchRequest {
    pub fn new(
        root: &Arc<HostObject>,
        path: &str,
        timeout: Duration,
    ) -> Self {
        let started_at = Instant::now();
        Self {
            path: path.to_string(),
            target: Arc::clone(root),
            path_remaining: path
                .split(PATH_SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            started_at,
            deadline: started_at + timeout,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> impl Iterator<Item = &str> {
        self.path_remaining.iter().map(String::as_str)
    }

    /// Descends through every segment that is already present.
    pub fn advance(&mut self) -> Result<Step, WatchError> {
        while let Some(segment) = self.path_remaining.front() {
            let Some(value) = self.target.get(segment) else {
                return Ok(Step::Blocked(segment.clone()));
            };

            if self.path_remaining.len() == 1 {
                self.path_remaining.pop_front();
                return Ok(Step::Resolved(value));
            }

            match value {
                HostValue::Object(next) => {
                    trace!(path = %self.path, segment = %segment, "segment resolved");
                    self.target = next;
                    self.path_remaining.pop_front();
                }
                _ => {
                    return Err(WatchError::NullIntermediate {
                        path: self.path.clone(),
                        segment: segment.clone(),
                    })
                }
            }
        }

        Ok(Step::Resolved(HostValue::Object(Arc::clone(&self.target))))
    }

    fn timeout_error(&self) -> WatchError {
        WatchError::Timeout {
            path: self.path.clone(),
            segment: self.path_remaining.front().cloned().unwrap_or_default(),
            elapsed: self.started_at.elapsed(),
        }
    }
}

/// Resolves dotted paths against a root object.
///
/// A path that cannot be resolved, whether by timeout or because an
/// intermediate hop is not an object, force-completes the barrier so that
/// work gated on it proceeds without this path's patch.
#[derive(Debug, Clone)]
pub struct PathWatcher {
    poll_interval: Duration,
    timeout: Duration,
    barrier: ReadinessBarrier,
}

impl PathWatcher {
    pub fn new(
        poll_interval: Duration,
        timeout: Duration,
        barrier: ReadinessBarrier,
    ) -> Self {
        Self {
            poll_interval,
            timeout,
            barrier,
        }
    }

    pub fn from_config(
        config: &WatchConfig,
        barrier: ReadinessBarrier,
    ) -> Self {
        Self::new(config.path_poll_interval(), config.path_timeout(), barrier)
    }

    /// Resolves `path` from `root`, suspending only while a segment is missing
    pub async fn resolve(
        &self,
        root: &Arc<HostObject>,
        path: &str,
    ) -> Result<HostValue, WatchError> {
        let mut request = WatchRequest::new(root, path, self.timeout);
        let outcome = match request.advance() {
            Ok(Step::Resolved(value)) => Ok(value),
            Ok(Step::Blocked(_)) => self.wait(&mut request).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            self.degrade(e);
        }
        outcome
    }

    /// Invokes `on_resolved` with the value at the end of `path`.
    ///
    /// A fully present path is delivered before this returns.
    pub fn watch<F>(
        &self,
        root: &Arc<HostObject>,
        path: &str,
        on_resolved: F,
    ) -> Armed
    where
        F: FnOnce(HostValue) + Send + 'static,
    {
        let mut request = WatchRequest::new(root, path, self.timeout);
        match request.advance() {
            Ok(Step::Resolved(value)) => {
                on_resolved(value);
                Armed::Resolved
            }
            Err(e) => {
                self.degrade(&e);
                Armed::Abandoned
            }
            Ok(Step::Blocked(segment)) => {
                debug!(path = %path, segment = %segment, "waiting for path segment");
                let watcher = self.clone();
                Armed::Pending(tokio::spawn(async move {
                    match watcher.wait(&mut request).await {
                        Ok(value) => on_resolved(value),
                        Err(e) => watcher.degrade(&e),
                    }
                }))
            }
        }
    }

    async fn wait(
        &self,
        request: &mut WatchRequest,
    ) -> Result<HostValue, WatchError> {
        let deadline = request.deadline();
        match timeout_at(deadline, self.poll(request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(request.timeout_error()),
        }
    }

    async fn poll(
        &self,
        request: &mut WatchRequest,
    ) -> Result<HostValue, WatchError> {
        let mut ticker = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Step::Resolved(value) = request.advance()? {
                return Ok(value);
            }
        }
    }

    fn degrade(
        &self,
        error: &WatchError,
    ) {
        let segment = error.segment().unwrap_or_default();
        warn!(
            error = %error,
            segment,
            "path unresolved, proceeding without its patch"
        );
        metrics::PATH_WATCH_FAILURES
            .with_label_values(&[error.path(), error.reason()])
            .inc();
        self.barrier.force_complete();
    }
}
