use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tokio::time::timeout_at;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::Armed;
use crate::HostObject;
use crate::HostValue;
use crate::WatchConfig;
use crate::WatchError;

/// Delivers the first value a property receives.
#[derive(Debug, Clone)]
pub struct PropertyWatcher {
    poll_interval: Duration,
    /// Ceiling of the accessor fallback poll
    timeout: Duration,
}

impl PropertyWatcher {
    pub fn new(
        poll_interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(config.property_poll_interval(), config.property_timeout())
    }

    /// Waits for `key` on `target` to hold a value.
    ///
    /// Returns at once if it already does. Properties carrying a custom
    /// accessor are polled at the configured cadence rather than subscribed
    /// to, since their writes bypass the subscription table. That poll gives
    /// up with [`WatchError::Timeout`] once the configured ceiling passes.
    pub async fn wait_for(
        &self,
        target: Option<&Arc<HostObject>>,
        key: &str,
    ) -> Result<HostValue, WatchError> {
        let Some(target) = target else {
            return Err(WatchError::MissingTarget {
                path: key.to_string(),
            });
        };

        if target.has_accessor(key) {
            trace!(object = %target.name(), key, "accessor present, polling");
            return self.poll(target, key).await;
        }

        // subscribe before checking so a write in between is not lost
        let subscription = target.subscriptions().subscribe(target.id(), key);
        if let Some(value) = target.get(key) {
            return Ok(value);
        }

        match subscription.recv().await {
            Some(value) => Ok(value),
            None => Err(WatchError::MissingTarget {
                path: format!("{}.{}", target.name(), key),
            }),
        }
    }

    /// Invokes `on_value` with the first value of `key` on `target`.
    ///
    /// An existing value is delivered before this returns. A missing target
    /// only logs: the caller has nothing further to do in that case.
    pub fn watch<F>(
        &self,
        target: Option<&Arc<HostObject>>,
        key: &str,
        on_value: F,
    ) -> Armed
    where
        F: FnOnce(HostValue) + Send + 'static,
    {
        let Some(target) = target else {
            warn!(key, "property watch requested on a missing target, ignored");
            return Armed::Abandoned;
        };

        if let Some(value) = target.get(key) {
            on_value(value);
            return Armed::Resolved;
        }

        let watcher = self.clone();
        let target = Arc::clone(target);
        let key = key.to_string();
        Armed::Pending(tokio::spawn(async move {
            match watcher.wait_for(Some(&target), &key).await {
                Ok(value) => {
                    debug!(object = %target.name(), key = %key, "property resolved");
                    on_value(value);
                }
                Err(e) => warn!(error = %e, "property watch ended without a value"),
            }
        }))
    }

    async fn poll(
        &self,
        target: &HostObject,
        key: &str,
    ) -> Result<HostValue, WatchError> {
        let started_at = Instant::now();
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let poll = async {
            loop {
                ticker.tick().await;
                if let Some(value) = target.get(key) {
                    return value;
                }
            }
        };

        timeout_at(started_at + self.timeout, poll)
            .await
            .map_err(|_| WatchError::Timeout {
                path: format!("{}.{}", target.name(), key),
                segment: key.to_string(),
                elapsed: started_at.elapsed(),
            })
    }
}
