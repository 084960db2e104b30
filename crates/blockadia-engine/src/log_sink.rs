//! Notification sink that writes to the log.
//!
//! Headless runs have no UI, so every notification is logged at `debug`
//! with its JSON payload and counted by name. The counts are reported once
//! the run ends.

use std::collections::BTreeMap;

use blockadia_core::NotificationSink;
use blockadia_types::Notification;
use tracing::{debug, info, warn};

/// Logs and counts notifications.
#[derive(Debug, Default)]
pub struct LogSink {
    counts: BTreeMap<&'static str, u64>,
}

impl LogSink {
    /// An empty sink.
    pub const fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }

    /// Notifications seen, by wire name.
    pub const fn counts(&self) -> &BTreeMap<&'static str, u64> {
        &self.counts
    }

    /// Log the per-name totals.
    pub fn log_totals(&self) {
        for (name, count) in &self.counts {
            info!(notification = name, count, "Notification total");
        }
    }
}

impl NotificationSink for LogSink {
    fn deliver(&mut self, notification: &Notification) {
        let name = notification.name();
        let counter = self.counts.entry(name).or_insert(0);
        *counter = counter.saturating_add(1);
        match notification.to_json() {
            Ok(json) => debug!(notification = name, payload = %json, "Notification"),
            Err(e) => warn!(notification = name, error = %e, "Notification not serializable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use blockadia_types::ResourceWallet;

    use super::*;

    #[test]
    fn counts_by_name() {
        let mut sink = LogSink::new();
        sink.deliver(&Notification::ResourceUpdate(ResourceWallet::ZERO));
        sink.deliver(&Notification::ResourceUpdate(ResourceWallet::ZERO));
        assert_eq!(sink.counts().get("resourceUpdate"), Some(&2));
    }
}
