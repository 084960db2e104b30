//! Event bridge between the simulation and its presentation layer.
//!
//! Commands arrive as [`Command`] values (or their JSON form) and are
//! routed to the matching [`Simulation`] operation. Notifications are
//! queued in an [`EventBridge`] outbox in the order they were raised and
//! handed to a [`NotificationSink`] on [`Simulation::flush`].
//!
//! A refused command is a soft failure: [`Simulation::dispatch`] logs it
//! and carries on, leaving the state untouched.

use blockadia_ledger::EntryReason;
use blockadia_types::{Command, Notification};
use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::simulation::Simulation;

/// Receiver of outgoing notifications.
///
/// Implementations might forward to a UI, a websocket, or a log.
pub trait NotificationSink {
    /// Called once per notification, in emission order.
    fn deliver(&mut self, notification: &Notification);
}

impl NotificationSink for Vec<Notification> {
    fn deliver(&mut self, notification: &Notification) {
        self.push(notification.clone());
    }
}

/// A sink that discards everything.
pub struct NoOpSink;

impl NotificationSink for NoOpSink {
    fn deliver(&mut self, _notification: &Notification) {}
}

/// FIFO outbox of pending notifications.
#[derive(Debug, Clone, Default)]
pub struct EventBridge {
    outbox: Vec<Notification>,
}

impl EventBridge {
    /// An empty outbox.
    pub const fn new() -> Self {
        Self { outbox: Vec::new() }
    }

    /// Queue a notification.
    pub fn push(&mut self, notification: Notification) {
        self.outbox.push(notification);
    }

    /// Pending notifications, oldest first.
    pub fn pending(&self) -> &[Notification] {
        &self.outbox
    }

    /// Number of pending notifications.
    pub fn len(&self) -> usize {
        self.outbox.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.outbox.is_empty()
    }

    /// Take every pending notification.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }
}

impl Simulation {
    /// Route a command to its operation.
    ///
    /// # Errors
    ///
    /// Whatever the operation refuses with. The state is unchanged on
    /// error.
    pub fn handle_command(&mut self, command: Command) -> Result<(), SimError> {
        debug!(command = command.name(), "Command received");
        match command {
            Command::SpawnVillager => self.spawn_villager().map(|_| ()),
            Command::LanguageChange(language) => {
                self.language = language;
                info!(language = ?language, "Language changed");
                Ok(())
            }
            Command::SpendResources(cost) => {
                let at_ms = self.now_ms();
                self.ledger.debit(at_ms, EntryReason::Spend, cost)?;
                self.publish_wallet();
                Ok(())
            }
            Command::RequestUpgrade(target) => self.request_upgrade(target.building_id),
            Command::RequestRecruit(target) => self.request_recruit(target.building_id),
            Command::EnterBuildMode(key) => self.enter_build_mode(&key),
            Command::CancelBuildMode => self.cancel_build_mode(),
            Command::AssignVillager(target) => self.assign_villager(target.building_id),
            Command::UnassignVillager(target) => self.unassign_villager(target.building_id),
            Command::ClickTile(target) => self.click_tile(target.tile),
            Command::PointerMove(target) => {
                self.pointer_move(target.tile);
                Ok(())
            }
        }
    }

    /// Route a command, logging a refusal instead of returning it.
    ///
    /// Returns whether the command was accepted.
    pub fn dispatch(&mut self, command: Command) -> bool {
        let name = command.name();
        match self.handle_command(command) {
            Ok(()) => true,
            Err(err) => {
                info!(command = name, error = %err, "Command refused");
                false
            }
        }
    }

    /// Parse and route a JSON command. Malformed input is logged and
    /// ignored.
    pub fn dispatch_json(&mut self, raw: &str) -> bool {
        match Command::from_json(raw) {
            Ok(command) => self.dispatch(command),
            Err(err) => {
                warn!(error = %err, "Malformed command ignored");
                false
            }
        }
    }

    /// Hand every pending notification to `sink`. Returns how many were
    /// delivered.
    pub fn flush(&mut self, sink: &mut dyn NotificationSink) -> usize {
        let pending = self.bridge.drain();
        for notification in &pending {
            sink.deliver(notification);
        }
        pending.len()
    }

    /// Take every pending notification.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.bridge.drain()
    }

    /// Pending notifications, oldest first.
    pub fn pending_notifications(&self) -> &[Notification] {
        self.bridge.pending()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use blockadia_types::{Language, ResourceWallet};

    use super::*;
    use crate::config::SimulationConfig;

    fn bare() -> Simulation {
        let mut config = SimulationConfig::default();
        config.generation.clusters.clear();
        Simulation::new(config).unwrap()
    }

    #[test]
    fn startup_notifications_come_first() {
        let mut sim = bare();
        let mut sink: Vec<Notification> = Vec::new();
        sim.flush(&mut sink);
        let names: Vec<_> = sink.iter().map(Notification::name).collect();
        assert!(names.ends_with(&["resourceUpdate", "populationUpdate"]));
        assert!(sim.pending_notifications().is_empty());
    }

    #[test]
    fn spend_resources_debits_and_notifies() {
        let mut sim = bare();
        sim.drain_notifications();
        assert!(sim.dispatch_json(
            r#"{"type":"spendResources","payload":{"wood":50,"gold":50}}"#
        ));
        assert_eq!(sim.wallet(), ResourceWallet::new(150, 100, 50, 50));
        assert_eq!(
            sim.drain_notifications(),
            vec![Notification::ResourceUpdate(ResourceWallet::new(150, 100, 50, 50))]
        );
    }

    #[test]
    fn overspend_is_refused_without_change() {
        let mut sim = bare();
        sim.drain_notifications();
        assert!(!sim.dispatch(Command::SpendResources(ResourceWallet::new(0, 0, 0, 51))));
        assert_eq!(sim.wallet(), ResourceWallet::new(200, 100, 100, 50));
        assert!(sim.pending_notifications().is_empty());
    }

    #[test]
    fn language_change_is_applied() {
        let mut sim = bare();
        assert!(sim.dispatch_json(r#"{"type":"languageChange","payload":"pl"}"#));
        assert_eq!(sim.language(), Language::Pl);
    }

    #[test]
    fn malformed_json_is_ignored() {
        let mut sim = bare();
        assert!(!sim.dispatch_json("{not json"));
        assert!(!sim.dispatch_json(r#"{"type":"teleport"}"#));
    }
}
