//! Bounded simulation loop.
//!
//! [`run_simulation`] drives [`Simulation::tick`] with a fixed tick length,
//! feeding it commands from a [`CommandSource`] before each tick and
//! flushing notifications to a [`NotificationSink`] after it. In realtime
//! mode the loop sleeps for the tick length between ticks; otherwise it
//! runs as fast as it can.

use blockadia_types::Command;
use tracing::{info, warn};

use crate::bridge::NotificationSink;
use crate::error::SimError;
use crate::simulation::{Simulation, TickSummary};

/// Supplier of player input.
pub trait CommandSource: Send {
    /// Commands to apply before tick `tick` runs.
    fn commands_for(&mut self, tick: u64, sim: &Simulation) -> Vec<Command>;
}

/// A source that never sends anything.
pub struct NoCommands;

impl CommandSource for NoCommands {
    fn commands_for(&mut self, _tick: u64, _sim: &Simulation) -> Vec<Command> {
        Vec::new()
    }
}

/// Loop bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Stop after this many ticks.
    pub max_ticks: u64,
    /// Simulated milliseconds per tick.
    pub tick_interval_ms: u64,
    /// Sleep for the tick length between ticks.
    pub realtime: bool,
}

/// How a run went.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    /// Ticks executed.
    pub total_ticks: u64,
    /// The last tick summary, if any tick ran.
    pub final_summary: Option<TickSummary>,
    /// Commands applied.
    pub commands_accepted: u64,
    /// Commands refused.
    pub commands_refused: u64,
    /// Notifications handed to the sink.
    pub notifications_delivered: u64,
}

/// Run the simulation until `options.max_ticks` ticks have executed.
///
/// # Errors
///
/// Returns [`SimError`] if a tick fails. Refused commands are counted, not
/// returned.
pub async fn run_simulation(
    sim: &mut Simulation,
    source: &mut dyn CommandSource,
    sink: &mut dyn NotificationSink,
    options: RunOptions,
) -> Result<RunResult, SimError> {
    let mut result = RunResult::default();

    info!(
        max_ticks = options.max_ticks,
        tick_interval_ms = options.tick_interval_ms,
        realtime = options.realtime,
        "Simulation starting"
    );

    while result.total_ticks < options.max_ticks {
        let upcoming = sim.clock().tick().saturating_add(1);
        for command in source.commands_for(upcoming, sim) {
            if sim.dispatch(command) {
                result.commands_accepted = result.commands_accepted.saturating_add(1);
            } else {
                result.commands_refused = result.commands_refused.saturating_add(1);
            }
        }

        let summary = sim.tick(options.tick_interval_ms)?;
        result.total_ticks = result.total_ticks.saturating_add(1);

        let delivered = sim.flush(sink);
        result.notifications_delivered = result
            .notifications_delivered
            .saturating_add(u64::try_from(delivered).unwrap_or(u64::MAX));
        result.final_summary = Some(summary);

        if options.realtime {
            tokio::time::sleep(tokio::time::Duration::from_millis(options.tick_interval_ms))
                .await;
        }
    }

    Ok(result)
}

/// Log the end of a run.
pub fn log_run_end(result: &RunResult, sim: &Simulation) {
    info!(
        total_ticks = result.total_ticks,
        commands_accepted = result.commands_accepted,
        commands_refused = result.commands_refused,
        notifications = result.notifications_delivered,
        "Simulation ended"
    );

    let Some(summary) = result.final_summary else {
        warn!("Simulation ended with no ticks executed");
        return;
    };
    let wallet = sim.wallet();
    let population = sim.population();
    info!(
        tick = summary.tick,
        now_ms = summary.now_ms,
        wood = wallet.wood,
        stone = wallet.stone,
        gold = wallet.gold,
        metal = wallet.metal,
        units = population.current,
        assigned = population.assigned,
        population_cap = population.max,
        audit_balanced = sim.ledger().audit().is_balanced(),
        "Final state"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use blockadia_types::Notification;

    use super::*;
    use crate::bridge::NoOpSink;
    use crate::config::SimulationConfig;

    fn bare() -> Simulation {
        let mut config = SimulationConfig::default();
        config.generation.clusters.clear();
        Simulation::new(config).unwrap()
    }

    fn options(max_ticks: u64) -> RunOptions {
        RunOptions {
            max_ticks,
            tick_interval_ms: 100,
            realtime: false,
        }
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut sim = bare();
        let result = run_simulation(&mut sim, &mut NoCommands, &mut NoOpSink, options(5))
            .await
            .unwrap();
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.map(|s| s.tick), Some(5));
        assert_eq!(sim.clock().now_ms(), 500);
    }

    #[tokio::test]
    async fn commands_are_counted() {
        struct Once;
        impl CommandSource for Once {
            fn commands_for(&mut self, tick: u64, _sim: &Simulation) -> Vec<Command> {
                if tick == 1 {
                    vec![Command::SpawnVillager, Command::CancelBuildMode]
                } else {
                    Vec::new()
                }
            }
        }

        let mut sim = bare();
        let mut sink: Vec<Notification> = Vec::new();
        let result = run_simulation(&mut sim, &mut Once, &mut sink, options(3))
            .await
            .unwrap();
        assert_eq!(result.commands_accepted, 1);
        assert_eq!(result.commands_refused, 1);
        assert_eq!(sim.units().count(), 2);
        assert!(
            sink.iter()
                .any(|n| matches!(n, Notification::UnitSpawned(_)))
        );
    }
}
