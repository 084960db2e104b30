//! Scripted player for headless runs.
//!
//! The script is the `player` section of `blockadia-config.yaml`. It holds
//! a list of timed commands, written in the same JSON shape the UI sends,
//! plus an optional auto-gather behaviour that puts idle villagers to work
//! on the nearest tree.

use std::collections::BTreeMap;
use std::path::Path;

use blockadia_core::{CommandSource, Simulation};
use blockadia_types::{Command, NodeKind, PointerTarget, TilePos};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::EngineError;

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

/// One timed command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptStep {
    /// Tick before which the command is sent.
    pub at_tick: u64,
    /// The command.
    pub command: Command,
}

/// The `player` section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptConfig {
    /// Send idle villagers to the nearest tree.
    #[serde(default = "default_auto_gather")]
    pub auto_gather: bool,

    /// How often, in ticks, idle villagers are looked for.
    #[serde(default = "default_auto_gather_every")]
    pub auto_gather_every: u64,

    /// Timed commands.
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            auto_gather: default_auto_gather(),
            auto_gather_every: default_auto_gather_every(),
            steps: Vec::new(),
        }
    }
}

const fn default_auto_gather() -> bool {
    true
}

const fn default_auto_gather_every() -> u64 {
    10
}

/// Read the `player` section from the YAML file at `path`.
///
/// A missing file or a file without a `player` key yields the default
/// script.
pub fn load_script(path: &Path) -> Result<ScriptConfig, EngineError> {
    if !path.exists() {
        return Ok(ScriptConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| EngineError::Script {
        message: format!("failed to read config file: {e}"),
    })?;
    parse_script(&contents)
}

/// Extract the `player` section from a YAML document.
pub fn parse_script(yaml: &str) -> Result<ScriptConfig, EngineError> {
    let raw: serde_yml::Value = serde_yml::from_str(yaml).map_err(|e| EngineError::Script {
        message: format!("failed to parse config YAML: {e}"),
    })?;
    let Some(player) = raw.get("player") else {
        return Ok(ScriptConfig::default());
    };
    serde_yml::from_value(player.clone()).map_err(|e| EngineError::Script {
        message: format!("failed to parse player section: {e}"),
    })
}

// -----------------------------------------------------------------------
// Player
// -----------------------------------------------------------------------

/// A [`CommandSource`] that replays a script.
pub struct ScriptedPlayer {
    steps: BTreeMap<u64, Vec<Command>>,
    auto_gather: bool,
    auto_gather_every: u64,
}

impl ScriptedPlayer {
    /// Build a player from its configuration.
    pub fn new(config: ScriptConfig) -> Self {
        let mut steps: BTreeMap<u64, Vec<Command>> = BTreeMap::new();
        for step in config.steps {
            steps.entry(step.at_tick).or_default().push(step.command);
        }
        info!(
            scheduled = steps.values().map(Vec::len).sum::<usize>(),
            auto_gather = config.auto_gather,
            "Scripted player ready"
        );
        Self {
            steps,
            auto_gather: config.auto_gather,
            auto_gather_every: config.auto_gather_every.max(1),
        }
    }

    /// Select each idle villager, then click the tree nearest to it.
    ///
    /// Clicking an already selected unit would deselect it, so the select
    /// click is skipped for the villager the selection will already hold.
    fn put_idle_villagers_to_work(sim: &Simulation) -> Vec<Command> {
        let grid = sim.grid();
        let mut selected = sim.selection().unit();
        let mut commands = Vec::new();
        for unit in sim.units().filter(|u| u.is_idle_villager()) {
            let here = unit.tile(grid);
            let Some(tree) = sim.world().nodes().nearest(NodeKind::Tree, here) else {
                continue;
            };
            debug!(unit_id = %unit.id, tree = %tree.tile, "Sending idle villager to a tree");
            if selected != Some(unit.id) {
                commands.push(click(here));
                selected = Some(unit.id);
            }
            commands.push(click(tree.tile));
        }
        commands
    }
}

impl CommandSource for ScriptedPlayer {
    fn commands_for(&mut self, tick: u64, sim: &Simulation) -> Vec<Command> {
        let mut commands = self.steps.remove(&tick).unwrap_or_default();
        let every = self.auto_gather_every;
        if self.auto_gather && tick.checked_rem(every) == 1_u64.checked_rem(every) {
            commands.extend(Self::put_idle_villagers_to_work(sim));
        }
        commands
    }
}

const fn click(tile: TilePos) -> Command {
    Command::ClickTile(PointerTarget { tile })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use blockadia_core::SimulationConfig;

    use super::*;

    #[test]
    fn missing_player_section_uses_defaults() {
        let script = parse_script("world:\n  seed: 7\n").unwrap();
        assert_eq!(script, ScriptConfig::default());
    }

    #[test]
    fn steps_parse_in_wire_format() {
        let yaml = r#"
player:
  auto_gather: false
  steps:
    - at_tick: 5
      command: { type: spawnVillager }
    - at_tick: 5
      command: { type: enterBuildMode, payload: farm }
"#;
        let script = parse_script(yaml).unwrap();
        assert!(!script.auto_gather);
        assert_eq!(script.steps.len(), 2);
        assert_eq!(
            script.steps.get(1).map(|s| &s.command),
            Some(&Command::EnterBuildMode("farm".to_owned()))
        );
    }

    #[test]
    fn scheduled_commands_fire_once() {
        let script = ScriptConfig {
            auto_gather: false,
            auto_gather_every: 10,
            steps: vec![ScriptStep {
                at_tick: 2,
                command: Command::SpawnVillager,
            }],
        };
        let sim = Simulation::new(SimulationConfig::default()).unwrap();
        let mut player = ScriptedPlayer::new(script);
        assert!(player.commands_for(1, &sim).is_empty());
        assert_eq!(player.commands_for(2, &sim), vec![Command::SpawnVillager]);
        assert!(player.commands_for(2, &sim).is_empty());
    }

    #[test]
    fn auto_gather_targets_a_tree() {
        let sim = Simulation::new(SimulationConfig::default()).unwrap();
        let mut player = ScriptedPlayer::new(ScriptConfig::default());
        let commands = player.commands_for(1, &sim);
        assert_eq!(commands.len(), 2);
    }
}
