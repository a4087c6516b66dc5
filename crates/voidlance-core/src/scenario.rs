//! Scenario replay packages for regression and replay testing.
//!
//! A [`Scenario`] bundles a set of unit configurations with a scripted
//! strike/action timeline and a tick count. Running one builds a fresh
//! [`Arena`], replays the timeline, and reports the final state digest —
//! regression suites compare digests across runs, machines, and versions.
//!
//! This is the only fallible surface in the crate: loading can hit I/O,
//! parse, or validation problems and returns [`ScenarioError`]. The
//! resolution core itself never fails.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arena::Arena;
use crate::damage::{DamagePacket, DamagePayloadOp};
use crate::defense::{
    apply_module_defense_modifiers, DefenderState, HullSegment, ModuleDefenseModifier, ShieldLayer,
};
use crate::events::CombatEvent;
use crate::hash::digest_arena;
use crate::heat::{
    EquippedLimb, HeatActionEvent, HeatModifierDefinition, HeatRuntimeState, HeatSafetyMode,
    HeatsinkState, OwnedItem,
};
use crate::types::{DamageType, Delivery};
use crate::unit::QueuedStrike;

/// Errors raised while loading or validating a scenario package.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),
    /// The scenario JSON could not be parsed.
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
    /// The scenario parsed but is internally inconsistent.
    #[error("invalid scenario: {0}")]
    Validation(String),
}

/// Initial configuration for one unit in a scenario.
///
/// Every field defaults so scenario files only spell out what they exercise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    /// Orientation frame.
    #[serde(default)]
    pub defender: DefenderState,
    /// Shield stack.
    #[serde(default)]
    pub shields: Vec<ShieldLayer>,
    /// Hull segments.
    #[serde(default)]
    pub hull_segments: Vec<HullSegment>,
    /// Heat runtime baselines.
    #[serde(default)]
    pub heat: HeatRuntimeState,
    /// Heatsink baselines.
    #[serde(default)]
    pub heatsink: HeatsinkState,
    /// Overheat safety policy.
    #[serde(default)]
    pub safety_mode: HeatSafetyMode,
    /// Equipped limbs for heat aggregate resolution.
    #[serde(default)]
    pub equipped_limbs: Vec<EquippedLimb>,
    /// Owned items for heat aggregate resolution.
    #[serde(default)]
    pub owned_items: Vec<OwnedItem>,
    /// Equipment defense modifiers, applied to the buffers once at spawn.
    #[serde(default)]
    pub defense_modifiers: Vec<ModuleDefenseModifier>,
}

/// One scripted damage packet, scheduled by tick and unit index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedStrike {
    /// Tick the strike is queued on.
    pub tick: u64,
    /// Index of the attacking unit in [`Scenario::units`].
    pub source: usize,
    /// Index of the defending unit in [`Scenario::units`].
    pub target: usize,
    /// Damage channel.
    pub damage_type: DamageType,
    /// Delivery kind.
    pub delivery: Delivery,
    /// Base damage.
    pub base_damage: f32,
    /// Critical-hit multiplier.
    #[serde(default = "default_crit")]
    pub crit_multiplier: f32,
    /// Shield-bypass fraction.
    #[serde(default)]
    pub penetration01: f32,
    /// Direction of travel, attacker toward defender.
    #[serde(default = "default_direction")]
    pub incoming_direction: Vec3,
    /// Preferred hull segment, if any.
    #[serde(default)]
    pub preferred_hull_segment: Option<usize>,
    /// Payload operations riding with the packet.
    #[serde(default)]
    pub payload_ops: Vec<DamagePayloadOp>,
}

fn default_crit() -> f32 {
    1.0
}

fn default_direction() -> Vec3 {
    -Vec3::Z
}

/// One scripted heat action event, scheduled by tick and unit index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedAction {
    /// Tick the event is appended on.
    pub tick: u64,
    /// Index of the firing unit in [`Scenario::units`].
    pub unit: usize,
    /// The heat action event.
    pub event: HeatActionEvent,
}

/// A replayable combat scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Human-readable scenario name.
    pub name: String,
    /// Number of ticks to run.
    pub ticks: u64,
    /// Heat modifier catalog used for aggregate resolution.
    #[serde(default)]
    pub heat_definitions: Vec<HeatModifierDefinition>,
    /// Units, spawned in order (index = spawn order).
    pub units: Vec<UnitConfig>,
    /// Scripted strikes.
    #[serde(default)]
    pub strikes: Vec<ScriptedStrike>,
    /// Scripted heat action events.
    #[serde(default)]
    pub actions: Vec<ScriptedAction>,
}

/// Outcome of a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Ticks actually executed.
    pub ticks_run: u64,
    /// Digest of the final arena state.
    pub final_digest: u64,
    /// Every event emitted over the run, in tick then unit order.
    pub events: Vec<CombatEvent>,
}

impl Scenario {
    /// Parses and validates a scenario from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Parse`] for malformed JSON and
    /// [`ScenarioError::Validation`] for out-of-range indices or schedules.
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Loads a scenario from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Io`] if the file cannot be read, plus
    /// everything [`Scenario::from_json`] can return.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Checks internal consistency.
    fn validate(&self) -> Result<(), ScenarioError> {
        if self.ticks == 0 {
            return Err(ScenarioError::Validation(
                "scenario must run at least one tick".to_string(),
            ));
        }
        if self.units.is_empty() {
            return Err(ScenarioError::Validation(
                "scenario has no units".to_string(),
            ));
        }
        for (i, strike) in self.strikes.iter().enumerate() {
            if strike.source >= self.units.len() || strike.target >= self.units.len() {
                return Err(ScenarioError::Validation(format!(
                    "strike {i} references a unit index out of range"
                )));
            }
            if strike.tick >= self.ticks {
                return Err(ScenarioError::Validation(format!(
                    "strike {i} is scheduled at tick {} beyond the run length {}",
                    strike.tick, self.ticks
                )));
            }
        }
        for (i, action) in self.actions.iter().enumerate() {
            if action.unit >= self.units.len() {
                return Err(ScenarioError::Validation(format!(
                    "action {i} references a unit index out of range"
                )));
            }
            if action.tick >= self.ticks {
                return Err(ScenarioError::Validation(format!(
                    "action {i} is scheduled at tick {} beyond the run length {}",
                    action.tick, self.ticks
                )));
            }
        }
        Ok(())
    }

    /// Replays the scenario from a fresh arena and reports the outcome.
    ///
    /// Deterministic: the same scenario always produces the same report,
    /// digest included.
    #[must_use]
    pub fn run(&self) -> ScenarioReport {
        let mut arena = Arena::new();
        let ids: Vec<_> = self
            .units
            .iter()
            .map(|config| {
                let id = arena.spawn();
                if let Some(unit) = arena.get_mut(id) {
                    unit.defender = config.defender;
                    unit.shields = config.shields.clone();
                    unit.hull_segments = config.hull_segments.clone();
                    unit.heat = config.heat;
                    unit.heatsink = config.heatsink;
                    unit.safety_mode = config.safety_mode;
                    unit.equipped_limbs = config.equipped_limbs.clone();
                    unit.owned_items = config.owned_items.clone();
                    apply_module_defense_modifiers(
                        &config.defense_modifiers,
                        &mut unit.shields,
                        &mut unit.hull_segments,
                    );
                    unit.refresh_heat_stats(&self.heat_definitions);
                }
                id
            })
            .collect();

        let mut events = Vec::new();
        for tick in 0..self.ticks {
            for strike in self.strikes.iter().filter(|strike| strike.tick == tick) {
                arena.queue_strike(QueuedStrike {
                    packet: DamagePacket {
                        source: ids[strike.source],
                        target: ids[strike.target],
                        damage_type: strike.damage_type,
                        delivery: strike.delivery,
                        base_damage: strike.base_damage,
                        crit_multiplier: strike.crit_multiplier,
                        penetration01: strike.penetration01,
                        incoming_direction: strike.incoming_direction,
                        preferred_hull_segment: strike.preferred_hull_segment,
                    },
                    payload_ops: strike.payload_ops.clone(),
                });
            }
            for action in self.actions.iter().filter(|action| action.tick == tick) {
                if let Some(unit) = arena.get_mut(ids[action.unit]) {
                    unit.action_events.push(action.event.clone());
                }
            }
            events.extend(arena.step());
        }

        ScenarioReport {
            ticks_run: self.ticks,
            final_digest: digest_arena(&arena),
            events,
        }
    }
}
