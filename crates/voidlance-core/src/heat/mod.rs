//! The per-unit heat economy that gates weapon output.
//!
//! # Architecture
//!
//! Two cooperating parts with very different cadences:
//! - [`aggregate`]: folds a unit's equipped-limb/affix/item modifier sources
//!   into one [`ResolvedHeatStats`] bundle — pure, order-independent,
//!   re-run only when the loadout changes
//! - [`tick`]: advances [`HeatRuntimeState`] by one tick given the fired
//!   action events and the resolved bundle, producing the output multipliers
//!   the weapon-firing collaborator reads to gate fire
//!
//! The only hysteresis state carried between ticks is
//! [`HeatRuntimeState::is_overheated`]; everything else is recomputed.

pub mod aggregate;
pub mod tick;

use serde::{Deserialize, Serialize};

pub use aggregate::resolve_aggregate;
pub use tick::{resolve_jam, tick_heat};

/// Floor for multiplicative heat stats.
const MIN_STAT_MULTIPLIER: f32 = 0.05;

/// Module classification for heat modifier matching and action events.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleType {
    /// Power generation module
    Reactor,
    /// Propulsion module
    Engine,
    /// Weapon module
    Weapon,
    /// Shield projection module
    ShieldEmitter,
    /// Everything else (coolant loops, sensors, utility gear)
    Utility,
}

/// Slot a limb is mounted in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimbSlot {
    /// Central core mount
    Core,
    /// Weapon hardpoint
    Weapon,
    /// Dedicated cooling mount
    Cooling,
    /// Auxiliary mount
    Auxiliary,
}

/// What a heat modifier definition matches against.
///
/// A tagged enum rather than a kind-plus-id pair so call sites match
/// exhaustively and a new source kind cannot fall through silently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeatModifierSource {
    /// Matches a specific equipped limb by id.
    LimbId(String),
    /// Matches any equipped limb carrying the affix.
    AffixId(String),
    /// Matches a specific owned item by id.
    ItemId(String),
    /// Matches any owned item belonging to the set.
    SetId(String),
    /// Matches any equipped limb of the module type.
    ModuleType(ModuleType),
    /// Matches any limb mounted in the slot.
    LimbSlot(LimbSlot),
}

/// One limb in a unit's loadout, as rolled by the loot system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquippedLimb {
    /// Stable limb identifier.
    pub limb_id: String,
    /// Affix rolled onto the limb, if any.
    pub affix_id: Option<String>,
    /// Module classification.
    pub module_type: ModuleType,
    /// Mount slot.
    pub slot: LimbSlot,
}

/// One item in a unit's inventory that can carry heat modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedItem {
    /// Stable item identifier.
    pub item_id: String,
    /// Item set the item belongs to, if any.
    pub set_id: Option<String>,
}

/// Static catalog entry describing how one source alters a unit's heat
/// economy.
///
/// Multiplicative fields default to 1 and a non-positive value reads as
/// "unset" (catalog data is designer-authored and defensively interpreted);
/// additive fields default to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatModifierDefinition {
    /// Stable identifier for telemetry.
    pub modifier_id: String,
    /// What this definition matches against.
    pub source: HeatModifierSource,
    /// Multiplier on heat generated by action events.
    pub heat_generation_multiplier: f32,
    /// Multiplier on passive dissipation per tick.
    pub heat_dissipation_multiplier: f32,
    /// Multiplier on total heat capacity.
    pub heat_capacity_multiplier: f32,
    /// Additive offset to the overheat threshold (fraction of capacity).
    pub overheat_threshold_offset01: f32,
    /// Damage bonus per unit of heat fraction while nominal.
    pub heat_damage_bonus_per_heat01: f32,
    /// Cooldown bonus per unit of heat fraction while nominal.
    pub heat_cooldown_bonus_per_heat01: f32,
    /// Engine speed bonus per unit of heat fraction while nominal.
    pub heat_engine_speed_bonus_per_heat01: f32,
    /// Shield recharge bonus per unit of heat fraction while nominal.
    pub heat_shield_recharge_bonus_per_heat01: f32,
    /// Shield intensity bonus per unit of heat fraction while nominal.
    pub heat_shield_intensity_bonus_per_heat01: f32,
    /// Damage multiplier while overheated (< 1 penalizes).
    pub overheat_damage_penalty_multiplier: f32,
    /// Cooldown multiplier while overheated (> 1 penalizes).
    pub overheat_cooldown_penalty_multiplier: f32,
    /// Jam chance accrued per tick while overheated in unsafe mode.
    pub overheat_jam_chance_per_tick: f32,
    /// Thermal self-damage per tick while overheated in unsafe mode.
    pub overheat_thermal_self_damage_per_tick: f32,
    /// Multiplier on heatsink capacity.
    pub heatsink_capacity_multiplier: f32,
    /// Multiplier on heatsink absorption per tick.
    pub heatsink_absorb_multiplier: f32,
    /// Multiplier on heatsink venting per tick.
    pub heatsink_vent_multiplier: f32,
    /// Scales unsafe-mode thermal self-damage.
    pub unsafe_thermal_leak_multiplier: f32,
}

impl HeatModifierDefinition {
    /// Creates a neutral definition for the given source.
    #[must_use]
    pub fn neutral(modifier_id: impl Into<String>, source: HeatModifierSource) -> Self {
        Self {
            modifier_id: modifier_id.into(),
            source,
            heat_generation_multiplier: 1.0,
            heat_dissipation_multiplier: 1.0,
            heat_capacity_multiplier: 1.0,
            overheat_threshold_offset01: 0.0,
            heat_damage_bonus_per_heat01: 0.0,
            heat_cooldown_bonus_per_heat01: 0.0,
            heat_engine_speed_bonus_per_heat01: 0.0,
            heat_shield_recharge_bonus_per_heat01: 0.0,
            heat_shield_intensity_bonus_per_heat01: 0.0,
            overheat_damage_penalty_multiplier: 1.0,
            overheat_cooldown_penalty_multiplier: 1.0,
            overheat_jam_chance_per_tick: 0.0,
            overheat_thermal_self_damage_per_tick: 0.0,
            heatsink_capacity_multiplier: 1.0,
            heatsink_absorb_multiplier: 1.0,
            heatsink_vent_multiplier: 1.0,
            unsafe_thermal_leak_multiplier: 1.0,
        }
    }
}

/// The load-out-dependent, time-independent aggregate of all matching heat
/// modifiers.
///
/// Recomputed by [`resolve_aggregate`] on equipment change only, never per
/// tick. Multiplicative fields fold by multiplication (associative),
/// additive fields by summation (commutative), so the aggregate is
/// independent of definition ordering.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedHeatStats {
    /// Multiplier on heat generated by action events.
    pub heat_generation_multiplier: f32,
    /// Multiplier on passive dissipation per tick.
    pub heat_dissipation_multiplier: f32,
    /// Multiplier on total heat capacity.
    pub heat_capacity_multiplier: f32,
    /// Additive offset to the overheat threshold.
    pub overheat_threshold_offset01: f32,
    /// Damage bonus coefficient while nominal.
    pub heat_damage_bonus_per_heat01: f32,
    /// Cooldown bonus coefficient while nominal.
    pub heat_cooldown_bonus_per_heat01: f32,
    /// Engine speed bonus coefficient while nominal.
    pub heat_engine_speed_bonus_per_heat01: f32,
    /// Shield recharge bonus coefficient while nominal.
    pub heat_shield_recharge_bonus_per_heat01: f32,
    /// Shield intensity bonus coefficient while nominal.
    pub heat_shield_intensity_bonus_per_heat01: f32,
    /// Damage multiplier while overheated.
    pub overheat_damage_penalty_multiplier: f32,
    /// Cooldown multiplier while overheated.
    pub overheat_cooldown_penalty_multiplier: f32,
    /// Jam chance per tick while overheated in unsafe mode.
    pub overheat_jam_chance_per_tick: f32,
    /// Thermal self-damage per tick while overheated in unsafe mode.
    pub overheat_thermal_self_damage_per_tick: f32,
    /// Multiplier on heatsink capacity.
    pub heatsink_capacity_multiplier: f32,
    /// Multiplier on heatsink absorption.
    pub heatsink_absorb_multiplier: f32,
    /// Multiplier on heatsink venting.
    pub heatsink_vent_multiplier: f32,
    /// Scales unsafe-mode thermal self-damage.
    pub unsafe_thermal_leak_multiplier: f32,
}

impl ResolvedHeatStats {
    /// Returns the identity aggregate with the baseline overheat penalties.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            heat_generation_multiplier: 1.0,
            heat_dissipation_multiplier: 1.0,
            heat_capacity_multiplier: 1.0,
            overheat_threshold_offset01: 0.0,
            heat_damage_bonus_per_heat01: 0.0,
            heat_cooldown_bonus_per_heat01: 0.0,
            heat_engine_speed_bonus_per_heat01: 0.0,
            heat_shield_recharge_bonus_per_heat01: 0.0,
            heat_shield_intensity_bonus_per_heat01: 0.0,
            overheat_damage_penalty_multiplier: 0.75,
            overheat_cooldown_penalty_multiplier: 1.25,
            overheat_jam_chance_per_tick: 0.12,
            overheat_thermal_self_damage_per_tick: 0.4,
            heatsink_capacity_multiplier: 1.0,
            heatsink_absorb_multiplier: 1.0,
            heatsink_vent_multiplier: 1.0,
            unsafe_thermal_leak_multiplier: 1.35,
        }
    }

    /// Folds one matching definition into the aggregate.
    ///
    /// Non-positive multiplicative definition fields read as unset (1) and
    /// the fold floors every product so a stack of reductions cannot zero a
    /// channel. Bonus coefficients are floored at 0.
    pub fn apply(&mut self, modifier: &HeatModifierDefinition) {
        let unset_as_identity = |value: f32| if value <= 0.0 { 1.0 } else { value };

        self.heat_generation_multiplier *=
            unset_as_identity(modifier.heat_generation_multiplier).max(MIN_STAT_MULTIPLIER);
        self.heat_dissipation_multiplier *=
            unset_as_identity(modifier.heat_dissipation_multiplier).max(MIN_STAT_MULTIPLIER);
        self.heat_capacity_multiplier *=
            unset_as_identity(modifier.heat_capacity_multiplier).max(MIN_STAT_MULTIPLIER);
        self.overheat_threshold_offset01 += modifier.overheat_threshold_offset01;
        self.heat_damage_bonus_per_heat01 += modifier.heat_damage_bonus_per_heat01.max(0.0);
        self.heat_cooldown_bonus_per_heat01 += modifier.heat_cooldown_bonus_per_heat01.max(0.0);
        self.heat_engine_speed_bonus_per_heat01 +=
            modifier.heat_engine_speed_bonus_per_heat01.max(0.0);
        self.heat_shield_recharge_bonus_per_heat01 +=
            modifier.heat_shield_recharge_bonus_per_heat01.max(0.0);
        self.heat_shield_intensity_bonus_per_heat01 +=
            modifier.heat_shield_intensity_bonus_per_heat01.max(0.0);
        self.overheat_damage_penalty_multiplier *=
            unset_as_identity(modifier.overheat_damage_penalty_multiplier).max(MIN_STAT_MULTIPLIER);
        self.overheat_cooldown_penalty_multiplier *=
            unset_as_identity(modifier.overheat_cooldown_penalty_multiplier)
                .max(MIN_STAT_MULTIPLIER);
        self.overheat_jam_chance_per_tick =
            (self.overheat_jam_chance_per_tick + modifier.overheat_jam_chance_per_tick)
                .clamp(0.0, 1.0);
        self.overheat_thermal_self_damage_per_tick = (self.overheat_thermal_self_damage_per_tick
            + modifier.overheat_thermal_self_damage_per_tick)
            .max(0.0);
        self.heatsink_capacity_multiplier *=
            unset_as_identity(modifier.heatsink_capacity_multiplier).max(MIN_STAT_MULTIPLIER);
        self.heatsink_absorb_multiplier *=
            unset_as_identity(modifier.heatsink_absorb_multiplier).max(MIN_STAT_MULTIPLIER);
        self.heatsink_vent_multiplier *=
            unset_as_identity(modifier.heatsink_vent_multiplier).max(MIN_STAT_MULTIPLIER);
        self.unsafe_thermal_leak_multiplier *=
            unset_as_identity(modifier.unsafe_thermal_leak_multiplier).max(MIN_STAT_MULTIPLIER);
    }
}

impl Default for ResolvedHeatStats {
    fn default() -> Self {
        Self::identity()
    }
}

/// Per-unit heat runtime.
///
/// `is_overheated` is the only hysteresis state carried between ticks.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatRuntimeState {
    /// Accumulated heat.
    pub current_heat: f32,
    /// Base heat capacity before the resolved capacity multiplier.
    pub base_heat_capacity: f32,
    /// Base passive dissipation per tick.
    pub base_dissipation_per_tick: f32,
    /// Base overheat threshold as a fraction of capacity.
    pub base_overheat_threshold01: f32,
    /// Base recovery threshold as a fraction of capacity.
    pub base_recovery_threshold01: f32,
    /// Whether the unit is currently overheated.
    pub is_overheated: bool,
}

impl HeatRuntimeState {
    /// Creates a cold runtime with the given base capacity and dissipation.
    #[must_use]
    pub const fn new(base_heat_capacity: f32, base_dissipation_per_tick: f32) -> Self {
        Self {
            current_heat: 0.0,
            base_heat_capacity,
            base_dissipation_per_tick,
            base_overheat_threshold01: 0.85,
            base_recovery_threshold01: 0.45,
            is_overheated: false,
        }
    }
}

impl Default for HeatRuntimeState {
    fn default() -> Self {
        Self::new(100.0, 4.0)
    }
}

/// Optional heatsink buffer that soaks generated heat before it reaches the
/// main pool.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeatsinkState {
    /// Heat currently stored.
    pub stored_heat: f32,
    /// Base storage capacity before the resolved multiplier.
    pub base_capacity: f32,
    /// Base absorption per tick.
    pub base_absorb_per_tick: f32,
    /// Base venting per tick.
    pub base_vent_per_tick: f32,
}

/// Per-unit safety policy for overheated weapon fire.
///
/// Read but not owned by this core — the surrounding game exposes it as a
/// player-facing setting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HeatSafetyMode {
    /// Suppress fire entirely while overheated.
    #[default]
    ConservativeThrottle,
    /// Keep firing while overheated; penalties still apply, and the unit
    /// accrues jam risk and thermal self-damage.
    UnsafeNoReduction,
}

/// One fired action's heat contribution, appended by the weapon-firing
/// collaborator.
///
/// The action-event buffer is a single-tick inbox: [`tick_heat`] drains and
/// clears it so stale events can never double-count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatActionEvent {
    /// Module that fired.
    pub module_type: ModuleType,
    /// Slot the module is mounted in.
    pub slot: LimbSlot,
    /// Base heat contribution of the action.
    pub base_heat: f32,
    /// Scale factor (charge level, burst length). `<= 0` reads as 1.
    pub scale: f32,
}

/// Heat outputs read every tick by the weapon-firing collaborator and the
/// non-weapon systems that mirror heat state.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatOutputState {
    /// Heat as a fraction of effective capacity.
    pub heat01: f32,
    /// Effective heat capacity this tick.
    pub heat_capacity: f32,
    /// Effective dissipation this tick.
    pub dissipation_per_tick: f32,
    /// Effective overheat threshold this tick.
    pub overheat_threshold01: f32,
    /// Effective recovery threshold this tick.
    pub recovery_threshold01: f32,
    /// Multiplier on weapon damage.
    pub damage_multiplier: f32,
    /// Multiplier on weapon cooldown.
    pub cooldown_multiplier: f32,
    /// Multiplier on engine speed.
    pub engine_speed_multiplier: f32,
    /// Multiplier on shield recharge.
    pub shield_recharge_multiplier: f32,
    /// Multiplier on shield intensity.
    pub shield_intensity_multiplier: f32,
    /// Chance a firing action jams this tick (unsafe mode only).
    pub jam_chance: f32,
    /// Thermal self-damage accrued this tick (unsafe mode only).
    pub thermal_self_damage_per_tick: f32,
    /// Heat stored in the heatsink after this tick.
    pub heatsink_stored_heat: f32,
    /// Effective heatsink capacity this tick.
    pub heatsink_capacity: f32,
    /// Whether the weapon collaborator must suppress fire this tick.
    pub suppress_fire: bool,
    /// Whether the unit is overheated.
    pub is_overheated: bool,
}

impl HeatOutputState {
    /// Returns the cold, nominal output state.
    #[must_use]
    pub const fn nominal() -> Self {
        Self {
            heat01: 0.0,
            heat_capacity: 1.0,
            dissipation_per_tick: 0.0,
            overheat_threshold01: 0.85,
            recovery_threshold01: 0.45,
            damage_multiplier: 1.0,
            cooldown_multiplier: 1.0,
            engine_speed_multiplier: 1.0,
            shield_recharge_multiplier: 1.0,
            shield_intensity_multiplier: 1.0,
            jam_chance: 0.0,
            thermal_self_damage_per_tick: 0.0,
            heatsink_stored_heat: 0.0,
            heatsink_capacity: 0.0,
            suppress_fire: false,
            is_overheated: false,
        }
    }
}

impl Default for HeatOutputState {
    fn default() -> Self {
        Self::nominal()
    }
}
