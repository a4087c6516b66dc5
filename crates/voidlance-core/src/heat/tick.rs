//! The heat tick state machine.
//!
//! # States
//!
//! Two states with a hysteresis band between them:
//! - **Nominal** (`is_overheated == false`): heat rewards sustained fire —
//!   damage and cooldown improve with the heat fraction
//! - **Overheated** (`is_overheated == true`): damage and cooldown penalties
//!   apply in every safety mode; conservative mode additionally suppresses
//!   fire, unsafe mode instead accrues jam risk and thermal self-damage
//!
//! The transition up happens at the (offset) overheat threshold, the
//! transition down at the strictly lower recovery threshold, so the state
//! cannot chatter inside the band.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::debug;

use crate::types::UnitId;

use super::{
    HeatActionEvent, HeatOutputState, HeatRuntimeState, HeatSafetyMode, HeatsinkState,
    ResolvedHeatStats, MIN_STAT_MULTIPLIER,
};

/// Clamp range for the effective overheat threshold.
const OVERHEAT_THRESHOLD_RANGE: (f32, f32) = (0.25, 0.99);

/// Clamp range for the effective recovery threshold.
const RECOVERY_THRESHOLD_RANGE: (f32, f32) = (0.05, 0.98);

/// Floor for the nominal cooldown multiplier.
const COOLDOWN_FLOOR: f32 = 0.1;

/// Fixed overheated multipliers for non-weapon systems, conservative mode.
const CONSERVATIVE_OVERHEAT: (f32, f32, f32) = (0.88, 0.82, 0.78);

/// Fixed overheated multipliers for non-weapon systems, unsafe mode.
const UNSAFE_OVERHEAT: (f32, f32, f32) = (0.95, 0.92, 0.90);

/// Advances a unit's heat runtime by one tick.
///
/// Sums the heat of every action event (then clears the buffer — it is a
/// single-tick inbox), routes generated heat through the heatsink, applies
/// dissipation, clamps the pool to `[0, capacity]`, evaluates the hysteresis
/// transition, and computes the output multipliers for this tick.
///
/// Deterministic: no randomness, no ambient time; `tick` is used only for
/// diagnostics.
///
/// # Example
///
/// ```
/// use voidlance_core::heat::{
///     tick_heat, HeatActionEvent, HeatRuntimeState, HeatSafetyMode, HeatsinkState,
///     LimbSlot, ModuleType, ResolvedHeatStats,
/// };
///
/// let mut runtime = HeatRuntimeState::new(100.0, 4.0);
/// let mut heatsink = HeatsinkState::default();
/// let mut actions = vec![HeatActionEvent {
///     module_type: ModuleType::Weapon,
///     slot: LimbSlot::Weapon,
///     base_heat: 10.0,
///     scale: 1.0,
/// }];
///
/// let output = tick_heat(
///     0,
///     &mut actions,
///     &ResolvedHeatStats::identity(),
///     &mut runtime,
///     &mut heatsink,
///     HeatSafetyMode::ConservativeThrottle,
/// );
///
/// assert!(actions.is_empty());
/// assert!(output.heat01 > 0.0);
/// assert!(!output.is_overheated);
/// ```
pub fn tick_heat(
    tick: u64,
    actions: &mut Vec<HeatActionEvent>,
    stats: &ResolvedHeatStats,
    runtime: &mut HeatRuntimeState,
    heatsink: &mut HeatsinkState,
    safety_mode: HeatSafetyMode,
) -> HeatOutputState {
    let capacity =
        (runtime.base_heat_capacity * stats.heat_capacity_multiplier.max(MIN_STAT_MULTIPLIER))
            .max(1.0);
    let dissipation = (runtime.base_dissipation_per_tick
        * stats.heat_dissipation_multiplier.max(MIN_STAT_MULTIPLIER))
    .max(0.0);
    let generation_multiplier = stats.heat_generation_multiplier.max(MIN_STAT_MULTIPLIER);
    let heatsink_capacity = (heatsink.base_capacity
        * stats.heatsink_capacity_multiplier.max(MIN_STAT_MULTIPLIER))
    .max(0.0);
    let heatsink_absorb = (heatsink.base_absorb_per_tick
        * stats.heatsink_absorb_multiplier.max(MIN_STAT_MULTIPLIER))
    .max(0.0);
    let heatsink_vent = (heatsink.base_vent_per_tick
        * stats.heatsink_vent_multiplier.max(MIN_STAT_MULTIPLIER))
    .max(0.0);

    let mut generated = 0.0;
    for action in actions.iter() {
        let scale = if action.scale <= 0.0 { 1.0 } else { action.scale };
        generated += (action.base_heat * scale * generation_multiplier).max(0.0);
    }
    actions.clear();

    if generated > 0.0 && heatsink_capacity > 0.0 && heatsink_absorb > 0.0 {
        heatsink.stored_heat = heatsink.stored_heat.clamp(0.0, heatsink_capacity);
        let absorb = generated
            .min(heatsink_absorb)
            .min(heatsink_capacity - heatsink.stored_heat);
        if absorb > 0.0 {
            heatsink.stored_heat += absorb;
            generated -= absorb;
        }
    }

    runtime.current_heat = (runtime.current_heat + generated - dissipation).clamp(0.0, capacity);

    if heatsink.stored_heat > 0.0 && heatsink_vent > 0.0 {
        heatsink.stored_heat = (heatsink.stored_heat - heatsink_vent).max(0.0);
    }

    let heat01 = runtime.current_heat / capacity;

    let overheat_threshold = (runtime.base_overheat_threshold01
        + stats.overheat_threshold_offset01)
        .clamp(OVERHEAT_THRESHOLD_RANGE.0, OVERHEAT_THRESHOLD_RANGE.1);
    let recovery_threshold = runtime
        .base_recovery_threshold01
        .min(overheat_threshold - 0.01)
        .clamp(RECOVERY_THRESHOLD_RANGE.0, RECOVERY_THRESHOLD_RANGE.1);

    if !runtime.is_overheated && heat01 >= overheat_threshold {
        runtime.is_overheated = true;
        debug!(tick, heat01, overheat_threshold, "heat state: overheated");
    } else if runtime.is_overheated && heat01 <= recovery_threshold {
        runtime.is_overheated = false;
        debug!(tick, heat01, recovery_threshold, "heat state: recovered");
    }

    let mut output = HeatOutputState {
        heat01,
        heat_capacity: capacity,
        dissipation_per_tick: dissipation,
        overheat_threshold01: overheat_threshold,
        recovery_threshold01: recovery_threshold,
        heatsink_stored_heat: heatsink.stored_heat,
        heatsink_capacity,
        is_overheated: runtime.is_overheated,
        ..HeatOutputState::nominal()
    };

    if runtime.is_overheated {
        // Penalties apply in every safety mode; only suppression differs.
        output.damage_multiplier *= stats
            .overheat_damage_penalty_multiplier
            .max(MIN_STAT_MULTIPLIER);
        output.cooldown_multiplier *= stats
            .overheat_cooldown_penalty_multiplier
            .max(MIN_STAT_MULTIPLIER);

        match safety_mode {
            HeatSafetyMode::ConservativeThrottle => {
                output.suppress_fire = true;
                let (engine, recharge, intensity) = CONSERVATIVE_OVERHEAT;
                output.engine_speed_multiplier *= engine;
                output.shield_recharge_multiplier *= recharge;
                output.shield_intensity_multiplier *= intensity;
            }
            HeatSafetyMode::UnsafeNoReduction => {
                let stress = ((heat01 - overheat_threshold)
                    / (1.0 - overheat_threshold).max(0.01))
                .clamp(0.0, 1.0);
                output.jam_chance =
                    (stats.overheat_jam_chance_per_tick * (1.0 + stress)).clamp(0.0, 1.0);
                output.thermal_self_damage_per_tick = (stats.overheat_thermal_self_damage_per_tick
                    * stats.unsafe_thermal_leak_multiplier
                    * (1.0 + stress))
                    .max(0.0);
                let (engine, recharge, intensity) = UNSAFE_OVERHEAT;
                output.engine_speed_multiplier *= engine;
                output.shield_recharge_multiplier *= recharge;
                output.shield_intensity_multiplier *= intensity;
            }
        }
    } else {
        output.damage_multiplier *=
            1.0 + stats.heat_damage_bonus_per_heat01.max(0.0) * heat01;
        output.cooldown_multiplier *=
            (1.0 - stats.heat_cooldown_bonus_per_heat01.max(0.0) * heat01).max(COOLDOWN_FLOOR);
        output.engine_speed_multiplier *=
            1.0 + stats.heat_engine_speed_bonus_per_heat01.max(0.0) * heat01;
        output.shield_recharge_multiplier *=
            1.0 + stats.heat_shield_recharge_bonus_per_heat01.max(0.0) * heat01;
        output.shield_intensity_multiplier *=
            1.0 + stats.heat_shield_intensity_bonus_per_heat01.max(0.0) * heat01;
    }

    output
}

/// Resolves whether a firing action jams this tick.
///
/// Deterministic: the roll is a hash of (unit, mount, tick), so replays and
/// cross-run regression tests see identical jams. Never jams while fire is
/// suppressed (nothing fires) or when the chance is negligible.
// The 16-bit roll loses no meaningful precision as an f32.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn resolve_jam(output: &HeatOutputState, unit: UnitId, mount_index: usize, tick: u64) -> bool {
    if output.suppress_fire || output.jam_chance <= 1e-5 {
        return false;
    }

    let mut hasher = DefaultHasher::new();
    unit.as_u64().hash(&mut hasher);
    mount_index.hash(&mut hasher);
    (tick ^ 0x9E37_79B9).hash(&mut hasher);
    let roll = (hasher.finish() & 0xFFFF) as f32 / 65536.0;
    roll < output.jam_chance.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heat::{LimbSlot, ModuleType};

    fn fire_event(base_heat: f32) -> HeatActionEvent {
        HeatActionEvent {
            module_type: ModuleType::Weapon,
            slot: LimbSlot::Weapon,
            base_heat,
            scale: 1.0,
        }
    }

    fn tick_once(
        tick: u64,
        actions: Vec<HeatActionEvent>,
        stats: &ResolvedHeatStats,
        runtime: &mut HeatRuntimeState,
        mode: HeatSafetyMode,
    ) -> HeatOutputState {
        let mut actions = actions;
        let mut heatsink = HeatsinkState::default();
        tick_heat(tick, &mut actions, stats, runtime, &mut heatsink, mode)
    }

    mod accumulation_tests {
        use super::*;

        #[test]
        fn events_accumulate_and_buffer_clears() {
            let mut runtime = HeatRuntimeState::new(100.0, 0.0);
            let mut heatsink = HeatsinkState::default();
            let mut actions = vec![fire_event(10.0), fire_event(5.0)];

            let output = tick_heat(
                0,
                &mut actions,
                &ResolvedHeatStats::identity(),
                &mut runtime,
                &mut heatsink,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert!(actions.is_empty(), "action buffer is a single-tick inbox");
            assert!((runtime.current_heat - 15.0).abs() < 1e-4);
            assert!((output.heat01 - 0.15).abs() < 1e-4);
        }

        #[test]
        fn dissipation_drains_heat_and_clamps_at_zero() {
            let mut runtime = HeatRuntimeState::new(100.0, 4.0);
            runtime.current_heat = 3.0;

            let output = tick_once(
                0,
                vec![],
                &ResolvedHeatStats::identity(),
                &mut runtime,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert_eq!(runtime.current_heat, 0.0);
            assert_eq!(output.heat01, 0.0);
        }

        #[test]
        fn heat_clamps_at_capacity() {
            let mut runtime = HeatRuntimeState::new(50.0, 0.0);

            let _ = tick_once(
                0,
                vec![fire_event(500.0)],
                &ResolvedHeatStats::identity(),
                &mut runtime,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert!((runtime.current_heat - 50.0).abs() < 1e-4);
        }

        #[test]
        fn nonpositive_scale_reads_as_one() {
            let mut runtime = HeatRuntimeState::new(100.0, 0.0);
            let mut actions = vec![HeatActionEvent {
                scale: 0.0,
                ..fire_event(10.0)
            }];
            let mut heatsink = HeatsinkState::default();

            let _ = tick_heat(
                0,
                &mut actions,
                &ResolvedHeatStats::identity(),
                &mut runtime,
                &mut heatsink,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert!((runtime.current_heat - 10.0).abs() < 1e-4);
        }
    }

    mod bonus_tests {
        use super::*;

        #[test]
        fn heat_rewards_sustained_fire_below_threshold() {
            let mut stats = ResolvedHeatStats::identity();
            stats.heat_damage_bonus_per_heat01 = 0.2;
            stats.heat_cooldown_bonus_per_heat01 = 0.1;

            let mut runtime = HeatRuntimeState::new(100.0, 0.0);
            let output = tick_once(
                0,
                vec![fire_event(50.0)],
                &stats,
                &mut runtime,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert!(!output.is_overheated);
            assert!((output.damage_multiplier - 1.1).abs() < 1e-4);
            assert!((output.cooldown_multiplier - 0.95).abs() < 1e-4);
            assert!(!output.suppress_fire);
        }

        #[test]
        fn non_weapon_bonuses_mirror_nominal_branch() {
            let mut stats = ResolvedHeatStats::identity();
            stats.heat_engine_speed_bonus_per_heat01 = 0.08;
            stats.heat_shield_recharge_bonus_per_heat01 = 0.06;
            stats.heat_shield_intensity_bonus_per_heat01 = 0.04;

            let mut runtime = HeatRuntimeState::new(100.0, 0.0);
            let output = tick_once(
                0,
                vec![fire_event(50.0)],
                &stats,
                &mut runtime,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert!((output.engine_speed_multiplier - 1.04).abs() < 1e-4);
            assert!((output.shield_recharge_multiplier - 1.03).abs() < 1e-4);
            assert!((output.shield_intensity_multiplier - 1.02).abs() < 1e-4);
        }
    }

    mod hysteresis_tests {
        use super::*;

        #[test]
        fn overheats_at_threshold_and_recovers_below_recovery() {
            let mut stats = ResolvedHeatStats::identity();
            stats.heat_dissipation_multiplier = 1.0;
            let mut runtime = HeatRuntimeState::new(100.0, 10.0);

            // Drive over the 0.85 threshold.
            let output = tick_once(
                0,
                vec![fire_event(100.0)],
                &stats,
                &mut runtime,
                HeatSafetyMode::ConservativeThrottle,
            );
            assert!(output.is_overheated);

            // Cool through the band: still overheated until <= 0.45.
            let mut tick = 1;
            let mut saw_band_tick = false;
            loop {
                let output = tick_once(
                    tick,
                    vec![],
                    &stats,
                    &mut runtime,
                    HeatSafetyMode::ConservativeThrottle,
                );
                if output.heat01 > output.recovery_threshold01 {
                    assert!(
                        output.is_overheated,
                        "must stay overheated inside the band (heat01={})",
                        output.heat01
                    );
                    if output.heat01 < output.overheat_threshold01 {
                        saw_band_tick = true;
                    }
                } else {
                    assert!(!output.is_overheated);
                    break;
                }
                tick += 1;
            }
            assert!(saw_band_tick, "cooling path must pass through the band");
        }

        #[test]
        fn partial_rebound_inside_band_does_not_reenter_overheat() {
            let mut runtime = HeatRuntimeState::new(100.0, 0.0);
            runtime.current_heat = 40.0;
            runtime.is_overheated = false;

            // Push to 60% of capacity: inside the band, coming from below.
            let output = tick_once(
                0,
                vec![fire_event(20.0)],
                &ResolvedHeatStats::identity(),
                &mut runtime,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert!((output.heat01 - 0.6).abs() < 1e-4);
            assert!(!output.is_overheated, "band entry from below stays nominal");
        }

        #[test]
        fn threshold_offset_shifts_the_overheat_point() {
            let mut stats = ResolvedHeatStats::identity();
            stats.overheat_threshold_offset01 = 0.06;

            let mut runtime = HeatRuntimeState::new(100.0, 0.0);
            // 88% of capacity: above base 0.85, below offset 0.91.
            let output = tick_once(
                0,
                vec![fire_event(88.0)],
                &stats,
                &mut runtime,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert!(!output.is_overheated);
        }

        #[test]
        fn recovery_threshold_stays_below_overheat_threshold() {
            let mut runtime = HeatRuntimeState::new(100.0, 0.0);
            runtime.base_recovery_threshold01 = 0.95; // misconfigured above overheat

            let output = tick_once(
                0,
                vec![],
                &ResolvedHeatStats::identity(),
                &mut runtime,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert!(output.recovery_threshold01 < output.overheat_threshold01);
        }
    }

    mod safety_mode_tests {
        use super::*;

        fn overheated_runtime() -> HeatRuntimeState {
            let mut runtime = HeatRuntimeState::new(100.0, 0.0);
            runtime.current_heat = 95.0;
            runtime
        }

        #[test]
        fn conservative_mode_suppresses_fire_with_penalties() {
            let mut runtime = overheated_runtime();
            let output = tick_once(
                0,
                vec![],
                &ResolvedHeatStats::identity(),
                &mut runtime,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert!(output.is_overheated);
            assert!(output.suppress_fire);
            assert!(output.damage_multiplier < 1.0);
            assert!(output.cooldown_multiplier > 1.0);
            assert_eq!(output.jam_chance, 0.0);
        }

        #[test]
        fn unsafe_mode_allows_fire_but_keeps_penalties() {
            let mut runtime = overheated_runtime();
            let output = tick_once(
                0,
                vec![],
                &ResolvedHeatStats::identity(),
                &mut runtime,
                HeatSafetyMode::UnsafeNoReduction,
            );

            assert!(output.is_overheated);
            assert!(!output.suppress_fire);
            assert!(output.damage_multiplier < 1.0, "penalties apply in unsafe mode");
            assert!(output.cooldown_multiplier > 1.0);
            assert!(output.jam_chance > 0.0);
            assert!(output.thermal_self_damage_per_tick > 0.0);
        }

        #[test]
        fn overheated_non_weapon_systems_are_penalized() {
            let mut runtime = overheated_runtime();
            let output = tick_once(
                0,
                vec![],
                &ResolvedHeatStats::identity(),
                &mut runtime,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert!(output.engine_speed_multiplier < 1.0);
            assert!(output.shield_recharge_multiplier < 1.0);
            assert!(output.shield_intensity_multiplier < 1.0);
        }
    }

    mod heatsink_tests {
        use super::*;

        #[test]
        fn heatsink_absorbs_before_the_main_pool() {
            let mut runtime = HeatRuntimeState::new(100.0, 0.0);
            let mut heatsink = HeatsinkState {
                stored_heat: 0.0,
                base_capacity: 60.0,
                base_absorb_per_tick: 10.0,
                base_vent_per_tick: 0.0,
            };
            let mut actions = vec![fire_event(25.0)];

            let output = tick_heat(
                0,
                &mut actions,
                &ResolvedHeatStats::identity(),
                &mut runtime,
                &mut heatsink,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert!((heatsink.stored_heat - 10.0).abs() < 1e-4);
            assert!((runtime.current_heat - 15.0).abs() < 1e-4);
            assert!((output.heatsink_stored_heat - 10.0).abs() < 1e-4);
        }

        #[test]
        fn heatsink_vents_after_absorbing() {
            let mut runtime = HeatRuntimeState::new(100.0, 0.0);
            let mut heatsink = HeatsinkState {
                stored_heat: 10.0,
                base_capacity: 60.0,
                base_absorb_per_tick: 10.0,
                base_vent_per_tick: 3.0,
            };
            let mut actions = vec![];

            let _ = tick_heat(
                0,
                &mut actions,
                &ResolvedHeatStats::identity(),
                &mut runtime,
                &mut heatsink,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert!((heatsink.stored_heat - 7.0).abs() < 1e-4);
        }

        #[test]
        fn full_heatsink_passes_heat_through() {
            let mut runtime = HeatRuntimeState::new(100.0, 0.0);
            let mut heatsink = HeatsinkState {
                stored_heat: 60.0,
                base_capacity: 60.0,
                base_absorb_per_tick: 10.0,
                base_vent_per_tick: 0.0,
            };
            let mut actions = vec![fire_event(20.0)];

            let _ = tick_heat(
                0,
                &mut actions,
                &ResolvedHeatStats::identity(),
                &mut runtime,
                &mut heatsink,
                HeatSafetyMode::ConservativeThrottle,
            );

            assert!((runtime.current_heat - 20.0).abs() < 1e-4);
        }
    }

    mod jam_tests {
        use super::*;

        #[test]
        fn jam_roll_is_deterministic() {
            let output = HeatOutputState {
                jam_chance: 0.5,
                ..HeatOutputState::nominal()
            };
            let unit = UnitId::new(7);

            for tick in 0..32 {
                assert_eq!(
                    resolve_jam(&output, unit, 0, tick),
                    resolve_jam(&output, unit, 0, tick)
                );
            }
        }

        #[test]
        fn no_jam_while_suppressed_or_chance_is_zero() {
            let suppressed = HeatOutputState {
                jam_chance: 1.0,
                suppress_fire: true,
                ..HeatOutputState::nominal()
            };
            assert!(!resolve_jam(&suppressed, UnitId::new(1), 0, 0));

            let cold = HeatOutputState::nominal();
            assert!(!resolve_jam(&cold, UnitId::new(1), 0, 0));
        }

        #[test]
        fn certain_jam_always_jams() {
            let output = HeatOutputState {
                jam_chance: 1.0,
                ..HeatOutputState::nominal()
            };
            for tick in 0..16 {
                assert!(resolve_jam(&output, UnitId::new(3), 1, tick));
            }
        }
    }
}
