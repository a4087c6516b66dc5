//! State hashing for determinism verification.
//!
//! This module computes deterministic `u64` digests of arena and unit state.
//! Two arenas driven by identical inputs must produce identical digests at
//! every tick — the regression and replay suites compare digests rather than
//! field-by-field state.
//!
//! Floats are hashed by bit pattern (`to_bits`) so the digest is exact and
//! platform-stable; enum variants are hashed through their discriminant
//! index via the derived `Hash` impls where available and explicitly
//! otherwise.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::Vec3;

use crate::arena::Arena;
use crate::damage::PendingEffect;
use crate::defense::{DefenseRuntimeState, HullSegment, ShieldLayer};
use crate::heat::{HeatRuntimeState, HeatsinkState};
use crate::unit::Unit;

/// Computes a deterministic digest of full arena state.
///
/// Includes the tick counter, the id counter, and every unit's buffers in
/// `UnitId` order.
#[must_use]
pub fn digest_arena(arena: &Arena) -> u64 {
    let mut hasher = DefaultHasher::new();
    arena.current_tick().hash(&mut hasher);
    arena.unit_count().hash(&mut hasher);
    for unit in arena.units_sorted() {
        hash_unit(unit, &mut hasher);
    }
    hasher.finish()
}

/// Computes a deterministic digest of one unit's state.
#[must_use]
pub fn digest_unit(unit: &Unit) -> u64 {
    let mut hasher = DefaultHasher::new();
    hash_unit(unit, &mut hasher);
    hasher.finish()
}

/// Hashes one unit's buffers into the given hasher.
fn hash_unit<H: Hasher>(unit: &Unit, hasher: &mut H) {
    unit.id().hash(hasher);
    hash_vec3(unit.defender.forward, hasher);
    hash_vec3(unit.defender.up, hasher);
    hash_runtime(&unit.runtime, hasher);

    unit.shields.len().hash(hasher);
    for layer in &unit.shields {
        hash_shield_layer(layer, hasher);
    }

    unit.hull_segments.len().hash(hasher);
    for segment in &unit.hull_segments {
        hash_hull_segment(segment, hasher);
    }

    unit.pending_effects.len().hash(hasher);
    for effect in &unit.pending_effects {
        hash_pending_effect(effect, hasher);
    }

    hash_heat_runtime(&unit.heat, hasher);
    hash_heatsink(&unit.heatsink, hasher);
    unit.safety_mode.hash(hasher);
}

/// Hashes a vector by component bit patterns.
fn hash_vec3<H: Hasher>(v: Vec3, hasher: &mut H) {
    v.x.to_bits().hash(hasher);
    v.y.to_bits().hash(hasher);
    v.z.to_bits().hash(hasher);
}

fn hash_runtime<H: Hasher>(runtime: &DefenseRuntimeState, hasher: &mut H) {
    runtime.mass_multiplier.to_bits().hash(hasher);
    runtime.shield_recharge_multiplier.to_bits().hash(hasher);
    runtime.reactor_output_multiplier.to_bits().hash(hasher);
    runtime.reflect_bonus_pct.to_bits().hash(hasher);
    runtime.incoming_damage_multiplier.to_bits().hash(hasher);
}

fn hash_shield_layer<H: Hasher>(layer: &ShieldLayer, hasher: &mut H) {
    layer.layer_id.hash(hasher);
    layer.topology.hash(hasher);
    layer.arc.hash(hasher);
    layer.current.to_bits().hash(hasher);
    layer.max.to_bits().hash(hasher);
    layer.recharge_per_tick.to_bits().hash(hasher);
    layer.reflect_pct.to_bits().hash(hasher);
    hash_resistances(&layer.resistances, hasher);
}

fn hash_hull_segment<H: Hasher>(segment: &HullSegment, hasher: &mut H) {
    segment.segment_id.hash(hasher);
    segment.hull_class.hash(hasher);
    segment.current.to_bits().hash(hasher);
    segment.max.to_bits().hash(hasher);
    segment.armor.to_bits().hash(hasher);
    segment.mass.to_bits().hash(hasher);
    hash_resistances(&segment.resistances, hasher);
    segment.active.hash(hasher);
}

fn hash_resistances<H: Hasher>(profile: &crate::types::ResistanceProfile, hasher: &mut H) {
    for ty in crate::types::DamageType::ALL {
        profile.resistance(ty).to_bits().hash(hasher);
    }
}

fn hash_pending_effect<H: Hasher>(effect: &PendingEffect, hasher: &mut H) {
    effect.effect_id.hash(hasher);
    effect.kind.hash(hasher);
    effect.damage_type.hash(hasher);
    effect.magnitude.to_bits().hash(hasher);
    effect.remaining_ticks.hash(hasher);
    effect.tick_interval.hash(hasher);
    effect.ticks_until_pulse.hash(hasher);
    effect.stacks.hash(hasher);
    effect.max_stacks.hash(hasher);
}

fn hash_heat_runtime<H: Hasher>(heat: &HeatRuntimeState, hasher: &mut H) {
    heat.current_heat.to_bits().hash(hasher);
    heat.base_heat_capacity.to_bits().hash(hasher);
    heat.base_dissipation_per_tick.to_bits().hash(hasher);
    heat.base_overheat_threshold01.to_bits().hash(hasher);
    heat.base_recovery_threshold01.to_bits().hash(hasher);
    heat.is_overheated.hash(hasher);
}

fn hash_heatsink<H: Hasher>(heatsink: &HeatsinkState, hasher: &mut H) {
    heatsink.stored_heat.to_bits().hash(hasher);
    heatsink.base_capacity.to_bits().hash(hasher);
    heatsink.base_absorb_per_tick.to_bits().hash(hasher);
    heatsink.base_vent_per_tick.to_bits().hash(hasher);
}
