//! The status-effect registry: payload-op registration and per-tick
//! advancement of pending effects.
//!
//! # Timing model
//!
//! Damage-over-time pulses fire on a per-effect countdown
//! ([`PendingEffect::ticks_until_pulse`]), not on wall-tick stamps, so two
//! effects registered on different ticks with the same interval stay
//! independent of global tick parity. Registration and the first pulse never
//! share a tick: the countdown starts at `interval + 1` because the
//! registering tick's own advancement pass (which runs after packet
//! resolution) counts as the first decrement. An interval-1 effect registered
//! during tick `T` therefore first pulses during tick `T + 1`.
//!
//! # Runtime recomputation
//!
//! Multiplier-kind effects (power reduction, shield recharge, mass, reflect)
//! do not mutate [`DefenseRuntimeState`] cumulatively. The tick function
//! resets the effect-driven channels to identity and refolds every live
//! effect's `magnitude * stacks`, so a reduction recovers the moment its
//! effect expires.
//!
//! # Damage-over-time and resistance
//!
//! DoT pulses bypass resistance: the registered magnitude is applied raw to
//! the hull segment. Resistance was already paid when the carrying hit
//! resolved; reapplying it per pulse would double-count.

use tracing::trace;

use crate::defense::{DefenseRuntimeState, HullSegment};
use crate::types::DamageType;

use super::{DamageOpKind, DamagePayloadOp, PendingEffect, DAMAGE_EPSILON};

/// Floor for effect-driven runtime multipliers.
///
/// Keeps stacked reductions from zeroing or inverting a channel.
const MIN_EFFECT_MULTIPLIER: f32 = 0.05;

/// Registers or refreshes a pending effect from a payload op.
///
/// The dedupe key is `(kind, damage type, effect id)`. An existing entry
/// below its stack cap gains a stack; at the cap only its duration refreshes.
/// Magnitude never accumulates — the per-tick application is
/// `magnitude * stacks`.
pub fn register_payload_op(
    pending_effects: &mut Vec<PendingEffect>,
    op: &DamagePayloadOp,
    fallback_type: DamageType,
) {
    let damage_type = op.damage_type.unwrap_or(fallback_type);
    let duration = op.duration_ticks.max(1);
    let interval = op.tick_interval.max(1);
    let max_stacks = op.max_stacks.max(1);

    let existing = pending_effects.iter_mut().find(|effect| {
        effect.kind == op.kind
            && effect.damage_type == damage_type
            && effect.effect_id == op.effect_id
    });

    if let Some(effect) = existing {
        if effect.stacks < effect.max_stacks {
            effect.stacks += 1;
        }
        effect.remaining_ticks = effect.remaining_ticks.max(duration);
        return;
    }

    pending_effects.push(PendingEffect {
        effect_id: op.effect_id.clone(),
        kind: op.kind,
        damage_type,
        magnitude: op.magnitude,
        remaining_ticks: duration,
        tick_interval: interval,
        // One extra count so the registering tick's advancement pass cannot
        // pulse the effect it just registered.
        ticks_until_pulse: interval + 1,
        stacks: 1,
        max_stacks,
    });
}

/// Advances every pending effect by one tick.
///
/// Resets the effect-driven runtime channels, refolds multiplier effects
/// from live stacks, pulses damage-over-time effects whose countdown
/// elapsed, decrements lifetimes, and drops expired entries. Pure with
/// respect to global state except the buffers and `runtime` passed in;
/// performs no allocation and never reads wall-clock time.
pub fn tick_pending_effects(
    tick: u64,
    pending_effects: &mut Vec<PendingEffect>,
    hull_segments: &mut [HullSegment],
    runtime: &mut DefenseRuntimeState,
) {
    runtime.reset_effect_channels();

    // Reverse index order so removal never shifts an unvisited entry.
    for index in (0..pending_effects.len()).rev() {
        if pending_effects[index].remaining_ticks == 0 {
            pending_effects.remove(index);
            continue;
        }

        let effect = &mut pending_effects[index];
        let stacks = f32::from(effect.stacks);

        match effect.kind {
            DamageOpKind::PowerReduction => {
                runtime.reactor_output_multiplier *=
                    (1.0 - effect.magnitude * stacks).max(MIN_EFFECT_MULTIPLIER);
            }
            DamageOpKind::ShieldRechargeModifier => {
                runtime.shield_recharge_multiplier *=
                    (1.0 + effect.magnitude * stacks).max(MIN_EFFECT_MULTIPLIER);
            }
            DamageOpKind::MassModifier => {
                runtime.mass_multiplier *=
                    (1.0 + effect.magnitude * stacks).max(MIN_EFFECT_MULTIPLIER);
            }
            DamageOpKind::ReflectModifier => {
                runtime.reflect_bonus_pct += (effect.magnitude * stacks).max(0.0);
            }
            DamageOpKind::DamageOverTime => {
                effect.ticks_until_pulse = effect.ticks_until_pulse.saturating_sub(1);
                if effect.ticks_until_pulse == 0 {
                    effect.ticks_until_pulse = effect.tick_interval.max(1);
                    let damage = (effect.magnitude * stacks).max(0.0);
                    trace!(tick, effect = %effect.effect_id, damage, "damage-over-time pulse");
                    apply_pulse_damage(damage, hull_segments);
                }
            }
        }

        let effect = &mut pending_effects[index];
        effect.remaining_ticks -= 1;
        if effect.remaining_ticks == 0 {
            pending_effects.remove(index);
        }
    }
}

/// Applies one DoT pulse to the first active hull segment.
///
/// Same clamping as the pipeline's hull stage, but resistance is not
/// reapplied. With no eligible segment the pulse dissipates.
fn apply_pulse_damage(damage: f32, hull_segments: &mut [HullSegment]) {
    let Some(segment) = hull_segments
        .iter_mut()
        .find(|segment| segment.active && segment.current > DAMAGE_EPSILON)
    else {
        return;
    };

    segment.current = (segment.current - damage).max(0.0);
    if segment.current <= DAMAGE_EPSILON {
        segment.current = 0.0;
        segment.active = false;
    }
}
