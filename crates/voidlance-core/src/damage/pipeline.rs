//! The damage pipeline: resolves one packet against a defender's shield stack
//! and hull segments.
//!
//! # Algorithm
//!
//! 1. Classify the incoming arc in the defender's frame
//! 2. Scale base damage by crit and the runtime incoming-damage multiplier,
//!    then split off the penetration fraction (bypasses shields entirely)
//! 3. Fold the remaining budget through eligible shield layers in buffer
//!    order, converting absorbed post-resistance damage back into budget
//!    units so every layer (and the hull) sees the same currency
//! 4. Whatever survives the stack plus the bypass fraction faces the hull:
//!    flat armor first, then resistance, clamped to segment integrity
//! 5. Register payload operations as pending effects
//!
//! # Degraded outcomes
//!
//! Zero shields, zero hull segments, or a dead preferred segment are not
//! errors: each stage degrades to "no absorption here" and the outcome is
//! reported through [`ResolutionFlags`]. A defender with no damageable
//! surface at all yields a no-op resolution with
//! [`ResolutionFlags::NO_DAMAGEABLE_SURFACE`] set for the caller to log.

use tracing::debug;

use crate::defense::{resolve_incoming_arc, DefenderState, DefenseRuntimeState, HullSegment, ShieldLayer, ShieldTopology};
use crate::types::DamageType;

use super::effects::register_payload_op;
use super::{DamagePacket, DamagePayloadOp, DamageOpKind, DamageResolution, PendingEffect, ResolutionFlags, DAMAGE_EPSILON};

/// Resolves one damage packet against a defender.
///
/// Mutates the shield and hull buffers in place and appends/refreshes pending
/// effects from `payload_ops`. Pure with respect to everything else: no
/// allocation beyond the pending buffer, no randomness, no ambient time —
/// `tick` is threaded in explicitly and used only for diagnostics.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use voidlance_core::damage::{resolve_packet, DamagePacket};
/// use voidlance_core::defense::{DefenderState, DefenseRuntimeState, ShieldLayer};
/// use voidlance_core::types::{DamageType, Delivery, UnitId};
///
/// let mut shields = vec![ShieldLayer::bubble("bubble", 50.0)];
/// let mut hull = vec![];
/// let mut pending = vec![];
///
/// let packet = DamagePacket::new(
///     UnitId::new(0),
///     UnitId::new(1),
///     DamageType::Energy,
///     Delivery::Beam,
///     40.0,
///     -Vec3::Z,
/// );
/// let resolution = resolve_packet(
///     &packet,
///     &DefenderState::default(),
///     &DefenseRuntimeState::identity(),
///     &mut shields,
///     &mut hull,
///     &mut pending,
///     &[],
///     0,
/// );
///
/// assert!((shields[0].current - 10.0).abs() < 1e-4);
/// assert!((resolution.applied_shield_damage - 40.0).abs() < 1e-4);
/// ```
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn resolve_packet(
    packet: &DamagePacket,
    defender: &DefenderState,
    runtime: &DefenseRuntimeState,
    shields: &mut [ShieldLayer],
    hull_segments: &mut [HullSegment],
    pending_effects: &mut Vec<PendingEffect>,
    payload_ops: &[DamagePayloadOp],
    tick: u64,
) -> DamageResolution {
    let incoming_arc =
        resolve_incoming_arc(defender.forward, defender.up, packet.incoming_direction);
    let mut result = DamageResolution::empty(incoming_arc);

    let effective = packet.base_damage.max(0.0)
        * packet.crit_multiplier.max(0.0)
        * runtime.incoming_damage_multiplier.max(0.0);
    let penetration = packet.penetration01.clamp(0.0, 1.0);
    let bypass = effective * penetration;
    let mut shieldable = effective - bypass;

    for (index, layer) in shields.iter_mut().enumerate() {
        if shieldable <= DAMAGE_EPSILON {
            break;
        }
        if layer.current <= DAMAGE_EPSILON || !layer.covers(incoming_arc) {
            continue;
        }

        let resistance = layer.resistances.resistance(packet.damage_type);
        let per_layer = shieldable * resistance;
        let absorbed = per_layer.min(layer.current);
        if absorbed <= DAMAGE_EPSILON {
            continue;
        }

        // Convert absorbed post-resistance damage back into budget units so
        // the remainder is in the same currency fed to the next layer and to
        // the hull. The resistance floor keeps the inverse total.
        let consumed = absorbed / resistance;
        layer.current = (layer.current - absorbed).max(0.0);
        shieldable = (shieldable - consumed).max(0.0);
        result.applied_shield_damage += absorbed;
        result.reflected_damage +=
            absorbed * (layer.reflect_pct + runtime.reflect_bonus_pct).clamp(0.0, 1.0);
        result.shield_layer_index = Some(index);
        result.flags |= match layer.topology {
            ShieldTopology::Bubble => ResolutionFlags::HIT_BUBBLE_SHIELD,
            ShieldTopology::Directional => ResolutionFlags::HIT_DIRECTIONAL_SHIELD,
        };
    }

    let hull_facing = shieldable + bypass;
    if hull_facing > DAMAGE_EPSILON {
        result.flags |= ResolutionFlags::SHIELD_BYPASSED;

        match select_hull_segment(packet.preferred_hull_segment, hull_segments) {
            Some(index) => {
                let segment = &mut hull_segments[index];
                let resistance = segment.resistances.resistance(packet.damage_type);
                let computed = (hull_facing - segment.armor.max(0.0)).max(0.0) * resistance;
                let applied = computed.min(segment.current);
                segment.current = (segment.current - applied).max(0.0);
                if segment.current <= DAMAGE_EPSILON {
                    segment.current = 0.0;
                    segment.active = false;
                    result.flags |= ResolutionFlags::HULL_SEGMENT_DESTROYED;
                }
                result.hull_segment_index = Some(index);
                result.applied_hull_damage = applied;
                result.remaining_damage = computed - applied;
                result.flags |= ResolutionFlags::HIT_HULL;
            }
            None => {
                result.remaining_damage = hull_facing;
                result.flags |= ResolutionFlags::DAMAGE_DISCARDED;
                if shields.is_empty() && hull_segments.is_empty() {
                    result.flags |= ResolutionFlags::NO_DAMAGEABLE_SURFACE;
                }
                debug!(
                    tick,
                    source = %packet.source,
                    target = %packet.target,
                    discarded = hull_facing,
                    "hull-facing damage discarded: no active hull segment"
                );
            }
        }
    }

    apply_payload_ops(payload_ops, pending_effects, packet.damage_type, &mut result);
    result
}

/// Selects the hull segment a hull-facing hit lands on.
///
/// The preferred index wins if it names an active segment with integrity
/// left; otherwise the first active segment with integrity in buffer order.
fn select_hull_segment(preferred: Option<usize>, hull_segments: &[HullSegment]) -> Option<usize> {
    if let Some(index) = preferred {
        if let Some(segment) = hull_segments.get(index) {
            if segment.active && segment.current > DAMAGE_EPSILON {
                return Some(index);
            }
        }
    }

    hull_segments
        .iter()
        .position(|segment| segment.active && segment.current > DAMAGE_EPSILON)
}

/// Registers every recognized payload op and records the outcome flags.
fn apply_payload_ops(
    payload_ops: &[DamagePayloadOp],
    pending_effects: &mut Vec<PendingEffect>,
    fallback_type: DamageType,
    result: &mut DamageResolution,
) {
    for op in payload_ops {
        register_payload_op(pending_effects, op, fallback_type);
        match op.kind {
            DamageOpKind::DamageOverTime => {
                result.flags |= ResolutionFlags::APPLIED_DAMAGE_OVER_TIME;
            }
            DamageOpKind::PowerReduction => {
                result.flags |= ResolutionFlags::APPLIED_POWER_REDUCTION;
            }
            DamageOpKind::ShieldRechargeModifier
            | DamageOpKind::MassModifier
            | DamageOpKind::ReflectModifier => {}
        }
    }
}
