//! Damage resolution: packets, payload operations, pending effects, and the
//! central pipeline.
//!
//! # Architecture
//!
//! The module splits into three cooperating parts:
//! - [`pipeline`]: resolves one [`DamagePacket`] against a defender's shield
//!   stack and hull segments — the central algorithm
//! - [`effects`]: converts a resolved hit's payload operations into timed
//!   [`PendingEffect`]s and advances them each tick
//! - [`conversion`]: damage-type conversion rules with capping, applied by the
//!   weapon collaborator before packet emission
//!
//! # Determinism
//!
//! Everything here is a pure function over explicitly passed buffers plus the
//! per-unit [`DefenseRuntimeState`](crate::defense::DefenseRuntimeState).
//! There is no randomness, no wall-clock access, and no allocation beyond the
//! pending-effect buffer the caller owns.

pub mod conversion;
pub mod effects;
pub mod pipeline;

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::defense::ShieldArc;
use crate::types::{DamageType, Delivery, UnitId};

pub use conversion::{apply_conversion_rules, DamageConversionRule, DamageVector};
pub use effects::{register_payload_op, tick_pending_effects};
pub use pipeline::resolve_packet;

/// Damage below this threshold is treated as fully absorbed.
///
/// Matches the capacity epsilon used when deciding whether a shield layer or
/// hull segment still has charge.
pub(crate) const DAMAGE_EPSILON: f32 = 1e-5;

/// One weapon or ability effect, already resolved by the weapon collaborator.
///
/// Packets are ephemeral: they are consumed by
/// [`resolve_packet`](pipeline::resolve_packet) and never stored. All numeric
/// fields are defensively clamped during resolution because packets can
/// originate from data-driven catalog content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamagePacket {
    /// Unit that produced the packet.
    pub source: UnitId,
    /// Unit the packet is aimed at.
    pub target: UnitId,
    /// Damage channel the packet deals.
    pub damage_type: DamageType,
    /// Physical delivery kind, carried through for feedback collaborators.
    pub delivery: Delivery,
    /// Base damage before crit and runtime scaling. Clamped to `>= 0`.
    pub base_damage: f32,
    /// Critical-hit multiplier. Clamped to `>= 0`.
    pub crit_multiplier: f32,
    /// Fraction of effective damage that bypasses shields entirely.
    /// Clamped to `[0, 1]`.
    pub penetration01: f32,
    /// Direction of travel, attacker toward defender.
    pub incoming_direction: Vec3,
    /// Hull segment the packet prefers to strike, if any.
    pub preferred_hull_segment: Option<usize>,
}

impl DamagePacket {
    /// Creates a packet with neutral scaling (crit 1, no penetration).
    #[must_use]
    pub fn new(
        source: UnitId,
        target: UnitId,
        damage_type: DamageType,
        delivery: Delivery,
        base_damage: f32,
        incoming_direction: Vec3,
    ) -> Self {
        Self {
            source,
            target,
            damage_type,
            delivery,
            base_damage,
            crit_multiplier: 1.0,
            penetration01: 0.0,
            incoming_direction,
            preferred_hull_segment: None,
        }
    }
}

/// Kind of a per-hit payload operation and of the pending effect it registers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageOpKind {
    /// Periodic hull damage.
    DamageOverTime,
    /// Reduces the defender's reactor output multiplier.
    PowerReduction,
    /// Scales the defender's shield recharge multiplier.
    ShieldRechargeModifier,
    /// Scales the defender's mass multiplier.
    MassModifier,
    /// Adds to the defender's reflect bonus.
    ReflectModifier,
}

/// Per-hit effect definition supplied by static catalog data.
///
/// Payload ops ride alongside a packet; when the hit lands each op registers
/// or refreshes a [`PendingEffect`] in the defender's buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamagePayloadOp {
    /// Stable effect identifier; part of the stacking dedupe key.
    pub effect_id: String,
    /// Operation kind.
    pub kind: DamageOpKind,
    /// Damage channel of the effect. `None` inherits the packet's type.
    pub damage_type: Option<DamageType>,
    /// Per-pulse magnitude (damage for DoT, fraction for multipliers).
    pub magnitude: f32,
    /// Total lifetime in ticks. Clamped to `>= 1` on registration.
    pub duration_ticks: u32,
    /// Ticks between pulses. Clamped to `>= 1` on registration.
    pub tick_interval: u32,
    /// Stack cap; re-registration beyond it only refreshes duration.
    pub max_stacks: u8,
}

/// A registered, time-limited consequence of a hit.
///
/// # Lifecycle
///
/// Created by the damage pipeline from a [`DamagePayloadOp`]; advanced and
/// decremented each tick by [`tick_pending_effects`]; removed when
/// `remaining_ticks` reaches zero. The pulse countdown is a per-effect
/// counter, not a wall-tick stamp, so effects are independent of global tick
/// parity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEffect {
    /// Stable effect identifier; part of the stacking dedupe key.
    pub effect_id: String,
    /// Operation kind.
    pub kind: DamageOpKind,
    /// Damage channel of the effect.
    pub damage_type: DamageType,
    /// Per-pulse magnitude; applied as `magnitude * stacks`.
    pub magnitude: f32,
    /// Ticks of lifetime remaining.
    pub remaining_ticks: u32,
    /// Ticks between pulses.
    pub tick_interval: u32,
    /// Ticks until the next pulse fires.
    pub ticks_until_pulse: u32,
    /// Current stack count.
    pub stacks: u8,
    /// Stack cap.
    pub max_stacks: u8,
}

bitflags! {
    /// Bitset describing what a resolution touched.
    ///
    /// Consumed by damage-feedback, VFX, and telemetry collaborators. Every
    /// degraded outcome is reported here rather than as an error.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ResolutionFlags: u16 {
        /// At least one bubble layer absorbed damage.
        const HIT_BUBBLE_SHIELD = 1 << 0;
        /// At least one directional layer absorbed damage.
        const HIT_DIRECTIONAL_SHIELD = 1 << 1;
        /// Damage reached the hull stage past the shield stack.
        const SHIELD_BYPASSED = 1 << 2;
        /// A hull segment absorbed damage.
        const HIT_HULL = 1 << 3;
        /// The struck segment was driven to zero and deactivated.
        const HULL_SEGMENT_DESTROYED = 1 << 4;
        /// At least one damage-over-time payload op was registered.
        const APPLIED_DAMAGE_OVER_TIME = 1 << 5;
        /// At least one power-reduction payload op was registered.
        const APPLIED_POWER_REDUCTION = 1 << 6;
        /// Hull-facing damage was discarded (no eligible segment).
        const DAMAGE_DISCARDED = 1 << 7;
        /// The defender had no shields and no hull segments at all.
        const NO_DAMAGEABLE_SURFACE = 1 << 8;
    }
}

// Flags persist as their raw bits; unknown bits from newer save data are
// truncated rather than rejected.
impl Serialize for ResolutionFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResolutionFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_bits_truncate(u16::deserialize(deserializer)?))
    }
}

/// The resolved outcome of one damage packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageResolution {
    /// Arc the packet arrived through.
    pub incoming_arc: ShieldArc,
    /// Index of the last shield layer that absorbed damage, if any.
    pub shield_layer_index: Option<usize>,
    /// Index of the hull segment that was struck, if any.
    pub hull_segment_index: Option<usize>,
    /// Total post-resistance damage absorbed by shields.
    pub applied_shield_damage: f32,
    /// Total damage applied to the hull segment.
    pub applied_hull_damage: f32,
    /// Damage that could not be absorbed anywhere (overkill).
    pub remaining_damage: f32,
    /// Damage reflected back at the attacker by shield layers.
    pub reflected_damage: f32,
    /// What the resolution touched.
    pub flags: ResolutionFlags,
}

impl DamageResolution {
    /// Creates an empty resolution for the given arc.
    #[must_use]
    pub fn empty(incoming_arc: ShieldArc) -> Self {
        Self {
            incoming_arc,
            shield_layer_index: None,
            hull_segment_index: None,
            applied_shield_damage: 0.0,
            applied_hull_damage: 0.0,
            remaining_damage: 0.0,
            reflected_damage: 0.0,
            flags: ResolutionFlags::empty(),
        }
    }
}
