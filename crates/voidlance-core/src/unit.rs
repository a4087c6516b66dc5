//! The per-unit container owning every buffer the resolution core mutates.
//!
//! A [`Unit`] holds exactly the entity-owned state the surrounding game
//! serializes: defender orientation, runtime multipliers, shield stack, hull
//! segments, pending effects, heat runtime, and the two per-tick inboxes
//! (queued strikes and heat action events). If the game persists combat
//! state, it serializes these structs verbatim.
//!
//! # Ownership
//!
//! Each unit's buffers are exclusively owned by its arena entry, which is
//! what makes cross-unit parallel stepping trivially safe: no resolution
//! ever touches another unit's state.

use serde::{Deserialize, Serialize};

use crate::damage::{DamagePacket, DamagePayloadOp, PendingEffect};
use crate::defense::{DefenderState, DefenseRuntimeState, HullSegment, ShieldLayer};
use crate::heat::{
    resolve_aggregate, EquippedLimb, HeatActionEvent, HeatModifierDefinition, HeatOutputState,
    HeatRuntimeState, HeatSafetyMode, HeatsinkState, OwnedItem, ResolvedHeatStats,
};
use crate::types::UnitId;

/// A damage packet queued against a unit, with its payload operations.
///
/// Strikes are a single-tick inbox: the arena step drains them in queue
/// order, which keeps resolution order deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedStrike {
    /// The packet to resolve.
    pub packet: DamagePacket,
    /// Per-hit effect definitions riding with the packet.
    pub payload_ops: Vec<DamagePayloadOp>,
}

/// One combat unit and all of its resolution state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    /// Orientation frame for arc classification.
    pub defender: DefenderState,
    /// Effect-driven runtime multipliers.
    pub runtime: DefenseRuntimeState,
    /// Shield stack, resolved in buffer order.
    pub shields: Vec<ShieldLayer>,
    /// Hull segments, selected in buffer order.
    pub hull_segments: Vec<HullSegment>,
    /// Registered timed effects.
    pub pending_effects: Vec<PendingEffect>,
    /// Heat runtime; `is_overheated` is the only cross-tick hysteresis state.
    pub heat: HeatRuntimeState,
    /// Optional heatsink buffer.
    pub heatsink: HeatsinkState,
    /// Player-facing overheat policy, read but not owned by the core.
    pub safety_mode: HeatSafetyMode,
    /// Equipped limbs, matched by the heat aggregate resolver.
    pub equipped_limbs: Vec<EquippedLimb>,
    /// Owned items, matched by the heat aggregate resolver.
    pub owned_items: Vec<OwnedItem>,
    /// Heat action events appended by the weapon collaborator this tick.
    pub action_events: Vec<HeatActionEvent>,
    /// Heat outputs published by the last step, read by the weapon
    /// collaborator to gate fire.
    pub heat_output: HeatOutputState,
    resolved_heat_stats: ResolvedHeatStats,
    strike_inbox: Vec<QueuedStrike>,
}

impl Unit {
    /// Creates a bare unit with identity state and empty buffers.
    #[must_use]
    pub fn new(id: UnitId) -> Self {
        Self {
            id,
            defender: DefenderState::default(),
            runtime: DefenseRuntimeState::identity(),
            shields: Vec::new(),
            hull_segments: Vec::new(),
            pending_effects: Vec::new(),
            heat: HeatRuntimeState::default(),
            heatsink: HeatsinkState::default(),
            safety_mode: HeatSafetyMode::default(),
            equipped_limbs: Vec::new(),
            owned_items: Vec::new(),
            action_events: Vec::new(),
            heat_output: HeatOutputState::nominal(),
            resolved_heat_stats: ResolvedHeatStats::identity(),
            strike_inbox: Vec::new(),
        }
    }

    /// Returns this unit's identifier.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Returns the cached heat-stat aggregate.
    #[must_use]
    pub const fn resolved_heat_stats(&self) -> &ResolvedHeatStats {
        &self.resolved_heat_stats
    }

    /// Recomputes the cached heat-stat aggregate from the current loadout.
    ///
    /// Call on every equipment change — and only then; the aggregate is
    /// time-independent and must not be recomputed per tick.
    pub fn refresh_heat_stats(&mut self, definitions: &[HeatModifierDefinition]) {
        self.resolved_heat_stats =
            resolve_aggregate(&self.equipped_limbs, &self.owned_items, definitions);
    }

    /// Queues a strike for resolution on the next step.
    pub fn queue_strike(&mut self, strike: QueuedStrike) {
        self.strike_inbox.push(strike);
    }

    /// Drains the strike inbox, leaving it empty.
    pub(crate) fn drain_strikes(&mut self) -> Vec<QueuedStrike> {
        std::mem::take(&mut self.strike_inbox)
    }

    /// Number of strikes waiting for the next step.
    #[must_use]
    pub fn queued_strike_count(&self) -> usize {
        self.strike_inbox.len()
    }

    /// Returns true while any hull segment is active.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hull_segments.iter().any(|segment| segment.active)
    }

    /// Sum of current shield capacity across all layers.
    #[must_use]
    pub fn total_shield(&self) -> f32 {
        self.shields.iter().map(|layer| layer.current).sum()
    }

    /// Sum of current hull integrity across all segments.
    #[must_use]
    pub fn total_hull(&self) -> f32 {
        self.hull_segments.iter().map(|segment| segment.current).sum()
    }
}
