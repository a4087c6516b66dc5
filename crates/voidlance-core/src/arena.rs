//! Arena: the deterministic per-unit store and the per-tick step loop.
//!
//! # Determinism
//!
//! Units live in a `BTreeMap` so iteration order is the numeric `UnitId`
//! order on every platform. Unit IDs are assigned monotonically. The step
//! loop resolves units in parallel — each unit's buffers are exclusively
//! owned by its map entry, so there is no cross-unit shared mutable state —
//! and concatenates the emitted events in id order, so the event stream is
//! identical regardless of thread scheduling.
//!
//! # Per-tick ordering
//!
//! Within one unit the order is fixed and matches the resolution contract:
//! queued strikes resolve to completion first (registering payload effects),
//! then pending effects advance, then the heat state machine consumes the
//! action-event inbox. The tick counter is threaded explicitly into every
//! call; nothing reads ambient time.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::damage::{resolve_packet, ResolutionFlags};
use crate::events::CombatEvent;
use crate::heat::tick_heat;
use crate::types::UnitId;
use crate::unit::{QueuedStrike, Unit};

/// The combat arena: all units plus the simulation tick counter.
///
/// # Example
///
/// ```
/// use voidlance_core::arena::Arena;
/// use voidlance_core::defense::{HullClass, HullSegment};
///
/// let mut arena = Arena::new();
/// let id = arena.spawn();
/// arena
///     .get_mut(id)
///     .unwrap()
///     .hull_segments
///     .push(HullSegment::new("core", HullClass::Balanced, 100.0));
///
/// let events = arena.step();
/// assert!(events.is_empty());
/// assert_eq!(arena.current_tick(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    /// Monotonically increasing unit ID counter.
    next_id: u64,
    /// Unit storage with deterministic iteration order.
    units: BTreeMap<UnitId, Unit>,
    /// Current simulation tick.
    tick: u64,
}

impl Arena {
    /// Creates an empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            units: BTreeMap::new(),
            tick: 0,
        }
    }

    /// Spawns a bare unit and returns its id.
    ///
    /// Configure the unit through [`Arena::get_mut`] before stepping.
    pub fn spawn(&mut self) -> UnitId {
        let id = UnitId::new(self.next_id);
        self.next_id += 1;
        self.units.insert(id, Unit::new(id));
        id
    }

    /// Removes a unit from the arena.
    pub fn despawn(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    /// Returns a reference to a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Returns a mutable reference to a unit by id.
    #[must_use]
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Returns an iterator over unit ids in deterministic (sorted) order.
    pub fn unit_ids_sorted(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.keys().copied()
    }

    /// Returns an iterator over units in deterministic (sorted by id) order.
    pub fn units_sorted(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.values()
    }

    /// Returns an iterator over mutable units in deterministic order.
    pub fn units_sorted_mut(&mut self) -> impl Iterator<Item = &mut Unit> + '_ {
        self.units.values_mut()
    }

    /// Number of units in the arena.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Returns true if the arena has no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Returns the current simulation tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Routes a strike to its target's inbox for the next step.
    ///
    /// A strike against a unit that no longer exists is dropped with a debug
    /// record; one degenerate target never aborts the tick for other units.
    /// Returns true if the strike was queued.
    pub fn queue_strike(&mut self, strike: QueuedStrike) -> bool {
        let target = strike.packet.target;
        match self.units.get_mut(&target) {
            Some(unit) => {
                unit.queue_strike(strike);
                true
            }
            None => {
                debug!(tick = self.tick, %target, "dropping strike against missing unit");
                false
            }
        }
    }

    /// Executes one simulation tick across every unit.
    ///
    /// Units are resolved in parallel; per-unit work runs in the mandated
    /// order (strikes, then pending effects, then heat). Returns the events
    /// emitted this tick, concatenated in `UnitId` order.
    pub fn step(&mut self) -> Vec<CombatEvent> {
        let tick = self.tick;

        let per_unit: Vec<Vec<CombatEvent>> = self
            .units
            .par_iter_mut()
            .map(|(_, unit)| step_unit(unit, tick))
            .collect();

        self.tick += 1;
        per_unit.into_iter().flatten().collect()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

/// Advances one unit by one tick: strikes, pending effects, heat.
fn step_unit(unit: &mut Unit, tick: u64) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    let was_alive = unit.is_alive();
    let mut last_attacker = None;

    for strike in unit.drain_strikes() {
        let resolution = resolve_packet(
            &strike.packet,
            &unit.defender,
            &unit.runtime,
            &mut unit.shields,
            &mut unit.hull_segments,
            &mut unit.pending_effects,
            &strike.payload_ops,
            tick,
        );

        if resolution.applied_shield_damage > 0.0 {
            events.push(CombatEvent::ShieldHit {
                target: strike.packet.target,
                source: strike.packet.source,
                absorbed: resolution.applied_shield_damage,
            });
        }
        if let Some(segment_index) = resolution.hull_segment_index {
            if resolution.applied_hull_damage > 0.0 {
                events.push(CombatEvent::HullHit {
                    target: strike.packet.target,
                    source: strike.packet.source,
                    amount: resolution.applied_hull_damage,
                    segment_index,
                });
                last_attacker = Some(strike.packet.source);
            }
            if resolution
                .flags
                .contains(ResolutionFlags::HULL_SEGMENT_DESTROYED)
            {
                events.push(CombatEvent::SegmentDestroyed {
                    target: strike.packet.target,
                    segment_index,
                });
            }
        }
    }

    crate::damage::tick_pending_effects(
        tick,
        &mut unit.pending_effects,
        &mut unit.hull_segments,
        &mut unit.runtime,
    );

    if was_alive && !unit.is_alive() {
        events.push(CombatEvent::UnitDestroyed {
            target: unit.id(),
            destroyer: last_attacker,
        });
    }

    let was_overheated = unit.heat.is_overheated;
    let stats = *unit.resolved_heat_stats();
    let safety_mode = unit.safety_mode;
    unit.heat_output = tick_heat(
        tick,
        &mut unit.action_events,
        &stats,
        &mut unit.heat,
        &mut unit.heatsink,
        safety_mode,
    );
    if !was_overheated && unit.heat.is_overheated {
        events.push(CombatEvent::OverheatEntered { unit: unit.id() });
    } else if was_overheated && !unit.heat.is_overheated {
        events.push(CombatEvent::OverheatRecovered { unit: unit.id() });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::DamagePacket;
    use crate::defense::{HullClass, HullSegment, ShieldLayer};
    use crate::heat::{HeatActionEvent, LimbSlot, ModuleType};
    use crate::types::{DamageType, Delivery};
    use glam::Vec3;

    fn strike(source: UnitId, target: UnitId, base_damage: f32) -> QueuedStrike {
        QueuedStrike {
            packet: DamagePacket::new(
                source,
                target,
                DamageType::Kinetic,
                Delivery::Slug,
                base_damage,
                -Vec3::Z,
            ),
            payload_ops: vec![],
        }
    }

    fn arm(arena: &mut Arena, id: UnitId, shield: f32, hull: f32) {
        let unit = arena.get_mut(id).unwrap();
        if shield > 0.0 {
            unit.shields.push(ShieldLayer::bubble("bubble", shield));
        }
        unit.hull_segments
            .push(HullSegment::new("core", HullClass::Balanced, hull));
    }

    mod store_tests {
        use super::*;

        #[test]
        fn spawn_assigns_sequential_ids() {
            let mut arena = Arena::new();
            assert_eq!(arena.spawn(), UnitId::new(0));
            assert_eq!(arena.spawn(), UnitId::new(1));
            assert_eq!(arena.spawn(), UnitId::new(2));
            assert_eq!(arena.unit_count(), 3);
        }

        #[test]
        fn despawn_removes_unit_and_ids_stay_monotonic() {
            let mut arena = Arena::new();
            let first = arena.spawn();
            arena.despawn(first);
            let second = arena.spawn();

            assert!(arena.get(first).is_none());
            assert_eq!(second, UnitId::new(1), "ids are never reused");
        }

        #[test]
        fn iteration_order_is_sorted() {
            let mut arena = Arena::new();
            let ids: Vec<UnitId> = (0..5).map(|_| arena.spawn()).collect();
            let iterated: Vec<UnitId> = arena.unit_ids_sorted().collect();
            assert_eq!(ids, iterated);
        }

        #[test]
        fn step_advances_tick_even_when_empty() {
            let mut arena = Arena::new();
            arena.step();
            arena.step();
            assert_eq!(arena.current_tick(), 2);
        }

        #[test]
        fn queue_strike_against_missing_unit_is_dropped() {
            let mut arena = Arena::new();
            let attacker = arena.spawn();
            assert!(!arena.queue_strike(strike(attacker, UnitId::new(99), 10.0)));
        }
    }

    mod step_tests {
        use super::*;

        #[test]
        fn step_resolves_queued_strikes() {
            let mut arena = Arena::new();
            let attacker = arena.spawn();
            let defender = arena.spawn();
            arm(&mut arena, defender, 50.0, 100.0);

            assert!(arena.queue_strike(strike(attacker, defender, 40.0)));
            let events = arena.step();

            let unit = arena.get(defender).unwrap();
            assert!((unit.total_shield() - 10.0).abs() < 1e-4);
            assert_eq!(unit.queued_strike_count(), 0);
            assert!(matches!(events[0], CombatEvent::ShieldHit { .. }));
        }

        #[test]
        fn events_come_out_in_unit_id_order() {
            let mut arena = Arena::new();
            let attacker = arena.spawn();
            let first = arena.spawn();
            let second = arena.spawn();
            arm(&mut arena, first, 0.0, 100.0);
            arm(&mut arena, second, 0.0, 100.0);

            // Queue against the higher id first; events must still come out
            // in unit id order.
            arena.queue_strike(strike(attacker, second, 10.0));
            arena.queue_strike(strike(attacker, first, 10.0));

            let events = arena.step();
            let order: Vec<UnitId> = events.iter().map(CombatEvent::primary_unit).collect();
            assert_eq!(order, vec![first, second]);
        }

        #[test]
        fn killing_strike_emits_destruction_events() {
            let mut arena = Arena::new();
            let attacker = arena.spawn();
            let defender = arena.spawn();
            arm(&mut arena, defender, 0.0, 30.0);

            arena.queue_strike(strike(attacker, defender, 100.0));
            let events = arena.step();

            assert!(events
                .iter()
                .any(|event| matches!(event, CombatEvent::SegmentDestroyed { .. })));
            assert!(events.iter().any(|event| matches!(
                event,
                CombatEvent::UnitDestroyed { destroyer: Some(d), .. } if *d == attacker
            )));
            assert!(!arena.get(defender).unwrap().is_alive());
        }

        #[test]
        fn heat_transitions_emit_events() {
            let mut arena = Arena::new();
            let id = arena.spawn();
            {
                let unit = arena.get_mut(id).unwrap();
                unit.hull_segments
                    .push(HullSegment::new("core", HullClass::Balanced, 100.0));
                unit.heat.base_heat_capacity = 100.0;
                unit.heat.base_dissipation_per_tick = 0.0;
                unit.action_events.push(HeatActionEvent {
                    module_type: ModuleType::Weapon,
                    slot: LimbSlot::Weapon,
                    base_heat: 90.0,
                    scale: 1.0,
                });
            }

            let events = arena.step();
            assert!(events
                .iter()
                .any(|event| matches!(event, CombatEvent::OverheatEntered { .. })));
            assert!(arena.get(id).unwrap().heat_output.is_overheated);
            assert!(arena.get(id).unwrap().action_events.is_empty());
        }

        #[test]
        fn strike_then_effect_then_heat_ordering_holds() {
            // A DoT registered by a strike must not pulse in the same step.
            let mut arena = Arena::new();
            let attacker = arena.spawn();
            let defender = arena.spawn();
            arm(&mut arena, defender, 0.0, 100.0);

            let mut s = strike(attacker, defender, 10.0);
            s.payload_ops.push(crate::damage::DamagePayloadOp {
                effect_id: "burn".to_string(),
                kind: crate::damage::DamageOpKind::DamageOverTime,
                damage_type: Some(DamageType::Thermal),
                magnitude: 5.0,
                duration_ticks: 4,
                tick_interval: 1,
                max_stacks: 1,
            });
            arena.queue_strike(s);

            arena.step();
            let after_first = arena.get(defender).unwrap().total_hull();
            assert!((after_first - 90.0).abs() < 1e-4, "strike only, no pulse yet");

            arena.step();
            let after_second = arena.get(defender).unwrap().total_hull();
            assert!((after_second - 85.0).abs() < 1e-4, "pulse on the next step");
        }

        #[test]
        fn parallel_step_is_deterministic() {
            let build = || {
                let mut arena = Arena::new();
                let attacker = arena.spawn();
                let defenders: Vec<UnitId> = (0..16).map(|_| arena.spawn()).collect();
                for (i, id) in defenders.iter().enumerate() {
                    arm(&mut arena, *id, 20.0 + i as f32, 100.0);
                }
                for (i, id) in defenders.iter().enumerate() {
                    arena.queue_strike(strike(attacker, *id, 15.0 + i as f32));
                }
                arena
            };

            let mut first = build();
            let mut second = build();
            let events_first: Vec<Vec<CombatEvent>> = (0..8).map(|_| first.step()).collect();
            let events_second: Vec<Vec<CombatEvent>> = (0..8).map(|_| second.step()).collect();

            assert_eq!(events_first, events_second);
            let hull_first: Vec<f32> = first.units_sorted().map(Unit::total_hull).collect();
            let hull_second: Vec<f32> = second.units_sorted().map(Unit::total_hull).collect();
            assert_eq!(hull_first, hull_second);
        }
    }
}
