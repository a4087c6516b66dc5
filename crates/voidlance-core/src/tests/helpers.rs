//! Shared builders for the cross-module suites.

use glam::Vec3;

use crate::arena::Arena;
use crate::damage::{DamagePacket, DamagePayloadOp};
use crate::defense::{HullClass, HullSegment, ShieldLayer};
use crate::heat::{HeatActionEvent, LimbSlot, ModuleType};
use crate::types::{DamageType, Delivery, UnitId};
use crate::unit::QueuedStrike;

/// Gives a unit a bubble shield (if `shield > 0`) and one hull segment.
pub fn arm_unit(arena: &mut Arena, id: UnitId, shield: f32, hull: f32) {
    let unit = arena.get_mut(id).expect("unit exists");
    if shield > 0.0 {
        unit.shields.push(ShieldLayer::bubble("bubble", shield));
    }
    unit.hull_segments
        .push(HullSegment::new("core", HullClass::Balanced, hull));
}

/// Builds a plain kinetic strike with no payload.
pub fn kinetic_strike(source: UnitId, target: UnitId, base_damage: f32) -> QueuedStrike {
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

/// Builds a strike carrying one damage-over-time and one power-reduction op.
pub fn payload_strike(source: UnitId, target: UnitId, base_damage: f32) -> QueuedStrike {
    QueuedStrike {
        packet: DamagePacket::new(
            source,
            target,
            DamageType::Em,
            Delivery::Burst,
            base_damage,
            -Vec3::Z,
        ),
        payload_ops: vec![
            DamagePayloadOp {
                effect_id: "dot_thermal".to_string(),
                kind: crate::damage::DamageOpKind::DamageOverTime,
                damage_type: Some(DamageType::Thermal),
                magnitude: 3.0,
                duration_ticks: 5,
                tick_interval: 1,
                max_stacks: 2,
            },
            DamagePayloadOp {
                effect_id: "drain_em".to_string(),
                kind: crate::damage::DamageOpKind::PowerReduction,
                damage_type: Some(DamageType::Em),
                magnitude: 0.12,
                duration_ticks: 4,
                tick_interval: 1,
                max_stacks: 1,
            },
        ],
    }
}

/// Builds a weapon heat event.
pub fn weapon_heat(base_heat: f32) -> HeatActionEvent {
    HeatActionEvent {
        module_type: ModuleType::Weapon,
        slot: LimbSlot::Weapon,
        base_heat,
        scale: 1.0,
    }
}

/// Spawns an attacker plus `defenders` armed defenders.
pub fn setup_battle(arena: &mut Arena, defenders: usize) -> (UnitId, Vec<UnitId>) {
    let attacker = arena.spawn();
    let ids: Vec<UnitId> = (0..defenders)
        .map(|i| {
            let id = arena.spawn();
            #[allow(clippy::cast_precision_loss)]
            arm_unit(arena, id, 30.0 + i as f32 * 5.0, 100.0);
            id
        })
        .collect();
    (attacker, ids)
}
