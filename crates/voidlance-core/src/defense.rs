//! Defensive state for a combat unit: shield layers, hull segments, the arc
//! frame, and per-unit runtime multipliers.
//!
//! These are pure data types plus one piece of geometry —
//! [`resolve_incoming_arc`] — which classifies a packet's incoming direction
//! into the defender's arc frame. All behavior that mutates this state lives
//! in the [`damage`](crate::damage) module.
//!
//! # Arc convention
//!
//! `incoming_direction` on a packet is the projectile's direction of travel
//! (attacker toward defender). The approach vector used for classification is
//! its negation: a shot travelling along `-forward` comes from dead ahead and
//! strikes the Front arc.
//!
//! # Invariants
//!
//! - `0 <= current <= max` for every shield layer and hull segment
//! - An inactive hull segment cannot absorb damage or be selected

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::ResistanceProfile;

/// Cosine band defining the Front and Rear arcs.
///
/// Approach vectors with a forward dot product at or above this value are
/// Front, at or below its negation Rear; everything between is a flank arc.
const ARC_FORWARD_BAND: f32 = 0.5;

/// Shield coverage topology.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShieldTopology {
    /// Omnidirectional layer; participates regardless of incoming arc.
    Bubble,
    /// Covers a single arc; participates only on an exact arc match.
    Directional,
}

/// Directional coverage classification for shield layers and incoming hits.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShieldArc {
    /// Matches every incoming arc.
    Any,
    /// Forward hemisphere band.
    Front,
    /// Port flank.
    Left,
    /// Starboard flank.
    Right,
    /// Rear hemisphere band.
    Rear,
}

/// Hull chassis classification.
///
/// Carried for the damage-feedback and telemetry collaborators; the pipeline
/// itself treats all classes identically.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HullClass {
    /// Light, fast chassis
    LightChassis,
    /// Balanced chassis
    Balanced,
    /// Heavy armored chassis
    HeavyChassis,
}

/// One layer of a unit's shield stack.
///
/// Layers are resolved in buffer order by the damage pipeline. Only the
/// pipeline decrements `current`; the external recharge step (out of scope
/// for this crate) is the only thing that raises it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldLayer {
    /// Stable identifier for telemetry and save data.
    pub layer_id: String,
    /// Coverage topology of this layer.
    pub topology: ShieldTopology,
    /// Arc this layer covers. Ignored for [`ShieldTopology::Bubble`].
    pub arc: ShieldArc,
    /// Current capacity. Invariant: `0 <= current <= max`.
    pub current: f32,
    /// Maximum capacity.
    pub max: f32,
    /// Capacity regained per tick by the external recharge step.
    pub recharge_per_tick: f32,
    /// Fraction of absorbed damage reflected back at the attacker.
    pub reflect_pct: f32,
    /// Per-damage-type multipliers applied before capacity consumption.
    pub resistances: ResistanceProfile,
}

impl ShieldLayer {
    /// Creates a bubble layer with identity resistances and full charge.
    #[must_use]
    pub fn bubble(layer_id: impl Into<String>, max: f32) -> Self {
        Self {
            layer_id: layer_id.into(),
            topology: ShieldTopology::Bubble,
            arc: ShieldArc::Any,
            current: max,
            max,
            recharge_per_tick: 0.0,
            reflect_pct: 0.0,
            resistances: ResistanceProfile::identity(),
        }
    }

    /// Creates a directional layer with identity resistances and full charge.
    #[must_use]
    pub fn directional(layer_id: impl Into<String>, arc: ShieldArc, max: f32) -> Self {
        Self {
            layer_id: layer_id.into(),
            topology: ShieldTopology::Directional,
            arc,
            current: max,
            max,
            recharge_per_tick: 0.0,
            reflect_pct: 0.0,
            resistances: ResistanceProfile::identity(),
        }
    }

    /// Returns true if this layer participates in absorbing a hit from the
    /// given arc.
    #[must_use]
    pub fn covers(&self, incoming_arc: ShieldArc) -> bool {
        match self.topology {
            ShieldTopology::Bubble => true,
            ShieldTopology::Directional => {
                self.arc == ShieldArc::Any || self.arc == incoming_arc
            }
        }
    }
}

/// One segment of a unit's hull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullSegment {
    /// Stable identifier for telemetry and save data.
    pub segment_id: String,
    /// Chassis classification.
    pub hull_class: HullClass,
    /// Current integrity. Invariant: `0 <= current <= max`.
    pub current: f32,
    /// Maximum integrity.
    pub max: f32,
    /// Flat damage reduction applied before resistance.
    pub armor: f32,
    /// Segment mass, read by external movement systems.
    pub mass: f32,
    /// Per-damage-type multipliers applied after armor.
    pub resistances: ResistanceProfile,
    /// Whether the segment can absorb damage or be selected.
    pub active: bool,
}

impl HullSegment {
    /// Creates an active segment with identity resistances at full integrity.
    #[must_use]
    pub fn new(segment_id: impl Into<String>, hull_class: HullClass, max: f32) -> Self {
        Self {
            segment_id: segment_id.into(),
            hull_class,
            current: max,
            max,
            armor: 0.0,
            mass: 0.0,
            resistances: ResistanceProfile::identity(),
            active: true,
        }
    }

    /// Returns a copy with the given flat armor value.
    #[must_use]
    pub fn with_armor(mut self, armor: f32) -> Self {
        self.armor = armor;
        self
    }
}

/// Orientation frame used to classify incoming directions into arcs.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenderState {
    /// Unit forward axis (unit vector).
    pub forward: Vec3,
    /// Unit up axis (unit vector).
    pub up: Vec3,
}

impl DefenderState {
    /// Creates a frame from forward and up axes.
    #[must_use]
    pub const fn new(forward: Vec3, up: Vec3) -> Self {
        Self { forward, up }
    }
}

impl Default for DefenderState {
    fn default() -> Self {
        Self {
            forward: Vec3::Z,
            up: Vec3::Y,
        }
    }
}

/// Per-unit scalar multipliers driven by active status effects.
///
/// The status-effect registry recomputes these from live effect stacks every
/// tick, so reductions recover as soon as their effects expire — they are
/// never permanently baked in. The damage pipeline reads
/// `incoming_damage_multiplier`; external systems read the rest (shield
/// recharge, weapon cooldown, movement).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseRuntimeState {
    /// Multiplier on unit mass.
    pub mass_multiplier: f32,
    /// Multiplier on shield recharge rates.
    pub shield_recharge_multiplier: f32,
    /// Multiplier on reactor power output.
    pub reactor_output_multiplier: f32,
    /// Additive bonus to shield reflect percentages.
    pub reflect_bonus_pct: f32,
    /// Multiplier on incoming effective damage.
    pub incoming_damage_multiplier: f32,
}

impl DefenseRuntimeState {
    /// Returns the identity runtime (all multipliers 1, no reflect bonus).
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            mass_multiplier: 1.0,
            shield_recharge_multiplier: 1.0,
            reactor_output_multiplier: 1.0,
            reflect_bonus_pct: 0.0,
            incoming_damage_multiplier: 1.0,
        }
    }

    /// Resets the effect-driven channels back to identity.
    ///
    /// Called at the top of every status-effect tick so that multipliers are
    /// recomputed from live stacks rather than accumulated across ticks.
    pub fn reset_effect_channels(&mut self) {
        *self = Self::identity();
    }
}

impl Default for DefenseRuntimeState {
    fn default() -> Self {
        Self::identity()
    }
}

/// Module discipline a defense modifier originates from.
///
/// Carried for telemetry; the application logic treats all disciplines
/// identically.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleDiscipline {
    /// Reactor modules
    Reactor,
    /// Engine modules
    Engine,
    /// Shield capacitor modules
    ShieldCapacitor,
    /// Shield canopy modules
    ShieldCanopy,
    /// Armor plating modules
    ArmorPlating,
}

/// Equipment-driven scaling of a unit's defensive baselines.
///
/// Multiplicative fields default to 1 and a zero value reads as "unset";
/// additive fields default to 0. Applied once per loadout change by
/// [`apply_module_defense_modifiers`] — the mutations land in the shield and
/// hull buffers themselves, so they persist across ticks without touching
/// the effect-owned [`DefenseRuntimeState`] channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDefenseModifier {
    /// Stable identifier for telemetry and save data.
    pub modifier_id: String,
    /// Discipline of the contributing module.
    pub discipline: ModuleDiscipline,
    /// Multiplier on shield layer capacity.
    pub shield_capacity_mul: f32,
    /// Multiplier on shield recharge rates.
    pub shield_recharge_mul: f32,
    /// Multiplier on hull armor.
    pub armor_mul: f32,
    /// Multiplier on hull segment mass.
    pub mass_mul: f32,
    /// Additive reflect percentage for every shield layer.
    pub reflect_add_pct: f32,
    /// Fractional EM resistance improvement (lowers the EM multiplier).
    pub em_resistance_add: f32,
    /// Fractional caustic resistance improvement.
    pub caustic_resistance_add: f32,
}

impl ModuleDefenseModifier {
    /// Creates a neutral modifier for the given discipline.
    #[must_use]
    pub fn neutral(modifier_id: impl Into<String>, discipline: ModuleDiscipline) -> Self {
        Self {
            modifier_id: modifier_id.into(),
            discipline,
            shield_capacity_mul: 1.0,
            shield_recharge_mul: 1.0,
            armor_mul: 1.0,
            mass_mul: 1.0,
            reflect_add_pct: 0.0,
            em_resistance_add: 0.0,
            caustic_resistance_add: 0.0,
        }
    }
}

/// Floor for equipment-driven multipliers.
const MIN_MODULE_MULTIPLIER: f32 = 0.05;

/// Applies equipment defense modifiers to a unit's shield and hull buffers.
///
/// Call once per loadout change, not per tick: the scaling mutates the
/// buffers' baselines in place (capacity, recharge, armor, mass, reflect,
/// EM/caustic resistances) and applying it again would compound. A zero
/// multiplicative field reads as unset; every multiplier is floored so
/// misconfigured catalog data cannot zero a baseline. Shield charge is
/// rescaled with capacity and stays clamped to the new maximum.
pub fn apply_module_defense_modifiers(
    modifiers: &[ModuleDefenseModifier],
    shields: &mut [ShieldLayer],
    hull_segments: &mut [HullSegment],
) {
    let unset_as_identity = |value: f32| if value == 0.0 { 1.0 } else { value };

    for modifier in modifiers {
        let capacity_mul =
            unset_as_identity(modifier.shield_capacity_mul).max(MIN_MODULE_MULTIPLIER);
        let recharge_mul =
            unset_as_identity(modifier.shield_recharge_mul).max(MIN_MODULE_MULTIPLIER);
        let armor_mul = unset_as_identity(modifier.armor_mul).max(MIN_MODULE_MULTIPLIER);
        let mass_mul = unset_as_identity(modifier.mass_mul).max(MIN_MODULE_MULTIPLIER);
        let reflect_add = modifier.reflect_add_pct.max(0.0);

        for layer in shields.iter_mut() {
            layer.max *= capacity_mul;
            layer.current = (layer.current * capacity_mul).min(layer.max);
            layer.recharge_per_tick *= recharge_mul;
            layer.reflect_pct += reflect_add;
            layer.resistances.em =
                (layer.resistances.em * (1.0 - modifier.em_resistance_add)).max(0.05);
            layer.resistances.caustic =
                (layer.resistances.caustic * (1.0 - modifier.caustic_resistance_add)).max(0.05);
        }

        for segment in hull_segments.iter_mut() {
            segment.armor *= armor_mul;
            segment.mass *= mass_mul;
            segment.resistances.em =
                (segment.resistances.em * (1.0 - modifier.em_resistance_add)).max(0.05);
            segment.resistances.caustic =
                (segment.resistances.caustic * (1.0 - modifier.caustic_resistance_add)).max(0.05);
        }
    }
}

/// Classifies an incoming direction into the defender's arc frame.
///
/// `incoming_direction` is the projectile's direction of travel. The approach
/// vector (defender toward attacker) is its negation; its forward dot product
/// selects Front/Rear inside a ±0.5 band, and the sign of its right component
/// selects the flank otherwise. Degenerate inputs (zero-length forward or
/// incoming vectors) fall back to the forward axis, classifying as Front.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use voidlance_core::defense::{resolve_incoming_arc, ShieldArc};
///
/// // Head-on shot travelling opposite the defender's forward axis.
/// let arc = resolve_incoming_arc(Vec3::Z, Vec3::Y, -Vec3::Z);
/// assert_eq!(arc, ShieldArc::Front);
/// ```
#[must_use]
pub fn resolve_incoming_arc(forward: Vec3, up: Vec3, incoming_direction: Vec3) -> ShieldArc {
    let forward = forward.try_normalize().unwrap_or(Vec3::Z);
    let up = up.try_normalize().unwrap_or(Vec3::Y);
    let right = up.cross(forward).try_normalize().unwrap_or(Vec3::X);
    let approach = (-incoming_direction).try_normalize().unwrap_or(forward);

    let f = forward.dot(approach);
    if f >= ARC_FORWARD_BAND {
        return ShieldArc::Front;
    }
    if f <= -ARC_FORWARD_BAND {
        return ShieldArc::Rear;
    }
    if right.dot(approach) >= 0.0 {
        ShieldArc::Right
    } else {
        ShieldArc::Left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod arc_tests {
        use super::*;

        #[test]
        fn head_on_shot_is_front() {
            let arc = resolve_incoming_arc(Vec3::Z, Vec3::Y, -Vec3::Z);
            assert_eq!(arc, ShieldArc::Front);
        }

        #[test]
        fn shot_from_behind_is_rear() {
            let arc = resolve_incoming_arc(Vec3::Z, Vec3::Y, Vec3::Z);
            assert_eq!(arc, ShieldArc::Rear);
        }

        #[test]
        fn flank_shots_resolve_left_and_right() {
            // Approach from starboard: projectile travels along -right.
            // right = up x forward = Y x Z = X
            let from_starboard = resolve_incoming_arc(Vec3::Z, Vec3::Y, -Vec3::X);
            assert_eq!(from_starboard, ShieldArc::Right);

            let from_port = resolve_incoming_arc(Vec3::Z, Vec3::Y, Vec3::X);
            assert_eq!(from_port, ShieldArc::Left);
        }

        #[test]
        fn band_boundary_is_front() {
            // Approach exactly on the 60-degree cone edge (dot == 0.5).
            let approach = Vec3::new((1.0 - 0.25f32).sqrt(), 0.0, 0.5);
            let arc = resolve_incoming_arc(Vec3::Z, Vec3::Y, -approach);
            assert_eq!(arc, ShieldArc::Front);
        }

        #[test]
        fn degenerate_inputs_fall_back_to_front() {
            let arc = resolve_incoming_arc(Vec3::ZERO, Vec3::Y, Vec3::ZERO);
            assert_eq!(arc, ShieldArc::Front);
        }

        #[test]
        fn classification_is_deterministic() {
            let dir = Vec3::new(0.3, 0.1, -0.9);
            let first = resolve_incoming_arc(Vec3::Z, Vec3::Y, dir);
            let second = resolve_incoming_arc(Vec3::Z, Vec3::Y, dir);
            assert_eq!(first, second);
        }
    }

    mod coverage_tests {
        use super::*;

        #[test]
        fn bubble_covers_every_arc() {
            let layer = ShieldLayer::bubble("bubble", 50.0);
            for arc in [ShieldArc::Front, ShieldArc::Left, ShieldArc::Right, ShieldArc::Rear] {
                assert!(layer.covers(arc));
            }
        }

        #[test]
        fn directional_covers_only_its_arc() {
            let layer = ShieldLayer::directional("front", ShieldArc::Front, 20.0);
            assert!(layer.covers(ShieldArc::Front));
            assert!(!layer.covers(ShieldArc::Rear));
            assert!(!layer.covers(ShieldArc::Left));
        }

        #[test]
        fn directional_any_covers_everything() {
            let layer = ShieldLayer::directional("aura", ShieldArc::Any, 20.0);
            assert!(layer.covers(ShieldArc::Front));
            assert!(layer.covers(ShieldArc::Rear));
        }
    }

    mod runtime_tests {
        use super::*;

        #[test]
        fn identity_is_all_ones() {
            let runtime = DefenseRuntimeState::identity();
            assert_eq!(runtime.mass_multiplier, 1.0);
            assert_eq!(runtime.reactor_output_multiplier, 1.0);
            assert_eq!(runtime.reflect_bonus_pct, 0.0);
        }

        #[test]
        fn reset_restores_identity() {
            let mut runtime = DefenseRuntimeState {
                reactor_output_multiplier: 0.4,
                reflect_bonus_pct: 0.2,
                ..DefenseRuntimeState::identity()
            };
            runtime.reset_effect_channels();
            assert_eq!(runtime, DefenseRuntimeState::identity());
        }
    }

    mod module_modifier_tests {
        use super::*;

        #[test]
        fn capacity_scaling_rescales_charge_within_max() {
            let mut shields = vec![ShieldLayer::bubble("bubble", 50.0)];
            shields[0].current = 40.0;
            let mut hull: Vec<HullSegment> = vec![];

            let mut modifier =
                ModuleDefenseModifier::neutral("cap", ModuleDiscipline::ShieldCapacitor);
            modifier.shield_capacity_mul = 1.5;

            apply_module_defense_modifiers(&[modifier], &mut shields, &mut hull);

            assert!((shields[0].max - 75.0).abs() < 1e-4);
            assert!((shields[0].current - 60.0).abs() < 1e-4);
        }

        #[test]
        fn armor_and_mass_scale_hull_segments() {
            let mut shields: Vec<ShieldLayer> = vec![];
            let mut hull = vec![{
                let mut segment = HullSegment::new("core", HullClass::HeavyChassis, 100.0)
                    .with_armor(10.0);
                segment.mass = 500.0;
                segment
            }];

            let mut modifier =
                ModuleDefenseModifier::neutral("plating", ModuleDiscipline::ArmorPlating);
            modifier.armor_mul = 1.4;
            modifier.mass_mul = 1.1;

            apply_module_defense_modifiers(&[modifier], &mut shields, &mut hull);

            assert!((hull[0].armor - 14.0).abs() < 1e-4);
            assert!((hull[0].mass - 550.0).abs() < 1e-4);
        }

        #[test]
        fn resistance_adds_lower_the_matching_channels() {
            let mut shields = vec![ShieldLayer::bubble("bubble", 50.0)];
            let mut hull = vec![HullSegment::new("core", HullClass::Balanced, 100.0)];

            let mut modifier =
                ModuleDefenseModifier::neutral("faraday", ModuleDiscipline::ShieldCanopy);
            modifier.em_resistance_add = 0.3;

            apply_module_defense_modifiers(&[modifier], &mut shields, &mut hull);

            assert!((shields[0].resistances.em - 0.7).abs() < 1e-4);
            assert!((hull[0].resistances.em - 0.7).abs() < 1e-4);
            assert_eq!(shields[0].resistances.kinetic, 1.0);
        }

        #[test]
        fn zero_fields_read_as_unset() {
            let mut shields = vec![ShieldLayer::bubble("bubble", 50.0)];
            let mut hull: Vec<HullSegment> = vec![];

            let mut modifier =
                ModuleDefenseModifier::neutral("noop", ModuleDiscipline::Reactor);
            modifier.shield_capacity_mul = 0.0;

            apply_module_defense_modifiers(&[modifier], &mut shields, &mut hull);

            assert_eq!(shields[0].max, 50.0);
        }
    }

    mod serialization_tests {
        use super::*;

        #[test]
        fn shield_layer_roundtrip() {
            let layer = ShieldLayer::directional("front", ShieldArc::Front, 35.0);
            let json = serde_json::to_string(&layer).unwrap();
            let deserialized: ShieldLayer = serde_json::from_str(&json).unwrap();
            assert_eq!(layer, deserialized);
        }

        #[test]
        fn hull_segment_roundtrip() {
            let segment = HullSegment::new("core", HullClass::Balanced, 100.0).with_armor(3.0);
            let json = serde_json::to_string(&segment).unwrap();
            let deserialized: HullSegment = serde_json::from_str(&json).unwrap();
            assert_eq!(segment, deserialized);
        }
    }
}
