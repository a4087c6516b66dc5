//! Shared leaf types for the combat-resolution core.
//!
//! This module provides the identifiers and classification enums that every
//! other module builds on:
//! - [`UnitId`]: Unique identifier for combat units
//! - [`DamageType`]: The seven damage channels
//! - [`Delivery`]: How a damage packet physically arrives
//! - [`ResistanceProfile`]: Per-damage-type multipliers
//!
//! # Determinism
//!
//! `UnitId` is `Ord` so that `BTreeMap`-backed stores iterate units in a
//! deterministic order across platforms. Resistance lookups clamp to a fixed
//! range so that data-driven catalog content can never produce a divide-by-zero
//! or an unbounded amplification inside the damage pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower clamp bound for resistance multipliers.
///
/// A profile entry of zero reads as this floor: the layer is near-immune to
/// the damage type but still consumes capacity proportionally, and the
/// budget-unit inverse in the damage pipeline stays well-defined.
pub const MIN_RESISTANCE: f32 = 0.05;

/// Upper clamp bound for resistance multipliers.
pub const MAX_RESISTANCE: f32 = 4.0;

/// Unique identifier for a combat unit.
///
/// `UnitId` is a newtype wrapper around `u64` that provides type safety and
/// a clear semantic meaning. Unit IDs are immutable once assigned and must be
/// unique within an arena.
///
/// # Ordering
///
/// Unit IDs are ordered by their numeric value, which is used to ensure
/// deterministic iteration order across all units.
///
/// # Example
///
/// ```
/// use voidlance_core::types::UnitId;
///
/// let id1 = UnitId::new(1);
/// let id2 = UnitId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(u64);

impl UnitId {
    /// Creates a new `UnitId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UnitId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<UnitId> for u64 {
    fn from(id: UnitId) -> Self {
        id.0
    }
}

/// The seven damage channels a packet or effect can carry.
///
/// Every [`ResistanceProfile`] holds one multiplier per channel. The order of
/// variants is stable and used for indexed damage vectors, so new channels
/// must be appended, never inserted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Coherent energy (lasers, particle lances)
    Energy,
    /// Raw heat transfer (plasma, flamers)
    Thermal,
    /// Electromagnetic disruption (ion bursts, EMP)
    Em,
    /// Ionizing radiation payloads
    Radiation,
    /// Mass-driver and ballistic impacts
    Kinetic,
    /// Warhead blast and fragmentation
    Explosive,
    /// Corrosive and nanite payloads
    Caustic,
}

impl DamageType {
    /// All damage types in stable channel order.
    pub const ALL: [Self; 7] = [
        Self::Energy,
        Self::Thermal,
        Self::Em,
        Self::Radiation,
        Self::Kinetic,
        Self::Explosive,
        Self::Caustic,
    ];

    /// Returns the stable channel index of this damage type.
    #[must_use]
    pub const fn channel(self) -> usize {
        match self {
            Self::Energy => 0,
            Self::Thermal => 1,
            Self::Em => 2,
            Self::Radiation => 3,
            Self::Kinetic => 4,
            Self::Explosive => 5,
            Self::Caustic => 6,
        }
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Energy => write!(f, "Energy"),
            Self::Thermal => write!(f, "Thermal"),
            Self::Em => write!(f, "EM"),
            Self::Radiation => write!(f, "Radiation"),
            Self::Kinetic => write!(f, "Kinetic"),
            Self::Explosive => write!(f, "Explosive"),
            Self::Caustic => write!(f, "Caustic"),
        }
    }
}

/// How a damage packet physically arrives at the defender.
///
/// Delivery does not alter the resolution algorithm; it is carried through
/// for the damage-feedback and telemetry collaborators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delivery {
    /// Continuous directed-energy beam
    Beam,
    /// Single ballistic slug
    Slug,
    /// Multi-projectile burst
    Burst,
    /// Guided missile
    Missile,
    /// Heavy guided torpedo
    Torpedo,
}

/// Per-damage-type multiplier set scaling effective damage before capacity
/// consumption.
///
/// A multiplier below 1 reduces effective damage of that type, above 1
/// amplifies it. The identity profile is all 1.0. Lookups clamp each entry to
/// `[MIN_RESISTANCE, MAX_RESISTANCE]` so misconfigured catalog data degrades
/// instead of breaking the pipeline's budget arithmetic.
///
/// # Example
///
/// ```
/// use voidlance_core::types::{DamageType, ResistanceProfile};
///
/// let mut profile = ResistanceProfile::identity();
/// profile.energy = 0.5;
///
/// assert_eq!(profile.resistance(DamageType::Energy), 0.5);
/// assert_eq!(profile.resistance(DamageType::Kinetic), 1.0);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResistanceProfile {
    /// Multiplier for [`DamageType::Energy`]
    pub energy: f32,
    /// Multiplier for [`DamageType::Thermal`]
    pub thermal: f32,
    /// Multiplier for [`DamageType::Em`]
    pub em: f32,
    /// Multiplier for [`DamageType::Radiation`]
    pub radiation: f32,
    /// Multiplier for [`DamageType::Kinetic`]
    pub kinetic: f32,
    /// Multiplier for [`DamageType::Explosive`]
    pub explosive: f32,
    /// Multiplier for [`DamageType::Caustic`]
    pub caustic: f32,
}

impl ResistanceProfile {
    /// Returns the identity profile (all multipliers 1.0).
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            energy: 1.0,
            thermal: 1.0,
            em: 1.0,
            radiation: 1.0,
            kinetic: 1.0,
            explosive: 1.0,
            caustic: 1.0,
        }
    }

    /// Returns a profile with the same multiplier on every channel.
    #[must_use]
    pub const fn uniform(value: f32) -> Self {
        Self {
            energy: value,
            thermal: value,
            em: value,
            radiation: value,
            kinetic: value,
            explosive: value,
            caustic: value,
        }
    }

    /// Returns the clamped resistance multiplier for a damage type.
    ///
    /// The raw profile entry is clamped to `[MIN_RESISTANCE, MAX_RESISTANCE]`.
    #[must_use]
    pub fn resistance(&self, damage_type: DamageType) -> f32 {
        let raw = match damage_type {
            DamageType::Energy => self.energy,
            DamageType::Thermal => self.thermal,
            DamageType::Em => self.em,
            DamageType::Radiation => self.radiation,
            DamageType::Kinetic => self.kinetic,
            DamageType::Explosive => self.explosive,
            DamageType::Caustic => self.caustic,
        };
        raw.clamp(MIN_RESISTANCE, MAX_RESISTANCE)
    }
}

impl Default for ResistanceProfile {
    fn default() -> Self {
        Self::identity()
    }
}
