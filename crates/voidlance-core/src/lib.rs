//! # Voidlance Core
//!
//! Deterministic combat-resolution core for Voidlance's tick-based
//! space-combat simulation.
//!
//! The crate converts abstract damage packets into concrete changes to a
//! target's shields, hull, and status-effect state, and regulates a per-unit
//! heat economy that gates weapon output. Everything is bit-for-bit
//! deterministic: fixed inputs produce identical outcomes across runs and
//! platforms, which is what the replay and regression suites rely on.
//!
//! ## Architecture
//!
//! - **[`types`] / [`defense`]**: pure data — damage channels, resistance
//!   profiles, shield layers, hull segments, the arc frame
//! - **[`damage`]**: the damage pipeline, payload-effect registry, and
//!   damage-type conversion
//! - **[`heat`]**: the loadout-driven heat aggregate and the per-tick heat
//!   state machine with overheat hysteresis
//! - **[`unit`] / [`arena`]**: the per-unit buffer owner and the
//!   deterministic store with the parallel step loop
//! - **[`hash`]**: state digests for determinism verification
//! - **[`scenario`]**: serde-backed replay packages for regression tests
//!
//! ## Determinism rules
//!
//! The current tick is an explicit parameter threaded through every call —
//! nothing reads ambient time. Units iterate in `BTreeMap` id order. The
//! only pseudo-randomness (weapon jams under unsafe overheat) is a hash of
//! explicit inputs. All numeric inputs are defensively clamped rather than
//! rejected, because packets and modifier tables originate from data-driven
//! catalog content.
//!
//! ## Usage
//!
//! ```
//! use glam::Vec3;
//! use voidlance_core::arena::Arena;
//! use voidlance_core::damage::DamagePacket;
//! use voidlance_core::defense::{HullClass, HullSegment, ShieldLayer};
//! use voidlance_core::types::{DamageType, Delivery};
//! use voidlance_core::unit::QueuedStrike;
//!
//! let mut arena = Arena::new();
//! let attacker = arena.spawn();
//! let defender = arena.spawn();
//! {
//!     let unit = arena.get_mut(defender).unwrap();
//!     unit.shields.push(ShieldLayer::bubble("bubble", 50.0));
//!     unit.hull_segments
//!         .push(HullSegment::new("core", HullClass::Balanced, 100.0));
//! }
//!
//! arena.queue_strike(QueuedStrike {
//!     packet: DamagePacket::new(
//!         attacker,
//!         defender,
//!         DamageType::Energy,
//!         Delivery::Beam,
//!         40.0,
//!         -Vec3::Z,
//!     ),
//!     payload_ops: vec![],
//! });
//!
//! let events = arena.step();
//! assert!(!events.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod damage;
pub mod defense;
pub mod events;
pub mod hash;
pub mod heat;
pub mod scenario;
pub mod types;
pub mod unit;

#[cfg(test)]
mod tests;

pub use arena::Arena;
pub use events::CombatEvent;
pub use types::{DamageType, Delivery, ResistanceProfile, UnitId};
pub use unit::{QueuedStrike, Unit};
