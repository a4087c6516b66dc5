//! Notification events emitted by the arena step loop.
//!
//! Events never change state; they inform the damage-feedback, VFX, and
//! telemetry collaborators about what the resolution core did this tick.
//! The step loop emits them in `UnitId` order regardless of how many threads
//! resolved units, so the event stream itself is deterministic.

use serde::{Deserialize, Serialize};

use crate::types::UnitId;

/// Something the resolution core did during a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A shield stack absorbed damage.
    ShieldHit {
        /// Unit whose shields absorbed the hit.
        target: UnitId,
        /// Unit that dealt the damage.
        source: UnitId,
        /// Post-resistance damage absorbed.
        absorbed: f32,
    },
    /// A hull segment absorbed damage.
    HullHit {
        /// Unit whose hull was struck.
        target: UnitId,
        /// Unit that dealt the damage.
        source: UnitId,
        /// Damage applied to the segment.
        amount: f32,
        /// Index of the struck segment.
        segment_index: usize,
    },
    /// A hull segment was driven to zero and deactivated.
    SegmentDestroyed {
        /// Unit that lost the segment.
        target: UnitId,
        /// Index of the destroyed segment.
        segment_index: usize,
    },
    /// Every hull segment of a unit is now inactive.
    UnitDestroyed {
        /// Unit that was destroyed.
        target: UnitId,
        /// Unit that landed the killing strike, if known.
        destroyer: Option<UnitId>,
    },
    /// A unit crossed its overheat threshold.
    OverheatEntered {
        /// Unit that overheated.
        unit: UnitId,
    },
    /// An overheated unit cooled to its recovery threshold.
    OverheatRecovered {
        /// Unit that recovered.
        unit: UnitId,
    },
}

impl CombatEvent {
    /// Returns the unit this event is primarily about.
    #[must_use]
    pub const fn primary_unit(&self) -> UnitId {
        match self {
            Self::ShieldHit { target, .. }
            | Self::HullHit { target, .. }
            | Self::SegmentDestroyed { target, .. }
            | Self::UnitDestroyed { target, .. } => *target,
            Self::OverheatEntered { unit } | Self::OverheatRecovered { unit } => *unit,
        }
    }
}
