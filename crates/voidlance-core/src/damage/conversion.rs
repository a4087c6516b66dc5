//! Damage-type conversion with capping.
//!
//! Module affixes can convert a fraction of one damage channel into another
//! (for example, 70% of Kinetic into Thermal). When several rules draw from
//! the same source channel their combined fraction may exceed 100%; the rules
//! are then scaled down proportionally so the converted total never exceeds
//! the source amount. Conversion moves damage between channels and conserves
//! the vector total exactly.
//!
//! Applied by the weapon collaborator while building a packet, before the
//! pipeline runs; the pipeline itself only ever sees a single dominant type.

use serde::{Deserialize, Serialize};

use crate::types::DamageType;

/// One damage-type conversion rule.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageConversionRule {
    /// Channel the damage is drawn from.
    pub from: DamageType,
    /// Channel the damage is paid into.
    pub to: DamageType,
    /// Fraction converted, clamped to `[0, 1]` on application.
    pub pct01: f32,
}

/// Per-channel damage amounts.
///
/// # Example
///
/// ```
/// use voidlance_core::damage::DamageVector;
/// use voidlance_core::types::DamageType;
///
/// let vector = DamageVector::from_single(DamageType::Kinetic, 100.0);
/// assert_eq!(vector.total(), 100.0);
/// assert_eq!(vector.dominant_type(), Some(DamageType::Kinetic));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageVector {
    amounts: [f32; 7],
}

impl DamageVector {
    /// Creates an empty vector.
    #[must_use]
    pub const fn new() -> Self {
        Self { amounts: [0.0; 7] }
    }

    /// Creates a vector with the given amount on a single channel.
    #[must_use]
    pub fn from_single(damage_type: DamageType, amount: f32) -> Self {
        let mut vector = Self::new();
        vector.amounts[damage_type.channel()] = amount.max(0.0);
        vector
    }

    /// Returns the amount on a channel.
    #[must_use]
    pub fn get(&self, damage_type: DamageType) -> f32 {
        self.amounts[damage_type.channel()]
    }

    /// Sets the amount on a channel, clamped to `>= 0`.
    pub fn set(&mut self, damage_type: DamageType, amount: f32) {
        self.amounts[damage_type.channel()] = amount.max(0.0);
    }

    /// Adds to the amount on a channel.
    pub fn add(&mut self, damage_type: DamageType, amount: f32) {
        let slot = &mut self.amounts[damage_type.channel()];
        *slot = (*slot + amount).max(0.0);
    }

    /// Returns the sum over all channels.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.amounts.iter().sum()
    }

    /// Returns the channel carrying the most damage, if any carries damage.
    ///
    /// Ties break toward the earlier channel in [`DamageType::ALL`] order so
    /// the result is deterministic.
    #[must_use]
    pub fn dominant_type(&self) -> Option<DamageType> {
        let mut best = 0.0_f32;
        let mut dominant = None;
        for ty in DamageType::ALL {
            let amount = self.amounts[ty.channel()];
            if amount > best {
                best = amount;
                dominant = Some(ty);
            }
        }
        dominant
    }
}

/// Applies conversion rules to a damage vector, capping per source channel.
///
/// Rules sharing a `from` channel whose saturated fractions sum above 1.0 are
/// each scaled by the reciprocal of that sum, so the combined converted
/// fraction never exceeds 100% of the source amount. The vector total is
/// conserved exactly up to floating-point rounding.
pub fn apply_conversion_rules(vector: &mut DamageVector, rules: &[DamageConversionRule]) {
    if rules.is_empty() {
        return;
    }

    // Sum of requested fractions per source channel, for normalization.
    let mut sum_by_from = [0.0_f32; 7];
    for rule in rules {
        sum_by_from[rule.from.channel()] += rule.pct01.clamp(0.0, 1.0);
    }

    let original = vector.amounts;
    let mut next = original;

    for from in DamageType::ALL {
        let from_amount = original[from.channel()];
        if from_amount <= 0.0 {
            continue;
        }

        let total_requested = sum_by_from[from.channel()];
        let scale = if total_requested > 1.0 {
            1.0 / total_requested
        } else {
            1.0
        };

        let mut converted = 0.0;
        for rule in rules {
            if rule.from != from {
                continue;
            }
            let amount = from_amount * rule.pct01.clamp(0.0, 1.0) * scale;
            converted += amount;
            next[rule.to.channel()] += amount;
        }

        next[from.channel()] = (next[from.channel()] - converted.min(from_amount)).max(0.0);
    }

    vector.amounts = next;
}
