//! The heat aggregate resolver: folds modifier definitions that match the
//! current loadout into one [`ResolvedHeatStats`] bundle.
//!
//! # Determinism
//!
//! Pure, order-independent, time-independent. For the multiplicative fields
//! the fold is associative and for the additive fields commutative, so the
//! result is independent of definition ordering — two identical resolves
//! produce identical bit patterns. Re-run only when the equipped set changes;
//! the owning [`Unit`](crate::unit::Unit) caches the result.

use super::{EquippedLimb, HeatModifierDefinition, HeatModifierSource, OwnedItem, ResolvedHeatStats};

/// Folds every modifier definition matching the loadout into one aggregate.
///
/// A definition matches if its source names any currently equipped limb
/// (by limb id, affix id, module type, or slot) or any owned item (by item
/// id or set id). Non-matching definitions contribute nothing.
///
/// # Example
///
/// ```
/// use voidlance_core::heat::{
///     resolve_aggregate, EquippedLimb, HeatModifierDefinition, HeatModifierSource,
///     LimbSlot, ModuleType,
/// };
///
/// let limbs = vec![EquippedLimb {
///     limb_id: "limb_coolant_radiator".to_string(),
///     affix_id: None,
///     module_type: ModuleType::Utility,
///     slot: LimbSlot::Cooling,
/// }];
/// let mut cooling = HeatModifierDefinition::neutral(
///     "heat_slot_cooling",
///     HeatModifierSource::LimbSlot(LimbSlot::Cooling),
/// );
/// cooling.heat_dissipation_multiplier = 1.5;
///
/// let stats = resolve_aggregate(&limbs, &[], &[cooling]);
/// assert!(stats.heat_dissipation_multiplier > 1.0);
/// ```
#[must_use]
pub fn resolve_aggregate(
    equipped_limbs: &[EquippedLimb],
    owned_items: &[OwnedItem],
    definitions: &[HeatModifierDefinition],
) -> ResolvedHeatStats {
    let mut stats = ResolvedHeatStats::identity();
    for definition in definitions {
        if matches_any(definition, equipped_limbs, owned_items) {
            stats.apply(definition);
        }
    }
    stats
}

/// Returns true if the definition's source names anything in the loadout.
fn matches_any(
    definition: &HeatModifierDefinition,
    equipped_limbs: &[EquippedLimb],
    owned_items: &[OwnedItem],
) -> bool {
    match &definition.source {
        HeatModifierSource::LimbId(limb_id) => equipped_limbs
            .iter()
            .any(|limb| limb.limb_id == *limb_id),
        HeatModifierSource::AffixId(affix_id) => equipped_limbs
            .iter()
            .any(|limb| limb.affix_id.as_deref() == Some(affix_id.as_str())),
        HeatModifierSource::ModuleType(module_type) => equipped_limbs
            .iter()
            .any(|limb| limb.module_type == *module_type),
        HeatModifierSource::LimbSlot(slot) => {
            equipped_limbs.iter().any(|limb| limb.slot == *slot)
        }
        HeatModifierSource::ItemId(item_id) => {
            owned_items.iter().any(|item| item.item_id == *item_id)
        }
        HeatModifierSource::SetId(set_id) => owned_items
            .iter()
            .any(|item| item.set_id.as_deref() == Some(set_id.as_str())),
    }
}
