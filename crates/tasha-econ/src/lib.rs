#![deny(warnings)]

//! Reward economics: resource conversion and next-threshold lookup.
//!
//! This module provides pure helpers for:
//! - Converting a raw resource quantity into points and tiered reward
//! - Finding how many more units (and how much premium currency) the next
//!   reward cycle costs
//!
//! Every function is a pure function of its inputs and the static table.

use serde::{Deserialize, Serialize};
use tasha_core::{CategoryId, ConfigError, EventConfig, ResourceConfig, Tier};
use tracing::trace;

/// Outcome of converting one category's raw quantity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    /// Convertible units after applying the divisor (uncapped).
    pub units: u64,
    /// Points earned.
    pub points: u64,
    /// Reward earned from the tier schedule.
    pub reward: u64,
}

/// Units and premium currency needed to complete the next reward cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub category: CategoryId,
    /// Premium currency per raw unit.
    pub cost_per_unit: u64,
    /// Raw units still missing for the next cycle.
    pub units_needed: u64,
}

impl Threshold {
    /// Premium currency needed to buy `units_needed`.
    pub fn premium_cost(&self) -> u64 {
        self.units_needed.saturating_mul(self.cost_per_unit)
    }
}

/// Raw units floor-divided by the category's divisor; 1:1 when absent.
pub fn convertible_units(resource: &ResourceConfig, raw_amount: u64) -> u64 {
    match resource.conversion_divisor {
        Some(d) => raw_amount / d.get(),
        None => raw_amount,
    }
}

/// Progress into the current cycle of `tier` for an amount at or above `lower`.
///
/// Zero means the amount sits exactly on a cycle boundary.
pub fn cycle_progress(amount: u64, lower: u64, tier: &Tier) -> u64 {
    amount
        .saturating_sub(lower)
        .checked_rem(tier.cost)
        .unwrap_or(0)
}

/// Units needed to finish the in-progress cycle, or a full cycle when the
/// amount sits on a boundary.
pub fn units_to_next_cycle(amount: u64, lower: u64, tier: &Tier) -> u64 {
    match cycle_progress(amount, lower, tier) {
        0 => tier.cost,
        progress => tier.cost - progress,
    }
}

/// Walk the tier schedule for an amount of convertible units.
///
/// Amounts above the final tier's `max` are capped; the excess earns nothing.
pub fn tier_reward(resource: &ResourceConfig, units: u64) -> u64 {
    let capped = units.min(resource.cap());
    let mut total: u64 = 0;
    for (lower, tier) in resource.spans() {
        if capped <= lower {
            break;
        }
        let usable = capped.min(tier.max) - lower;
        let cycles = usable.checked_div(tier.cost).unwrap_or(0);
        total = total.saturating_add(cycles.saturating_mul(tier.reward));
    }
    total
}

/// Convert a raw quantity using one category's rules.
///
/// Example:
/// skill (10 points/unit, tiers 150/30/20 and 850/50/50) at 200 raw units
/// earns 2000 points and 5*20 + 1*50 = 150 reward.
pub fn convert_resource(resource: &ResourceConfig, raw_amount: u64) -> Conversion {
    let units = convertible_units(resource, raw_amount);
    let points = resource
        .per_item_points
        .map(|p| units.saturating_mul(p))
        .unwrap_or(0);
    let reward = tier_reward(resource, units);
    Conversion {
        units,
        points,
        reward,
    }
}

/// Convert a raw quantity for a category looked up in the event table.
pub fn convert(
    event: &EventConfig,
    category: &CategoryId,
    raw_amount: u64,
) -> Result<Conversion, ConfigError> {
    let resource = event.category(category)?;
    let out = convert_resource(resource, raw_amount);
    trace!(%category, raw_amount, ?out, "converted");
    Ok(out)
}

/// Next reward threshold for a premium-fundable category.
///
/// Returns `None` when the category cannot be bought with premium currency or
/// when `current_amount` is at or beyond the final tier's ceiling.
pub fn threshold_for(resource: &ResourceConfig, current_amount: u64) -> Option<Threshold> {
    let cost_per_unit = resource.per_item_premium_cost?.get();
    let (lower, tier) = resource
        .spans()
        .find(|(_, tier)| current_amount < tier.max)?;
    Some(Threshold {
        category: resource.id.clone(),
        cost_per_unit,
        units_needed: units_to_next_cycle(current_amount, lower, tier),
    })
}

/// Next reward threshold for a category looked up in the event table.
pub fn next_threshold(
    event: &EventConfig,
    category: &CategoryId,
    current_amount: u64,
) -> Result<Option<Threshold>, ConfigError> {
    let resource = event.category(category)?;
    Ok(threshold_for(resource, current_amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::num::NonZeroU64;

    fn skill() -> ResourceConfig {
        ResourceConfig {
            id: "skill".into(),
            per_item_points: Some(10),
            per_item_premium_cost: NonZeroU64::new(100),
            conversion_divisor: None,
            tiers: vec![Tier::new(150, 30, 20), Tier::new(850, 50, 50)],
        }
    }

    #[test]
    fn convert_walks_both_tiers() {
        let out = convert_resource(&skill(), 200);
        assert_eq!(
            out,
            Conversion {
                units: 200,
                points: 2000,
                reward: 150
            }
        );
    }

    #[test]
    fn convert_applies_divisor() {
        let event = EventConfig::reference();
        let out = convert(&event, &"rune".into(), 95).unwrap();
        assert_eq!(out.units, 9);
        assert_eq!(out.points, 9);
        assert_eq!(out.reward, 0);
        let wood = convert(&event, &"wood".into(), 5_000).unwrap();
        assert_eq!(wood.units, 500);
        assert_eq!(wood.points, 0);
        // 400/50*10 + 100/100*20
        assert_eq!(wood.reward, 100);
    }

    #[test]
    fn convert_caps_reward_not_points() {
        let r = skill();
        let at_cap = convert_resource(&r, 850);
        let above = convert_resource(&r, 10_000);
        // 150/30*20 + 700/50*50
        assert_eq!(at_cap.reward, 100 + 700);
        assert_eq!(above.reward, at_cap.reward);
        assert_eq!(above.points, 100_000);
    }

    #[test]
    fn convert_zero_is_zero() {
        assert_eq!(convert_resource(&skill(), 0), Conversion::default());
    }

    #[test]
    fn convert_unknown_category_fails() {
        let event = EventConfig::reference();
        assert_eq!(
            convert(&event, &"gold".into(), 10),
            Err(ConfigError::UnknownCategory("gold".to_string()))
        );
        assert!(next_threshold(&event, &"gold".into(), 10).is_err());
    }

    #[test]
    fn threshold_inside_first_tier() {
        let t = threshold_for(&skill(), 40).unwrap();
        assert_eq!(t.units_needed, 20);
        assert_eq!(t.cost_per_unit, 100);
        assert_eq!(t.premium_cost(), 2_000);
    }

    #[test]
    fn threshold_on_tier_boundary_requests_full_next_cycle() {
        let t = threshold_for(&skill(), 150).unwrap();
        assert_eq!(t.units_needed, 50);
        let t = threshold_for(&skill(), 160).unwrap();
        assert_eq!(t.units_needed, 40);
        let t = threshold_for(&skill(), 60).unwrap();
        assert_eq!(t.units_needed, 30);
    }

    #[test]
    fn threshold_none_cases() {
        let r = skill();
        assert!(threshold_for(&r, 850).is_none());
        assert!(threshold_for(&r, 9_999).is_none());
        let event = EventConfig::reference();
        assert_eq!(next_threshold(&event, &"mount".into(), 10).unwrap(), None);
        assert!(next_threshold(&event, &"melo".into(), 10).unwrap().is_some());
    }

    proptest! {
        #[test]
        fn convert_monotonic(a in 0u64..50_000, d in 0u64..5_000) {
            let event = EventConfig::reference();
            for r in &event.categories {
                let lo = convert_resource(r, a);
                let hi = convert_resource(r, a + d);
                prop_assert!(hi.points >= lo.points);
                prop_assert!(hi.reward >= lo.reward);
            }
        }

        #[test]
        fn reward_flat_past_cap(k in 0u64..100_000) {
            let event = EventConfig::reference();
            for r in &event.categories {
                let divisor = r.conversion_divisor.map(|d| d.get()).unwrap_or(1);
                let cap_raw = r.cap() * divisor;
                prop_assert_eq!(
                    convert_resource(r, cap_raw).reward,
                    convert_resource(r, cap_raw + k).reward
                );
            }
        }

        #[test]
        fn threshold_within_one_cycle(current in 0u64..1_000) {
            let event = EventConfig::reference();
            for r in event.premium_categories() {
                if let Some(t) = threshold_for(r, current) {
                    let (_, tier) = r.spans().find(|(_, t)| current < t.max).unwrap();
                    prop_assert!(t.units_needed >= 1);
                    prop_assert!(t.units_needed <= tier.cost);
                    // buying exactly the missing units completes one more cycle
                    let before = tier_reward(r, current);
                    let after = tier_reward(r, current + t.units_needed);
                    prop_assert!(after > before);
                } else {
                    prop_assert!(current >= r.cap());
                }
            }
        }
    }
}
