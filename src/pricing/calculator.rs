use rust_decimal::Decimal;

use crate::inventory::{AdjustmentKind, BookingChannel, CancellationPolicy, MealPlan, RoomType};
use crate::money::round_money;
use crate::pricing::models::{MealLine, RateVariant};
use crate::stay::StayRange;

/// Service for calculating stay prices and rate variants
///
/// Every function here is pure: callers load the catalogue and availability
/// and pass them in.
pub struct RateCalculator;

impl RateCalculator {
    /// Minimum nightly charge for the party size
    ///
    /// The greatest `nightly_minimum` among floors whose `min_guests` the party
    /// reaches, zero when no floor applies.
    pub fn minimum_charge_floor(room_type: &RoomType, guests: i32) -> Decimal {
        room_type
            .occupancy_floors
            .iter()
            .filter(|floor| floor.min_guests <= guests)
            .map(|floor| floor.nightly_minimum)
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// Room charge for the whole stay: base rate scaled by nights, raised to
    /// the occupancy floor when the floor is higher
    pub fn room_rate(room_type: &RoomType, guests: i32, nights: i64) -> Decimal {
        let nights = Decimal::from(nights);
        let linear = room_type.base_rate * nights;
        let floor = Self::minimum_charge_floor(room_type, guests) * nights;
        linear.max(floor)
    }

    /// Meal subtotal per included category
    pub fn meal_lines(plan: &MealPlan, guests: i32, nights: i64) -> Vec<MealLine> {
        plan.included_meals
            .iter()
            .map(|meal| MealLine {
                category: meal.category,
                cost_per_guest: meal.cost_per_guest,
                guests,
                nights,
                amount: meal.cost_per_guest * Decimal::from(guests) * Decimal::from(nights),
            })
            .collect()
    }

    /// Total meal cost: per-meal-per-guest cost x guests x nights, summed over categories
    pub fn meal_cost(plan: &MealPlan, guests: i32, nights: i64) -> Decimal {
        Self::meal_lines(plan, guests, nights)
            .iter()
            .map(|line| line.amount)
            .sum()
    }

    /// Signed policy adjustment, applied once per stay
    pub fn policy_adjustment(
        policy: &CancellationPolicy,
        room_rate: Decimal,
        meal_cost: Decimal,
    ) -> Decimal {
        match policy.adjustment_kind {
            AdjustmentKind::Fixed => policy.adjustment_value,
            AdjustmentKind::Percentage => {
                round_money((room_rate + meal_cost) * policy.adjustment_value / Decimal::from(100))
            }
        }
    }

    /// Price a single combination; featured flag and savings are filled in
    /// once the whole result set is known
    pub fn price_variant(
        room_type: &RoomType,
        plan: &MealPlan,
        policy: &CancellationPolicy,
        stay: &StayRange,
        guests: i32,
        is_available: bool,
    ) -> RateVariant {
        let nights = stay.nights();
        let room_rate = Self::room_rate(room_type, guests, nights);
        let meal_cost = Self::meal_cost(plan, guests, nights);
        let policy_adjustment = Self::policy_adjustment(policy, room_rate, meal_cost);

        // Never negative
        let total_price = (room_rate + meal_cost + policy_adjustment).max(Decimal::ZERO);
        let price_per_night = round_money(total_price / Decimal::from(nights));

        RateVariant {
            meal_plan_code: plan.code.clone(),
            meal_plan_name: plan.name.clone(),
            included_meals: plan.included_meals.iter().map(|meal| meal.category).collect(),
            cancellation_policy_code: policy.code.clone(),
            cancellation_policy_name: policy.name.clone(),
            is_refundable: policy.is_refundable(),
            nights,
            room_rate,
            meal_cost,
            policy_adjustment,
            total_price,
            price_per_night,
            is_available,
            is_featured: false,
            savings: Decimal::ZERO,
            discount_percentage: Decimal::ZERO,
        }
    }

    /// All variants offered on `channel`, ordered by meal plan then policy
    /// sort order
    ///
    /// Returns an empty list when no active combination exists for the channel.
    pub fn compute_variants(
        room_type: &RoomType,
        meal_plans: &[MealPlan],
        policies: &[CancellationPolicy],
        stay: &StayRange,
        guests: i32,
        channel: BookingChannel,
        is_available: bool,
    ) -> Vec<RateVariant> {
        let mut plans: Vec<&MealPlan> = meal_plans.iter().filter(|p| p.offered_on(channel)).collect();
        plans.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.code.cmp(&b.code)));

        let mut offered: Vec<&CancellationPolicy> =
            policies.iter().filter(|p| p.offered_on(channel)).collect();
        offered.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.code.cmp(&b.code)));

        let mut variants: Vec<RateVariant> = plans
            .iter()
            .flat_map(|plan| {
                offered.iter().map(move |policy| {
                    Self::price_variant(room_type, plan, policy, stay, guests, is_available)
                })
            })
            .collect();

        Self::apply_savings(&mut variants);
        Self::mark_featured(&mut variants);
        variants
    }

    /// Savings and discount percentage relative to the most expensive variant
    pub fn apply_savings(variants: &mut [RateVariant]) {
        let Some(reference) = variants.iter().map(|v| v.total_price).max() else {
            return;
        };

        for variant in variants.iter_mut() {
            variant.savings = reference - variant.total_price;
            variant.discount_percentage = if reference > Decimal::ZERO {
                round_money(variant.savings / reference * Decimal::from(100))
            } else {
                Decimal::ZERO
            };
        }
    }

    /// Feature the cheapest available variant; the first one wins ties
    pub fn mark_featured(variants: &mut [RateVariant]) {
        let mut featured: Option<usize> = None;
        for (index, variant) in variants.iter().enumerate() {
            if !variant.is_available {
                continue;
            }
            match featured {
                Some(best) if variants[best].total_price <= variant.total_price => {}
                _ => featured = Some(index),
            }
        }

        for (index, variant) in variants.iter_mut().enumerate() {
            variant.is_featured = Some(index) == featured;
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::inventory::{BedCategory, BedConfig, IncludedMeal, MealCategory, OccupancyFloor};
    use chrono::{Days, NaiveDate, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn room(base_cents: u32, floor_cents: u32) -> RoomType {
        RoomType {
            id: Uuid::new_v4(),
            name: "Suite".to_string(),
            description: None,
            base_rate: Decimal::from(base_cents) / Decimal::from(100),
            max_occupancy: 6,
            bed_configuration: vec![BedConfig { category: BedCategory::King, quantity: 3 }],
            occupancy_floors: vec![OccupancyFloor {
                min_guests: 2,
                nightly_minimum: Decimal::from(floor_cents) / Decimal::from(100),
            }],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn stay(nights: u64) -> StayRange {
        let check_in = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        StayRange::new(check_in, check_in + Days::new(nights)).unwrap()
    }

    /// Room rate never drops below the occupancy floor for parties of two or more
    #[test]
    fn prop_room_rate_respects_floor() {
        proptest!(|(
            base_cents in 1u32..=2_000_000,
            floor_cents in 0u32..=2_000_000,
            guests in 2i32..=6,
            nights in 1i64..=30,
        )| {
            let room = room(base_cents, floor_cents);
            let rate = RateCalculator::room_rate(&room, guests, nights);
            prop_assert!(rate >= RateCalculator::minimum_charge_floor(&room, guests));
            prop_assert!(rate >= room.base_rate * Decimal::from(nights));
        });
    }

    /// Per-night price times nights reproduces the total within rounding
    #[test]
    fn prop_price_per_night_reconstructs_total() {
        proptest!(|(
            base_cents in 1u32..=2_000_000,
            meal_cents in 0u32..=200_000,
            adjustment_cents in -100_000i64..=100_000,
            guests in 1i32..=6,
            nights in 1u64..=30,
        )| {
            let room = room(base_cents, 0);
            let plan = MealPlan {
                code: "CP".to_string(),
                name: "Continental".to_string(),
                included_meals: vec![IncludedMeal {
                    category: MealCategory::Breakfast,
                    cost_per_guest: Decimal::from(meal_cents) / Decimal::from(100),
                }],
                channels: vec![BookingChannel::Website],
                is_active: true,
                sort_order: 0,
            };
            let policy = CancellationPolicy {
                code: "STD".to_string(),
                name: "Standard".to_string(),
                terms: "Terms".to_string(),
                refundable_until_days: Some(3),
                adjustment_kind: AdjustmentKind::Fixed,
                adjustment_value: Decimal::from(adjustment_cents) / Decimal::from(100),
                channels: vec![BookingChannel::Website],
                is_active: true,
                sort_order: 0,
            };

            let variant = RateCalculator::price_variant(&room, &plan, &policy, &stay(nights), guests, true);
            let rebuilt = variant.price_per_night * Decimal::from(variant.nights);
            let tolerance = Decimal::new(5, 3) * Decimal::from(variant.nights);
            prop_assert!((rebuilt - variant.total_price).abs() <= tolerance,
                "per night {} x {} = {} vs total {}", variant.price_per_night, variant.nights, rebuilt, variant.total_price);
            prop_assert!(variant.total_price >= Decimal::ZERO);
        });
    }

    /// Exactly one variant is featured when any is available, and it is the cheapest
    #[test]
    fn prop_featured_is_cheapest() {
        proptest!(|(
            adjustments in prop::collection::vec(-2_000i64..=2_000, 1..=6),
        )| {
            let room = room(300_000, 0);
            let plan = MealPlan {
                code: "EP".to_string(),
                name: "Room only".to_string(),
                included_meals: vec![],
                channels: vec![BookingChannel::Website],
                is_active: true,
                sort_order: 0,
            };
            let policies: Vec<CancellationPolicy> = adjustments
                .iter()
                .enumerate()
                .map(|(i, value)| CancellationPolicy {
                    code: format!("P{}", i),
                    name: format!("Policy {}", i),
                    terms: "Terms".to_string(),
                    refundable_until_days: None,
                    adjustment_kind: AdjustmentKind::Fixed,
                    adjustment_value: Decimal::from(*value),
                    channels: vec![BookingChannel::Website],
                    is_active: true,
                    sort_order: i as i32,
                })
                .collect();

            let variants = RateCalculator::compute_variants(
                &room, &[plan], &policies, &stay(2), 2, BookingChannel::Website, true,
            );
            let featured: Vec<&RateVariant> = variants.iter().filter(|v| v.is_featured).collect();
            prop_assert_eq!(featured.len(), 1);
            let cheapest = variants.iter().map(|v| v.total_price).min().unwrap();
            prop_assert_eq!(featured[0].total_price, cheapest);
            prop_assert!(variants.iter().all(|v| v.savings >= Decimal::ZERO));
        });
    }
}
