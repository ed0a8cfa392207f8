use std::sync::Arc;

use uuid::Uuid;

use crate::bookings::{free_units, unit_is_free, Addon};
use crate::inventory::{BookingChannel, CancellationPolicy, MealPlan, RoomType};
use crate::pricing::{
    build_breakdown, AddonRequest, AddonTaxPolicy, GstPolicy, PriceBreakdown, PricingError,
    QuoteRequest, RateCalculator, RateVariant, RateVariantsRequest,
};
use crate::stay::StayRange;
use crate::store::HotelStore;

/// Selected meal plan and policy for one stay, already checked against the channel
pub struct PricedSelection {
    pub room_type: RoomType,
    pub plan: MealPlan,
    pub policy: CancellationPolicy,
    pub variant: RateVariant,
    pub breakdown: PriceBreakdown,
}

/// Service for rate variants and price quotes
#[derive(Clone)]
pub struct RateService {
    store: Arc<dyn HotelStore>,
    gst: GstPolicy,
    addon_tax: AddonTaxPolicy,
}

impl RateService {
    /// Create a new RateService
    pub fn new(store: Arc<dyn HotelStore>, gst: GstPolicy, addon_tax: AddonTaxPolicy) -> Self {
        Self { store, gst, addon_tax }
    }

    /// Load an active room type and check the party fits it
    pub async fn bookable_room_type(&self, room_type_id: Uuid, guests: i32) -> Result<RoomType, PricingError> {
        if guests < 1 {
            return Err(PricingError::InvalidGuests(guests));
        }

        let room_type = self
            .store
            .find_room_type(room_type_id)
            .await?
            .filter(|rt| rt.is_active)
            .ok_or(PricingError::RoomTypeNotFound(room_type_id))?;

        if guests > room_type.max_occupancy {
            return Err(PricingError::OccupancyExceeded {
                guests,
                max_occupancy: room_type.max_occupancy,
            });
        }

        Ok(room_type)
    }

    /// Every meal plan x cancellation policy combination offered for a stay
    ///
    /// # Validation
    /// - check-out must be after check-in
    /// - at least one guest, no more than the room's max occupancy
    /// - room type must exist and be active
    /// - a requested room unit must belong to the room type
    pub async fn variants(&self, request: &RateVariantsRequest) -> Result<Vec<RateVariant>, PricingError> {
        let stay = StayRange::new(request.check_in, request.check_out)?;
        let room_type = self
            .bookable_room_type(request.room_type_id, request.guests_count)
            .await?;

        let units = self.store.list_room_units(room_type.id).await?;
        let bookings = self
            .store
            .overlapping_bookings(room_type.id, &stay, None)
            .await?;

        let is_available = match request.room_unit_id {
            Some(unit_id) => {
                if !units.iter().any(|unit| unit.id == unit_id) {
                    return Err(PricingError::RoomUnitNotFound(unit_id));
                }
                unit_is_free(unit_id, &units, &bookings, &stay)
            }
            None => free_units(&units, &bookings, &stay, None).is_valid,
        };

        let meal_plans = self.store.list_meal_plans().await?;
        let policies = self.store.list_cancellation_policies().await?;

        let variants = RateCalculator::compute_variants(
            &room_type,
            &meal_plans,
            &policies,
            &stay,
            request.guests_count,
            request.booking_channel,
            is_available,
        );

        tracing::debug!(
            "Computed {} rate variants for room type {} over {} (available: {})",
            variants.len(),
            room_type.id,
            stay,
            is_available
        );

        Ok(variants)
    }

    /// Price one chosen combination with tax and add-ons
    pub async fn price_selection(
        &self,
        room_type_id: Uuid,
        stay: &StayRange,
        guests: i32,
        channel: BookingChannel,
        meal_plan_code: &str,
        cancellation_policy_code: &str,
        addons: &[AddonRequest],
    ) -> Result<PricedSelection, PricingError> {
        let room_type = self.bookable_room_type(room_type_id, guests).await?;

        let not_offered = || PricingError::VariantNotOffered {
            meal_plan_code: meal_plan_code.to_string(),
            cancellation_policy_code: cancellation_policy_code.to_string(),
            channel: channel.to_string(),
        };

        let plan = self
            .store
            .list_meal_plans()
            .await?
            .into_iter()
            .find(|plan| plan.code == meal_plan_code && plan.offered_on(channel))
            .ok_or_else(not_offered)?;
        let policy = self
            .store
            .list_cancellation_policies()
            .await?
            .into_iter()
            .find(|policy| policy.code == cancellation_policy_code && policy.offered_on(channel))
            .ok_or_else(not_offered)?;

        let variant = RateCalculator::price_variant(&room_type, &plan, &policy, stay, guests, true);
        let addons: Vec<Addon> = addons.iter().cloned().map(Addon::from).collect();
        let breakdown = build_breakdown(&variant, &plan, guests, &addons, &self.gst, self.addon_tax)?;

        Ok(PricedSelection {
            room_type,
            plan,
            policy,
            variant,
            breakdown,
        })
    }

    /// Full guest-facing breakdown for a quote request
    pub async fn quote(&self, request: &QuoteRequest) -> Result<PriceBreakdown, PricingError> {
        let stay = StayRange::new(request.check_in, request.check_out)?;
        let selection = self
            .price_selection(
                request.room_type_id,
                &stay,
                request.guests_count,
                request.booking_channel,
                &request.meal_plan_code,
                &request.cancellation_policy_code,
                &request.addons,
            )
            .await?;

        tracing::debug!(
            "Quoted {} / {} for room type {}: {}",
            selection.plan.code,
            selection.policy.code,
            selection.room_type.id,
            selection.breakdown.grand_total
        );

        Ok(selection.breakdown)
    }
}
