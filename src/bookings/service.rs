use std::sync::Arc;

use uuid::Uuid;

use crate::bookings::{
    free_units, AssignUnitRequest, AssignUnitResponse, AvailabilityReport, Booking, BookingError,
    BookingStatus, CreateBookingRequest, NewBooking, PaymentMachine, PaymentStatus, StatusMachine,
    ValidateAvailabilityRequest,
};
use crate::pricing::RateService;
use crate::stay::StayRange;
use crate::store::{HotelStore, StoreError};

/// Service for availability checks, unit assignment and the booking lifecycle
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn HotelStore>,
    rates: RateService,
}

impl BookingService {
    /// Create a new BookingService
    pub fn new(store: Arc<dyn HotelStore>, rates: RateService) -> Self {
        Self { store, rates }
    }

    async fn availability(
        &self,
        room_type_id: Uuid,
        stay: &StayRange,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<AvailabilityReport, BookingError> {
        let units = self.store.list_room_units(room_type_id).await?;
        let bookings = self
            .store
            .overlapping_bookings(room_type_id, stay, exclude_booking_id)
            .await?;

        Ok(free_units(&units, &bookings, stay, exclude_booking_id))
    }

    /// Check which units of a room type are free for a stay
    ///
    /// `exclude_booking_id` lets an existing booking be re-validated without
    /// conflicting with itself.
    pub async fn validate(
        &self,
        request: &ValidateAvailabilityRequest,
    ) -> Result<AvailabilityReport, BookingError> {
        let stay = StayRange::new(request.check_in, request.check_out)?;
        let room_type = self
            .rates
            .bookable_room_type(request.room_type_id, request.guests_count)
            .await?;

        let report = self
            .availability(room_type.id, &stay, request.exclude_booking_id)
            .await?;

        tracing::debug!(
            "Availability for room type {} over {}: {} free units",
            room_type.id,
            stay,
            report.available_unit_ids.len()
        );

        Ok(report)
    }

    /// Assign a free unit to an existing booking
    ///
    /// # Validation
    /// - bookingId, roomTypeId, checkIn and checkOut are required
    /// - the booking must exist and not be cancelled
    /// - the request must carry the booking's own room type and stay dates
    /// - some unit of the room type must still be free
    pub async fn assign(&self, request: AssignUnitRequest) -> Result<AssignUnitResponse, BookingError> {
        let mut missing = Vec::new();
        if request.booking_id.is_none() {
            missing.push("bookingId");
        }
        if request.room_type_id.is_none() {
            missing.push("roomTypeId");
        }
        if request.check_in.is_none() {
            missing.push("checkIn");
        }
        if request.check_out.is_none() {
            missing.push("checkOut");
        }

        let (Some(booking_id), Some(room_type_id), Some(check_in), Some(check_out)) = (
            request.booking_id,
            request.room_type_id,
            request.check_in,
            request.check_out,
        ) else {
            return Err(BookingError::MissingFields(missing));
        };

        let stay = StayRange::new(check_in, check_out)?;
        let booking = self
            .store
            .find_booking(booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if booking.stay() != stay {
            return Err(BookingError::ValidationError(format!(
                "Booking {} is for {}, not {}",
                booking.id,
                booking.stay(),
                stay
            )));
        }
        if booking.room_type_id != room_type_id {
            return Err(BookingError::ValidationError(format!(
                "Booking {} was priced for room type {}, not {}",
                booking.id, booking.room_type_id, room_type_id
            )));
        }
        if booking.status == BookingStatus::Cancelled {
            return Err(BookingError::ValidationError(
                "Cannot assign a unit to a cancelled booking".to_string(),
            ));
        }

        let guests = request.guests_count.unwrap_or(booking.guests_count);
        let room_type = self.rates.bookable_room_type(room_type_id, guests).await?;

        self.assign_to(booking.id, room_type.id, &stay).await
    }

    /// Re-validate, then conditionally write the first still-free unit
    async fn assign_to(
        &self,
        booking_id: Uuid,
        room_type_id: Uuid,
        stay: &StayRange,
    ) -> Result<AssignUnitResponse, BookingError> {
        let report = self.availability(room_type_id, stay, Some(booking_id)).await?;
        if !report.is_valid {
            return Err(BookingError::NoUnitsAvailable {
                conflicting_bookings: report.conflicting_bookings,
            });
        }

        let booking = self
            .store
            .assign_unit(booking_id, room_type_id, &report.available_unit_ids)
            .await?
            .ok_or(BookingError::AssignmentRace)?;

        let assigned_unit = booking.room_unit_id.ok_or_else(|| {
            StoreError::Corrupt(format!("booking {} has no unit after assignment", booking.id))
        })?;

        tracing::info!("Assigned unit {} to booking {}", assigned_unit, booking.id);

        Ok(AssignUnitResponse {
            success: true,
            assigned_unit,
            available_units: report.available_unit_ids,
            booking,
        })
    }

    /// Price, validate, insert and assign a new booking
    ///
    /// Availability is checked before anything is written. If another request
    /// claims the last unit between insert and assignment, the booking is kept
    /// as waitlisted and `AssignmentRace` is returned.
    pub async fn create_booking(&self, request: CreateBookingRequest) -> Result<Booking, BookingError> {
        let stay = StayRange::new(request.check_in, request.check_out)?;
        let selection = self
            .rates
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
        let room_type_id = selection.room_type.id;

        let report = self.availability(room_type_id, &stay, None).await?;
        if !report.is_valid {
            return Err(BookingError::NoUnitsAvailable {
                conflicting_bookings: report.conflicting_bookings,
            });
        }

        let breakdown = selection.breakdown;
        let new_booking = NewBooking {
            room_type_id,
            stay,
            guests_count: request.guests_count,
            channel: request.booking_channel,
            meal_plan_code: selection.plan.code,
            cancellation_policy_code: selection.policy.code,
            guest_name: request.guest_name,
            guest_email: request.guest_email,
            guest_phone: request.guest_phone,
            room_rate: breakdown.room_subtotal,
            meal_cost: breakdown.meal_subtotal,
            policy_adjustment: breakdown.policy_adjustment,
            gst_rate: breakdown.gst_rate,
            gst_amount: breakdown.gst_amount,
            addon_total: breakdown.addon_total,
            total_amount: breakdown.grand_total,
            addons: request.addons.into_iter().map(Into::into).collect(),
        };

        let booking = self.store.insert_booking(&new_booking).await?;
        tracing::info!("Created booking {} for room type {} over {}", booking.id, room_type_id, stay);

        match self.assign_to(booking.id, room_type_id, &stay).await {
            Ok(assigned) => Ok(assigned.booking),
            Err(BookingError::AssignmentRace) | Err(BookingError::NoUnitsAvailable { .. }) => {
                tracing::warn!("Booking {} lost its unit to a concurrent request, waitlisting", booking.id);
                self.store
                    .update_booking_status(booking.id, BookingStatus::Waitlisted)
                    .await?;
                Err(BookingError::AssignmentRace)
            }
            Err(other) => Err(other),
        }
    }

    /// Get a booking by ID
    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        self.store
            .find_booking(booking_id)
            .await?
            .ok_or(BookingError::NotFound)
    }

    /// Update booking status, validated by the status machine
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let booking = self.get_booking(booking_id).await?;
        StatusMachine::transition(booking.status, new_status).map_err(BookingError::InvalidTransition)?;

        let updated = self
            .store
            .update_booking_status(booking_id, new_status)
            .await?
            .ok_or(BookingError::NotFound)?;

        tracing::info!("Booking {} status {} -> {}", booking_id, booking.status, new_status);
        Ok(updated)
    }

    /// Update payment status
    pub async fn update_payment_status(
        &self,
        booking_id: Uuid,
        new_status: PaymentStatus,
    ) -> Result<Booking, BookingError> {
        let booking = self.get_booking(booking_id).await?;
        PaymentMachine::transition(booking.payment_status, new_status)
            .map_err(BookingError::InvalidTransition)?;

        let updated = self
            .store
            .update_payment_status(booking_id, new_status)
            .await?
            .ok_or(BookingError::NotFound)?;

        tracing::info!(
            "Booking {} payment {} -> {}",
            booking_id,
            booking.payment_status,
            new_status
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{
        AdjustmentKind, BedCategory, BedConfig, BookingChannel, CreateCancellationPolicy,
        CreateMealPlan, CreateRoomType, RoomType, RoomUnit,
    };
    use crate::pricing::{AddonRequest, AddonTaxPolicy, GstPolicy};
    use crate::store::memory::MemoryHotelStore;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    struct Fixture {
        store: Arc<MemoryHotelStore>,
        service: BookingService,
        room_type: RoomType,
        units: Vec<RoomUnit>,
    }

    async fn fixture(labels: &[&str]) -> Fixture {
        let store = Arc::new(MemoryHotelStore::new());
        let room_type = store
            .insert_room_type(&CreateRoomType {
                name: "Garden Cottage".to_string(),
                description: None,
                base_rate: dec!(3000),
                max_occupancy: 2,
                bed_configuration: vec![BedConfig { category: BedCategory::Double, quantity: 1 }],
                occupancy_floors: vec![],
            })
            .await
            .unwrap();
        let mut units = Vec::new();
        for label in labels {
            units.push(store.insert_room_unit(room_type.id, label).await.unwrap());
        }
        store
            .insert_meal_plan(&CreateMealPlan {
                code: "EP".to_string(),
                name: "Room only".to_string(),
                included_meals: vec![],
                channels: vec![BookingChannel::Website],
                is_active: true,
                sort_order: 0,
            })
            .await
            .unwrap();
        store
            .insert_cancellation_policy(&CreateCancellationPolicy {
                code: "FLEX".to_string(),
                name: "Free cancellation".to_string(),
                terms: "Full refund up to 7 days before check-in".to_string(),
                refundable_until_days: Some(7),
                adjustment_kind: AdjustmentKind::Fixed,
                adjustment_value: dec!(0),
                channels: vec![BookingChannel::Website],
                is_active: true,
                sort_order: 0,
            })
            .await
            .unwrap();

        let rates = RateService::new(store.clone(), GstPolicy::default(), AddonTaxPolicy::Exempt);
        let service = BookingService::new(store.clone(), rates);
        Fixture { store, service, room_type, units }
    }

    fn create_request(room_type_id: Uuid, from: u32, to: u32) -> CreateBookingRequest {
        CreateBookingRequest {
            room_type_id,
            check_in: day(from),
            check_out: day(to),
            guests_count: 2,
            booking_channel: BookingChannel::Website,
            meal_plan_code: "EP".to_string(),
            cancellation_policy_code: "FLEX".to_string(),
            guest_name: "Meera Joshi".to_string(),
            guest_email: "meera@example.com".to_string(),
            guest_phone: None,
            addons: vec![],
        }
    }

    fn validate_request(room_type_id: Uuid, from: u32, to: u32) -> ValidateAvailabilityRequest {
        ValidateAvailabilityRequest {
            room_type_id,
            check_in: day(from),
            check_out: day(to),
            guests_count: 2,
            exclude_booking_id: None,
        }
    }

    fn assign_request(booking: &Booking) -> AssignUnitRequest {
        AssignUnitRequest {
            booking_id: Some(booking.id),
            room_type_id: Some(booking.room_type_id),
            check_in: Some(booking.check_in),
            check_out: Some(booking.check_out),
            guests_count: Some(booking.guests_count),
        }
    }

    async fn unassigned_booking(fx: &Fixture, from: u32, to: u32) -> Booking {
        let selection_free = NewBooking {
            room_type_id: fx.room_type.id,
            stay: StayRange::new(day(from), day(to)).unwrap(),
            guests_count: 2,
            channel: BookingChannel::Website,
            meal_plan_code: "EP".to_string(),
            cancellation_policy_code: "FLEX".to_string(),
            guest_name: "Walk-in".to_string(),
            guest_email: "walkin@example.com".to_string(),
            guest_phone: None,
            room_rate: dec!(6000),
            meal_cost: dec!(0),
            policy_adjustment: dec!(0),
            gst_rate: dec!(0.05),
            gst_amount: dec!(300),
            addon_total: dec!(0),
            total_amount: dec!(6300),
            addons: vec![],
        };
        fx.store.insert_booking(&selection_free).await.unwrap()
    }

    #[tokio::test]
    async fn test_overlap_excludes_held_unit() {
        let fx = fixture(&["A", "B"]).await;
        let existing = fx.service.create_booking(create_request(fx.room_type.id, 1, 3)).await.unwrap();
        assert_eq!(existing.room_unit_id, Some(fx.units[0].id));

        let report = fx.service.validate(&validate_request(fx.room_type.id, 2, 4)).await.unwrap();
        assert!(report.is_valid);
        assert_eq!(report.available_unit_ids, vec![fx.units[1].id]);
    }

    #[tokio::test]
    async fn test_back_to_back_includes_unit() {
        let fx = fixture(&["A", "B"]).await;
        fx.service.create_booking(create_request(fx.room_type.id, 1, 3)).await.unwrap();

        let report = fx.service.validate(&validate_request(fx.room_type.id, 3, 5)).await.unwrap();
        assert_eq!(report.available_unit_ids, vec![fx.units[0].id, fx.units[1].id]);
    }

    #[tokio::test]
    async fn test_create_booking_snapshots_price() {
        let fx = fixture(&["A"]).await;
        let mut request = create_request(fx.room_type.id, 1, 3);
        request.addons = vec![AddonRequest {
            name: "Bonfire".to_string(),
            quantity: 1,
            unit_price: dec!(1500),
        }];

        let booking = fx.service.create_booking(request).await.unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
        assert_eq!(booking.room_rate, dec!(6000));
        assert_eq!(booking.gst_amount, dec!(300));
        assert_eq!(booking.addon_total, dec!(1500));
        assert_eq!(booking.total_amount, dec!(7800));
        assert_eq!(booking.addons.len(), 1);
    }

    #[tokio::test]
    async fn test_full_house_rejects_before_insert() {
        let fx = fixture(&["A"]).await;
        let first = fx.service.create_booking(create_request(fx.room_type.id, 1, 3)).await.unwrap();

        let result = fx.service.create_booking(create_request(fx.room_type.id, 2, 4)).await;
        match result {
            Err(BookingError::NoUnitsAvailable { conflicting_bookings }) => {
                assert_eq!(conflicting_bookings.len(), 1);
                assert_eq!(conflicting_bookings[0].booking_id, first.id);
            }
            other => panic!("expected NoUnitsAvailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_assign_reports_missing_fields() {
        let fx = fixture(&["A"]).await;
        let result = fx
            .service
            .assign(AssignUnitRequest {
                room_type_id: Some(fx.room_type.id),
                check_in: Some(day(1)),
                ..Default::default()
            })
            .await;

        match result {
            Err(BookingError::MissingFields(fields)) => assert_eq!(fields, vec!["bookingId", "checkOut"]),
            other => panic!("expected MissingFields, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_assign_rejects_mismatched_dates() {
        let fx = fixture(&["A"]).await;
        let booking = unassigned_booking(&fx, 1, 3).await;
        let mut request = assign_request(&booking);
        request.check_out = Some(day(4));

        assert!(matches!(
            fx.service.assign(request).await,
            Err(BookingError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_assign_rejects_other_room_type() {
        let fx = fixture(&["A"]).await;
        let suite = fx
            .store
            .insert_room_type(&CreateRoomType {
                name: "Family Suite".to_string(),
                description: None,
                base_rate: dec!(9000),
                max_occupancy: 4,
                bed_configuration: vec![BedConfig { category: BedCategory::King, quantity: 2 }],
                occupancy_floors: vec![],
            })
            .await
            .unwrap();
        fx.store.insert_room_unit(suite.id, "S1").await.unwrap();

        let booking = unassigned_booking(&fx, 1, 3).await;
        let mut request = assign_request(&booking);
        request.room_type_id = Some(suite.id);

        assert!(matches!(
            fx.service.assign(request).await,
            Err(BookingError::ValidationError(_))
        ));
        let stored = fx.service.get_booking(booking.id).await.unwrap();
        assert_eq!(stored.room_unit_id, None);
        assert_eq!(stored.total_amount, dec!(6300));
    }

    #[tokio::test]
    async fn test_assign_unknown_booking() {
        let fx = fixture(&["A"]).await;
        let booking = unassigned_booking(&fx, 1, 3).await;
        let mut request = assign_request(&booking);
        request.booking_id = Some(Uuid::new_v4());

        assert!(matches!(fx.service.assign(request).await, Err(BookingError::NotFound)));
    }

    #[tokio::test]
    async fn test_assign_picks_first_free_unit() {
        let fx = fixture(&["A", "B"]).await;
        fx.service.create_booking(create_request(fx.room_type.id, 1, 3)).await.unwrap();
        let booking = unassigned_booking(&fx, 2, 4).await;

        let response = fx.service.assign(assign_request(&booking)).await.unwrap();

        assert!(response.success);
        assert_eq!(response.assigned_unit, fx.units[1].id);
        assert_eq!(response.available_units, vec![fx.units[1].id]);
        assert_eq!(response.booking.room_unit_id, Some(fx.units[1].id));
    }

    #[tokio::test]
    async fn test_reassigning_keeps_own_unit_available() {
        let fx = fixture(&["A"]).await;
        let booking = fx.service.create_booking(create_request(fx.room_type.id, 1, 3)).await.unwrap();

        let response = fx.service.assign(assign_request(&booking)).await.unwrap();
        assert_eq!(response.assigned_unit, fx.units[0].id);
    }

    #[tokio::test]
    async fn test_assign_conflict_suggests_waitlist() {
        let fx = fixture(&["A"]).await;
        fx.service.create_booking(create_request(fx.room_type.id, 1, 3)).await.unwrap();
        let late = unassigned_booking(&fx, 2, 4).await;

        assert!(matches!(
            fx.service.assign(assign_request(&late)).await,
            Err(BookingError::NoUnitsAvailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_stale_candidates_lose_the_race() {
        let fx = fixture(&["A"]).await;
        let first = unassigned_booking(&fx, 1, 3).await;
        let second = unassigned_booking(&fx, 2, 4).await;

        // Both saw unit A free before either wrote
        let candidates = vec![fx.units[0].id];
        let won = fx.store.assign_unit(first.id, fx.room_type.id, &candidates).await.unwrap();
        let lost = fx.store.assign_unit(second.id, fx.room_type.id, &candidates).await.unwrap();

        assert!(won.is_some());
        assert!(lost.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_assign_for_last_unit() {
        let fx = fixture(&["A"]).await;
        let first = unassigned_booking(&fx, 1, 3).await;
        let second = unassigned_booking(&fx, 1, 3).await;

        let a = {
            let service = fx.service.clone();
            let request = assign_request(&first);
            tokio::spawn(async move { service.assign(request).await })
        };
        let b = {
            let service = fx.service.clone();
            let request = assign_request(&second);
            tokio::spawn(async move { service.assign(request).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(BookingError::AssignmentRace) | Err(BookingError::NoUnitsAvailable { .. })
        )));
    }

    #[tokio::test]
    async fn test_status_lifecycle() {
        let fx = fixture(&["A"]).await;
        let booking = fx.service.create_booking(create_request(fx.room_type.id, 1, 3)).await.unwrap();

        let confirmed = fx.service.update_status(booking.id, BookingStatus::Confirmed).await.unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);

        assert!(matches!(
            fx.service.update_status(booking.id, BookingStatus::CheckedOut).await,
            Err(BookingError::InvalidTransition(_))
        ));

        let cancelled = fx.service.update_status(booking.id, BookingStatus::Cancelled).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        // Cancelled stay frees the unit
        let report = fx.service.validate(&validate_request(fx.room_type.id, 1, 3)).await.unwrap();
        assert!(report.is_valid);
    }

    #[tokio::test]
    async fn test_payment_lifecycle() {
        let fx = fixture(&["A"]).await;
        let booking = fx.service.create_booking(create_request(fx.room_type.id, 1, 3)).await.unwrap();

        assert!(matches!(
            fx.service.update_payment_status(booking.id, PaymentStatus::Refunded).await,
            Err(BookingError::InvalidTransition(_))
        ));
        let paid = fx.service.update_payment_status(booking.id, PaymentStatus::Paid).await.unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
    }
}
