// In-memory store used by service and handler tests

use axum::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::bookings::{Booking, BookingStatus, NewBooking, PaymentStatus};
use crate::inventory::{
    CancellationPolicy, CreateCancellationPolicy, CreateMealPlan, CreateRoomType, MealPlan,
    RoomType, RoomUnit,
};
use crate::stay::StayRange;
use crate::store::{HotelStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    room_types: Vec<RoomType>,
    room_units: Vec<RoomUnit>,
    meal_plans: Vec<MealPlan>,
    policies: Vec<CancellationPolicy>,
    bookings: Vec<Booking>,
}

impl Tables {
    fn unit_taken(&self, unit_id: Uuid, booking_id: Uuid, stay: &StayRange) -> bool {
        self.bookings.iter().any(|b| {
            b.id != booking_id
                && b.room_unit_id == Some(unit_id)
                && b.status.holds_unit()
                && b.stay().overlaps(stay)
        })
    }
}

/// Store backed by vectors behind one async mutex
#[derive(Default)]
pub struct MemoryHotelStore {
    tables: Mutex<Tables>,
}

impl MemoryHotelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deactivate a room type without going through the API
    pub async fn deactivate_room_type(&self, id: Uuid) {
        let mut tables = self.tables.lock().await;
        if let Some(room_type) = tables.room_types.iter_mut().find(|rt| rt.id == id) {
            room_type.is_active = false;
        }
    }
}

#[async_trait]
impl HotelStore for MemoryHotelStore {
    async fn insert_room_type(&self, request: &CreateRoomType) -> StoreResult<RoomType> {
        let mut tables = self.tables.lock().await;
        if tables.room_types.iter().any(|rt| rt.name == request.name) {
            return Err(StoreError::Duplicate("room_types_name_key".to_string()));
        }
        let now = Utc::now();
        let room_type = RoomType {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            description: request.description.clone(),
            base_rate: request.base_rate,
            max_occupancy: request.max_occupancy,
            bed_configuration: request.bed_configuration.clone(),
            occupancy_floors: request.occupancy_floors.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.room_types.push(room_type.clone());
        Ok(room_type)
    }

    async fn find_room_type(&self, id: Uuid) -> StoreResult<Option<RoomType>> {
        let tables = self.tables.lock().await;
        Ok(tables.room_types.iter().find(|rt| rt.id == id).cloned())
    }

    async fn list_room_types(&self) -> StoreResult<Vec<RoomType>> {
        let tables = self.tables.lock().await;
        let mut room_types = tables.room_types.clone();
        room_types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(room_types)
    }

    async fn insert_room_unit(&self, room_type_id: Uuid, label: &str) -> StoreResult<RoomUnit> {
        let mut tables = self.tables.lock().await;
        if tables
            .room_units
            .iter()
            .any(|u| u.room_type_id == room_type_id && u.label == label)
        {
            return Err(StoreError::Duplicate("room_units_room_type_id_label_key".to_string()));
        }
        let unit = RoomUnit {
            id: Uuid::new_v4(),
            room_type_id,
            label: label.to_string(),
            in_service: true,
            created_at: Utc::now(),
        };
        tables.room_units.push(unit.clone());
        Ok(unit)
    }

    async fn list_room_units(&self, room_type_id: Uuid) -> StoreResult<Vec<RoomUnit>> {
        let tables = self.tables.lock().await;
        let mut units: Vec<RoomUnit> = tables
            .room_units
            .iter()
            .filter(|u| u.room_type_id == room_type_id)
            .cloned()
            .collect();
        units.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(units)
    }

    async fn set_unit_in_service(&self, unit_id: Uuid, in_service: bool) -> StoreResult<Option<RoomUnit>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.room_units.iter_mut().find(|u| u.id == unit_id).map(|unit| {
            unit.in_service = in_service;
            unit.clone()
        }))
    }

    async fn insert_meal_plan(&self, request: &CreateMealPlan) -> StoreResult<MealPlan> {
        let mut tables = self.tables.lock().await;
        if tables.meal_plans.iter().any(|p| p.code == request.code) {
            return Err(StoreError::Duplicate("meal_plans_pkey".to_string()));
        }
        let plan = MealPlan {
            code: request.code.clone(),
            name: request.name.clone(),
            included_meals: request.included_meals.clone(),
            channels: request.channels.clone(),
            is_active: request.is_active,
            sort_order: request.sort_order,
        };
        tables.meal_plans.push(plan.clone());
        Ok(plan)
    }

    async fn list_meal_plans(&self) -> StoreResult<Vec<MealPlan>> {
        let tables = self.tables.lock().await;
        let mut plans = tables.meal_plans.clone();
        plans.sort_by(|a, b| (a.sort_order, &a.code).cmp(&(b.sort_order, &b.code)));
        Ok(plans)
    }

    async fn insert_cancellation_policy(
        &self,
        request: &CreateCancellationPolicy,
    ) -> StoreResult<CancellationPolicy> {
        let mut tables = self.tables.lock().await;
        if tables.policies.iter().any(|p| p.code == request.code) {
            return Err(StoreError::Duplicate("cancellation_policies_pkey".to_string()));
        }
        let policy = CancellationPolicy {
            code: request.code.clone(),
            name: request.name.clone(),
            terms: request.terms.clone(),
            refundable_until_days: request.refundable_until_days,
            adjustment_kind: request.adjustment_kind,
            adjustment_value: request.adjustment_value,
            channels: request.channels.clone(),
            is_active: request.is_active,
            sort_order: request.sort_order,
        };
        tables.policies.push(policy.clone());
        Ok(policy)
    }

    async fn list_cancellation_policies(&self) -> StoreResult<Vec<CancellationPolicy>> {
        let tables = self.tables.lock().await;
        let mut policies = tables.policies.clone();
        policies.sort_by(|a, b| (a.sort_order, &a.code).cmp(&(b.sort_order, &b.code)));
        Ok(policies)
    }

    async fn insert_booking(&self, booking: &NewBooking) -> StoreResult<Booking> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let stored = Booking {
            id: Uuid::new_v4(),
            room_type_id: booking.room_type_id,
            room_unit_id: None,
            check_in: booking.stay.check_in,
            check_out: booking.stay.check_out,
            guests_count: booking.guests_count,
            channel: booking.channel,
            meal_plan_code: booking.meal_plan_code.clone(),
            cancellation_policy_code: booking.cancellation_policy_code.clone(),
            guest_name: booking.guest_name.clone(),
            guest_email: booking.guest_email.clone(),
            guest_phone: booking.guest_phone.clone(),
            room_rate: booking.room_rate,
            meal_cost: booking.meal_cost,
            policy_adjustment: booking.policy_adjustment,
            gst_rate: booking.gst_rate,
            gst_amount: booking.gst_amount,
            addon_total: booking.addon_total,
            total_amount: booking.total_amount,
            addons: booking.addons.clone(),
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            created_at: now,
            updated_at: now,
        };
        tables.bookings.push(stored.clone());
        Ok(stored)
    }

    async fn find_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let tables = self.tables.lock().await;
        Ok(tables.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn overlapping_bookings(
        &self,
        room_type_id: Uuid,
        stay: &StayRange,
        exclude_booking_id: Option<Uuid>,
    ) -> StoreResult<Vec<Booking>> {
        let tables = self.tables.lock().await;
        let mut overlapping: Vec<Booking> = tables
            .bookings
            .iter()
            .filter(|b| {
                b.room_type_id == room_type_id
                    && b.room_unit_id.is_some()
                    && b.status.holds_unit()
                    && Some(b.id) != exclude_booking_id
                    && b.stay().overlaps(stay)
            })
            .cloned()
            .collect();
        overlapping.sort_by(|a, b| (a.check_in, a.id).cmp(&(b.check_in, b.id)));
        Ok(overlapping)
    }

    async fn assign_unit(
        &self,
        booking_id: Uuid,
        room_type_id: Uuid,
        candidates: &[Uuid],
    ) -> StoreResult<Option<Booking>> {
        // Check and write happen under one lock
        let mut tables = self.tables.lock().await;
        let Some(stay) = tables.bookings.iter().find(|b| b.id == booking_id).map(Booking::stay) else {
            return Ok(None);
        };

        let chosen = candidates.iter().copied().find(|unit_id| {
            let usable = tables
                .room_units
                .iter()
                .any(|u| u.id == *unit_id && u.room_type_id == room_type_id && u.in_service);
            usable && !tables.unit_taken(*unit_id, booking_id, &stay)
        });

        let Some(unit_id) = chosen else {
            return Ok(None);
        };

        let booking = tables
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| StoreError::Corrupt(format!("booking {} vanished", booking_id)))?;
        booking.room_unit_id = Some(unit_id);
        booking.room_type_id = room_type_id;
        booking.updated_at = Utc::now();
        Ok(Some(booking.clone()))
    }

    async fn update_booking_status(&self, id: Uuid, status: BookingStatus) -> StoreResult<Option<Booking>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.bookings.iter_mut().find(|b| b.id == id).map(|booking| {
            booking.status = status;
            booking.updated_at = Utc::now();
            booking.clone()
        }))
    }

    async fn update_payment_status(&self, id: Uuid, status: PaymentStatus) -> StoreResult<Option<Booking>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.bookings.iter_mut().find(|b| b.id == id).map(|booking| {
            booking.payment_status = status;
            booking.updated_at = Utc::now();
            booking.clone()
        }))
    }
}
