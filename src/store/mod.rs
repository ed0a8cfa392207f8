// Persistence seam
//
// Services talk to storage through `HotelStore`. Postgres is the production
// backend; an in-memory store backs the unit and handler tests.

pub mod postgres;

#[cfg(test)]
pub mod memory;


use axum::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::bookings::{Booking, BookingStatus, NewBooking, PaymentStatus};
use crate::inventory::{
    CancellationPolicy, CreateCancellationPolicy, CreateMealPlan, CreateRoomType, MealPlan,
    RoomType, RoomUnit,
};
use crate::stay::StayRange;

pub use postgres::PgHotelStore;

/// Errors surfaced by a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint violated (name, label or code already taken)
    #[error("Duplicate {0}")]
    Duplicate(String),

    /// The unit is already held by an overlapping booking
    #[error("Room unit is already held for overlapping dates")]
    UnitConflict,

    /// A stored value could not be mapped back to the domain
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        let code = error
            .as_database_error()
            .and_then(|db| db.code().map(|code| code.into_owned()));

        match code.as_deref() {
            // unique_violation
            Some("23505") => {
                let constraint = error
                    .as_database_error()
                    .and_then(|db| db.constraint().map(str::to_string))
                    .unwrap_or_else(|| "record".to_string());
                StoreError::Duplicate(constraint)
            }
            // exclusion_violation on bookings_no_unit_overlap
            Some("23P01") => StoreError::UnitConflict,
            _ => StoreError::Database(error),
        }
    }
}

/// Storage operations the pricing and booking services rely on
#[async_trait]
pub trait HotelStore: Send + Sync {
    async fn insert_room_type(&self, request: &CreateRoomType) -> StoreResult<RoomType>;

    async fn find_room_type(&self, id: Uuid) -> StoreResult<Option<RoomType>>;

    async fn list_room_types(&self) -> StoreResult<Vec<RoomType>>;

    async fn insert_room_unit(&self, room_type_id: Uuid, label: &str) -> StoreResult<RoomUnit>;

    /// Units of a room type ordered by label
    async fn list_room_units(&self, room_type_id: Uuid) -> StoreResult<Vec<RoomUnit>>;

    async fn set_unit_in_service(&self, unit_id: Uuid, in_service: bool) -> StoreResult<Option<RoomUnit>>;

    async fn insert_meal_plan(&self, request: &CreateMealPlan) -> StoreResult<MealPlan>;

    async fn list_meal_plans(&self) -> StoreResult<Vec<MealPlan>>;

    async fn insert_cancellation_policy(
        &self,
        request: &CreateCancellationPolicy,
    ) -> StoreResult<CancellationPolicy>;

    async fn list_cancellation_policies(&self) -> StoreResult<Vec<CancellationPolicy>>;

    async fn insert_booking(&self, booking: &NewBooking) -> StoreResult<Booking>;

    async fn find_booking(&self, id: Uuid) -> StoreResult<Option<Booking>>;

    /// Non-cancelled bookings that hold a unit of `room_type_id` and overlap `stay`
    async fn overlapping_bookings(
        &self,
        room_type_id: Uuid,
        stay: &StayRange,
        exclude_booking_id: Option<Uuid>,
    ) -> StoreResult<Vec<Booking>>;

    /// Conditionally assign the first still-free candidate unit to a booking
    ///
    /// Each candidate is locked, re-checked against overlapping bookings and
    /// written in one atomic step. Returns `None` when every candidate was
    /// taken in the meantime.
    async fn assign_unit(
        &self,
        booking_id: Uuid,
        room_type_id: Uuid,
        candidates: &[Uuid],
    ) -> StoreResult<Option<Booking>>;

    async fn update_booking_status(&self, id: Uuid, status: BookingStatus) -> StoreResult<Option<Booking>>;

    async fn update_payment_status(&self, id: Uuid, status: PaymentStatus) -> StoreResult<Option<Booking>>;
}
