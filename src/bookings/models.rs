use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::inventory::BookingChannel;
use crate::pricing::AddonRequest;
use crate::stay::StayRange;
use crate::validation::validate_phone;

/// Booking status enum representing the lifecycle of a stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Waitlisted,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Waitlisted => "waitlisted",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a booking in this status keeps its room unit
    pub fn holds_unit(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status enum representing the payment state of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extra purchased with a stay (airport transfer, bonfire, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Addon {
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl Addon {
    /// `None` when quantity times unit price does not fit a `Decimal`
    pub fn line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

impl From<AddonRequest> for Addon {
    fn from(request: AddonRequest) -> Self {
        Self {
            name: request.name,
            quantity: request.quantity,
            unit_price: request.unit_price,
        }
    }
}

/// Domain model representing a booking
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub room_type_id: Uuid,
    pub room_unit_id: Option<Uuid>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests_count: i32,
    pub channel: BookingChannel,
    pub meal_plan_code: String,
    pub cancellation_policy_code: String,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub room_rate: Decimal,
    pub meal_cost: Decimal,
    pub policy_adjustment: Decimal,
    pub gst_rate: Decimal,
    pub gst_amount: Decimal,
    pub addon_total: Decimal,
    pub total_amount: Decimal,
    pub addons: Vec<Addon>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn stay(&self) -> StayRange {
        StayRange {
            check_in: self.check_in,
            check_out: self.check_out,
        }
    }
}

/// Everything needed to insert a booking; status starts pending and unpaid
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub room_type_id: Uuid,
    pub stay: StayRange,
    pub guests_count: i32,
    pub channel: BookingChannel,
    pub meal_plan_code: String,
    pub cancellation_policy_code: String,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub room_rate: Decimal,
    pub meal_cost: Decimal,
    pub policy_adjustment: Decimal,
    pub gst_rate: Decimal,
    pub gst_amount: Decimal,
    pub addon_total: Decimal,
    pub total_amount: Decimal,
    pub addons: Vec<Addon>,
}

/// An existing booking that blocks a requested stay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingConflict {
    pub booking_id: Uuid,
    pub room_unit_id: Option<Uuid>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl From<&Booking> for BookingConflict {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id,
            room_unit_id: booking.room_unit_id,
            check_in: booking.check_in,
            check_out: booking.check_out,
        }
    }
}

/// Outcome of an availability check
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub is_valid: bool,
    pub available_unit_ids: Vec<Uuid>,
    pub conflicting_bookings: Vec<BookingConflict>,
    pub suggested_waitlist: bool,
}

/// Request DTO for checking availability
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAvailabilityRequest {
    pub room_type_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(range(min = 1, message = "guestsCount must be at least 1"))]
    pub guests_count: i32,
    pub exclude_booking_id: Option<Uuid>,
}

/// Request DTO for assigning a unit to an existing booking
///
/// Every field is optional on the wire so that absent fields surface as a
/// `MissingFields` error rather than a generic JSON rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignUnitRequest {
    pub booking_id: Option<Uuid>,
    pub room_type_id: Option<Uuid>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests_count: Option<i32>,
}

/// Successful unit assignment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignUnitResponse {
    pub success: bool,
    pub assigned_unit: Uuid,
    pub available_units: Vec<Uuid>,
    pub booking: Booking,
}

/// Request DTO for creating a booking
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub room_type_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(range(min = 1, message = "guestsCount must be at least 1"))]
    pub guests_count: i32,
    #[serde(default)]
    pub booking_channel: BookingChannel,
    pub meal_plan_code: String,
    pub cancellation_policy_code: String,
    #[validate(length(min = 1, max = 120, message = "Guest name must be 1-120 characters"))]
    pub guest_name: String,
    #[validate(email(message = "Guest email must be a valid address"))]
    pub guest_email: String,
    #[validate(custom = "validate_phone")]
    pub guest_phone: Option<String>,
    #[serde(default)]
    #[validate]
    pub addons: Vec<AddonRequest>,
}

/// Request DTO for updating booking status
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

/// Request DTO for updating payment status
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
}
