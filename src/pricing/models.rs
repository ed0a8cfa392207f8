use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::inventory::{BookingChannel, MealCategory};
use crate::validation::validate_non_negative_amount;

/// Request DTO for listing rate variants of a stay
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateVariantsRequest {
    pub room_type_id: Uuid,
    #[schema(value_type = String, example = "2025-03-01")]
    pub check_in: NaiveDate,
    #[schema(value_type = String, example = "2025-03-03")]
    pub check_out: NaiveDate,
    /// Restrict availability to one specific unit
    pub room_unit_id: Option<Uuid>,
    pub guests_count: i32,
    #[serde(default)]
    pub booking_channel: BookingChannel,
}

/// One purchasable meal plan x cancellation policy combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RateVariant {
    pub meal_plan_code: String,
    pub meal_plan_name: String,
    pub included_meals: Vec<MealCategory>,
    pub cancellation_policy_code: String,
    pub cancellation_policy_name: String,
    pub is_refundable: bool,
    pub nights: i64,
    pub room_rate: Decimal,
    pub meal_cost: Decimal,
    pub policy_adjustment: Decimal,
    pub total_price: Decimal,
    pub price_per_night: Decimal,
    pub is_available: bool,
    pub is_featured: bool,
    pub savings: Decimal,
    pub discount_percentage: Decimal,
}

/// Add-on selected with a quote or booking
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddonRequest {
    #[validate(length(min = 1, max = 80, message = "Add-on name must be 1-80 characters"))]
    pub name: String,
    #[validate(range(min = 1, max = 50, message = "Add-on quantity must be between 1 and 50"))]
    pub quantity: i32,
    #[validate(custom = "validate_non_negative_amount")]
    pub unit_price: Decimal,
}

/// Request DTO for a full price breakdown of one variant
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub room_type_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests_count: i32,
    #[serde(default)]
    pub booking_channel: BookingChannel,
    pub meal_plan_code: String,
    pub cancellation_policy_code: String,
    #[serde(default)]
    #[validate]
    pub addons: Vec<AddonRequest>,
}

/// Meal subtotal broken down per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MealLine {
    pub category: MealCategory,
    pub cost_per_guest: Decimal,
    pub guests: i32,
    pub nights: i64,
    pub amount: Decimal,
}

/// Add-on line of a breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AddonLine {
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

/// Display line, amount plus its rupee rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BreakdownLine {
    pub label: String,
    pub amount: Decimal,
    pub display: String,
}

/// Guest-facing price breakdown of a stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceBreakdown {
    pub meal_plan_code: String,
    pub cancellation_policy_code: String,
    pub nights: i64,
    pub guests: i32,
    pub room_subtotal: Decimal,
    pub meal_subtotal: Decimal,
    pub meal_lines: Vec<MealLine>,
    pub policy_adjustment: Decimal,
    pub taxable_subtotal: Decimal,
    pub gst_rate: Decimal,
    pub gst_amount: Decimal,
    pub addon_lines: Vec<AddonLine>,
    pub addon_total: Decimal,
    pub addon_tax: Decimal,
    pub grand_total: Decimal,
    pub lines: Vec<BreakdownLine>,
}
