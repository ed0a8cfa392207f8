use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::money::MAX_UNIT_AMOUNT;
use crate::validation::{validate_plan_code, validate_positive_rate};

/// Bed categories with their fixed sleeping capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BedCategory {
    Single,
    Double,
    Queen,
    King,
    Twin,
    SofaBed,
}

impl BedCategory {
    /// Number of guests one bed of this category sleeps
    pub fn capacity(&self) -> i32 {
        match self {
            BedCategory::Single | BedCategory::SofaBed => 1,
            BedCategory::Double | BedCategory::Queen | BedCategory::King | BedCategory::Twin => 2,
        }
    }
}

/// One line of a room's bed configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BedConfig {
    pub category: BedCategory,
    pub quantity: i32,
}

/// Minimum nightly charge once a stay reaches `min_guests`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OccupancyFloor {
    pub min_guests: i32,
    pub nightly_minimum: Decimal,
}

/// A sellable category of room
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomType {
    pub id: Uuid,
    #[schema(example = "Deluxe Valley View")]
    pub name: String,
    pub description: Option<String>,
    /// Nightly rate in INR
    #[schema(example = "3000.00")]
    pub base_rate: Decimal,
    #[schema(example = 3)]
    pub max_occupancy: i32,
    pub bed_configuration: Vec<BedConfig>,
    pub occupancy_floors: Vec<OccupancyFloor>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sum of capacity x quantity over a bed configuration
pub fn bed_capacity(beds: &[BedConfig]) -> i32 {
    beds.iter()
        .map(|bed| bed.category.capacity() * bed.quantity.max(0))
        .sum()
}

/// A physical, individually bookable room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct RoomUnit {
    pub id: Uuid,
    pub room_type_id: Uuid,
    #[schema(example = "101")]
    pub label: String,
    pub in_service: bool,
    pub created_at: DateTime<Utc>,
}

/// Channel a booking request arrives through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingChannel {
    Website,
    Phone,
    WalkIn,
    Ota,
}

impl BookingChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingChannel::Website => "website",
            BookingChannel::Phone => "phone",
            BookingChannel::WalkIn => "walk_in",
            BookingChannel::Ota => "ota",
        }
    }
}

impl Default for BookingChannel {
    fn default() -> Self {
        BookingChannel::Website
    }
}

impl std::fmt::Display for BookingChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "website" => Ok(BookingChannel::Website),
            "phone" => Ok(BookingChannel::Phone),
            "walk_in" => Ok(BookingChannel::WalkIn),
            "ota" => Ok(BookingChannel::Ota),
            _ => Err(format!("Invalid booking channel: {}", s)),
        }
    }
}

/// Meal categories a plan can include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    HighTea,
    Dinner,
}

impl MealCategory {
    pub fn label(&self) -> &'static str {
        match self {
            MealCategory::Breakfast => "Breakfast",
            MealCategory::Lunch => "Lunch",
            MealCategory::HighTea => "High tea",
            MealCategory::Dinner => "Dinner",
        }
    }
}

/// A meal included in a plan, priced per guest per night
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IncludedMeal {
    pub category: MealCategory,
    pub cost_per_guest: Decimal,
}

/// Meal plan offered alongside a room (EP, CP, MAP, AP, ...)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MealPlan {
    #[schema(example = "CP")]
    pub code: String,
    #[schema(example = "Continental Plan")]
    pub name: String,
    pub included_meals: Vec<IncludedMeal>,
    pub channels: Vec<BookingChannel>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl MealPlan {
    pub fn offered_on(&self, channel: BookingChannel) -> bool {
        self.is_active && self.channels.contains(&channel)
    }
}

/// How a cancellation policy's adjustment value is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Flat INR amount applied once per stay
    Fixed,
    /// Percent of the room + meal subtotal
    Percentage,
}

impl AdjustmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentKind::Fixed => "fixed",
            AdjustmentKind::Percentage => "percentage",
        }
    }
}

impl std::str::FromStr for AdjustmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(AdjustmentKind::Fixed),
            "percentage" => Ok(AdjustmentKind::Percentage),
            _ => Err(format!("Invalid adjustment kind: {}", s)),
        }
    }
}

/// Cancellation terms and the price adjustment they carry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CancellationPolicy {
    #[schema(example = "FLEX")]
    pub code: String,
    #[schema(example = "Free cancellation")]
    pub name: String,
    pub terms: String,
    /// Days before check-in a full refund is still possible; None means non-refundable
    pub refundable_until_days: Option<i32>,
    pub adjustment_kind: AdjustmentKind,
    /// Positive surcharge or negative discount
    pub adjustment_value: Decimal,
    pub channels: Vec<BookingChannel>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl CancellationPolicy {
    pub fn offered_on(&self, channel: BookingChannel) -> bool {
        self.is_active && self.channels.contains(&channel)
    }

    pub fn is_refundable(&self) -> bool {
        self.refundable_until_days.is_some()
    }
}

fn validate_room_capacity(request: &CreateRoomType) -> Result<(), ValidationError> {
    if bed_capacity(&request.bed_configuration) < request.max_occupancy {
        let mut error = ValidationError::new("beds_below_max_occupancy");
        error.message = Some("Bed configuration sleeps fewer guests than max_occupancy".into());
        return Err(error);
    }
    Ok(())
}

fn validate_beds(beds: &[BedConfig]) -> Result<(), ValidationError> {
    if beds.is_empty() || beds.iter().any(|bed| bed.quantity < 1) {
        return Err(ValidationError::new("invalid_bed_configuration"));
    }
    Ok(())
}

fn validate_floors(floors: &[OccupancyFloor]) -> Result<(), ValidationError> {
    if floors
        .iter()
        .any(|floor| {
            floor.min_guests < 1
                || floor.nightly_minimum < Decimal::ZERO
                || floor.nightly_minimum > MAX_UNIT_AMOUNT
        })
    {
        return Err(ValidationError::new("invalid_occupancy_floor"));
    }
    Ok(())
}

fn validate_meals(meals: &[IncludedMeal]) -> Result<(), ValidationError> {
    if meals.iter().any(|meal| meal.cost_per_guest < Decimal::ZERO) {
        return Err(ValidationError::new("meal_cost_must_not_be_negative"));
    }
    if meals.iter().any(|meal| meal.cost_per_guest > MAX_UNIT_AMOUNT) {
        return Err(ValidationError::new("amount_too_large"));
    }
    Ok(())
}

fn validate_channels(channels: &[BookingChannel]) -> Result<(), ValidationError> {
    if channels.is_empty() {
        return Err(ValidationError::new("at_least_one_channel"));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

/// Request DTO for creating a room type
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_room_capacity"))]
pub struct CreateRoomType {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom = "validate_positive_rate")]
    pub base_rate: Decimal,
    #[validate(range(min = 1, max = 12, message = "max_occupancy must be between 1 and 12"))]
    pub max_occupancy: i32,
    #[validate(custom = "validate_beds")]
    pub bed_configuration: Vec<BedConfig>,
    #[serde(default)]
    #[validate(custom = "validate_floors")]
    pub occupancy_floors: Vec<OccupancyFloor>,
}

/// Request DTO for adding a physical unit to a room type
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRoomUnit {
    #[validate(length(min = 1, max = 20, message = "Label must be 1-20 characters"))]
    pub label: String,
}

/// Request DTO for taking a unit in or out of service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateRoomUnit {
    pub in_service: bool,
}

/// Request DTO for creating a meal plan
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMealPlan {
    #[validate(custom = "validate_plan_code")]
    pub code: String,
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(custom = "validate_meals")]
    pub included_meals: Vec<IncludedMeal>,
    #[validate(custom = "validate_channels")]
    pub channels: Vec<BookingChannel>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Request DTO for creating a cancellation policy
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCancellationPolicy {
    #[validate(custom = "validate_plan_code")]
    pub code: String,
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(length(min = 1, max = 2000))]
    pub terms: String,
    #[validate(range(min = 0, max = 365))]
    pub refundable_until_days: Option<i32>,
    pub adjustment_kind: AdjustmentKind,
    pub adjustment_value: Decimal,
    #[validate(custom = "validate_channels")]
    pub channels: Vec<BookingChannel>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl CreateCancellationPolicy {
    /// Percentages stay within -100..=100; fixed amounts within one unit price either way
    pub fn check_adjustment(&self) -> Result<(), ValidationError> {
        match self.adjustment_kind {
            AdjustmentKind::Percentage if self.adjustment_value < Decimal::from(-100) => {
                Err(ValidationError::new("percentage_discount_below_minus_100"))
            }
            AdjustmentKind::Percentage if self.adjustment_value > Decimal::from(100) => {
                Err(ValidationError::new("percentage_surcharge_above_100"))
            }
            AdjustmentKind::Fixed if self.adjustment_value.abs() > MAX_UNIT_AMOUNT => {
                Err(ValidationError::new("amount_too_large"))
            }
            _ => Ok(()),
        }
    }
}
