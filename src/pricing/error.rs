use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::stay::InvalidRange;
use crate::store::StoreError;

/// Error types for rate computation and quoting
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),

    #[error("guestsCount must be at least 1, got {0}")]
    InvalidGuests(i32),

    #[error("{guests} guests exceed the room's maximum occupancy of {max_occupancy}")]
    OccupancyExceeded { guests: i32, max_occupancy: i32 },

    #[error("Room type {0} not found")]
    RoomTypeNotFound(Uuid),

    #[error("Room unit {0} not found for this room type")]
    RoomUnitNotFound(Uuid),

    #[error("Meal plan {meal_plan_code} with policy {cancellation_policy_code} is not offered on {channel}")]
    VariantNotOffered {
        meal_plan_code: String,
        cancellation_policy_code: String,
        channel: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PricingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PricingError::InvalidRange(_)
            | PricingError::InvalidGuests(_)
            | PricingError::OccupancyExceeded { .. }
            | PricingError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PricingError::RoomTypeNotFound(_)
            | PricingError::RoomUnitNotFound(_)
            | PricingError::VariantNotOffered { .. } => StatusCode::NOT_FOUND,
            PricingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            PricingError::Store(err) => {
                tracing::error!("Pricing store error: {:?}", err);
                "Pricing unavailable, please contact us".to_string()
            }
            other => {
                tracing::debug!("Pricing request rejected: {}", other);
                other.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
