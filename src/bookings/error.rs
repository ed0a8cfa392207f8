use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::bookings::BookingConflict;
use crate::pricing::PricingError;
use crate::stay::InvalidRange;
use crate::store::StoreError;

/// Error types for availability and booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),

    #[error("Booking not found")]
    NotFound,

    #[error("No rooms available for the selected dates")]
    NoUnitsAvailable { conflicting_bookings: Vec<BookingConflict> },

    #[error("The last free room was taken by another booking, please try again or join the waitlist")]
    AssignmentRace,

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Database error: {0}")]
    DatabaseError(StoreError),
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnitConflict => BookingError::AssignmentRace,
            other => BookingError::DatabaseError(other),
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            BookingError::NoUnitsAvailable { conflicting_bookings } => {
                tracing::warn!(
                    "No units available, {} conflicting bookings",
                    conflicting_bookings.len()
                );
                (
                    StatusCode::CONFLICT,
                    json!({
                        "error": "No rooms available for the selected dates",
                        "suggestedWaitlist": true,
                        "conflictingBookings": conflicting_bookings,
                    }),
                )
            }
            BookingError::AssignmentRace => {
                tracing::warn!("Unit assignment lost a race");
                (
                    StatusCode::CONFLICT,
                    json!({
                        "error": BookingError::AssignmentRace.to_string(),
                        "suggestedWaitlist": true,
                        "conflictingBookings": [],
                    }),
                )
            }
            BookingError::Pricing(err) => return err.into_response(),
            BookingError::DatabaseError(err) => {
                tracing::error!("Booking store error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "A database error occurred" }),
                )
            }
            BookingError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "Booking not found" })),
            other => (StatusCode::BAD_REQUEST, json!({ "error": other.to_string() })),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message() {
        let err = BookingError::MissingFields(vec!["bookingId", "checkOut"]);
        assert_eq!(err.to_string(), "Missing required fields: bookingId, checkOut");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_conflicts_map_to_409() {
        let err = BookingError::NoUnitsAvailable { conflicting_bookings: vec![] };
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
        assert_eq!(BookingError::AssignmentRace.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_exclusion_violation_becomes_race() {
        assert!(matches!(
            BookingError::from(StoreError::UnitConflict),
            BookingError::AssignmentRace
        ));
    }
}
