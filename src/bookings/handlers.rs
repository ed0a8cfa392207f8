// HTTP handlers for availability and booking endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AdminUser;
use crate::bookings::{
    AssignUnitRequest, AssignUnitResponse, AvailabilityReport, Booking, BookingError,
    CreateBookingRequest, UpdateBookingStatusRequest, UpdatePaymentRequest,
    ValidateAvailabilityRequest,
};

/// Handler for POST /api/bookings/validate
/// Reports free units of a room type for a stay
#[utoipa::path(
    post,
    path = "/api/bookings/validate",
    request_body = ValidateAvailabilityRequest,
    responses(
        (status = 200, description = "Availability report", body = AvailabilityReport),
        (status = 400, description = "Invalid date range or guest count"),
        (status = 404, description = "Room type not found")
    ),
    tag = "bookings"
)]
pub async fn validate_availability_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<ValidateAvailabilityRequest>,
) -> Result<Json<AvailabilityReport>, BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    let report = state.booking_service.validate(&request).await?;
    Ok(Json(report))
}

/// Handler for POST /api/bookings/assign-unit
/// Assigns a free unit to an existing booking (Admin only)
#[utoipa::path(
    post,
    path = "/api/bookings/assign-unit",
    request_body = AssignUnitRequest,
    responses(
        (status = 200, description = "Unit assigned", body = AssignUnitResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "Booking or room type not found"),
        (status = 409, description = "No unit available, waitlist suggested")
    ),
    tag = "bookings"
)]
pub async fn assign_unit_handler(
    State(state): State<crate::AppState>,
    admin: AdminUser,
    Json(request): Json<AssignUnitRequest>,
) -> Result<Json<AssignUnitResponse>, BookingError> {
    tracing::debug!("Unit assignment requested by {}", admin.subject);
    let response = state.booking_service.assign(request).await?;
    Ok(Json(response))
}

/// Handler for POST /api/bookings
/// Prices, validates and creates a booking with an assigned unit
#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = Booking),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Room type or rate combination not found"),
        (status = 409, description = "No unit available, waitlist suggested")
    ),
    tag = "bookings"
)]
pub async fn create_booking_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    let booking = state.booking_service.create_booking(request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Handler for GET /api/bookings/{id} (Admin only)
#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking found", body = Booking),
        (status = 404, description = "Booking not found")
    ),
    tag = "bookings"
)]
pub async fn get_booking_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state.booking_service.get_booking(booking_id).await?;
    Ok(Json(booking))
}

/// Handler for PATCH /api/bookings/{id}/status (Admin only)
#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/status",
    params(("id" = Uuid, Path, description = "Booking id")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Booking),
        (status = 400, description = "Invalid status transition"),
        (status = 404, description = "Booking not found")
    ),
    tag = "bookings"
)]
pub async fn update_booking_status_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state
        .booking_service
        .update_status(booking_id, request.status)
        .await?;
    Ok(Json(booking))
}

/// Handler for PATCH /api/bookings/{id}/payment (Admin only)
#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/payment",
    params(("id" = Uuid, Path, description = "Booking id")),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment status updated", body = Booking),
        (status = 400, description = "Invalid payment transition"),
        (status = 404, description = "Booking not found")
    ),
    tag = "bookings"
)]
pub async fn update_payment_status_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state
        .booking_service
        .update_payment_status(booking_id, request.payment_status)
        .await?;
    Ok(Json(booking))
}
