// HTTP handlers for the room, meal plan and cancellation policy catalogue

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::inventory::{
    CancellationPolicy, CreateCancellationPolicy, CreateMealPlan, CreateRoomType, CreateRoomUnit,
    MealPlan, RoomType, RoomUnit, UpdateRoomUnit,
};

/// Handler for POST /api/room-types
/// Creates a room type (Admin only)
#[utoipa::path(
    post,
    path = "/api/room-types",
    request_body = CreateRoomType,
    responses(
        (status = 201, description = "Room type created", body = RoomType),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Room type name already exists")
    ),
    tag = "catalogue"
)]
pub async fn create_room_type_handler(
    State(state): State<crate::AppState>,
    admin: AdminUser,
    Json(payload): Json<CreateRoomType>,
) -> Result<(StatusCode, Json<RoomType>), ApiError> {
    tracing::debug!("{} creating room type: {}", admin.subject, payload.name);
    payload.validate()?;

    let room_type = state.store.insert_room_type(&payload).await?;

    tracing::info!("Created room type {} ({})", room_type.name, room_type.id);
    Ok((StatusCode::CREATED, Json(room_type)))
}

/// Handler for GET /api/room-types
#[utoipa::path(
    get,
    path = "/api/room-types",
    responses(
        (status = 200, description = "All room types", body = Vec<RoomType>)
    ),
    tag = "catalogue"
)]
pub async fn list_room_types_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<RoomType>>, ApiError> {
    let room_types = state.store.list_room_types().await?;
    tracing::debug!("Retrieved {} room types", room_types.len());
    Ok(Json(room_types))
}

/// Handler for GET /api/room-types/{id}
#[utoipa::path(
    get,
    path = "/api/room-types/{id}",
    params(("id" = Uuid, Path, description = "Room type id")),
    responses(
        (status = 200, description = "Room type found", body = RoomType),
        (status = 404, description = "Room type not found")
    ),
    tag = "catalogue"
)]
pub async fn get_room_type_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomType>, ApiError> {
    let room_type = state
        .store
        .find_room_type(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Room type", id))?;
    Ok(Json(room_type))
}

/// Handler for GET /api/room-types/{id}/units
#[utoipa::path(
    get,
    path = "/api/room-types/{id}/units",
    params(("id" = Uuid, Path, description = "Room type id")),
    responses(
        (status = 200, description = "Units ordered by label", body = Vec<RoomUnit>),
        (status = 404, description = "Room type not found")
    ),
    tag = "catalogue"
)]
pub async fn list_room_units_handler(
    State(state): State<crate::AppState>,
    Path(room_type_id): Path<Uuid>,
) -> Result<Json<Vec<RoomUnit>>, ApiError> {
    if state.store.find_room_type(room_type_id).await?.is_none() {
        return Err(ApiError::not_found("Room type", room_type_id));
    }
    let units = state.store.list_room_units(room_type_id).await?;
    Ok(Json(units))
}

/// Handler for POST /api/room-types/{id}/units
/// Adds a physical unit to a room type (Admin only)
#[utoipa::path(
    post,
    path = "/api/room-types/{id}/units",
    params(("id" = Uuid, Path, description = "Room type id")),
    request_body = CreateRoomUnit,
    responses(
        (status = 201, description = "Unit created", body = RoomUnit),
        (status = 400, description = "Invalid label"),
        (status = 404, description = "Room type not found"),
        (status = 409, description = "Label already used for this room type")
    ),
    tag = "catalogue"
)]
pub async fn create_room_unit_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(room_type_id): Path<Uuid>,
    Json(payload): Json<CreateRoomUnit>,
) -> Result<(StatusCode, Json<RoomUnit>), ApiError> {
    payload.validate()?;

    if state.store.find_room_type(room_type_id).await?.is_none() {
        return Err(ApiError::not_found("Room type", room_type_id));
    }

    let unit = state
        .store
        .insert_room_unit(room_type_id, payload.label.trim())
        .await?;

    tracing::info!("Added unit {} to room type {}", unit.label, room_type_id);
    Ok((StatusCode::CREATED, Json(unit)))
}

/// Handler for PATCH /api/room-units/{id}
/// Takes a unit in or out of service (Admin only)
#[utoipa::path(
    patch,
    path = "/api/room-units/{id}",
    params(("id" = Uuid, Path, description = "Room unit id")),
    request_body = UpdateRoomUnit,
    responses(
        (status = 200, description = "Unit updated", body = RoomUnit),
        (status = 404, description = "Room unit not found")
    ),
    tag = "catalogue"
)]
pub async fn update_room_unit_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(unit_id): Path<Uuid>,
    Json(payload): Json<UpdateRoomUnit>,
) -> Result<Json<RoomUnit>, ApiError> {
    let unit = state
        .store
        .set_unit_in_service(unit_id, payload.in_service)
        .await?
        .ok_or_else(|| ApiError::not_found("Room unit", unit_id))?;

    tracing::info!("Unit {} in_service set to {}", unit.label, unit.in_service);
    Ok(Json(unit))
}

/// Handler for GET /api/meal-plans
#[utoipa::path(
    get,
    path = "/api/meal-plans",
    responses(
        (status = 200, description = "Meal plans in display order", body = Vec<MealPlan>)
    ),
    tag = "catalogue"
)]
pub async fn list_meal_plans_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<MealPlan>>, ApiError> {
    Ok(Json(state.store.list_meal_plans().await?))
}

/// Handler for POST /api/meal-plans (Admin only)
#[utoipa::path(
    post,
    path = "/api/meal-plans",
    request_body = CreateMealPlan,
    responses(
        (status = 201, description = "Meal plan created", body = MealPlan),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Plan code already exists")
    ),
    tag = "catalogue"
)]
pub async fn create_meal_plan_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateMealPlan>,
) -> Result<(StatusCode, Json<MealPlan>), ApiError> {
    payload.validate()?;

    let plan = state.store.insert_meal_plan(&payload).await?;

    tracing::info!("Created meal plan {}", plan.code);
    Ok((StatusCode::CREATED, Json(plan)))
}

/// Handler for GET /api/cancellation-policies
#[utoipa::path(
    get,
    path = "/api/cancellation-policies",
    responses(
        (status = 200, description = "Cancellation policies in display order", body = Vec<CancellationPolicy>)
    ),
    tag = "catalogue"
)]
pub async fn list_cancellation_policies_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<CancellationPolicy>>, ApiError> {
    Ok(Json(state.store.list_cancellation_policies().await?))
}

/// Handler for POST /api/cancellation-policies (Admin only)
#[utoipa::path(
    post,
    path = "/api/cancellation-policies",
    request_body = CreateCancellationPolicy,
    responses(
        (status = 201, description = "Cancellation policy created", body = CancellationPolicy),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Policy code already exists")
    ),
    tag = "catalogue"
)]
pub async fn create_cancellation_policy_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateCancellationPolicy>,
) -> Result<(StatusCode, Json<CancellationPolicy>), ApiError> {
    payload.validate()?;
    payload
        .check_adjustment()
        .map_err(|e| ApiError::invalid_field("adjustment_value", e))?;

    let policy = state.store.insert_cancellation_policy(&payload).await?;

    tracing::info!("Created cancellation policy {}", policy.code);
    Ok((StatusCode::CREATED, Json(policy)))
}
