pub mod auth;
pub mod bookings;
pub mod config;
pub mod db;
pub mod error;
pub mod inventory;
pub mod money;
pub mod pricing;
pub mod stay;
pub mod store;
pub mod validation;

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::TokenService;
use bookings::BookingService;
use config::Config;
use pricing::RateService;
use store::HotelStore;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        pricing::handlers::rate_variants_handler,
        pricing::handlers::quote_handler,
        bookings::handlers::validate_availability_handler,
        bookings::handlers::assign_unit_handler,
        bookings::handlers::create_booking_handler,
        bookings::handlers::get_booking_handler,
        bookings::handlers::update_booking_status_handler,
        bookings::handlers::update_payment_status_handler,
        inventory::handlers::create_room_type_handler,
        inventory::handlers::list_room_types_handler,
        inventory::handlers::get_room_type_handler,
        inventory::handlers::list_room_units_handler,
        inventory::handlers::create_room_unit_handler,
        inventory::handlers::update_room_unit_handler,
        inventory::handlers::list_meal_plans_handler,
        inventory::handlers::create_meal_plan_handler,
        inventory::handlers::list_cancellation_policies_handler,
        inventory::handlers::create_cancellation_policy_handler,
    ),
    components(
        schemas(
            pricing::RateVariantsRequest,
            pricing::RateVariant,
            pricing::AddonRequest,
            pricing::QuoteRequest,
            pricing::MealLine,
            pricing::AddonLine,
            pricing::BreakdownLine,
            pricing::PriceBreakdown,
            bookings::BookingStatus,
            bookings::PaymentStatus,
            bookings::Addon,
            bookings::Booking,
            bookings::BookingConflict,
            bookings::AvailabilityReport,
            bookings::ValidateAvailabilityRequest,
            bookings::AssignUnitRequest,
            bookings::AssignUnitResponse,
            bookings::CreateBookingRequest,
            bookings::UpdateBookingStatusRequest,
            bookings::UpdatePaymentRequest,
            inventory::BedCategory,
            inventory::BedConfig,
            inventory::OccupancyFloor,
            inventory::RoomType,
            inventory::RoomUnit,
            inventory::BookingChannel,
            inventory::MealCategory,
            inventory::IncludedMeal,
            inventory::MealPlan,
            inventory::AdjustmentKind,
            inventory::CancellationPolicy,
            inventory::CreateRoomType,
            inventory::CreateRoomUnit,
            inventory::UpdateRoomUnit,
            inventory::CreateMealPlan,
            inventory::CreateCancellationPolicy,
        )
    ),
    tags(
        (name = "rates", description = "Rate variants and price quotes"),
        (name = "bookings", description = "Availability, unit assignment and booking lifecycle"),
        (name = "catalogue", description = "Room types, units, meal plans and cancellation policies")
    ),
    info(
        title = "Hotel Rates & Booking API",
        version = "1.0.0",
        description = "Rate variants with GST breakdowns, availability checks and race-free room assignment"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HotelStore>,
    pub rate_service: RateService,
    pub booking_service: BookingService,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Wire services around a store using the loaded configuration
    pub fn new(store: Arc<dyn HotelStore>, config: &Config) -> Self {
        let rate_service = RateService::new(store.clone(), config.gst, config.addon_tax);
        let booking_service = BookingService::new(store.clone(), rate_service.clone());

        Self {
            store,
            rate_service,
            booking_service,
            tokens: Arc::new(TokenService::new(config.jwt_secret.clone())),
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds tracing and CORS middleware
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        // Rates
        .route("/api/rates/variants", post(pricing::rate_variants_handler))
        .route("/api/rates/quote", post(pricing::quote_handler))
        // Bookings
        .route("/api/bookings", post(bookings::create_booking_handler))
        .route("/api/bookings/validate", post(bookings::validate_availability_handler))
        .route("/api/bookings/assign-unit", post(bookings::assign_unit_handler))
        .route("/api/bookings/:id", get(bookings::get_booking_handler))
        .route("/api/bookings/:id/status", patch(bookings::update_booking_status_handler))
        .route("/api/bookings/:id/payment", patch(bookings::update_payment_status_handler))
        // Catalogue
        .route(
            "/api/room-types",
            get(inventory::list_room_types_handler).post(inventory::create_room_type_handler),
        )
        .route("/api/room-types/:id", get(inventory::get_room_type_handler))
        .route(
            "/api/room-types/:id/units",
            get(inventory::list_room_units_handler).post(inventory::create_room_unit_handler),
        )
        .route("/api/room-units/:id", patch(inventory::update_room_unit_handler))
        .route(
            "/api/meal-plans",
            get(inventory::list_meal_plans_handler).post(inventory::create_meal_plan_handler),
        )
        .route(
            "/api/cancellation-policies",
            get(inventory::list_cancellation_policies_handler)
                .post(inventory::create_cancellation_policy_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
