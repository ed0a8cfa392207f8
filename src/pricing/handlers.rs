// HTTP handlers for rate endpoints

use axum::{extract::State, Json};
use validator::Validate;

use crate::pricing::{PriceBreakdown, PricingError, QuoteRequest, RateVariant, RateVariantsRequest};

/// Handler for POST /api/rates/variants
/// Lists every purchasable meal plan x cancellation policy combination for a stay
#[utoipa::path(
    post,
    path = "/api/rates/variants",
    request_body = RateVariantsRequest,
    responses(
        (status = 200, description = "Rate variants for the stay", body = [RateVariant]),
        (status = 400, description = "Invalid date range or guest count"),
        (status = 404, description = "Room type or unit not found")
    ),
    tag = "rates"
)]
pub async fn rate_variants_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<RateVariantsRequest>,
) -> Result<Json<Vec<RateVariant>>, PricingError> {
    let variants = state.rate_service.variants(&request).await?;
    Ok(Json(variants))
}

/// Handler for POST /api/rates/quote
/// Prices one combination with GST and add-ons
#[utoipa::path(
    post,
    path = "/api/rates/quote",
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Price breakdown", body = PriceBreakdown),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Room type or combination not offered")
    ),
    tag = "rates"
)]
pub async fn quote_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<PriceBreakdown>, PricingError> {
    request
        .validate()
        .map_err(|e| PricingError::ValidationError(e.to_string()))?;

    let breakdown = state.rate_service.quote(&request).await?;
    Ok(Json(breakdown))
}
