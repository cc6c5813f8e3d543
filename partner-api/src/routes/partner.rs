//! Partner REST API Routes
//!
//! Handlers for partner registration, fetch-by-id, and the
//! nearest-covering-partner search. All business behavior lives in
//! the facade; handlers only marshal requests and map outcomes to
//! status codes.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use partner_core::{
    MultiPolygonGeometry, NewPartner, PointGeometry, MAX_OWNER_NAME_LEN, MAX_TRADING_NAME_LEN,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// REQUEST TYPES
// ============================================================================

/// Body of POST /partners/.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePartnerRequest {
    pub trading_name: String,
    pub owner_name: String,
    pub document: String,
    pub coverage_area: MultiPolygonGeometry,
    pub address: PointGeometry,
}

impl CreatePartnerRequest {
    /// Field-level checks mirroring the column widths; geometry is
    /// validated by the candidate itself.
    fn validate(&self) -> ApiResult<()> {
        if self.document.trim().is_empty() {
            return Err(ApiError::invalid_input("document must not be empty"));
        }
        if self.trading_name.chars().count() > MAX_TRADING_NAME_LEN {
            return Err(ApiError::invalid_input(format!(
                "trading_name exceeds {} characters",
                MAX_TRADING_NAME_LEN
            )));
        }
        if self.owner_name.chars().count() > MAX_OWNER_NAME_LEN {
            return Err(ApiError::invalid_input(format!(
                "owner_name exceeds {} characters",
                MAX_OWNER_NAME_LEN
            )));
        }
        Ok(())
    }

    fn into_candidate(self) -> NewPartner {
        NewPartner {
            trading_name: self.trading_name,
            owner_name: self.owner_name,
            document: self.document,
            coverage_area: self.coverage_area,
            address: self.address,
        }
    }
}

/// Query parameters of GET /partners.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SearchQuery {
    pub long: f64,
    pub lat: f64,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /partners/ - Register a partner
pub async fn create_partner(
    State(state): State<AppState>,
    Json(request): Json<CreatePartnerRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;
    let candidate = request.into_candidate();
    candidate.validate()?;

    let partner = state.partners.create(&candidate).await?;
    Ok(Json(partner))
}

/// GET /partners/{id} - Fetch a partner by id
pub async fn get_partner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let partner = state
        .partners
        .get_by_id(id)
        .await?
        .ok_or_else(ApiError::partner_not_found)?;
    Ok(Json(partner))
}

/// GET /partners?long=&lat= - Nearest partner covering a coordinate
pub async fn search_partners(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let partner = state
        .partners
        .search_nearest_containing(query.long, query.lat)
        .await?
        .ok_or_else(ApiError::partner_not_found)?;
    Ok(Json(partner))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the partner routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/partners", axum::routing::get(search_partners))
        .route("/partners/", axum::routing::post(create_partner))
        .route("/partners/:id", axum::routing::get(get_partner))
}
