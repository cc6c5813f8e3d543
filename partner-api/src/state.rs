//! Shared application state for Axum routers.

use partner_storage::PartnerService;

/// Application-wide state shared across all routes.
///
/// The facade is injected fully wired (production store + cache, or
/// the in-memory doubles in tests), so handlers never construct
/// collaborators themselves.
#[derive(Clone)]
pub struct AppState {
    pub partners: PartnerService,
}

impl AppState {
    pub fn new(partners: PartnerService) -> Self {
        Self { partners }
    }
}
