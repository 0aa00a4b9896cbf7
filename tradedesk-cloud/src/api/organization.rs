//! Organization subscription and entitlement endpoints

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;
use shared::entitlement::{CrewSeats, Entitlement, OrganizationState};
use shared::error::AppError;

use crate::auth::SessionIdentity;
use crate::db::crew;
use crate::error::ServiceError;
use crate::services::entitlement;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, AppError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub organization_id: String,
    pub name: String,
    #[serde(flatten)]
    pub state: OrganizationState,
}

/// GET /api/organization/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<SubscriptionResponse> {
    let resolved = entitlement::load(&state.pool, &identity).await?;
    Ok(Json(SubscriptionResponse {
        organization_id: resolved.organization.id,
        name: resolved.organization.name,
        state: resolved.state,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementResponse {
    #[serde(flatten)]
    pub entitlement: Entitlement,
    pub active_crew_count: usize,
    pub can_add_more_crew: bool,
}

impl EntitlementResponse {
    pub fn new(entitlement: Entitlement, active_crew_count: usize) -> Self {
        let seats = CrewSeats::evaluate(&entitlement, active_crew_count);
        Self {
            entitlement,
            active_crew_count: seats.active,
            can_add_more_crew: seats.can_add_more,
        }
    }
}

/// GET /api/organization/entitlements
///
/// Advisory: UI gating only. Mutating endpoints re-check on their own.
pub async fn get_entitlements(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<EntitlementResponse> {
    let resolved = entitlement::load(&state.pool, &identity).await?;
    let active = crew::count_active(&state.pool, &resolved.organization.id)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(EntitlementResponse::new(
        resolved.entitlement,
        active as usize,
    )))
}
