//! Crew roster endpoints

use axum::extract::State;
use axum::{Extension, Json};
use shared::entitlement::CrewMember;
use shared::error::AppError;

use crate::auth::SessionIdentity;
use crate::db;
use crate::error::ServiceError;
use crate::services::crew::{self, AddCrewMember};
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, AppError>;

/// GET /api/crew
pub async fn list_crew(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<Vec<CrewMember>> {
    let organization_id = identity.require_organization()?;
    let members = db::crew::list_by_organization(&state.pool, organization_id)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(members))
}

/// POST /api/crew
pub async fn add_crew(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Json(req): Json<AddCrewMember>,
) -> ApiResult<CrewMember> {
    let member = crew::add_member(&state.pool, &identity, req).await?;
    Ok(Json(member))
}
