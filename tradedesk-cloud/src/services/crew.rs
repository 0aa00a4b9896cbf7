//! Crew roster operations

use serde::Deserialize;
use shared::entitlement::CrewMember;
use shared::error::{AppError, ErrorCode};
use sqlx::PgPool;

use super::entitlement::OrganizationEntitlement;
use crate::auth::SessionIdentity;
use crate::db::{crew, organizations};
use crate::error::ServiceResult;

/// Refuse when `active` members already fill the plan's seats
fn ensure_seat_available(resolved: &OrganizationEntitlement, active: usize) -> Result<(), AppError> {
    if resolved.entitlement.can_add_more_crew(active) {
        return Ok(());
    }
    tracing::info!(
        organization_id = %resolved.organization.id,
        active,
        plan = %resolved.entitlement.plan,
        "Crew add refused: seat limit reached"
    );
    Err(AppError::new(ErrorCode::CrewLimitReached)
        .with_detail("plan", resolved.entitlement.plan.as_str())
        .with_detail("activeCrewCount", active)
        .with_detail("maxCrewMembers", resolved.entitlement.max_crew_members))
}

#[derive(Debug, Deserialize)]
pub struct AddCrewMember {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Add a crew member, enforcing the seat limit authoritatively.
///
/// The organization row is locked for the duration of the check so two
/// concurrent adds cannot both take the last seat.
pub async fn add_member(
    pool: &PgPool,
    identity: &SessionIdentity,
    req: AddCrewMember,
) -> ServiceResult<CrewMember> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "name is required").into());
    }
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    let role = req.role.as_deref().map(str::trim).filter(|r| !r.is_empty());

    let organization_id = identity.require_organization()?;
    let mut tx = pool.begin().await?;

    let organization = organizations::lock_by_id(&mut *tx, organization_id)
        .await?
        .ok_or(ErrorCode::OrganizationNotFound)?;
    let resolved = OrganizationEntitlement::evaluate(organization, identity);

    let active = crew::count_active(&mut *tx, organization_id).await? as usize;
    ensure_seat_available(&resolved, active)?;

    if let Some(email) = email
        && crew::email_exists(&mut *tx, organization_id, email).await?
    {
        return Err(ErrorCode::CrewEmailExists.into());
    }

    let id = shared::util::new_id();
    let member = crew::create(
        &mut *tx,
        &crew::NewCrewMember {
            id: &id,
            organization_id,
            name,
            email,
            role,
            now: shared::util::now_millis(),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(organization_id, crew_id = %member.id, "Crew member added");
    Ok(member)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::organizations::Organization;

    fn resolved(plan: &str) -> OrganizationEntitlement {
        let organization = Organization {
            id: "org-a".into(),
            name: "Acme Plumbing".into(),
            plan: Some(plan.into()),
            subscription_status: Some("active".into()),
            trial_ends_at: None,
            plan_override: None,
            billing_override: None,
            created_at: 0,
        };
        let identity = SessionIdentity {
            user_id: "u-1".into(),
            organization_id: Some("org-a".into()),
            display_name: "Owner".into(),
            is_super_admin: false,
        };
        OrganizationEntitlement::evaluate(organization, &identity)
    }

    #[test]
    fn starter_refuses_fourth_member() {
        let err = ensure_seat_available(&resolved("starter"), 3).unwrap_err();
        assert_eq!(err.code, ErrorCode::CrewLimitReached);
        let details = err.details.unwrap();
        assert_eq!(details["plan"], "starter");
        assert_eq!(details["activeCrewCount"], 3);
        assert_eq!(details["maxCrewMembers"], 3);
    }

    #[test]
    fn starter_accepts_third_member() {
        assert!(ensure_seat_available(&resolved("starter"), 2).is_ok());
    }

    #[test]
    fn business_has_no_seat_ceiling() {
        assert!(ensure_seat_available(&resolved("business"), 500).is_ok());
    }
}
