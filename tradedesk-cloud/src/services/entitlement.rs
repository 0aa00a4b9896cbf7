//! Entitlement lookup for the requesting user's organization

use shared::entitlement::{Entitlement, Feature, OrganizationState, RequestingUser, resolve};
use shared::error::{AppError, ErrorCode};
use sqlx::PgExecutor;

use crate::auth::SessionIdentity;
use crate::db::organizations::{self, Organization};
use crate::error::ServiceResult;

/// Organization row with its resolved entitlement
pub struct OrganizationEntitlement {
    pub organization: Organization,
    pub state: OrganizationState,
    pub entitlement: Entitlement,
}

impl OrganizationEntitlement {
    pub fn evaluate(organization: Organization, identity: &SessionIdentity) -> Self {
        let state = organization.subscription_state();
        let user = RequestingUser {
            is_super_admin: identity.is_super_admin,
        };
        let entitlement = resolve(&state, &user, chrono::Utc::now());
        Self {
            organization,
            state,
            entitlement,
        }
    }

    /// Chat endpoints are gated on the plan, re-checked on every call
    pub fn require_chat(&self) -> Result<(), AppError> {
        self.entitlement.require_feature(Feature::Chat).inspect_err(|_| {
            tracing::debug!(
                organization_id = %self.organization.id,
                plan = %self.entitlement.plan,
                "Chat refused: feature not in plan"
            );
        })
    }
}

/// Resolve the entitlement of the identity's active organization
pub async fn load<'e>(
    executor: impl PgExecutor<'e>,
    identity: &SessionIdentity,
) -> ServiceResult<OrganizationEntitlement> {
    let organization_id = identity.require_organization()?;
    let organization = organizations::find_by_id(executor, organization_id)
        .await?
        .ok_or(ErrorCode::OrganizationNotFound)?;
    Ok(OrganizationEntitlement::evaluate(organization, identity))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn organization(plan: &str, status: &str) -> Organization {
        Organization {
            id: "org-a".into(),
            name: "Acme Plumbing".into(),
            plan: Some(plan.into()),
            subscription_status: Some(status.into()),
            trial_ends_at: None,
            plan_override: None,
            billing_override: None,
            created_at: 0,
        }
    }

    fn owner() -> SessionIdentity {
        SessionIdentity {
            user_id: "u-1".into(),
            organization_id: Some("org-a".into()),
            display_name: "Owner".into(),
            is_super_admin: false,
        }
    }

    #[test]
    fn starter_plan_cannot_chat() {
        let resolved = OrganizationEntitlement::evaluate(organization("starter", "active"), &owner());
        let err = resolved.require_chat().unwrap_err();
        assert_eq!(err.code, ErrorCode::FeatureNotAvailable);
        assert_eq!(err.details.unwrap()["plan"], "starter");
    }

    #[test]
    fn business_plan_can_chat() {
        let resolved = OrganizationEntitlement::evaluate(organization("business", "active"), &owner());
        assert!(resolved.require_chat().is_ok());
    }

    #[test]
    fn active_trial_unlocks_chat_on_starter() {
        let mut org = organization("starter", "active");
        org.subscription_status = None;
        org.trial_ends_at = Some(shared::util::now_millis() + 2 * 86_400_000);
        let resolved = OrganizationEntitlement::evaluate(org, &owner());
        assert!(resolved.require_chat().is_ok());
    }

    #[test]
    fn super_admin_can_chat_anywhere() {
        let mut admin = owner();
        admin.is_super_admin = true;
        let resolved = OrganizationEntitlement::evaluate(organization("starter", "canceled"), &admin);
        assert!(resolved.require_chat().is_ok());
    }
}
