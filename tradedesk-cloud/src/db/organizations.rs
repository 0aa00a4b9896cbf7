use chrono::DateTime;
use shared::entitlement::{OrganizationState, RawOrganizationState};
use sqlx::PgExecutor;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub plan: Option<String>,
    pub subscription_status: Option<String>,
    /// Unix millis
    pub trial_ends_at: Option<i64>,
    pub plan_override: Option<String>,
    pub billing_override: Option<String>,
    pub created_at: i64,
}

impl Organization {
    /// Parse the stored billing columns into the resolver input
    pub fn subscription_state(&self) -> OrganizationState {
        RawOrganizationState {
            plan: self.plan.clone(),
            subscription_status: self.subscription_status.clone(),
            trial_ends_at: self.trial_ends_at.and_then(DateTime::from_timestamp_millis),
            plan_override: self.plan_override.clone(),
            billing_override: self.billing_override.clone(),
        }
        .into()
    }
}

pub async fn find_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
) -> Result<Option<Organization>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM organizations WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Fetch and row-lock an organization for the rest of the transaction
pub async fn lock_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
) -> Result<Option<Organization>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM organizations WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared::entitlement::{PlanTier, SubscriptionStatus};

    fn row() -> Organization {
        Organization {
            id: "org-a".into(),
            name: "Acme Plumbing".into(),
            plan: Some("professional".into()),
            subscription_status: Some("no_org".into()),
            trial_ends_at: Some(1_700_000_000_000),
            plan_override: Some("enterprise".into()),
            billing_override: None,
            created_at: 0,
        }
    }

    #[test]
    fn stored_strings_are_parsed_at_the_boundary() {
        let state = row().subscription_state();
        assert_eq!(state.plan, Some(PlanTier::Professional));
        assert_eq!(state.subscription_status, None);
        assert_eq!(state.plan_override, None);
        assert_eq!(
            state.trial_ends_at,
            Some(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap())
        );
    }

    #[test]
    fn active_status_survives_parsing() {
        let mut org = row();
        org.subscription_status = Some("active".into());
        assert_eq!(
            org.subscription_state().subscription_status,
            Some(SubscriptionStatus::Active)
        );
    }
}
