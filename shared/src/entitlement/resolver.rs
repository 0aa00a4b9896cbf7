//! Entitlement resolution
//!
//! `resolve()` is a pure function of the organization's subscription state,
//! the requesting user and the evaluation time. It never fails: missing or
//! malformed upstream data degrades to the most conservative reading (no
//! plan → starter, no status → no boost).
//!
//! Tier precedence, highest first:
//!
//! ```text
//! super-admin user        → business, override
//! plan_override           → that tier, override
//! billing_override = free → business, override
//! trial window active     → business (trial boost)
//! nominal plan            → plan, or starter when unset
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::plan::{Feature, FeatureSet, PlanTier};
use super::status::{BillingOverride, SubscriptionStatus};
use crate::error::{AppError, ErrorCode};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Normalized subscription state of an organization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationState {
    pub plan: Option<PlanTier>,
    pub subscription_status: Option<SubscriptionStatus>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub plan_override: Option<PlanTier>,
    pub billing_override: Option<BillingOverride>,
}

/// Subscription state as stored, before boundary parsing
#[derive(Debug, Clone, Default)]
pub struct RawOrganizationState {
    pub plan: Option<String>,
    pub subscription_status: Option<String>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub plan_override: Option<String>,
    pub billing_override: Option<String>,
}

impl From<RawOrganizationState> for OrganizationState {
    fn from(raw: RawOrganizationState) -> Self {
        Self {
            plan: raw.plan.as_deref().and_then(PlanTier::parse),
            subscription_status: raw
                .subscription_status
                .as_deref()
                .and_then(SubscriptionStatus::parse),
            trial_ends_at: raw.trial_ends_at,
            plan_override: raw.plan_override.as_deref().and_then(PlanTier::parse),
            billing_override: raw
                .billing_override
                .as_deref()
                .and_then(BillingOverride::parse),
        }
    }
}

/// The user the entitlement is evaluated for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestingUser {
    pub is_super_admin: bool,
}

/// Trial window relative to the evaluation time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialInfo {
    pub is_trialing: bool,
    /// Whole days left, rounded up, never negative
    pub days_left: u32,
    pub is_expired: bool,
}

impl TrialInfo {
    pub fn compute(trial_ends_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let Some(ends_at) = trial_ends_at else {
            return Self::default();
        };

        let remaining_ms = (ends_at - now).num_milliseconds();
        if remaining_ms <= 0 {
            return Self {
                is_trialing: false,
                days_left: 0,
                is_expired: true,
            };
        }

        let days = (remaining_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;
        Self {
            is_trialing: true,
            days_left: u32::try_from(days).unwrap_or(u32::MAX),
            is_expired: false,
        }
    }
}

/// Which rule decided the effective plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementSource {
    SuperAdmin,
    PlanOverride,
    BillingOverride,
    Trial,
    Subscription,
    Default,
}

/// Derived entitlement, recomputed on every read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    pub plan: PlanTier,
    pub source: EntitlementSource,
    pub features: FeatureSet,
    /// `None` = unbounded
    pub max_crew_members: Option<u32>,
    pub trial: TrialInfo,
    pub needs_upgrade: bool,
    pub has_override: bool,
    pub is_super_admin: bool,
    pub subscription_status: Option<SubscriptionStatus>,
}

impl Entitlement {
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(feature)
    }

    /// Advisory seat check; the mutating endpoint must re-check.
    pub fn can_add_more_crew(&self, active_crew_count: usize) -> bool {
        match self.max_crew_members {
            Some(max) => active_crew_count < max as usize,
            None => true,
        }
    }

    pub fn require_feature(&self, feature: Feature) -> Result<(), AppError> {
        if self.has_feature(feature) {
            return Ok(());
        }
        Err(AppError::new(ErrorCode::FeatureNotAvailable)
            .with_detail("feature", serde_json::to_value(feature).unwrap_or_default())
            .with_detail("plan", self.plan.as_str()))
    }
}

/// Compute the effective entitlement for `user` in an organization at `now`.
pub fn resolve(
    state: &OrganizationState,
    user: &RequestingUser,
    now: DateTime<Utc>,
) -> Entitlement {
    let trial = TrialInfo::compute(state.trial_ends_at, now);

    let (plan, source) = if user.is_super_admin {
        (PlanTier::Business, EntitlementSource::SuperAdmin)
    } else if let Some(tier) = state.plan_override {
        (tier, EntitlementSource::PlanOverride)
    } else if state.billing_override == Some(BillingOverride::Free) {
        (PlanTier::Business, EntitlementSource::BillingOverride)
    } else if trial.is_trialing {
        (PlanTier::Business, EntitlementSource::Trial)
    } else if let Some(tier) = state.plan {
        (tier, EntitlementSource::Subscription)
    } else {
        (PlanTier::Starter, EntitlementSource::Default)
    };

    let has_override = matches!(
        source,
        EntitlementSource::SuperAdmin
            | EntitlementSource::PlanOverride
            | EntitlementSource::BillingOverride
    );

    let needs_upgrade = if has_override || trial.is_trialing {
        false
    } else {
        trial.is_expired || state.subscription_status.is_some_and(|s| s.is_lapsed())
    };

    Entitlement {
        plan,
        source,
        features: plan.features(),
        max_crew_members: plan.max_crew_members(),
        trial,
        needs_upgrade,
        has_override,
        is_super_admin: user.is_super_admin,
        subscription_status: state.subscription_status,
    }
}
