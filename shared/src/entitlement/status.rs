//! Boundary parsing of billing status strings
//!
//! Raw strings coming from the database or the billing provider are parsed
//! once into tagged variants. Anything unrecognized (including the
//! `no_org` sentinel used before an organization exists) becomes `None`.

use serde::{Deserialize, Serialize};

/// Billing-side subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    Canceled,
    Unpaid,
}

impl SubscriptionStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "trialing" => Some(Self::Trialing),
            "active" => Some(Self::Active),
            "past_due" => Some(Self::PastDue),
            "canceled" => Some(Self::Canceled),
            "unpaid" => Some(Self::Unpaid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trialing => "trialing",
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Unpaid => "unpaid",
        }
    }

    /// Canceled or unpaid subscriptions lose paid entitlement.
    pub fn is_lapsed(&self) -> bool {
        matches!(self, Self::Canceled | Self::Unpaid)
    }
}

/// Administrative billing bypass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingOverride {
    /// Organization is not billed and gets business-tier features
    Free,
}

impl BillingOverride {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "free" => Some(Self::Free),
            _ => None,
        }
    }
}
