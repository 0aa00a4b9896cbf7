//! Plan tiers and the fixed tier → feature / seat mapping

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Subscription plan tier, ordered `Starter < Professional < Business`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Starter,
    Professional,
    Business,
}

impl PlanTier {
    pub const ALL: [PlanTier; 3] = [Self::Starter, Self::Professional, Self::Business];

    /// Parse from database / API string value (lowercase)
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "starter" => Some(Self::Starter),
            "professional" => Some(Self::Professional),
            "business" => Some(Self::Business),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Professional => "professional",
            Self::Business => "business",
        }
    }

    /// Features enabled for this tier
    pub fn features(&self) -> FeatureSet {
        let features: &[Feature] = match self {
            Self::Starter => STARTER_FEATURES,
            Self::Professional => PROFESSIONAL_FEATURES,
            Self::Business => BUSINESS_FEATURES,
        };
        features.iter().copied().collect()
    }

    /// Crew seat ceiling. `None` = unbounded.
    pub fn max_crew_members(&self) -> Option<u32> {
        match self {
            Self::Starter => Some(3),
            Self::Professional => Some(10),
            Self::Business => None,
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature flag gated by plan tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Jobs,
    Quotes,
    Invoices,
    Customers,
    Reports,
    Scheduling,
    PurchaseOrders,
    Leads,
    Products,
    Chat,
    Branding,
    Api,
}

const STARTER_FEATURES: &[Feature] = &[
    Feature::Jobs,
    Feature::Quotes,
    Feature::Invoices,
    Feature::Customers,
];

const PROFESSIONAL_FEATURES: &[Feature] = &[
    Feature::Jobs,
    Feature::Quotes,
    Feature::Invoices,
    Feature::Customers,
    Feature::Reports,
    Feature::Scheduling,
    Feature::PurchaseOrders,
    Feature::Leads,
    Feature::Products,
];

const BUSINESS_FEATURES: &[Feature] = &[
    Feature::Jobs,
    Feature::Quotes,
    Feature::Invoices,
    Feature::Customers,
    Feature::Reports,
    Feature::Scheduling,
    Feature::PurchaseOrders,
    Feature::Leads,
    Feature::Products,
    Feature::Chat,
    Feature::Branding,
    Feature::Api,
];

/// Set of enabled features, serialized as a sorted array of camelCase names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(BTreeSet<Feature>);

impl FeatureSet {
    pub fn contains(&self, feature: Feature) -> bool {
        self.0.contains(&feature)
    }

    pub fn is_subset(&self, other: &FeatureSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_tiers_are_supersets() {
        for lower in PlanTier::ALL {
            for higher in PlanTier::ALL.into_iter().filter(|t| *t > lower) {
                let lo = lower.features();
                let hi = higher.features();
                assert!(lo.is_subset(&hi), "{lower} ⊄ {higher}");
                assert!(hi.len() > lo.len(), "{higher} must add features over {lower}");
            }
        }
    }

    #[test]
    fn seat_ceilings() {
        assert_eq!(PlanTier::Starter.max_crew_members(), Some(3));
        assert_eq!(PlanTier::Professional.max_crew_members(), Some(10));
        assert_eq!(PlanTier::Business.max_crew_members(), None);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(PlanTier::parse("business"), Some(PlanTier::Business));
        assert_eq!(PlanTier::parse("Business"), None);
        assert_eq!(PlanTier::parse("enterprise"), None);
        assert_eq!(PlanTier::parse(""), None);
    }

    #[test]
    fn chat_is_business_only() {
        assert!(!PlanTier::Starter.features().contains(Feature::Chat));
        assert!(!PlanTier::Professional.features().contains(Feature::Chat));
        assert!(PlanTier::Business.features().contains(Feature::Chat));
    }

    #[test]
    fn feature_set_serializes_camel_case() {
        let set: FeatureSet = [Feature::PurchaseOrders, Feature::Jobs].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["jobs","purchaseOrders"]"#);
    }
}
