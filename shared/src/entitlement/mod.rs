//! Plan entitlements: tiers, billing status parsing and the resolver
//!
//! ```text
//! RawOrganizationState ──parse──▶ OrganizationState
//!                                        │
//!                 RequestingUser, now ──▶ resolve() ──▶ Entitlement
//!                                                        ├── features / maxCrewMembers
//!                                                        ├── trial
//!                                                        └── needsUpgrade
//! ```

mod crew;
mod plan;
mod resolver;
mod status;

pub use crew::{CrewMember, CrewSeats, count_active};
pub use plan::{Feature, FeatureSet, PlanTier};
pub use resolver::{
    Entitlement, EntitlementSource, OrganizationState, RawOrganizationState, RequestingUser,
    TrialInfo, resolve,
};
pub use status::{BillingOverride, SubscriptionStatus};
