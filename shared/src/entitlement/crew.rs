//! Crew roster model and active-seat counting

use serde::{Deserialize, Serialize};

use super::resolver::Entitlement;

/// Crew member as exposed by the roster endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct CrewMember {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    /// Only an explicit `false` marks a member inactive
    pub is_active: Option<bool>,
    pub created_at: i64,
}

impl CrewMember {
    pub fn occupies_seat(&self) -> bool {
        self.is_active != Some(false)
    }
}

/// Count members that occupy a seat (not explicitly inactive)
pub fn count_active(members: &[CrewMember]) -> usize {
    members.iter().filter(|m| m.occupies_seat()).count()
}

/// Seat usage summary returned next to the entitlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewSeats {
    pub active: usize,
    pub max: Option<u32>,
    pub can_add_more: bool,
}

impl CrewSeats {
    pub fn evaluate(entitlement: &Entitlement, active: usize) -> Self {
        Self {
            active,
            max: entitlement.max_crew_members,
            can_add_more: entitlement.can_add_more_crew(active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlement::{OrganizationState, RequestingUser, resolve};

    fn member(id: &str, is_active: Option<bool>) -> CrewMember {
        CrewMember {
            id: id.to_string(),
            organization_id: "org-1".to_string(),
            name: format!("Crew {id}"),
            email: None,
            role: None,
            is_active,
            created_at: 0,
        }
    }

    #[test]
    fn unset_flag_counts_as_active() {
        let roster = vec![
            member("a", Some(true)),
            member("b", None),
            member("c", Some(false)),
        ];
        assert_eq!(count_active(&roster), 2);
    }

    #[test]
    fn starter_seats_fill_at_three() {
        let ent = resolve(
            &OrganizationState::default(),
            &RequestingUser::default(),
            chrono::Utc::now(),
        );

        let mut roster = vec![member("a", None), member("b", None)];
        let seats = CrewSeats::evaluate(&ent, count_active(&roster));
        assert_eq!(seats.max, Some(3));
        assert!(seats.can_add_more);

        roster.push(member("c", Some(true)));
        roster.push(member("d", Some(false)));
        let seats = CrewSeats::evaluate(&ent, count_active(&roster));
        assert_eq!(seats.active, 3);
        assert!(!seats.can_add_more);
    }
}
