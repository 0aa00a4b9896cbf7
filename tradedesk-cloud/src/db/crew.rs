use shared::entitlement::CrewMember;
use sqlx::PgExecutor;

pub struct NewCrewMember<'a> {
    pub id: &'a str,
    pub organization_id: &'a str,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub role: Option<&'a str>,
    pub now: i64,
}

pub async fn list_by_organization<'e>(
    executor: impl PgExecutor<'e>,
    organization_id: &str,
) -> Result<Vec<CrewMember>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, organization_id, name, email, role, is_active, created_at
         FROM crew_members WHERE organization_id = $1 ORDER BY created_at",
    )
    .bind(organization_id)
    .fetch_all(executor)
    .await
}

/// Members occupying a seat: only an explicit `FALSE` frees one
pub async fn count_active<'e>(
    executor: impl PgExecutor<'e>,
    organization_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM crew_members
         WHERE organization_id = $1 AND is_active IS DISTINCT FROM FALSE",
    )
    .bind(organization_id)
    .fetch_one(executor)
    .await
}

pub async fn email_exists<'e>(
    executor: impl PgExecutor<'e>,
    organization_id: &str,
    email: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM crew_members
         WHERE organization_id = $1 AND lower(email) = lower($2))",
    )
    .bind(organization_id)
    .bind(email)
    .fetch_one(executor)
    .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    member: &NewCrewMember<'_>,
) -> Result<CrewMember, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO crew_members (id, organization_id, name, email, role, is_active, created_at)
         VALUES ($1, $2, $3, $4, $5, TRUE, $6)
         RETURNING id, organization_id, name, email, role, is_active, created_at",
    )
    .bind(member.id)
    .bind(member.organization_id)
    .bind(member.name)
    .bind(member.email)
    .bind(member.role)
    .bind(member.now)
    .fetch_one(executor)
    .await
}
