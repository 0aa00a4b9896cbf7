use sqlx::PgExecutor;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub organization_id: Option<String>,
    pub display_name: String,
    pub email: String,
    pub is_super_admin: bool,
    pub created_at: i64,
}

/// Look up a user that belongs to `organization_id`
pub async fn find_in_organization<'e>(
    executor: impl PgExecutor<'e>,
    organization_id: &str,
    user_id: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1 AND organization_id = $2")
        .bind(user_id)
        .bind(organization_id)
        .fetch_optional(executor)
        .await
}
