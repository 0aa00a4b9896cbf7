use shared::realtime::{ChatMessage, DirectMessage};
use sqlx::PgExecutor;

pub async fn insert_channel_message<'e>(
    executor: impl PgExecutor<'e>,
    msg: &ChatMessage,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO chat_messages (id, organization_id, channel_id, sender_id, sender_name, body, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(&msg.id)
    .bind(&msg.organization_id)
    .bind(&msg.channel_id)
    .bind(&msg.sender_id)
    .bind(&msg.sender_name)
    .bind(&msg.body)
    .bind(msg.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_direct_message<'e>(
    executor: impl PgExecutor<'e>,
    msg: &DirectMessage,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO chat_messages (id, organization_id, recipient_id, sender_id, sender_name, body, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(&msg.id)
    .bind(&msg.organization_id)
    .bind(&msg.recipient_id)
    .bind(&msg.sender_id)
    .bind(&msg.sender_name)
    .bind(&msg.body)
    .bind(msg.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Most recent channel messages, newest first
pub async fn list_channel<'e>(
    executor: impl PgExecutor<'e>,
    organization_id: &str,
    channel_id: &str,
    limit: i64,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    let rows: Vec<(String, String, String, String, String, String, i64)> = sqlx::query_as(
        "SELECT id, organization_id, channel_id, sender_id, sender_name, body, created_at
         FROM chat_messages
         WHERE organization_id = $1 AND channel_id = $2
         ORDER BY created_at DESC LIMIT $3",
    )
    .bind(organization_id)
    .bind(channel_id)
    .bind(limit)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(id, organization_id, channel_id, sender_id, sender_name, body, created_at)| {
                ChatMessage {
                    id,
                    organization_id,
                    channel_id,
                    sender_id,
                    sender_name,
                    body,
                    created_at,
                }
            },
        )
        .collect())
}
