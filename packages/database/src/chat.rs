//! Campaign chat repository.

use field_mapper_campaign_models::ChatMessage;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

fn row_to_message(row: &Row) -> Result<ChatMessage, DbError> {
    Ok(ChatMessage {
        id: row.to_value("id")?,
        campaign_id: row.to_value("campaign_id")?,
        sender_id: row.to_value("sender_id")?,
        receiver_id: row.to_value("receiver_id")?,
        message: row.to_value("message")?,
        send_time: row.to_value("send_time")?,
        delivered: row.to_value("delivered")?,
    })
}

/// Inserts a chat message and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub async fn insert_message(
    db: &dyn Database,
    campaign_id: i32,
    sender_id: i32,
    receiver_id: i32,
    message: &str,
) -> Result<ChatMessage, DbError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO chat_messages (campaign_id, sender_id, receiver_id, message, send_time)
             VALUES ($1, $2, $3, $4, NOW())
             RETURNING id, campaign_id, sender_id, receiver_id, message, send_time, delivered",
            &[
                DatabaseValue::Int32(campaign_id),
                DatabaseValue::Int32(sender_id),
                DatabaseValue::Int32(receiver_id),
                DatabaseValue::String(message.to_string()),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Failed to get chat row from insert".to_string(),
    })?;

    row_to_message(row)
}

/// Returns all chat messages for a campaign in send order.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_campaign_messages(
    db: &dyn Database,
    campaign_id: i32,
) -> Result<Vec<ChatMessage>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, campaign_id, sender_id, receiver_id, message, send_time, delivered
             FROM chat_messages WHERE campaign_id = $1
             ORDER BY send_time",
            &[DatabaseValue::Int32(campaign_id)],
        )
        .await?;

    rows.iter().map(row_to_message).collect()
}

/// Marks a chat message as delivered.
///
/// # Errors
///
/// Returns [`DbError`] if the update fails.
pub async fn mark_delivered(db: &dyn Database, message_id: i32) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE chat_messages SET delivered = TRUE WHERE id = $1",
        &[DatabaseValue::Int32(message_id)],
    )
    .await?;

    Ok(())
}
