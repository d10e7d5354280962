//! Campaign notification repository.

use field_mapper_campaign_models::Notification;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

fn row_to_notification(row: &Row) -> Result<Notification, DbError> {
    Ok(Notification {
        id: row.to_value("id")?,
        campaign_id: row.to_value("campaign_id")?,
        sender_id: row.to_value("sender_id")?,
        message: row.to_value("message")?,
        sent_at: row.to_value("sent_at")?,
        delivered: row.to_value("delivered")?,
    })
}

/// Inserts a notification and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub async fn insert_notification(
    db: &dyn Database,
    campaign_id: i32,
    sender_id: i32,
    message: &str,
) -> Result<Notification, DbError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO notifications (campaign_id, sender_id, message, sent_at)
             VALUES ($1, $2, $3, NOW())
             RETURNING id, campaign_id, sender_id, message, sent_at, delivered",
            &[
                DatabaseValue::Int32(campaign_id),
                DatabaseValue::Int32(sender_id),
                DatabaseValue::String(message.to_string()),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Failed to get notification row from insert".to_string(),
    })?;

    row_to_notification(row)
}

/// Returns the undelivered notifications for a campaign, oldest first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_undelivered(
    db: &dyn Database,
    campaign_id: i32,
) -> Result<Vec<Notification>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, campaign_id, sender_id, message, sent_at, delivered
             FROM notifications
             WHERE campaign_id = $1 AND delivered = FALSE
             ORDER BY sent_at",
            &[DatabaseValue::Int32(campaign_id)],
        )
        .await?;

    rows.iter().map(row_to_notification).collect()
}

/// Marks a notification as delivered.
///
/// # Errors
///
/// Returns [`DbError`] if the update fails.
pub async fn mark_delivered(db: &dyn Database, notification_id: i32) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE notifications SET delivered = TRUE WHERE id = $1",
        &[DatabaseValue::Int32(notification_id)],
    )
    .await?;

    Ok(())
}
