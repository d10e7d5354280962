//! User repository.

use field_mapper_campaign_models::{User, UserUpdate};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

fn row_to_user(row: &Row) -> Result<User, DbError> {
    Ok(User {
        id: row.to_value("id")?,
        osm_user_id: row.to_value("osm_user_id")?,
        email: row.to_value("email")?,
    })
}

/// Creates a user and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails (e.g. duplicate OSM username).
pub async fn create_user(
    db: &dyn Database,
    osm_user_id: &str,
    email: Option<&str>,
) -> Result<User, DbError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO users (osm_user_id, email)
             VALUES ($1, $2)
             RETURNING id, osm_user_id, email",
            &[
                DatabaseValue::String(osm_user_id.to_string()),
                email.map_or(DatabaseValue::Null, |e| DatabaseValue::String(e.to_string())),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Failed to get user row from insert".to_string(),
    })?;

    row_to_user(row)
}

/// Returns the user with the given OSM username, if registered.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_user_by_osm_id(
    db: &dyn Database,
    osm_user_id: &str,
) -> Result<Option<User>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, osm_user_id, email FROM users WHERE osm_user_id = $1",
            &[DatabaseValue::String(osm_user_id.to_string())],
        )
        .await?;

    rows.first().map(row_to_user).transpose()
}

/// Returns all registered users.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_all_users(db: &dyn Database) -> Result<Vec<User>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, osm_user_id, email FROM users ORDER BY id",
            &[],
        )
        .await?;

    rows.iter().map(row_to_user).collect()
}

/// Applies the non-`None` fields of `update` to the user.
///
/// # Errors
///
/// Returns [`DbError`] if the update fails.
pub async fn update_user(db: &dyn Database, id: i32, update: &UserUpdate) -> Result<(), DbError> {
    if let Some(ref osm_user_id) = update.osm_user_id {
        db.exec_raw_params(
            "UPDATE users SET osm_user_id = $2 WHERE id = $1",
            &[
                DatabaseValue::Int32(id),
                DatabaseValue::String(osm_user_id.clone()),
            ],
        )
        .await?;
    }

    if let Some(ref email) = update.email {
        db.exec_raw_params(
            "UPDATE users SET email = $2 WHERE id = $1",
            &[
                DatabaseValue::Int32(id),
                DatabaseValue::String(email.clone()),
            ],
        )
        .await?;
    }

    Ok(())
}

/// Deletes the user.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails (e.g. the user still owns
/// campaigns).
pub async fn delete_user(db: &dyn Database, id: i32) -> Result<(), DbError> {
    db.exec_raw_params(
        "DELETE FROM users WHERE id = $1",
        &[DatabaseValue::Int32(id)],
    )
    .await?;

    Ok(())
}
