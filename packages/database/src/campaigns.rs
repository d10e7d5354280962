//! Campaign repository.
//!
//! Active/inactive classification is evaluated in SQL against `NOW()` so it
//! matches what any concurrent writer sees, rather than a client-side clock.

use field_mapper_campaign_models::{Campaign, CampaignUpdate, NewCampaign};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::{DbError, users};

const CAMPAIGN_COLUMNS: &str = "id, creator_id, name, description, start_date, end_date, \
     created_on, link_to_openmapkit, version, uuid, remote_projects, map_type, thumbnail";

fn row_to_campaign(row: &Row) -> Result<Campaign, DbError> {
    Ok(Campaign {
        id: row.to_value("id")?,
        creator_id: row.to_value("creator_id")?,
        name: row.to_value("name")?,
        description: row.to_value("description")?,
        start_date: row.to_value("start_date")?,
        end_date: row.to_value("end_date")?,
        created_on: row.to_value("created_on")?,
        link_to_openmapkit: row.to_value("link_to_openmapkit")?,
        version: row.to_value("version")?,
        uuid: row.to_value("uuid")?,
        remote_projects: row.to_value("remote_projects")?,
        map_type: row.to_value("map_type")?,
        thumbnail: row.to_value("thumbnail")?,
    })
}

/// Creates a campaign, assigning it a fresh UUID, and returns the stored
/// row. The creator is also registered as the first campaign manager.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails (e.g. duplicate campaign name).
pub async fn create_campaign(db: &dyn Database, new: &NewCampaign) -> Result<Campaign, DbError> {
    let uuid = uuid::Uuid::new_v4().to_string();

    let rows = db
        .query_raw_params(
            &format!(
                "INSERT INTO campaigns (
                    creator_id, name, description, start_date, end_date,
                    created_on, link_to_openmapkit, version, uuid,
                    remote_projects, map_type
                ) VALUES ($1, $2, $3, $4, $5, NOW(), $6, $7, $8, $9, $10)
                RETURNING {CAMPAIGN_COLUMNS}"
            ),
            &[
                DatabaseValue::Int32(new.creator_id),
                DatabaseValue::String(new.name.clone()),
                new.description
                    .as_ref()
                    .map_or(DatabaseValue::Null, |d| DatabaseValue::String(d.clone())),
                DatabaseValue::DateTime(new.start_date),
                DatabaseValue::DateTime(new.end_date),
                DatabaseValue::Bool(new.link_to_openmapkit),
                new.version.map_or(DatabaseValue::Null, DatabaseValue::Int32),
                DatabaseValue::String(uuid),
                new.remote_projects
                    .as_ref()
                    .map_or(DatabaseValue::Null, |r| DatabaseValue::String(r.clone())),
                new.map_type
                    .as_ref()
                    .map_or(DatabaseValue::Null, |m| DatabaseValue::String(m.clone())),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Failed to get campaign row from insert".to_string(),
    })?;

    let campaign = row_to_campaign(row)?;

    db.exec_raw_params(
        "INSERT INTO campaign_managers (user_id, campaign_id)
         VALUES ($1, $2)
         ON CONFLICT DO NOTHING",
        &[
            DatabaseValue::Int32(campaign.creator_id),
            DatabaseValue::Int32(campaign.id),
        ],
    )
    .await?;

    Ok(campaign)
}

/// Returns the campaign with the given UUID, if it exists.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_campaign_by_uuid(
    db: &dyn Database,
    uuid: &str,
) -> Result<Option<Campaign>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE uuid = $1"),
            &[DatabaseValue::String(uuid.to_string())],
        )
        .await?;

    rows.first().map(row_to_campaign).transpose()
}

/// Returns all campaigns.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_all_campaigns(db: &dyn Database) -> Result<Vec<Campaign>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns ORDER BY id"),
            &[],
        )
        .await?;

    rows.iter().map(row_to_campaign).collect()
}

/// Returns all campaigns whose date range contains the current time.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_active_campaigns(db: &dyn Database) -> Result<Vec<Campaign>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT {CAMPAIGN_COLUMNS} FROM campaigns
                 WHERE start_date <= NOW() AND NOW() <= end_date
                 ORDER BY id"
            ),
            &[],
        )
        .await?;

    rows.iter().map(row_to_campaign).collect()
}

/// Returns the number of currently active campaigns.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_active_campaign_count(db: &dyn Database) -> Result<u64, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT COUNT(*) AS active_count FROM campaigns
             WHERE start_date <= NOW() AND NOW() <= end_date",
            &[],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Failed to get active campaign count".to_string(),
    })?;

    let count: i64 = row.to_value("active_count")?;
    Ok(count.try_into().unwrap_or(0))
}

/// Returns all campaigns that have not started yet or have already ended.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_inactive_campaigns(db: &dyn Database) -> Result<Vec<Campaign>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT {CAMPAIGN_COLUMNS} FROM campaigns
                 WHERE start_date > NOW() OR end_date < NOW()
                 ORDER BY id"
            ),
            &[],
        )
        .await?;

    rows.iter().map(row_to_campaign).collect()
}

/// Applies the non-`None` fields of `update` to the campaign.
///
/// # Errors
///
/// Returns [`DbError`] if the update fails.
pub async fn update_campaign(
    db: &dyn Database,
    id: i32,
    update: &CampaignUpdate,
) -> Result<(), DbError> {
    if let Some(ref name) = update.name {
        db.exec_raw_params(
            "UPDATE campaigns SET name = $2 WHERE id = $1",
            &[DatabaseValue::Int32(id), DatabaseValue::String(name.clone())],
        )
        .await?;
    }

    if let Some(ref description) = update.description {
        db.exec_raw_params(
            "UPDATE campaigns SET description = $2 WHERE id = $1",
            &[
                DatabaseValue::Int32(id),
                DatabaseValue::String(description.clone()),
            ],
        )
        .await?;
    }

    if let Some(start_date) = update.start_date {
        db.exec_raw_params(
            "UPDATE campaigns SET start_date = $2 WHERE id = $1",
            &[
                DatabaseValue::Int32(id),
                DatabaseValue::DateTime(start_date),
            ],
        )
        .await?;
    }

    if let Some(end_date) = update.end_date {
        db.exec_raw_params(
            "UPDATE campaigns SET end_date = $2 WHERE id = $1",
            &[DatabaseValue::Int32(id), DatabaseValue::DateTime(end_date)],
        )
        .await?;
    }

    Ok(())
}

/// Stores the campaign's own polygon from a `GeoJSON` geometry value.
///
/// # Errors
///
/// Returns [`DbError`] if the geometry is rejected by `PostGIS` or the
/// update fails.
pub async fn set_campaign_geometry(
    db: &dyn Database,
    id: i32,
    geometry: &serde_json::Value,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE campaigns
         SET geometry = ST_SetSRID(ST_GeomFromGeoJSON($2), 4326)
         WHERE id = $1",
        &[
            DatabaseValue::Int32(id),
            DatabaseValue::String(geometry.to_string()),
        ],
    )
    .await?;

    Ok(())
}

/// Deletes the campaign.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails.
pub async fn delete_campaign(db: &dyn Database, id: i32) -> Result<(), DbError> {
    db.exec_raw_params(
        "DELETE FROM campaigns WHERE id = $1",
        &[DatabaseValue::Int32(id)],
    )
    .await?;

    Ok(())
}

/// Returns the number of users participating in the campaign.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_participant_count(db: &dyn Database, campaign_id: i32) -> Result<u64, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT COUNT(*) AS participant_count
             FROM campaign_managers WHERE campaign_id = $1",
            &[DatabaseValue::Int32(campaign_id)],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Failed to get participant count".to_string(),
    })?;

    let count: i64 = row.to_value("participant_count")?;
    Ok(count.try_into().unwrap_or(0))
}

/// Returns the OSM usernames of the campaign's managers.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_managers(db: &dyn Database, campaign_id: i32) -> Result<Vec<String>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT u.osm_user_id
             FROM users u
             JOIN campaign_managers cm ON cm.user_id = u.id
             WHERE cm.campaign_id = $1
             ORDER BY u.osm_user_id",
            &[DatabaseValue::Int32(campaign_id)],
        )
        .await?;

    rows.iter()
        .map(|row| row.to_value("osm_user_id").map_err(DbError::from))
        .collect()
}

/// Assigns the given OSM usernames as campaign managers.
///
/// Users that are not registered yet are created on the fly; users that are
/// already managers are skipped.
///
/// # Errors
///
/// Returns [`DbError`] if any lookup, insert, or association fails.
pub async fn assign_managers(
    db: &dyn Database,
    campaign_id: i32,
    osm_user_ids: &[&str],
) -> Result<(), DbError> {
    for osm_user_id in osm_user_ids {
        let user = match users::get_user_by_osm_id(db, osm_user_id).await? {
            Some(user) => user,
            None => users::create_user(db, osm_user_id, None).await?,
        };

        db.exec_raw_params(
            "INSERT INTO campaign_managers (user_id, campaign_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
            &[
                DatabaseValue::Int32(user.id),
                DatabaseValue::Int32(campaign_id),
            ],
        )
        .await?;
    }

    Ok(())
}
