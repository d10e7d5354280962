//! Task boundary and team repository.
//!
//! Boundaries arrive as uploaded `GeoJSON` feature collections. The polygon
//! goes into `PostGIS` via `ST_GeomFromGeoJSON`; the surrounding properties
//! (`area`, `status`, `team`) become boundary/team rows.

use field_mapper_campaign_models::{TaskBoundary, Team};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

fn row_to_boundary(row: &Row) -> Result<TaskBoundary, DbError> {
    Ok(TaskBoundary {
        id: row.to_value("id")?,
        campaign_id: row.to_value("campaign_id")?,
        name: row.to_value("name")?,
        status: row.to_value("status")?,
        boundary_type: row.to_value("boundary_type")?,
    })
}

fn row_to_team(row: &Row) -> Result<Team, DbError> {
    Ok(Team {
        id: row.to_value("id")?,
        name: row.to_value("name")?,
        boundary_id: row.to_value("boundary_id")?,
    })
}

/// Stores the first feature of an uploaded `GeoJSON` feature collection as
/// the campaign's task boundary, together with its assigned team.
///
/// Returns the created boundary.
///
/// # Errors
///
/// Returns [`DbError`] if the payload is missing the expected
/// feature/properties structure, the polygon is rejected by `PostGIS`, or
/// any insert fails.
pub async fn save_task_boundary(
    db: &dyn Database,
    campaign_id: i32,
    collection: &serde_json::Value,
) -> Result<TaskBoundary, DbError> {
    let feature = collection["features"]
        .get(0)
        .ok_or_else(|| DbError::Conversion {
            message: "Boundary upload has no features".to_string(),
        })?;

    let geometry = feature.get("geometry").ok_or_else(|| DbError::Conversion {
        message: "Boundary feature has no geometry".to_string(),
    })?;

    let properties = &feature["properties"];
    let name = properties["area"].as_str();
    let status = properties["status"].as_str();
    let team = properties["team"].as_str();
    let boundary_type = collection["type"].as_str();

    let rows = db
        .query_raw_params(
            "INSERT INTO task_boundaries (campaign_id, coordinates, name, status, boundary_type)
             VALUES ($1, ST_SetSRID(ST_GeomFromGeoJSON($2), 4326), $3, $4, $5)
             RETURNING id, campaign_id, name, status, boundary_type",
            &[
                DatabaseValue::Int32(campaign_id),
                DatabaseValue::String(geometry.to_string()),
                name.map_or(DatabaseValue::Null, |n| DatabaseValue::String(n.to_string())),
                status.map_or(DatabaseValue::Null, |s| DatabaseValue::String(s.to_string())),
                boundary_type.map_or(DatabaseValue::Null, |t| {
                    DatabaseValue::String(t.to_string())
                }),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Failed to get boundary row from insert".to_string(),
    })?;

    let boundary = row_to_boundary(row)?;

    if let Some(team_name) = team {
        db.exec_raw_params(
            "INSERT INTO teams (name, boundary_id) VALUES ($1, $2)",
            &[
                DatabaseValue::String(team_name.to_string()),
                DatabaseValue::Int32(boundary.id),
            ],
        )
        .await?;
    }

    Ok(boundary)
}

/// Returns the campaign's task boundary, if one was uploaded.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_task_boundary(
    db: &dyn Database,
    campaign_id: i32,
) -> Result<Option<TaskBoundary>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, campaign_id, name, status, boundary_type
             FROM task_boundaries WHERE campaign_id = $1
             ORDER BY id LIMIT 1",
            &[DatabaseValue::Int32(campaign_id)],
        )
        .await?;

    rows.first().map(row_to_boundary).transpose()
}

/// Returns the campaign's task boundary polygon as a `GeoJSON` geometry
/// string.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_task_boundary_geojson(
    db: &dyn Database,
    campaign_id: i32,
) -> Result<Option<String>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT ST_AsGeoJSON(coordinates) AS geojson
             FROM task_boundaries WHERE campaign_id = $1
             ORDER BY id LIMIT 1",
            &[DatabaseValue::Int32(campaign_id)],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    Ok(row.to_value("geojson")?)
}

/// Deletes all task boundaries for the campaign, together with their teams.
///
/// # Errors
///
/// Returns [`DbError`] if any delete fails.
pub async fn delete_task_boundaries(db: &dyn Database, campaign_id: i32) -> Result<(), DbError> {
    db.exec_raw_params(
        "DELETE FROM teams
         WHERE boundary_id IN (
             SELECT id FROM task_boundaries WHERE campaign_id = $1
         )",
        &[DatabaseValue::Int32(campaign_id)],
    )
    .await?;

    db.exec_raw_params(
        "DELETE FROM task_boundaries WHERE campaign_id = $1",
        &[DatabaseValue::Int32(campaign_id)],
    )
    .await?;

    Ok(())
}

/// Returns all teams.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_all_teams(db: &dyn Database) -> Result<Vec<Team>, DbError> {
    let rows = db
        .query_raw_params("SELECT id, name, boundary_id FROM teams ORDER BY id", &[])
        .await?;

    rows.iter().map(row_to_team).collect()
}

/// Adds a user to a team.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub async fn add_team_member(db: &dyn Database, team_id: i32, user_id: i32) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO team_members (user_id, team_id)
         VALUES ($1, $2)
         ON CONFLICT DO NOTHING",
        &[
            DatabaseValue::Int32(user_id),
            DatabaseValue::Int32(team_id),
        ],
    )
    .await?;

    Ok(())
}
