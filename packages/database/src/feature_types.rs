//! Feature type, template, and attribute repository.

use field_mapper_campaign_models::{Attribute, FeatureTemplate, FeatureType, NewFeatureType};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

fn row_to_feature_type(row: &Row) -> Result<FeatureType, DbError> {
    Ok(FeatureType {
        id: row.to_value("id")?,
        feature: row.to_value("feature")?,
        name: row.to_value("name")?,
        is_template: row.to_value("is_template")?,
    })
}

fn row_to_attribute(row: &Row) -> Result<Attribute, DbError> {
    Ok(Attribute {
        id: row.to_value("id")?,
        name: row.to_value("name")?,
    })
}

fn row_to_template(row: &Row) -> Result<FeatureTemplate, DbError> {
    Ok(FeatureTemplate {
        id: row.to_value("id")?,
        name: row.to_value("name")?,
        description: row.to_value("description")?,
        feature_type_id: row.to_value("feature_type_id")?,
    })
}

/// Creates a feature type row.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub async fn create_feature_type(
    db: &dyn Database,
    feature: &str,
    name: Option<&str>,
    is_template: bool,
) -> Result<FeatureType, DbError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO feature_types (feature, name, is_template)
             VALUES ($1, $2, $3)
             RETURNING id, feature, name, is_template",
            &[
                DatabaseValue::String(feature.to_string()),
                name.map_or(DatabaseValue::Null, |n| DatabaseValue::String(n.to_string())),
                DatabaseValue::Bool(is_template),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Failed to get feature type row from insert".to_string(),
    })?;

    row_to_feature_type(row)
}

/// Creates the feature types described by `types` and attaches them — with
/// their tag attributes — to the campaign.
///
/// # Errors
///
/// Returns [`DbError`] if any insert or association fails.
pub async fn save_campaign_feature_types(
    db: &dyn Database,
    campaign_id: i32,
    types: &[NewFeatureType],
) -> Result<Vec<FeatureType>, DbError> {
    let mut created = Vec::with_capacity(types.len());

    for new_type in types {
        let feature_type =
            create_feature_type(db, &new_type.feature, new_type.name.as_deref(), false).await?;

        for tag in &new_type.tags {
            let rows = db
                .query_raw_params(
                    "INSERT INTO attributes (name) VALUES ($1) RETURNING id, name",
                    &[DatabaseValue::String(tag.clone())],
                )
                .await?;

            let row = rows.first().ok_or_else(|| DbError::Conversion {
                message: "Failed to get attribute row from insert".to_string(),
            })?;
            let attribute = row_to_attribute(row)?;

            db.exec_raw_params(
                "INSERT INTO feature_type_attributes (attribute_id, feature_type_id)
                 VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
                &[
                    DatabaseValue::Int32(attribute.id),
                    DatabaseValue::Int32(feature_type.id),
                ],
            )
            .await?;
        }

        db.exec_raw_params(
            "INSERT INTO campaign_feature_types (campaign_id, feature_type_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
            &[
                DatabaseValue::Int32(campaign_id),
                DatabaseValue::Int32(feature_type.id),
            ],
        )
        .await?;

        created.push(feature_type);
    }

    Ok(created)
}

/// Returns the feature types offered as reusable templates.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_template_feature_types(db: &dyn Database) -> Result<Vec<FeatureType>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, feature, name, is_template
             FROM feature_types WHERE is_template = TRUE
             ORDER BY id",
            &[],
        )
        .await?;

    rows.iter().map(row_to_feature_type).collect()
}

/// Returns the most recently created feature type with the given name.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_feature_type_by_name(
    db: &dyn Database,
    name: &str,
) -> Result<Option<FeatureType>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, feature, name, is_template
             FROM feature_types WHERE name = $1
             ORDER BY id DESC LIMIT 1",
            &[DatabaseValue::String(name.to_string())],
        )
        .await?;

    rows.first().map(row_to_feature_type).transpose()
}

/// Returns the feature types attached to a campaign.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_campaign_feature_types(
    db: &dyn Database,
    campaign_id: i32,
) -> Result<Vec<FeatureType>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT ft.id, ft.feature, ft.name, ft.is_template
             FROM feature_types ft
             JOIN campaign_feature_types cft ON cft.feature_type_id = ft.id
             WHERE cft.campaign_id = $1
             ORDER BY ft.id",
            &[DatabaseValue::Int32(campaign_id)],
        )
        .await?;

    rows.iter().map(row_to_feature_type).collect()
}

/// Returns the tag attributes collected for a feature type.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_feature_type_attributes(
    db: &dyn Database,
    feature_type_id: i32,
) -> Result<Vec<Attribute>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT a.id, a.name
             FROM attributes a
             JOIN feature_type_attributes fta ON fta.attribute_id = a.id
             WHERE fta.feature_type_id = $1
             ORDER BY a.id",
            &[DatabaseValue::Int32(feature_type_id)],
        )
        .await?;

    rows.iter().map(row_to_attribute).collect()
}

/// Detaches and deletes all feature types attached to the campaign,
/// together with their attribute associations.
///
/// # Errors
///
/// Returns [`DbError`] if any delete fails.
pub async fn delete_campaign_feature_types(
    db: &dyn Database,
    campaign_id: i32,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "DELETE FROM feature_type_attributes
         WHERE feature_type_id IN (
             SELECT feature_type_id FROM campaign_feature_types WHERE campaign_id = $1
         )",
        &[DatabaseValue::Int32(campaign_id)],
    )
    .await?;

    db.exec_raw_params(
        "DELETE FROM feature_types
         WHERE id IN (
             SELECT feature_type_id FROM campaign_feature_types WHERE campaign_id = $1
         )
         AND is_template = FALSE",
        &[DatabaseValue::Int32(campaign_id)],
    )
    .await?;

    db.exec_raw_params(
        "DELETE FROM campaign_feature_types WHERE campaign_id = $1",
        &[DatabaseValue::Int32(campaign_id)],
    )
    .await?;

    Ok(())
}

/// Returns all feature templates.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_feature_templates(db: &dyn Database) -> Result<Vec<FeatureTemplate>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, description, feature_type_id
             FROM feature_templates ORDER BY id",
            &[],
        )
        .await?;

    rows.iter().map(row_to_template).collect()
}
