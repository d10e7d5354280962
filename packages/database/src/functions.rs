//! Insight function repository.

use field_mapper_campaign_models::{InsightFunction, NewInsightFunction};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::{DbError, feature_types};

fn row_to_function(row: &Row) -> Result<InsightFunction, DbError> {
    Ok(InsightFunction {
        id: row.to_value("id")?,
        name: row.to_value("name")?,
        feature: row.to_value("feature")?,
        feature_type_id: row.to_value("feature_type_id")?,
    })
}

/// Creates the given insight functions and attaches them to the campaign.
///
/// Each function's feature type is resolved by name to the latest feature
/// type of that name; an unresolvable name is an error.
///
/// # Errors
///
/// Returns [`DbError`] if a feature type name cannot be resolved or any
/// insert fails.
pub async fn save_campaign_functions(
    db: &dyn Database,
    campaign_id: i32,
    functions: &[NewInsightFunction],
) -> Result<Vec<InsightFunction>, DbError> {
    let mut created = Vec::with_capacity(functions.len());

    for new_function in functions {
        let feature_type =
            feature_types::get_feature_type_by_name(db, &new_function.feature_type_name)
                .await?
                .ok_or_else(|| DbError::Conversion {
                    message: format!(
                        "Unknown feature type: {}",
                        new_function.feature_type_name
                    ),
                })?;

        let rows = db
            .query_raw_params(
                "INSERT INTO insight_functions (name, feature, feature_type_id)
                 VALUES ($1, $2, $3)
                 RETURNING id, name, feature, feature_type_id",
                &[
                    DatabaseValue::String(new_function.name.clone()),
                    new_function
                        .feature
                        .as_ref()
                        .map_or(DatabaseValue::Null, |f| DatabaseValue::String(f.clone())),
                    DatabaseValue::Int32(feature_type.id),
                ],
            )
            .await?;

        let row = rows.first().ok_or_else(|| DbError::Conversion {
            message: "Failed to get insight function row from insert".to_string(),
        })?;
        let function = row_to_function(row)?;

        db.exec_raw_params(
            "INSERT INTO campaign_functions (campaign_id, function_id)
             VALUES ($1, $2)",
            &[
                DatabaseValue::Int32(campaign_id),
                DatabaseValue::Int32(function.id),
            ],
        )
        .await?;

        created.push(function);
    }

    Ok(created)
}

/// Returns the insight functions attached to a campaign.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_campaign_functions(
    db: &dyn Database,
    campaign_id: i32,
) -> Result<Vec<InsightFunction>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT f.id, f.name, f.feature, f.feature_type_id
             FROM insight_functions f
             JOIN campaign_functions cf ON cf.function_id = f.id
             WHERE cf.campaign_id = $1
             ORDER BY f.id",
            &[DatabaseValue::Int32(campaign_id)],
        )
        .await?;

    rows.iter().map(row_to_function).collect()
}

/// Deletes all insight functions attached to the campaign.
///
/// # Errors
///
/// Returns [`DbError`] if any delete fails.
pub async fn delete_campaign_functions(db: &dyn Database, campaign_id: i32) -> Result<(), DbError> {
    db.exec_raw_params(
        "DELETE FROM insight_functions
         WHERE id IN (
             SELECT function_id FROM campaign_functions WHERE campaign_id = $1
         )",
        &[DatabaseValue::Int32(campaign_id)],
    )
    .await?;

    db.exec_raw_params(
        "DELETE FROM campaign_functions WHERE campaign_id = $1",
        &[DatabaseValue::Int32(campaign_id)],
    )
    .await?;

    Ok(())
}
