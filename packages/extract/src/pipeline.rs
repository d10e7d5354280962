//! OSM extract → shapefile conversion pipeline.
//!
//! Five sequential external-process stages move the extract through a
//! staging `PostGIS` database and out to a shapefile:
//!
//! 1. `createdb` — provision a spatial staging database named after the job
//! 2. `osm2pgsql` — import the extract with the feature's style file
//! 3. `psql` — run the feature's transform SQL to normalize types
//! 4. `pgsql2shp` — export the feature's spatial query as a shapefile
//! 5. `dropdb` — remove the staging database
//!
//! Every stage checks its exit status and fails the pipeline on non-zero
//! exit. Once the staging database exists, the drop is attempted no matter
//! how the intermediate stages went, so a failing import or export cannot
//! leak a database. Stages block the caller and have no timeout.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;

use crate::feature_def::FeatureDefinition;
use crate::resources::ResourceBundle;
use crate::{ExtractError, archive, config, exec, metadata};

/// Characters that may not appear in an output prefix.
static OUTPUT_PREFIX_REJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^A-Za-z0-9-_]").expect("prefix pattern is valid"));

/// Options controlling one shapefile extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Prepended to the feature id to form the output file stem. Only
    /// `[A-Za-z0-9-_]` characters are allowed; empty means the stem is the
    /// feature id alone.
    pub output_prefix: String,
    /// QGIS major version the `.qml` style should target (1 selects the
    /// legacy style).
    pub qgis_version: u32,
    /// Downstream application version used to resolve metadata files. With
    /// no version, both legacy keywords and XML metadata are included.
    pub app_version: Option<String>,
    /// Language for the QML style and metadata files.
    pub lang: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            output_prefix: String::new(),
            qgis_version: 2,
            app_version: None,
            lang: "en".to_string(),
        }
    }
}

/// Checks that an output prefix contains only `[A-Za-z0-9-_]`.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidPrefix`] otherwise.
pub fn validate_output_prefix(prefix: &str) -> Result<(), ExtractError> {
    if OUTPUT_PREFIX_REJECT.is_match(prefix) {
        log::error!("Invalid output prefix: {prefix:?}");
        return Err(ExtractError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Converts a fetched OSM extract to a zipped shapefile package.
///
/// Runs the five-stage conversion in a fresh per-job working directory,
/// copies the feature's projection/style/license sidecars and resolved
/// metadata next to the shapefile, and packages everything with
/// [`archive::zip_shapefile`].
///
/// Returns the path of the created archive.
///
/// # Errors
///
/// Returns [`ExtractError`] if the output prefix is invalid (checked before
/// anything is invoked), a tool is missing from `PATH`, a stage exits
/// non-zero, or a copy/package step fails.
pub fn extract_shapefile(
    feature: &FeatureDefinition,
    osm_path: &Path,
    options: &ExtractOptions,
) -> Result<PathBuf, ExtractError> {
    validate_output_prefix(&options.output_prefix)?;

    let output_name = format!("{}{}", options.output_prefix, feature.id());

    // The job directory name doubles as the staging database name.
    let job_id = format!("fm{}", uuid::Uuid::new_v4().simple());
    let job_dir = config::work_dir().join(feature.id()).join(&job_id);
    std::fs::create_dir_all(&job_dir).map_err(|e| ExtractError::io(&job_dir, e))?;

    let bundle = ResourceBundle::new(feature.bundle());
    let shape_path = job_dir.join(format!("{output_name}.shp"));

    // Locate every tool up front so a missing binary fails the job before
    // any stage has side effects.
    let createdb = exec::find_program("createdb")?;
    let osm2pgsql = exec::find_program("osm2pgsql")?;
    let psql = exec::find_program("psql")?;
    let pgsql2shp = exec::find_program("pgsql2shp")?;
    let dropdb = exec::find_program("dropdb")?;

    run_stage(
        "createdb",
        Command::new(&createdb)
            .args(["-T", "template_postgis"])
            .arg(&job_id),
    )?;

    // The staging database exists from here on: run the remaining stages,
    // then drop it regardless of how they went.
    let converted = (|| {
        run_stage(
            "osm2pgsql",
            Command::new(&osm2pgsql)
                .arg("-S")
                .arg(bundle.style())
                .arg("-d")
                .arg(&job_id)
                .args(config::osm2pgsql_options())
                .arg(osm_path),
        )?;
        run_stage(
            "psql",
            Command::new(&psql)
                .arg(&job_id)
                .arg("-f")
                .arg(bundle.transform_sql()),
        )?;
        run_stage(
            "pgsql2shp",
            Command::new(&pgsql2shp)
                .arg("-f")
                .arg(&shape_path)
                .arg(&job_id)
                .arg(&feature.export.sql),
        )
    })();

    let dropped = run_stage("dropdb", Command::new(&dropdb).arg(&job_id));
    if let Err(ref drop_error) = dropped {
        log::warn!("Failed to drop staging database {job_id}: {drop_error}");
    }
    converted?;
    dropped?;

    copy_file(
        &bundle.projection(),
        &job_dir.join(format!("{output_name}.prj")),
    )?;
    copy_file(
        &bundle.qml(options.qgis_version, &options.lang),
        &job_dir.join(format!("{output_name}.qml")),
    )?;
    copy_file(
        &bundle.license(),
        &job_dir.join(format!("{output_name}.license")),
    )?;

    let metadata_files = metadata::metadata_files(
        &bundle,
        options.app_version.as_deref(),
        &options.lang,
        &output_name,
    );
    for (destination, suffix) in metadata_files {
        let destination_path = job_dir.join(destination);
        copy_file(&bundle.with_suffix(&suffix), &destination_path)?;
        metadata::stamp_metadata(&destination_path)?;
    }

    let zip_path = archive::zip_shapefile(&shape_path)?;
    log::info!("Shapefile package written to {}", zip_path.display());

    Ok(zip_path)
}

/// Runs one pipeline stage to completion and checks its exit status.
fn run_stage(stage: &str, command: &mut Command) -> Result<(), ExtractError> {
    log::info!("Running {stage}: {command:?}");

    let status = command.status().map_err(|e| ExtractError::Io {
        path: stage.to_string(),
        source: e,
    })?;

    if !status.success() {
        return Err(ExtractError::StageFailed {
            stage: stage.to_string(),
            code: status.code(),
        });
    }

    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> Result<(), ExtractError> {
    std::fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| ExtractError::io(from, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;

    #[test]
    fn accepts_clean_prefixes() {
        for prefix in ["", "test-", "Area_7", "abc-123_XYZ"] {
            assert!(validate_output_prefix(prefix).is_ok(), "{prefix:?}");
        }
    }

    #[test]
    fn rejects_unwanted_characters() {
        for prefix in ["bad name", "semi;colon", "sl/ash", "dot.", "ümlaut"] {
            assert!(
                matches!(
                    validate_output_prefix(prefix),
                    Err(ExtractError::InvalidPrefix(_))
                ),
                "{prefix:?}"
            );
        }
    }

    #[test]
    fn bad_prefix_fails_before_any_external_invocation() {
        let feature = registry::find_feature("buildings").unwrap();
        let options = ExtractOptions {
            output_prefix: "bad name".to_string(),
            ..ExtractOptions::default()
        };

        // The OSM path does not exist and no external tool would be found;
        // an InvalidPrefix error proves validation ran first.
        let result = extract_shapefile(&feature, Path::new("/nonexistent.osm"), &options);
        assert!(matches!(result, Err(ExtractError::InvalidPrefix(_))));
    }

    #[test]
    fn default_options_target_qgis2_english() {
        let options = ExtractOptions::default();
        assert_eq!(options.qgis_version, 2);
        assert_eq!(options.lang, "en");
        assert!(options.output_prefix.is_empty());
        assert!(options.app_version.is_none());
    }
}
