//! Environment-driven configuration with hard-coded defaults.

use std::path::PathBuf;

/// Directory holding cached Overpass extracts.
///
/// Override with `FIELD_MAPPER_CACHE_DIR`.
#[must_use]
pub fn cache_dir() -> PathBuf {
    std::env::var("FIELD_MAPPER_CACHE_DIR")
        .map_or_else(|_| PathBuf::from("data/cache"), PathBuf::from)
}

/// Directory holding per-job extract working directories.
///
/// Override with `FIELD_MAPPER_WORK_DIR`.
#[must_use]
pub fn work_dir() -> PathBuf {
    std::env::var("FIELD_MAPPER_WORK_DIR")
        .map_or_else(|_| PathBuf::from("data/extracts"), PathBuf::from)
}

/// Overpass API interpreter endpoint.
///
/// Override with `FIELD_MAPPER_OVERPASS_URL`.
#[must_use]
pub fn overpass_url() -> String {
    std::env::var("FIELD_MAPPER_OVERPASS_URL")
        .unwrap_or_else(|_| "https://overpass-api.de/api/interpreter".to_string())
}

/// Extra options passed to `osm2pgsql`, whitespace-separated.
///
/// Override with `FIELD_MAPPER_OSM2PGSQL_OPTIONS`.
#[must_use]
pub fn osm2pgsql_options() -> Vec<String> {
    std::env::var("FIELD_MAPPER_OSM2PGSQL_OPTIONS")
        .unwrap_or_else(|_| "--slim --drop --cache 800".to_string())
        .split_whitespace()
        .map(ToString::to_string)
        .collect()
}

/// Root directory of the per-feature resource bundles.
///
/// Defaults to the `resources/` directory shipped with this crate.
/// Override with `FIELD_MAPPER_RESOURCE_DIR`.
#[must_use]
pub fn resource_root() -> PathBuf {
    std::env::var("FIELD_MAPPER_RESOURCE_DIR").map_or_else(
        |_| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/resources")),
        PathBuf::from,
    )
}
