#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! OSM extract fetching and shapefile conversion.
//!
//! The toolchain runs in two halves:
//!
//! 1. **Fetch** ([`overpass`]): resolve the feature's Overpass query for a
//!    bounding box, and download the extract — unless a cache entry younger
//!    than one hour already exists ([`cache`]).
//! 2. **Convert** ([`pipeline`]): push the extract through `createdb` →
//!    `osm2pgsql` → `psql` → `pgsql2shp` → `dropdb`, copy the feature's
//!    sidecar resources next to the shapefile, resolve version/language
//!    metadata ([`metadata`]), and zip everything up ([`archive`]).
//!
//! Features are defined by embedded TOML configs ([`registry`]); their
//! style/projection/license/metadata bundles live under `resources/`
//! ([`resources`]).

pub mod archive;
pub mod cache;
pub mod config;
pub mod exec;
pub mod feature_def;
pub mod metadata;
pub mod overpass;
pub mod pipeline;
pub mod registry;
pub mod resources;

pub use field_mapper_extract_models::BoundingBox;

/// Errors from the extract toolchain.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Requested feature id is not in the registry.
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// Output prefix contains characters outside `[A-Za-z0-9-_]`.
    #[error("Invalid output prefix: {0:?}")]
    InvalidPrefix(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the Overpass API.
    #[error("HTTP {status} for {url}")]
    HttpStatus {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// External tool not found on `PATH`.
    #[error("Program not found on PATH: {0}")]
    ProgramNotFound(String),

    /// A conversion stage exited with a non-zero status.
    #[error("Stage {stage} failed with exit code {code:?}")]
    StageFailed {
        /// Stage name (`createdb`, `osm2pgsql`, ...).
        stage: String,
        /// Process exit code, if the process was not killed by a signal.
        code: Option<i32>,
    },

    /// Zip archive error.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ExtractError {
    /// Wraps an I/O error with the path it occurred at.
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
