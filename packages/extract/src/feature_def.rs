//! Config-driven feature definition.
//!
//! [`FeatureDefinition`] captures everything unique about an extractable
//! feature in a serializable config struct: the Overpass query template,
//! the shapefile export SQL, and the resource bundle it ships with. A
//! single generic pipeline implementation handles all features.

use serde::Deserialize;

/// A complete, config-driven extract feature definition.
///
/// Loaded from TOML files at compile time ([`crate::registry`]).
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureDefinition {
    /// Unique identifier (e.g. `"buildings"`, `"boundary-4"`).
    pub id: String,
    /// Human-readable name (e.g. `"Buildings"`).
    pub name: String,
    /// Resource bundle directory name under `resources/`. Several features
    /// may share one bundle (all `boundary-*` levels do).
    pub bundle: String,
    /// Overpass query configuration.
    pub overpass: OverpassConfig,
    /// Shapefile export configuration.
    pub export: ExportConfig,
}

/// Overpass query configuration for one feature.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassConfig {
    /// Query template with `{SW_lat}`, `{SW_lng}`, `{NE_lat}`, `{NE_lng}`
    /// placeholders. Each placeholder appears exactly once, in the global
    /// `[bbox:...]` setting.
    pub template: String,
}

/// Shapefile export configuration for one feature.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// SQL run by `pgsql2shp` against the staging database.
    pub sql: String,
}

impl FeatureDefinition {
    /// Returns the feature's unique identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the feature's human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the feature's resource bundle directory name.
    #[must_use]
    pub fn bundle(&self) -> &str {
        &self.bundle
    }
}

/// Parses a feature definition from its TOML text.
///
/// # Errors
///
/// Returns a TOML deserialization error if the config is malformed.
pub fn parse_feature_toml(raw: &str) -> Result<FeatureDefinition, toml::de::Error> {
    toml::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_definition() {
        let feature = parse_feature_toml(
            r#"
            id = "test"
            name = "Test"
            bundle = "test"

            [overpass]
            template = "[bbox:{SW_lat},{SW_lng},{NE_lat},{NE_lng}];way;out;"

            [export]
            sql = "SELECT osm_id FROM planet_osm_polygon"
            "#,
        )
        .unwrap();

        assert_eq!(feature.id(), "test");
        assert_eq!(feature.bundle(), "test");
        assert!(feature.overpass.template.contains("{SW_lat}"));
    }

    #[test]
    fn rejects_missing_sections() {
        assert!(parse_feature_toml("id = \"test\"").is_err());
    }
}
