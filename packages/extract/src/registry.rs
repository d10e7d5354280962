//! Feature registry — loads all feature definitions from embedded TOML
//! configs.
//!
//! Each `.toml` file in `packages/extract/features/` is baked into the
//! binary at compile time via [`include_str!`]. The feature set is fixed:
//! adding a feature means adding a TOML file (and its resource bundle) and
//! listing it below.

use crate::feature_def::{FeatureDefinition, parse_feature_toml};

/// TOML configs embedded at compile time.
const FEATURE_TOMLS: &[(&str, &str)] = &[
    ("buildings", include_str!("../features/buildings.toml")),
    (
        "building-points",
        include_str!("../features/building-points.toml"),
    ),
    ("roads", include_str!("../features/roads.toml")),
    (
        "potential-idp",
        include_str!("../features/potential-idp.toml"),
    ),
    // ── Administrative boundaries, one per admin_level ───────────────
    ("boundary-1", include_str!("../features/boundary-1.toml")),
    ("boundary-2", include_str!("../features/boundary-2.toml")),
    ("boundary-3", include_str!("../features/boundary-3.toml")),
    ("boundary-4", include_str!("../features/boundary-4.toml")),
    ("boundary-5", include_str!("../features/boundary-5.toml")),
    ("boundary-6", include_str!("../features/boundary-6.toml")),
    ("boundary-7", include_str!("../features/boundary-7.toml")),
    ("boundary-8", include_str!("../features/boundary-8.toml")),
    ("boundary-9", include_str!("../features/boundary-9.toml")),
    ("boundary-10", include_str!("../features/boundary-10.toml")),
    ("boundary-11", include_str!("../features/boundary-11.toml")),
];

/// Total number of configured features (used in tests).
#[cfg(test)]
const EXPECTED_FEATURE_COUNT: usize = 15;

/// Returns all configured feature definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_features() -> Vec<FeatureDefinition> {
    FEATURE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_feature_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Returns the feature definition for `id`, if configured.
#[must_use]
pub fn find_feature(id: &str) -> Option<FeatureDefinition> {
    all_features().into_iter().find(|f| f.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BBOX_PLACEHOLDERS: &[&str] = &["{SW_lat}", "{SW_lng}", "{NE_lat}", "{NE_lng}"];

    #[test]
    fn loads_all_features() {
        let features = all_features();
        assert_eq!(features.len(), EXPECTED_FEATURE_COUNT);
    }

    #[test]
    fn ids_match_embedded_names() {
        for ((name, _), feature) in FEATURE_TOMLS.iter().zip(all_features()) {
            assert_eq!(*name, feature.id());
        }
    }

    #[test]
    fn templates_use_each_placeholder_exactly_once() {
        for feature in all_features() {
            for placeholder in BBOX_PLACEHOLDERS {
                let count = feature.overpass.template.matches(placeholder).count();
                assert_eq!(
                    count, 1,
                    "{} appears {count} times in {} template",
                    placeholder,
                    feature.id()
                );
            }
        }
    }

    #[test]
    fn export_sql_is_nonempty() {
        for feature in all_features() {
            assert!(
                !feature.export.sql.trim().is_empty(),
                "{} has empty export SQL",
                feature.id()
            );
        }
    }

    #[test]
    fn find_feature_by_id() {
        assert!(find_feature("buildings").is_some());
        assert!(find_feature("boundary-4").is_some());
        assert!(find_feature("volcanoes").is_none());
    }

    #[test]
    fn bundles_exist_on_disk() {
        for feature in all_features() {
            let dir = crate::config::resource_root().join(feature.bundle());
            assert!(dir.is_dir(), "Missing resource bundle for {}", feature.id());
        }
    }
}
