//! Per-feature resource bundle path resolution.
//!
//! A bundle directory `resources/<name>/` holds sibling files sharing the
//! `<name>` stem: `<name>.style` (osm2pgsql column mapping), `<name>.sql`
//! (staging transform), `<name>.prj`, `<name>.license`, QML styles
//! (`<name>-<lang>.qml`, `<name>-qgis1.qml`), and versioned metadata files
//! resolved by [`crate::metadata`].

use std::path::{Path, PathBuf};

use crate::config;

/// Resolves paths inside one feature's resource bundle.
#[derive(Debug, Clone)]
pub struct ResourceBundle {
    /// `<root>/<name>/<name>` — file paths are formed by appending a
    /// suffix to this stem.
    base: PathBuf,
    name: String,
}

impl ResourceBundle {
    /// Opens the bundle under the configured resource root.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::with_root(&config::resource_root(), name)
    }

    /// Opens the bundle under an explicit resource root.
    #[must_use]
    pub fn with_root(root: &Path, name: &str) -> Self {
        Self {
            base: root.join(name).join(name),
            name: name.to_string(),
        }
    }

    /// Returns the bundle name (also the shared file stem).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the bundle directory.
    #[must_use]
    pub fn dir(&self) -> PathBuf {
        self.base
            .parent()
            .map_or_else(|| self.base.clone(), Path::to_path_buf)
    }

    /// Returns the path formed by appending `suffix` to the bundle stem.
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> PathBuf {
        PathBuf::from(format!("{}{suffix}", self.base.display()))
    }

    /// osm2pgsql column-mapping style file.
    #[must_use]
    pub fn style(&self) -> PathBuf {
        self.with_suffix(".style")
    }

    /// SQL script normalizing types in the staging database.
    #[must_use]
    pub fn transform_sql(&self) -> PathBuf {
        self.with_suffix(".sql")
    }

    /// Projection definition copied next to the shapefile.
    #[must_use]
    pub fn projection(&self) -> PathBuf {
        self.with_suffix(".prj")
    }

    /// License text copied next to the shapefile.
    #[must_use]
    pub fn license(&self) -> PathBuf {
        self.with_suffix(".license")
    }

    /// QGIS style file for the given QGIS version and language.
    ///
    /// QGIS 2+ styles are localized with an English fallback; QGIS 1 has a
    /// single legacy style.
    #[must_use]
    pub fn qml(&self, qgis_version: u32, lang: &str) -> PathBuf {
        if qgis_version > 1 {
            let localized = self.with_suffix(&format!("-{lang}.qml"));
            if localized.is_file() {
                localized
            } else {
                self.with_suffix("-en.qml")
            }
        } else {
            self.with_suffix("-qgis1.qml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_bundle(name: &str) -> ResourceBundle {
        let root = std::env::temp_dir()
            .join("field_mapper_resources_test")
            .join(name);
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join(name)).unwrap();
        ResourceBundle::with_root(&root, name)
    }

    #[test]
    fn suffix_paths_share_the_bundle_stem() {
        let bundle = ResourceBundle::with_root(Path::new("/res"), "roads");

        assert_eq!(bundle.style(), PathBuf::from("/res/roads/roads.style"));
        assert_eq!(bundle.transform_sql(), PathBuf::from("/res/roads/roads.sql"));
        assert_eq!(bundle.projection(), PathBuf::from("/res/roads/roads.prj"));
        assert_eq!(bundle.license(), PathBuf::from("/res/roads/roads.license"));
        assert_eq!(bundle.dir(), PathBuf::from("/res/roads"));
    }

    #[test]
    fn qml_prefers_localized_style() {
        let bundle = scratch_bundle("buildings");
        fs::write(bundle.with_suffix("-fr.qml"), "<qgis/>").unwrap();

        assert_eq!(bundle.qml(2, "fr"), bundle.with_suffix("-fr.qml"));
    }

    #[test]
    fn qml_falls_back_to_english() {
        let bundle = scratch_bundle("roads");

        assert_eq!(bundle.qml(2, "fr"), bundle.with_suffix("-en.qml"));
    }

    #[test]
    fn qgis1_uses_legacy_style() {
        let bundle = scratch_bundle("boundary");
        fs::write(bundle.with_suffix("-fr.qml"), "<qgis/>").unwrap();

        assert_eq!(bundle.qml(1, "fr"), bundle.with_suffix("-qgis1.qml"));
    }
}
