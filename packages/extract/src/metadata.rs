//! Version/language metadata file resolution.
//!
//! Shapefile packages ship a descriptor file whose format changed over the
//! life of the downstream application: legacy `.keywords` files up to
//! version 3.2, `.xml` from 3.2 on. Both are localized, and not every
//! (version, language) combination exists on disk, so resolution walks a
//! fallback chain and settles for the closest file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::ExtractError;
use crate::resources::ResourceBundle;

/// First version whose packages carry `.xml` metadata instead of legacy
/// `.keywords`.
const XML_METADATA_CUTOFF: ShortVersion = ShortVersion { major: 3, minor: 2 };

/// A `major.minor` version, as used in metadata filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ShortVersion {
    /// Major version component.
    pub major: u32,
    /// Minor version component.
    pub minor: u32,
}

impl ShortVersion {
    /// Parses a full version string (`"3.2.1"`) down to its `major.minor`
    /// prefix. Returns `None` if the first two components are not numeric.
    #[must_use]
    pub fn parse(version: &str) -> Option<Self> {
        let mut parts = version.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        Some(Self { major, minor })
    }
}

impl fmt::Display for ShortVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The two metadata file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    /// Versioned XML descriptor.
    Xml,
    /// Legacy keywords descriptor.
    Keywords,
}

/// Scans the bundle directory for the highest version with an English XML
/// descriptor (`<name>-<major.minor>-en.xml`).
#[must_use]
pub fn latest_known_version(bundle: &ResourceBundle) -> Option<ShortVersion> {
    let pattern = format!(r"^{}-(\d+)\.(\d+)-en\.xml$", regex::escape(bundle.name()));
    let re = regex::Regex::new(&pattern).ok()?;

    let entries = std::fs::read_dir(bundle.dir()).ok()?;
    let mut max_version = None;

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(captures) = re.captures(name) {
            let major = captures[1].parse().ok()?;
            let minor = captures[2].parse().ok()?;
            let version = ShortVersion { major, minor };
            if max_version.is_none_or(|max| max < version) {
                max_version = Some(version);
            }
        }
    }

    max_version
}

/// Resolves the best metadata file suffix for the given kind, version, and
/// language. First match wins:
///
/// XML: exact version + language → exact version + English → latest known
/// version + language → latest known version + English.
///
/// Keywords (legacy, unversioned): language → English.
///
/// The returned suffix is appended to the bundle stem; the final fallback
/// is returned without an existence check, so a bundle with no metadata at
/// all surfaces as an I/O error at copy time.
#[must_use]
pub fn metadata_suffix(
    bundle: &ResourceBundle,
    kind: MetadataKind,
    version: Option<ShortVersion>,
    lang: &str,
) -> String {
    match kind {
        MetadataKind::Keywords => {
            let localized = format!("-{lang}.keywords");
            if bundle.with_suffix(&localized).is_file() {
                localized
            } else {
                "-en.keywords".to_string()
            }
        }
        MetadataKind::Xml => {
            if let Some(version) = version {
                let exact = format!("-{version}-{lang}.xml");
                if bundle.with_suffix(&exact).is_file() {
                    return exact;
                }

                let english = format!("-{version}-en.xml");
                if bundle.with_suffix(&english).is_file() {
                    return english;
                }
            }

            if let Some(latest) = latest_known_version(bundle) {
                let localized = format!("-{latest}-{lang}.xml");
                if bundle.with_suffix(&localized).is_file() {
                    return localized;
                }
                return format!("-{latest}-en.xml");
            }

            "-en.xml".to_string()
        }
    }
}

/// Returns the metadata files to include in the package, keyed by
/// destination filename, with the source suffix as the value.
///
/// With no version supplied, both the legacy keywords and the versioned
/// XML descriptor are included. Below the 3.2 cutoff only keywords ship;
/// from 3.2 on, only XML.
#[must_use]
pub fn metadata_files(
    bundle: &ResourceBundle,
    version: Option<&str>,
    lang: &str,
    output_name: &str,
) -> BTreeMap<String, String> {
    let short = version.and_then(ShortVersion::parse);

    let xml = metadata_suffix(bundle, MetadataKind::Xml, short, lang);
    let keywords = metadata_suffix(bundle, MetadataKind::Keywords, short, lang);

    let mut files = BTreeMap::new();
    match short {
        None => {
            files.insert(format!("{output_name}.keywords"), keywords);
            files.insert(format!("{output_name}.xml"), xml);
        }
        Some(v) if v < XML_METADATA_CUTOFF => {
            files.insert(format!("{output_name}.keywords"), keywords);
        }
        Some(_) => {
            files.insert(format!("{output_name}.xml"), xml);
        }
    }

    files
}

/// Appends the current date/time to a copied `.keywords` metadata file.
///
/// XML descriptors carry their own timestamps and are left untouched.
///
/// # Errors
///
/// Returns [`ExtractError::Io`] if the file cannot be appended to.
pub fn stamp_metadata(path: &Path) -> Result<(), ExtractError> {
    if path.extension().and_then(|e| e.to_str()) != Some("keywords") {
        return Ok(());
    }

    use std::io::Write as _;

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| ExtractError::io(path, e))?;

    let stamp = chrono::Local::now().format("%d-%m-%Y %H:%M");
    writeln!(file, "date: {stamp}").map_err(|e| ExtractError::io(path, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_bundle(test: &str, name: &str, files: &[&str]) -> ResourceBundle {
        let root = std::env::temp_dir()
            .join("field_mapper_metadata_test")
            .join(test);
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join(name)).unwrap();

        for file in files {
            fs::write(root.join(name).join(file), "metadata").unwrap();
        }

        ResourceBundle::with_root(&root, name)
    }

    #[test]
    fn short_version_truncates_to_major_minor() {
        assert_eq!(
            ShortVersion::parse("3.2.1"),
            Some(ShortVersion { major: 3, minor: 2 })
        );
        assert_eq!(ShortVersion::parse("3.2.1").unwrap().to_string(), "3.2");
        assert_eq!(ShortVersion::parse("4"), None);
        assert_eq!(ShortVersion::parse("not-a-version"), None);
    }

    #[test]
    fn short_version_orders_numerically_not_lexically() {
        let v3_9 = ShortVersion::parse("3.9").unwrap();
        let v3_10 = ShortVersion::parse("3.10").unwrap();
        assert!(v3_9 < v3_10);
    }

    #[test]
    fn exact_version_and_language_wins() {
        let bundle = scratch_bundle(
            "exact",
            "roads",
            &["roads-3.2-fr.xml", "roads-3.2-en.xml", "roads-3.3-en.xml"],
        );

        let suffix = metadata_suffix(&bundle, MetadataKind::Xml, ShortVersion::parse("3.2"), "fr");
        assert_eq!(suffix, "-3.2-fr.xml");
    }

    #[test]
    fn falls_back_to_english_at_exact_version_before_other_versions() {
        // French exists at 3.3 but NOT at 3.2 — the resolver must still
        // prefer the English file at the requested version.
        let bundle = scratch_bundle(
            "version_first",
            "roads",
            &["roads-3.2-en.xml", "roads-3.3-fr.xml", "roads-3.3-en.xml"],
        );

        let suffix = metadata_suffix(&bundle, MetadataKind::Xml, ShortVersion::parse("3.2"), "fr");
        assert_eq!(suffix, "-3.2-en.xml");
    }

    #[test]
    fn unknown_version_falls_back_to_latest_localized() {
        let bundle = scratch_bundle(
            "latest_localized",
            "buildings",
            &[
                "buildings-3.2-en.xml",
                "buildings-3.3-en.xml",
                "buildings-3.3-fr.xml",
            ],
        );

        let suffix =
            metadata_suffix(&bundle, MetadataKind::Xml, ShortVersion::parse("9.9"), "fr");
        assert_eq!(suffix, "-3.3-fr.xml");
    }

    #[test]
    fn final_fallback_is_latest_english() {
        let bundle = scratch_bundle(
            "latest_english",
            "buildings",
            &["buildings-3.2-en.xml", "buildings-3.3-en.xml"],
        );

        let suffix = metadata_suffix(&bundle, MetadataKind::Xml, None, "fr");
        assert_eq!(suffix, "-3.3-en.xml");
    }

    #[test]
    fn latest_version_scan_ignores_other_bundles_and_languages() {
        let bundle = scratch_bundle(
            "scan",
            "roads",
            &[
                "roads-3.2-en.xml",
                "roads-3.10-en.xml",
                "roads-4.0-fr.xml",
                "streets-9.9-en.xml",
            ],
        );

        assert_eq!(
            latest_known_version(&bundle),
            Some(ShortVersion { major: 3, minor: 10 })
        );
    }

    #[test]
    fn keywords_fall_back_to_english_only() {
        let bundle = scratch_bundle("keywords", "roads", &["roads-en.keywords"]);

        let suffix = metadata_suffix(&bundle, MetadataKind::Keywords, None, "fr");
        assert_eq!(suffix, "-en.keywords");
    }

    #[test]
    fn keywords_prefer_localized_file() {
        let bundle = scratch_bundle(
            "keywords_localized",
            "roads",
            &["roads-en.keywords", "roads-fr.keywords"],
        );

        let suffix = metadata_suffix(&bundle, MetadataKind::Keywords, None, "fr");
        assert_eq!(suffix, "-fr.keywords");
    }

    #[test]
    fn no_version_includes_both_formats() {
        let bundle = scratch_bundle(
            "both",
            "roads",
            &["roads-en.keywords", "roads-3.2-en.xml"],
        );

        let files = metadata_files(&bundle, None, "en", "roads");
        assert_eq!(files.len(), 2);
        assert!(files.contains_key("roads.keywords"));
        assert!(files.contains_key("roads.xml"));
    }

    #[test]
    fn old_versions_get_keywords_only() {
        let bundle = scratch_bundle(
            "old",
            "roads",
            &["roads-en.keywords", "roads-3.2-en.xml"],
        );

        let files = metadata_files(&bundle, Some("3.1.2"), "en", "test-roads");
        assert_eq!(files.len(), 1);
        assert!(files.contains_key("test-roads.keywords"));
    }

    #[test]
    fn cutoff_and_newer_versions_get_xml_only() {
        let bundle = scratch_bundle(
            "new",
            "roads",
            &["roads-en.keywords", "roads-3.2-en.xml"],
        );

        let files = metadata_files(&bundle, Some("3.2.0"), "en", "roads");
        assert_eq!(files.len(), 1);
        assert_eq!(files.get("roads.xml"), Some(&"-3.2-en.xml".to_string()));
    }

    #[test]
    fn stamp_appends_date_to_keywords() {
        let dir = std::env::temp_dir().join("field_mapper_metadata_test/stamp");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let path = dir.join("roads.keywords");
        fs::write(&path, "title: Roads\n").unwrap();
        stamp_metadata(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("title: Roads\n"));
        assert!(content.contains("date: "));
    }

    #[test]
    fn stamp_leaves_xml_untouched() {
        let dir = std::env::temp_dir().join("field_mapper_metadata_test/stamp_xml");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let path: PathBuf = dir.join("roads.xml");
        fs::write(&path, "<metadata/>").unwrap();
        stamp_metadata(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<metadata/>");
    }
}
