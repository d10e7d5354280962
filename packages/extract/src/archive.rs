//! Shapefile packaging.
//!
//! A shapefile is really a set of sibling files sharing one stem. The
//! packager zips the mandatory components together with whichever sidecar
//! files the pipeline produced, then removes the originals so only the
//! archive remains in the job directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::ExtractError;

/// Mandatory shapefile components. A package missing any of these is
/// unusable, so their absence is an error.
const SHAPEFILE_COMPONENTS: &[&str] = &["shp", "shx", "dbf"];

/// Sidecar extensions included when present.
const AUXILIARY_EXTENSIONS: &[&str] = &["prj", "qml", "keywords", "license", "xml"];

/// Zips the shapefile at `shape_path` together with its sidecar files and
/// removes the originals.
///
/// Returns the path of the created `.zip` archive (the shapefile stem with
/// a `.zip` extension).
///
/// # Errors
///
/// Returns [`ExtractError::Io`] if a mandatory component is missing or any
/// file operation fails, and [`ExtractError::Zip`] on archive errors.
pub fn zip_shapefile(shape_path: &Path) -> Result<PathBuf, ExtractError> {
    let zip_path = shape_path.with_extension("zip");

    let mut members = Vec::new();
    for extension in SHAPEFILE_COMPONENTS {
        let component = shape_path.with_extension(extension);
        if !component.is_file() {
            return Err(ExtractError::io(
                &component,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "missing shapefile component",
                ),
            ));
        }
        members.push(component);
    }
    for extension in AUXILIARY_EXTENSIONS {
        let sidecar = shape_path.with_extension(extension);
        if sidecar.is_file() {
            members.push(sidecar);
        }
    }

    let file = File::create(&zip_path).map_err(|e| ExtractError::io(&zip_path, e))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for member in &members {
        let name = member
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ExtractError::io(
                    member,
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "non-UTF8 file name"),
                )
            })?;

        writer.start_file(name, options)?;
        let mut source = File::open(member).map_err(|e| ExtractError::io(member, e))?;
        std::io::copy(&mut source, &mut writer).map_err(|e| ExtractError::io(member, e))?;
    }

    writer.finish()?;

    for member in &members {
        std::fs::remove_file(member).map_err(|e| ExtractError::io(member, e))?;
    }

    log::info!("Packaged {} files into {}", members.len(), zip_path.display());

    Ok(zip_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_shapefile(test: &str, extensions: &[&str]) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("field_mapper_archive_test")
            .join(test);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let shape_path = dir.join("test-buildings.shp");
        for extension in extensions {
            fs::write(shape_path.with_extension(extension), *extension).unwrap();
        }
        shape_path
    }

    #[test]
    fn archives_components_and_sidecars_and_removes_originals() {
        let shape_path = scratch_shapefile(
            "full",
            &["shp", "shx", "dbf", "qml", "license", "xml"],
        );

        let zip_path = zip_shapefile(&shape_path).unwrap();
        assert!(zip_path.is_file());

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "test-buildings.dbf",
                "test-buildings.license",
                "test-buildings.qml",
                "test-buildings.shp",
                "test-buildings.shx",
                "test-buildings.xml",
            ]
        );

        for extension in ["shp", "shx", "dbf", "qml", "license", "xml"] {
            assert!(
                !shape_path.with_extension(extension).exists(),
                ".{extension} should have been removed"
            );
        }
    }

    #[test]
    fn missing_component_is_an_error() {
        let shape_path = scratch_shapefile("incomplete", &["shp", "shx"]);

        let result = zip_shapefile(&shape_path);
        assert!(matches!(result, Err(ExtractError::Io { .. })));

        // Nothing was removed on failure.
        assert!(shape_path.exists());
    }

    #[test]
    fn sidecars_are_optional() {
        let shape_path = scratch_shapefile("bare", &["shp", "shx", "dbf"]);

        let zip_path = zip_shapefile(&shape_path).unwrap();
        let archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 3);
    }
}
