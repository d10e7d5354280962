//! On-disk extract cache.
//!
//! Extracts are cached under a name derived from the resolved query text,
//! so two requests with the same bounding box and feature resolve to the
//! same entry. Entries older than [`MAX_EXTRACT_AGE`] are deleted and
//! re-fetched. There is no locking — concurrent callers racing on the same
//! path is an accepted, unhandled condition.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::ExtractError;

/// Maximum age of a cached extract before it is considered stale.
pub const MAX_EXTRACT_AGE: Duration = Duration::from_secs(3600);

/// Returns the cache path for a resolved Overpass query.
///
/// The name is the MD5 of the query text, so identity is a pure function
/// of the query.
#[must_use]
pub fn cache_path(cache_dir: &Path, query: &str) -> PathBuf {
    cache_dir.join(format!("{:x}.osm", md5::compute(query)))
}

/// Returns whether the extract at `path` must be (re-)fetched.
///
/// A missing file needs a fetch. A file older than [`MAX_EXTRACT_AGE`] is
/// deleted here and needs a fetch. A fresh file does not.
///
/// # Errors
///
/// Returns [`ExtractError::Io`] if the file metadata cannot be read or a
/// stale file cannot be deleted.
pub fn needs_refresh(path: &Path) -> Result<bool, ExtractError> {
    if !path.exists() {
        return Ok(true);
    }

    let metadata = std::fs::metadata(path).map_err(|e| ExtractError::io(path, e))?;
    let modified = metadata
        .modified()
        .map_err(|e| ExtractError::io(path, e))?;
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO);

    if age > MAX_EXTRACT_AGE {
        log::info!(
            "Cache entry {} is stale ({}s old), deleting",
            path.display(),
            age.as_secs()
        );
        std::fs::remove_file(path).map_err(|e| ExtractError::io(path, e))?;
        return Ok(true);
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("field_mapper_cache_test").join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn cache_path_is_pure_function_of_query() {
        let dir = PathBuf::from("/cache");
        let a = cache_path(&dir, "way[highway];out;");
        let b = cache_path(&dir, "way[highway];out;");
        let c = cache_path(&dir, "way[building];out;");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.extension().unwrap(), "osm");
    }

    #[test]
    fn missing_file_needs_refresh() {
        let dir = scratch_dir("missing");
        assert!(needs_refresh(&dir.join("nope.osm")).unwrap());
    }

    #[test]
    fn fresh_file_is_reused() {
        let dir = scratch_dir("fresh");
        let path = dir.join("extract.osm");
        fs::write(&path, "<osm/>").unwrap();

        assert!(!needs_refresh(&path).unwrap());
        assert!(path.exists());
    }

    #[test]
    fn stale_file_is_deleted_and_refetched() {
        let dir = scratch_dir("stale");
        let path = dir.join("extract.osm");
        fs::write(&path, "<osm/>").unwrap();

        // Age the file two hours past its write time.
        let stale = SystemTime::now() - Duration::from_secs(7200);
        filetime::set_file_mtime(&path, filetime::FileTime::from_system_time(stale)).unwrap();

        assert!(needs_refresh(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn file_just_inside_window_is_reused() {
        let dir = scratch_dir("inside");
        let path = dir.join("extract.osm");
        fs::write(&path, "<osm/>").unwrap();

        let recent = SystemTime::now() - Duration::from_secs(3500);
        filetime::set_file_mtime(&path, filetime::FileTime::from_system_time(recent)).unwrap();

        assert!(!needs_refresh(&path).unwrap());
    }
}
