//! Overpass API query building and extract fetching.

use std::path::{Path, PathBuf};
use std::time::Duration;

use field_mapper_extract_models::BoundingBox;
use futures::StreamExt as _;
use tokio::io::AsyncWriteExt as _;

use crate::feature_def::FeatureDefinition;
use crate::{ExtractError, cache, config, registry};

/// User-agent sent with every Overpass request.
pub const USER_AGENT: &str = "field-mapper/0.1 (+https://github.com/fieldmapper/field-mapper)";

/// Per-request timeout for the Overpass fetch. External process stages have
/// no timeout; this is the only timed operation in the toolchain.
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Builds a `reqwest::Client` configured for Overpass requests.
///
/// # Errors
///
/// Returns [`ExtractError::Http`] if the client cannot be built.
pub fn build_client() -> Result<reqwest::Client, ExtractError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(Into::into)
}

/// Substitutes the bounding box into the feature's Overpass query template.
///
/// Each `{SW_lat}`/`{SW_lng}`/`{NE_lat}`/`{NE_lng}` placeholder is replaced
/// with the corresponding coordinate. Ordering of the box is not validated.
#[must_use]
pub fn build_query(feature: &FeatureDefinition, bbox: BoundingBox) -> String {
    feature
        .overpass
        .template
        .replace("{SW_lat}", &bbox.sw_lat.to_string())
        .replace("{SW_lng}", &bbox.sw_lng.to_string())
        .replace("{NE_lat}", &bbox.ne_lat.to_string())
        .replace("{NE_lng}", &bbox.ne_lng.to_string())
}

/// Fetches the OSM extract for a feature and bounding box, reusing the
/// on-disk cache when the entry is younger than one hour.
///
/// Returns the path to the cached extract file.
///
/// # Errors
///
/// Returns [`ExtractError::UnknownFeature`] if `feature_id` is not in the
/// registry, or a fetch/cache error.
pub async fn fetch_osm_extract(
    client: &reqwest::Client,
    feature_id: &str,
    bbox: BoundingBox,
) -> Result<PathBuf, ExtractError> {
    fetch_osm_extract_to(client, feature_id, bbox, &config::cache_dir()).await
}

/// [`fetch_osm_extract`] with an explicit cache directory.
///
/// # Errors
///
/// Returns [`ExtractError::UnknownFeature`] if `feature_id` is not in the
/// registry, or a fetch/cache error.
pub async fn fetch_osm_extract_to(
    client: &reqwest::Client,
    feature_id: &str,
    bbox: BoundingBox,
    cache_dir: &Path,
) -> Result<PathBuf, ExtractError> {
    let feature = registry::find_feature(feature_id)
        .ok_or_else(|| ExtractError::UnknownFeature(feature_id.to_string()))?;

    let query = build_query(&feature, bbox);
    let path = cache::cache_path(cache_dir, &query);

    if cache::needs_refresh(&path)? {
        fetch_to(client, &query, &path).await?;
        log::info!("Fetched {}", path.display());
    } else {
        log::info!("Reusing cached extract {}", path.display());
    }

    Ok(path)
}

/// Issues the Overpass GET and streams the response body to `dest`,
/// overwriting any existing content.
///
/// # Errors
///
/// Returns [`ExtractError`] on timeout, connection failure, non-success
/// status, or a write error. Failures are logged and propagated — there is
/// no retry.
pub async fn fetch_to(
    client: &reqwest::Client,
    query: &str,
    dest: &Path,
) -> Result<(), ExtractError> {
    let url = config::overpass_url();
    log::debug!("Getting URL: {url}?data={query}");

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ExtractError::io(parent, e))?;
    }

    let response = client
        .get(&url)
        .query(&[("data", query)])
        .timeout(FETCH_TIMEOUT)
        .send()
        .await
        .map_err(|e| {
            log::error!("Overpass request failed (bad URL or timeout): {e}");
            ExtractError::Http(e)
        })?;

    if !response.status().is_success() {
        return Err(ExtractError::HttpStatus {
            url: response.url().to_string(),
            status: response.status().as_u16(),
        });
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| ExtractError::io(dest, e))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| ExtractError::io(dest, e))?;
    }

    file.flush().await.map_err(|e| ExtractError::io(dest, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bbox() -> BoundingBox {
        BoundingBox::new(-34.05, 20.43, -34.04, 20.44)
    }

    #[test]
    fn buildings_query_substitutes_each_value_exactly_once() {
        let feature = registry::find_feature("buildings").unwrap();
        let query = build_query(&feature, test_bbox());

        for value in ["-34.05", "20.43", "-34.04", "20.44"] {
            assert_eq!(
                query.matches(value).count(),
                1,
                "{value} should appear exactly once in {query}"
            );
        }
        assert!(!query.contains('{'), "unresolved placeholder in {query}");
    }

    #[test]
    fn query_preserves_bbox_order_south_west_north_east() {
        let feature = registry::find_feature("roads").unwrap();
        let query = build_query(&feature, test_bbox());

        assert!(query.contains("[bbox:-34.05,20.43,-34.04,20.44]"));
    }

    #[test]
    fn identical_requests_resolve_to_identical_cache_entries() {
        let feature = registry::find_feature("buildings").unwrap();
        let dir = std::path::PathBuf::from("/cache");

        let first = cache::cache_path(&dir, &build_query(&feature, test_bbox()));
        let second = cache::cache_path(&dir, &build_query(&feature, test_bbox()));
        assert_eq!(first, second);

        let other_box = BoundingBox::new(-34.05, 20.43, -34.03, 20.45);
        let third = cache::cache_path(&dir, &build_query(&feature, other_box));
        assert_ne!(first, third);
    }

    #[tokio::test]
    async fn fresh_cache_entry_skips_the_network() {
        let dir = std::env::temp_dir().join("field_mapper_overpass_test/fresh");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        // Pre-populate the cache entry this request resolves to.
        let feature = registry::find_feature("buildings").unwrap();
        let path = cache::cache_path(&dir, &build_query(&feature, test_bbox()));
        std::fs::write(&path, "<osm/>").unwrap();

        // No Overpass endpoint is reachable here; returning the entry
        // untouched proves no request was issued.
        let client = build_client().unwrap();
        let result = fetch_osm_extract_to(&client, "buildings", test_bbox(), &dir)
            .await
            .unwrap();

        assert_eq!(result, path);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<osm/>");
    }

    #[tokio::test]
    async fn unknown_feature_is_a_lookup_error() {
        let client = build_client().unwrap();
        let result = fetch_osm_extract(&client, "volcanoes", test_bbox()).await;

        assert!(matches!(
            result,
            Err(ExtractError::UnknownFeature(ref id)) if id == "volcanoes"
        ));
    }
}
