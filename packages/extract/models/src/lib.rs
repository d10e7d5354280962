#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shared types for the OSM extract toolchain.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in WGS84 coordinates, as supplied by the
/// caller of an extract request.
///
/// Immutable once constructed. Coordinate ordering is **not** validated —
/// a box with `sw_lat > ne_lat` is passed through to the Overpass API
/// uninterpreted, which will reject it itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// South-west latitude.
    pub sw_lat: f64,
    /// South-west longitude.
    pub sw_lng: f64,
    /// North-east latitude.
    pub ne_lat: f64,
    /// North-east longitude.
    pub ne_lng: f64,
}

impl BoundingBox {
    /// Creates a bounding box from its south-west and north-east corners.
    #[must_use]
    pub const fn new(sw_lat: f64, sw_lng: f64, ne_lat: f64, ne_lng: f64) -> Self {
        Self {
            sw_lat,
            sw_lng,
            ne_lat,
            ne_lng,
        }
    }
}

/// Error returned when a bounding box string cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("Invalid bounding box {input:?}: expected \"sw_lat,sw_lng,ne_lat,ne_lng\"")]
pub struct ParseBoundingBoxError {
    /// The input that failed to parse.
    pub input: String,
}

impl std::str::FromStr for BoundingBox {
    type Err = ParseBoundingBoxError;

    /// Parses a `"sw_lat,sw_lng,ne_lat,ne_lng"` string (the CLI format).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseBoundingBoxError {
            input: s.to_string(),
        };

        let parts: Vec<f64> = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| err())?;

        match parts.as_slice() {
            &[sw_lat, sw_lng, ne_lat, ne_lng] => Ok(Self::new(sw_lat, sw_lng, ne_lat, ne_lng)),
            _ => Err(err()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_box() {
        let bbox: BoundingBox = "-34.05, 20.43, -34.04, 20.44".parse().unwrap();
        assert_eq!(bbox, BoundingBox::new(-34.05, 20.43, -34.04, 20.44));
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!("-34.05,20.43,-34.04".parse::<BoundingBox>().is_err());
        assert!("-34.05,20.43,-34.04,20.44,1.0".parse::<BoundingBox>().is_err());
    }

    #[test]
    fn rejects_non_numeric() {
        assert!("a,b,c,d".parse::<BoundingBox>().is_err());
    }

    #[test]
    fn does_not_validate_ordering() {
        // Malformed boxes are passed through to the remote API uninterpreted.
        assert!("20.44,-34.04,20.43,-34.05".parse::<BoundingBox>().is_ok());
    }
}
