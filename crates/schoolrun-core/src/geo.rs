//! Geographic primitives — validated coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Mean Earth radius in meters, as used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A validated WGS84 coordinate pair.
///
/// Construct via [`Coordinate::new`], which enforces the latitude/longitude
/// ranges. Deserialized values (e.g. rows read back from the store) are
/// trusted, since every write path re-validates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
  pub latitude:  f64,
  pub longitude: f64,
}

impl Coordinate {
  /// Validate and build a coordinate.
  ///
  /// Rejects latitudes outside `[-90, 90]` and longitudes outside
  /// `[-180, 180]`. NaN fails both range checks.
  pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
    if !(-90.0..=90.0).contains(&latitude) {
      return Err(Error::LatitudeOutOfRange(latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
      return Err(Error::LongitudeOutOfRange(longitude));
    }
    Ok(Self { latitude, longitude })
  }
}

/// Great-circle distance between two coordinates via the haversine formula.
pub fn haversine_meters(a: Coordinate, b: Coordinate) -> f64 {
  let d_lat = (b.latitude - a.latitude).to_radians();
  let d_lon = (b.longitude - a.longitude).to_radians();

  let h = (d_lat / 2.0).sin().powi(2)
    + a.latitude.to_radians().cos()
      * b.latitude.to_radians().cos()
      * (d_lon / 2.0).sin().powi(2);

  let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
  EARTH_RADIUS_METERS * c
}
