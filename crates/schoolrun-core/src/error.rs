//! Error types for `schoolrun-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("latitude {0} out of range [-90, 90]")]
  LatitudeOutOfRange(f64),

  #[error("longitude {0} out of range [-180, 180]")]
  LongitudeOutOfRange(f64),

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("rider reference not found: {0}")]
  ReferenceNotFound(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
