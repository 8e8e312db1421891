//! Location sources — where a device's GPS samples come from.

use thiserror::Error;

/// One raw GPS sample, before it becomes a fix.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
  pub latitude:        f64,
  pub longitude:       f64,
  pub accuracy_meters: Option<f64>,
}

#[derive(Debug, Error)]
pub enum SourceError {
  /// The user revoked location access. Fatal for the pump: it must stop and
  /// surface this to the user rather than silently retry forever.
  #[error("location permission revoked")]
  PermissionDenied,

  /// Transient failure (no satellite lock, hardware hiccup). The pump skips
  /// the tick and tries again on the next one.
  #[error("location unavailable: {0}")]
  Unavailable(String),
}

/// Abstraction over the device's positioning hardware.
pub trait LocationSource: Send {
  async fn sample(&mut self) -> Result<Sample, SourceError>;
}

/// A synthetic route for the simulator binary: starts at a point and drifts
/// a fixed number of degrees of latitude per sample.
#[derive(Debug, Clone)]
pub struct SimulatedRoute {
  latitude:  f64,
  longitude: f64,
  step:      f64,
}

impl SimulatedRoute {
  pub fn new(latitude: f64, longitude: f64, step: f64) -> Self {
    Self { latitude, longitude, step }
  }
}

impl LocationSource for SimulatedRoute {
  async fn sample(&mut self) -> Result<Sample, SourceError> {
    let sample = Sample {
      latitude:        self.latitude,
      longitude:       self.longitude,
      accuracy_meters: Some(5.0),
    };
    self.latitude = (self.latitude + self.step).clamp(-90.0, 90.0);
    Ok(sample)
  }
}
