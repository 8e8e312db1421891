//! The live tracking pipeline: ingestion → proximity engine → fan-out.
//!
//! [`Tracker`] is the facade the HTTP layer talks to. Every accepted fix and
//! registry change flows through it synchronously, so fixes for one subject
//! are processed in submission order while different subjects interleave
//! freely.

pub mod engine;
pub mod event;
pub mod fanout;
pub mod tracker;

pub use engine::ProximityEngine;
pub use event::TrackingEvent;
pub use fanout::SessionRegistry;
pub use tracker::Tracker;

#[cfg(test)]
mod tests;
