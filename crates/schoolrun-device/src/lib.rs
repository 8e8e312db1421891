//! Driver-side fix production.
//!
//! The cadence timer lives here, on the device, not on the server: the
//! server stays correct under bursty, delayed, or missing fixes, and
//! stopping tracking simply stops scheduling new submissions. Any fix
//! already in flight completes normally.

#![allow(async_fn_in_trait)]

pub mod client;
pub mod pump;
pub mod source;

pub use client::IngestClient;
pub use pump::{FixPump, FixSink, PumpStats};
pub use source::{LocationSource, Sample, SourceError};
