//! pump binary — simulates a driver device submitting fixes on a timer.
//!
//! Useful for exercising a running server without real hardware:
//!
//! ```text
//! cargo run -p schoolrun-device --bin pump -- \
//!   --server http://localhost:8080 --driver <uuid> --latitude 16.840 --longitude 96.170
//! ```

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use schoolrun_device::{FixPump, IngestClient, source::SimulatedRoute};
use tokio::sync::watch;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "schoolrun driver device simulator")]
struct Cli {
  /// Base URL of the schoolrun server.
  #[arg(long, default_value = "http://localhost:8080")]
  server: String,

  /// Driver identity to submit fixes as.
  #[arg(long)]
  driver: Uuid,

  /// Milliseconds between fixes.
  #[arg(long, default_value_t = 10_000)]
  interval_ms: u64,

  /// Starting latitude.
  #[arg(long)]
  latitude: f64,

  /// Starting longitude.
  #[arg(long)]
  longitude: f64,

  /// Degrees of latitude drifted per tick.
  #[arg(long, default_value_t = 0.0005)]
  step: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let client = IngestClient::new(&cli.server)?;
  let mut route = SimulatedRoute::new(cli.latitude, cli.longitude, cli.step);
  let pump = FixPump::new(cli.driver, Duration::from_millis(cli.interval_ms));

  // Ctrl-C toggles tracking off; the in-flight submission completes.
  let (stop_tx, stop_rx) = watch::channel(false);
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      let _ = stop_tx.send(true);
    }
  });

  tracing::info!(driver = %cli.driver, server = %cli.server, "tracking started");
  let stats = pump.run(&client, &mut route, stop_rx).await?;
  tracing::info!(?stats, "pump finished");

  Ok(())
}
