//! Runs the scripted failover scenario with pacing and human-readable logs.
//!
//! ```sh
//! cargo run --example scripted_failover
//! ```

use std::time::Duration;

use ringleader::{RingConfig, ScriptedFailover, run_scenario};

#[tokio::main]
async fn main() -> ringleader::RingResult<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut scenario = ScriptedFailover::with_step_delay(Duration::from_millis(300));
    run_scenario(RingConfig::new(4), &mut scenario).await?;

    tracing::info!(leaders = ?scenario.leaders, "leaders over the scenario");
    Ok(())
}
