//! Policy server entry point.

use anyhow::Context;
use clap::Parser;
use log::info;
use policy_core::{init_logging, seed_sample_data, SystemClock};
use policy_server::{serve, AppState, ServerConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    let target = config.log_target().map_err(anyhow::Error::msg)?;
    init_logging(config.log_level(), target).map_err(anyhow::Error::msg)?;

    let mut conn = config.open_store().context("failed to open policy store")?;
    if config.seed {
        let summary = seed_sample_data(&mut conn).context("failed to seed sample data")?;
        info!(
            "event=server_seed module=main status=ok policies={} notes={}",
            summary.policies, summary.notes
        );
    }

    serve(config.bind, AppState::new(conn, Arc::new(SystemClock))).await
}
