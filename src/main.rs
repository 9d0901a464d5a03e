//! Game server (default binary).
//!
//! Boots the TCP adapter with settings from `NEMEIN_*` environment variables.
//! Log output is controlled with `RUST_LOG` (default `info`).

use anyhow::Result;
use log::info;

use nemein::adapter::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();
    info!(
        "starting nemein server on {}:{} ({}x{} board)",
        config.host, config.port, config.board_width, config.board_height
    );
    run_server(config, None).await
}
