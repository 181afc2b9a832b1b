//! Serve command handler.

use anyhow::Result;
use pkgstore_axum::start_server;
use tracing::info;

use crate::config::ServeArgs;

/// Run the web server until the process is stopped.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = args.into_server_config();
    info!(host = %config.host, port = config.port, "starting pkgstore");
    start_server(config).await
}
