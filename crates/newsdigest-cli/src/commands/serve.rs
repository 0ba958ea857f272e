use std::sync::Arc;

use anyhow::Result;

use newsdigest_core::AppConfig;

use crate::server;

pub async fn run(config: Arc<AppConfig>, bind: Option<String>) -> Result<()> {
    let bind_address = bind.unwrap_or_else(|| config.server.bind_address.clone());
    server::start_server(config, &bind_address).await
}
