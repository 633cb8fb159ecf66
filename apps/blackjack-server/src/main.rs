//! Blackjack dealer.
//!
//! Reads `BLACKJACK_*` variables, binds, advertises itself on UDP and
//! serves players until killed.

use blackjack::logging;
use blackjack::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = ServerConfig::from_env()?;
    let server = BlackjackServerBuilder::from_config(config).build().await?;

    let addr = server.local_addr()?;
    tracing::info!(
        ip = %addr.ip(),
        port = addr.port(),
        name = %server.config().server_name,
        "server started"
    );

    server.run().await?;
    Ok(())
}
