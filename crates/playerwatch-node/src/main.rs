//! Playerwatch Node binary
//!
//! Keeps the scary, blacklist and alt-account registries for a client and
//! serves them over a Unix admin socket.

use playerwatch_node::{NodeConfig, PlayerwatchNode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playerwatch_node=info,playerwatch_registry=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Playerwatch Node");

    let config = NodeConfig::from_env()?;

    let node = PlayerwatchNode::new(config).await?;
    node.run().await?;

    Ok(())
}
