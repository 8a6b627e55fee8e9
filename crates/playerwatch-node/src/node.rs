//! Playerwatch Node - the main application entry point.
//!
//! Architecture:
//! - Single daemon process owning one [`SocialState`]
//! - Document store under the data directory
//! - Background profile resolution on the tokio runtime
//! - Unix admin socket for management and status commands

use crate::admin_socket::AdminSocket;
use crate::config::NodeConfig;
use crate::error::Result;
use crate::refresher::{OfflineProfiles, ProfileRefresher, ProfileService};
use crate::state::{SharedState, SocialState};
use crate::storage::open_store;
use playerwatch_registry::RefreshScheduler;
use std::sync::Arc;

/// A Playerwatch node instance.
pub struct PlayerwatchNode {
    state: SharedState,
    config: NodeConfig,
}

impl PlayerwatchNode {
    /// Create a node that resolves no profiles.
    pub async fn new(config: NodeConfig) -> Result<Self> {
        Self::with_service(config, Arc::new(OfflineProfiles)).await
    }

    /// Create a node resolving profiles through `service`.
    pub async fn with_service(config: NodeConfig, service: Arc<dyn ProfileService>) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let store = open_store(&config)?;
        let refresher: Arc<dyn RefreshScheduler> =
            Arc::new(ProfileRefresher::current(service, config.max_lookups)?);
        let highlight = config.load_highlight()?;

        let state = SocialState::load(store, Some(refresher), highlight)?.into_shared();
        {
            let state = state.read().await;
            tracing::info!(
                "Loaded {} scary, {} blacklisted, {} alt groups ({} players)",
                state.scary.count(),
                state.blacklisted.count(),
                state.alts.count(),
                state.alts.total_tracked_players()
            );
        }

        Ok(Self { state, config })
    }

    /// Get the shared state.
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Run the node until interrupted.
    pub async fn run(self) -> Result<()> {
        tracing::info!("Playerwatch node starting");
        tracing::info!("  Admin: {:?}", self.config.admin_socket);
        tracing::info!("  Data: {:?}", self.config.data_dir);
        tracing::info!("  Store: {:?}", self.config.store);

        let admin_socket = AdminSocket::new(self.state(), self.config.admin_socket.clone());
        let listener = admin_socket.bind()?;
        let admin = tokio::spawn(async move {
            if let Err(e) = admin_socket.serve(listener).await {
                tracing::error!("Admin socket error: {}", e);
            }
        });

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                tracing::info!("Shutting down");
            }
            _ = admin => {
                tracing::warn!("Admin socket stopped");
            }
        }

        let _ = std::fs::remove_file(&self.config.admin_socket);
        Ok(())
    }
}
