//! Playerwatch Node - persistent social registries behind an admin socket
//!
//! Hosts the scary, blacklist and alt-account registries for one client,
//! keeps them on disk, resolves profiles in the background and answers
//! management and status commands.
//!
//! # Architecture
//!
//! - **Storage**: file-backed (or RocksDB-backed) document stores
//! - **Refresher**: bounded background profile resolution on tokio
//! - **State**: the single shared instance of every registry
//! - **Commands**: management and query commands with chat-style replies
//! - **Admin Socket**: Unix socket speaking newline-delimited JSON commands
//!
//! # Example
//!
//! ```no_run
//! use playerwatch_node::{NodeConfig, PlayerwatchNode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NodeConfig::from_env()?;
//!     let node = PlayerwatchNode::new(config).await?;
//!     node.run().await?;
//!     Ok(())
//! }
//! ```

pub mod admin_socket;
pub mod commands;
pub mod config;
pub mod error;
pub mod node;
pub mod refresher;
pub mod state;
pub mod storage;

pub use commands::{execute_command, Command, Response, SuggestSource};
pub use config::{NodeConfig, StoreBackend};
pub use error::{Error, Result};
pub use node::PlayerwatchNode;
pub use refresher::{OfflineProfiles, ProfileLookup, ProfileRefresher, ProfileService};
pub use state::{SharedState, SocialState};
pub use storage::FileStore;
