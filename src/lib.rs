//! syncplicity_sample - A sample client for the Syncplicity REST API.
//!
//! This library provides functionality to:
//! - Authenticate with the OAuth client-credentials grant (and optionally a
//!   machine token for storage vaults)
//! - Provision users and groups
//! - Manage syncpoints, folders, files and share links
//!
//! # Example
//!
//! ```no_run
//! use syncplicity_sample::{Config, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_file("config.properties")?;
//!     config.validate()?;
//!
//!     let gateway = Gateway::new(config)?;
//!     gateway.authenticate().await;
//!
//!     for syncpoint in gateway.syncpoints().get_syncpoints(false).await {
//!         println!("{} {}", syncpoint.id, syncpoint.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod samples;
pub mod services;
pub mod session;

// Re-exports for convenience
pub use config::Config;
pub use error::{ApiError, ConfigError, Result};
pub use gateway::{ApiRequest, Credentials, Gateway};
pub use session::Session;
