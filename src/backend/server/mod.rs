//! Server Module
//!
//! This module contains the code that configures and assembles the Axum
//! HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure shared by the handlers
//! - **`config`** - Configuration loading and validation
//! - **`init`** - Store connection and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState definition
//! ├── config.rs       - Environment configuration, store backends
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use xfchat::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(&config).await?;
//! let listener = tokio::net::TcpListener::bind(config.socket_addr()?).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use config::{ConfigError, ServerConfig, StoreBackend};
pub use init::{build_state, create_app};
pub use state::AppState;
