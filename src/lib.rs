//! xfchat - Message Ingress Service
//!
//! The server side of a one-to-one chat: it accepts a message from an
//! authenticated user, checks that the sender may write to the conversation,
//! appends the message to the conversation's time-ordered log and fans it
//! out to realtime channels.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types and chat identifiers
//!   - Message record, request and notification bodies
//!   - `ChatId` parsing (`{userA}--{userB}`)
//!   - Error types
//!
//! - **`backend`** - Axum server
//!   - Message send and history handlers
//!   - Key-value and ordered-log stores (memory, SQLite, Upstash)
//!   - In-process channel hub with SSE subscriptions
//!   - JWT session resolution, publish retry worker
//!
//! # Usage
//!
//! ```rust,no_run
//! use xfchat::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::builder().jwt_secret("dev-secret").build()?;
//! let app = create_app(&config).await?;
//! // Use app with axum::serve
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
