//! Backend Module
//!
//! This module contains all server-side code: an Axum HTTP server that
//! accepts chat messages, persists them and publishes them to realtime
//! channels.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, app creation
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`messaging`** - Send and history handlers, ingress pipeline, retries
//! - **`store`** - Key-value and ordered-log storage backends
//! - **`realtime`** - Channel hub, publisher seam and SSE subscriptions
//! - **`auth`** - Session resolution from JWT bearer tokens
//! - **`error`** - Backend error type and HTTP conversion
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Configuration, state and initialization
//! ├── routes/         - Route configuration
//! ├── messaging/      - Message ingress
//! ├── store/          - Storage backends
//! ├── realtime/       - Pub/sub and SSE
//! ├── auth/           - Sessions
//! └── error/          - Error types
//! ```
//!
//! # Request Flow
//!
//! `POST /api/message/send` runs, in order: body parsing, session
//! resolution, participant and friendship checks, profile lookup, message
//! validation, the log append and finally two publishes. Nothing is written
//! until every check has passed, and a publish failure after the append is
//! retried in the background instead of failing the request.
//!
//! # Thread Safety
//!
//! Stores, the publisher and the session resolver are shared as
//! `Arc<dyn Trait>`; the hub is a `DashMap` of `broadcast::Sender`s. All of
//! it is `Send + Sync` and cloned into each request.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Message ingress
pub mod messaging;

/// Key-value and ordered-log stores
pub mod store;

/// Real-time update system
pub mod realtime;

/// Backend error types
pub mod error;

/// Session resolution
pub mod auth;

/// Re-export commonly used types
pub use error::BackendError;
pub use server::{create_app, AppState, ServerConfig};
