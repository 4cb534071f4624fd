//! Routes Module
//!
//! HTTP route configuration and router assembly.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs         - Module exports and documentation
//! ├── router.rs      - Main router, health check, realtime and fallback
//! └── api_routes.rs  - Message API endpoints
//! ```
//!
//! # Dependencies
//!
//! - `backend::server::state` - Application state
//! - `backend::messaging::handlers` - Message route handlers
//! - `backend::realtime` - SSE subscription handler

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;
