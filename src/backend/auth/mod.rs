//! Authentication Module
//!
//! Resolves the caller of a request. Identity itself is owned by an external
//! provider; this service only verifies the session tokens it issues.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs       - Module exports and documentation
//! └── sessions.rs  - SessionResolver trait, JWT verification
//! ```
//!
//! # Security
//!
//! - Tokens are HS256 JWTs signed with `JWT_SECRET`
//! - Expired or badly signed tokens resolve to no session (401)

/// Session resolution and JWT tokens
pub mod sessions;

pub use sessions::{
    create_token, verify_token, JwtSessionResolver, Session, SessionResolver, SessionUser,
};
