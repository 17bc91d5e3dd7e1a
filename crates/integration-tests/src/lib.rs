//! Integration tests for QuickMeds.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL, migrate and seed
//! cargo run -p quickmeds-cli -- migrate
//!
//! # Start the server
//! cargo run -p quickmeds-server
//!
//! # Run integration tests against it
//! cargo test -p quickmeds-integration-tests -- --ignored
//! ```
//!
//! The base URL defaults to `http://localhost:3000` and can be overridden
//! with `QUICKMEDS_BASE_URL`.

/// Base URL for the server API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("QUICKMEDS_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}
