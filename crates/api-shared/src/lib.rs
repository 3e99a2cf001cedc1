//! # API Shared
//!
//! Shared request/response types for the permissions APIs.
//!
//! Contains:
//! - JSON request/response bodies with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//!
//! Bodies carry plain strings and integers; parsing into domain types happens in the API crate
//! so that malformed input can be answered with `400 Bad Request`.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
