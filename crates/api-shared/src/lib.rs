//! # API Shared
//!
//! Shared utilities and definitions for the discharge APIs.
//!
//! Contains:
//! - Wire types (`dto` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//! - Bearer-token session extraction
//!
//! Used by `api-rest`; the types mirror what the chat front end reads.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{session_from_authorization, AuthError};
pub use health::HealthService;
