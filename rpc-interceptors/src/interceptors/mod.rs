//! Built-in server interceptors
//!
//! This module provides concrete implementations of the ServerInterceptor trait
//! for common policies: logging, authentication, rate limiting, and metadata
//! injection.

pub mod auth;
pub mod logging;
pub mod metadata;
pub mod rate_limit;

pub use auth::AuthInterceptor;
pub use logging::LoggingInterceptor;
pub use metadata::{MetadataInterceptor, MetadataOperation, MetadataRule, MetadataTarget};
pub use rate_limit::RateLimitInterceptor;
