//! # RPC Interceptors
//!
//! Ready-made [`ServerInterceptor`](rpc_core::ServerInterceptor)s for
//! `rpc-core` services and a configuration layer that assembles them into a
//! chain.
//!
//! ```rust
//! use rpc_interceptors::config::InterceptorChainConfig;
//!
//! # fn main() -> Result<(), rpc_core::RpcError> {
//! let config = InterceptorChainConfig::from_toml_str(
//!     r#"
//! [[interceptors]]
//! type = "logging"
//!
//! [[interceptors]]
//! type = "auth"
//! tokens = ["secret"]
//! "#,
//! )?;
//! let interceptors = config.build()?;
//! assert_eq!(interceptors.len(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod interceptors;

#[cfg(test)]
mod test_support;

pub use config::{InterceptorChainConfig, InterceptorConfig};
pub use interceptors::{
    AuthInterceptor, LoggingInterceptor, MetadataInterceptor, MetadataOperation, MetadataRule,
    MetadataTarget, RateLimitInterceptor,
};
