//! # RPC Core Library
//!
//! `rpc-core` provides the server-side call model of an RPC framework and the
//! machinery for wrapping every method of a service with an ordered chain of
//! interceptors (auth, logging, tracing, rate limiting) without touching the
//! method handlers themselves.
//!
//! ## Quick Start
//!
//! ```rust
//! use rpc_core::{
//!     call_handler_fn, intercept, interceptor_fn, MethodDescriptor, MethodType, NoopListener,
//!     ServerServiceDefinition,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), rpc_core::RpcError> {
//! let say = MethodDescriptor::new("echo.Echo", "Say", MethodType::Unary, "SayRequest", "SayReply");
//! let service = ServerServiceDefinition::builder("echo.Echo")
//!     .add_method_with(
//!         say,
//!         call_handler_fn(|_method: &str, _call, _headers| Ok(Box::new(NoopListener) as _)),
//!     )
//!     .build()?;
//!
//! let audit = interceptor_fn("audit", |method, call, headers, next| {
//!     println!("starting {}", method);
//!     next.start_call(method, call, headers)
//! });
//!
//! let service = intercept(Arc::new(service), vec![audit])?;
//! assert_eq!(service.name(), "echo.Echo");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`call`]: the outbound call capability, forwarding decorators and listeners
//! - [`handler`]: call handler and interceptor capabilities
//! - [`service`]: immutable service and method definitions
//! - [`interceptor`]: service rewriting and per-call chain traversal
//! - [`metadata`] / [`status`]: headers, trailers and completion status
//! - [`error`]: error types for all core operations

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]

pub mod call;
pub mod error;
pub mod handler;
pub mod interceptor;
pub mod metadata;
pub mod service;
pub mod status;

// Re-export commonly used types for convenience
pub use call::{
    ForwardingServerCall, ForwardingServerCallListener, Listener, NoopListener, Payload,
    ServerCall, ServerCallListener, ServerCallRef, SimpleForwardingServerCall,
    SimpleForwardingServerCallListener,
};
pub use error::{CallError, ConfigError, DefinitionError, RpcError, RpcResult};
pub use handler::{
    call_handler_fn, interceptor_fn, ServerCallHandler, ServerInterceptor, SharedCallHandler,
    SharedInterceptor,
};
pub use interceptor::{intercept, intercept_handler, ChainExecutor, InterceptCallHandler, InterceptorStats};
pub use metadata::{Headers, Metadata, Trailers};
pub use service::{
    MethodDescriptor, MethodType, ServerMethodDefinition, ServerServiceDefinition,
    ServiceDefinitionBuilder,
};
pub use status::{Status, StatusCode};

/// Current version of the rpc-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
