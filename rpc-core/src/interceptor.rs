//! Interceptor chaining for server call handlers.
//!
//! [`intercept`] rewrites a service definition so every method's handler runs
//! through an ordered list of [`ServerInterceptor`]s before reaching the
//! original handler. The list is snapshotted once and shared read-only by all
//! calls; each call walks it with its own [`ChainExecutor`].

use crate::call::{Listener, ServerCallRef};
use crate::error::{RpcError, RpcResult};
use crate::handler::{ServerCallHandler, SharedCallHandler, SharedInterceptor};
use crate::metadata::Metadata;
use crate::service::ServerServiceDefinition;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::sync::Arc;
use tracing::{debug, trace};

/// Create a new service definition whose handlers call `interceptors`, in
/// order, before the pre-existing handler.
///
/// `service_def` accepts an `Arc<ServerServiceDefinition>` or an `Option` of
/// one; `None` fails with [`RpcError::NullArgument`]. With no interceptors the
/// same `Arc` is returned. The input definition is left untouched.
///
/// # Examples
///
/// ```rust
/// use rpc_core::interceptor::intercept;
/// use rpc_core::service::ServerServiceDefinition;
/// use std::sync::Arc;
///
/// let service = Arc::new(ServerServiceDefinition::builder("echo.Echo").build()?);
/// let same = intercept(service.clone(), Vec::new())?;
/// assert!(Arc::ptr_eq(&service, &same));
/// # Ok::<(), rpc_core::error::RpcError>(())
/// ```
pub fn intercept<D, I>(service_def: D, interceptors: I) -> RpcResult<Arc<ServerServiceDefinition>>
where
    D: Into<Option<Arc<ServerServiceDefinition>>>,
    I: IntoIterator<Item = SharedInterceptor>,
{
    let service_def = service_def.into().ok_or(RpcError::NullArgument {
        argument: "service_def",
    })?;
    let interceptors: Arc<[SharedInterceptor]> = interceptors.into_iter().collect();
    if interceptors.is_empty() {
        trace!(service = %service_def.name(), "no interceptors configured, keeping definition");
        return Ok(service_def);
    }

    debug!(
        service = %service_def.name(),
        methods = service_def.methods().len(),
        interceptors = interceptors.len(),
        "wrapping service methods with interceptor chain"
    );

    let builder = service_def.methods().iter().fold(
        ServerServiceDefinition::builder(service_def.name()),
        |builder, method| {
            let handler = InterceptCallHandler::new(
                Arc::clone(&interceptors),
                Arc::clone(method.handler()),
            );
            builder.add_method(method.with_server_call_handler(Arc::new(handler)))
        },
    );
    Ok(Arc::new(builder.build()?))
}

/// Wrap a single handler with `interceptors`.
///
/// With no interceptors the handler itself is returned.
pub fn intercept_handler<I>(interceptors: I, handler: SharedCallHandler) -> SharedCallHandler
where
    I: IntoIterator<Item = SharedInterceptor>,
{
    let interceptors: Arc<[SharedInterceptor]> = interceptors.into_iter().collect();
    if interceptors.is_empty() {
        return handler;
    }
    Arc::new(InterceptCallHandler::new(interceptors, handler))
}

/// Handler that runs every call through a fresh [`ChainExecutor`].
pub struct InterceptCallHandler {
    interceptors: Arc<[SharedInterceptor]>,
    handler: SharedCallHandler,
}

impl InterceptCallHandler {
    /// Chain `interceptors` in front of `handler`.
    pub fn new(interceptors: Arc<[SharedInterceptor]>, handler: SharedCallHandler) -> Self {
        Self {
            interceptors,
            handler,
        }
    }

    /// The shared interceptor snapshot.
    pub fn interceptors(&self) -> &[SharedInterceptor] {
        &self.interceptors
    }
}

impl ServerCallHandler for InterceptCallHandler {
    fn start_call(
        &self,
        method: &str,
        call: ServerCallRef,
        headers: Metadata,
    ) -> RpcResult<Listener> {
        ChainExecutor::new(&self.interceptors, &*self.handler).start_call(method, call, headers)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Advancing(usize),
    Terminal,
}

/// Per-call traversal of an interceptor list.
///
/// Each `start_call` either hands the call to the next interceptor, passing the
/// executor itself as `next`, or, once the list is exhausted, to the terminal
/// handler. Exhaustion is permanent: further `start_call`s on the same
/// executor go straight to the terminal handler.
pub struct ChainExecutor<'a> {
    interceptors: &'a [SharedInterceptor],
    handler: &'a dyn ServerCallHandler,
    cursor: Cell<Cursor>,
}

impl<'a> ChainExecutor<'a> {
    /// Start a traversal at the first interceptor.
    pub fn new(interceptors: &'a [SharedInterceptor], handler: &'a dyn ServerCallHandler) -> Self {
        Self {
            interceptors,
            handler,
            cursor: Cell::new(Cursor::Advancing(0)),
        }
    }

    /// Whether every interceptor has been handed out.
    pub fn is_terminal(&self) -> bool {
        self.cursor.get() == Cursor::Terminal
    }

    fn advance(&self) -> Option<(usize, &'a SharedInterceptor)> {
        if let Cursor::Advancing(position) = self.cursor.get() {
            if let Some(interceptor) = self.interceptors.get(position) {
                self.cursor.set(Cursor::Advancing(position + 1));
                return Some((position, interceptor));
            }
        }
        self.cursor.set(Cursor::Terminal);
        None
    }
}

impl ServerCallHandler for ChainExecutor<'_> {
    fn start_call(
        &self,
        method: &str,
        call: ServerCallRef,
        headers: Metadata,
    ) -> RpcResult<Listener> {
        match self.advance() {
            Some((position, interceptor)) => {
                trace!(method, interceptor = interceptor.name(), position, "invoking interceptor");
                interceptor.intercept_call(method, call, headers, self)
            }
            None => {
                trace!(method, "interceptor chain exhausted, starting terminal handler");
                self.handler.start_call(method, call, headers)
            }
        }
    }
}

/// Statistics for an interceptor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterceptorStats {
    /// Total calls seen
    pub total_intercepted: u64,
    /// Calls passed on to the next handler
    pub total_forwarded: u64,
    /// Calls short-circuited
    pub total_rejected: u64,
    /// Last processed timestamp
    pub last_processed: Option<chrono::DateTime<chrono::Utc>>,
}

impl InterceptorStats {
    /// Record one intercepted call.
    pub fn record(&mut self, forwarded: bool) {
        self.total_intercepted += 1;
        if forwarded {
            self.total_forwarded += 1;
        } else {
            self.total_rejected += 1;
        }
        self.last_processed = Some(chrono::Utc::now());
    }
}
