//! Call setup capabilities: handlers and interceptors.
//!
//! A [`ServerCallHandler`] turns an incoming call into a [`Listener`]. A
//! [`ServerInterceptor`] sits in front of one and decides whether, and with
//! which call object, to continue to the `next` handler. Terminal handlers and
//! intermediate chain links implement the same trait, which is what lets chains
//! compose.

use crate::call::{Listener, ServerCallRef};
use crate::error::RpcResult;
use crate::metadata::Metadata;
use std::sync::Arc;

/// Handler shared across every call of a method.
pub type SharedCallHandler = Arc<dyn ServerCallHandler + Send + Sync>;

/// Interceptor shared across every call of every wrapped method.
pub type SharedInterceptor = Arc<dyn ServerInterceptor>;

/// Starts processing of an incoming call.
///
/// The trait carries no `Send`/`Sync` bound so that per-call chain links can
/// keep unsynchronized state; handlers stored in a service definition are
/// [`SharedCallHandler`]s.
pub trait ServerCallHandler {
    /// Set up `call` for `method` and return the listener for inbound events.
    fn start_call(&self, method: &str, call: ServerCallRef, headers: Metadata)
        -> RpcResult<Listener>;
}

/// Cross-cutting policy applied to call setup.
pub trait ServerInterceptor: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Intercept the setup of `call`.
    ///
    /// Calling `next.start_call` continues the chain, possibly with a
    /// substituted call or headers. Returning without calling it short-circuits:
    /// no later interceptor and no terminal handler runs for this call.
    fn intercept_call(
        &self,
        method: &str,
        call: ServerCallRef,
        headers: Metadata,
        next: &dyn ServerCallHandler,
    ) -> RpcResult<Listener>;
}

/// Handler backed by a closure. See [`call_handler_fn`].
#[derive(Clone)]
pub struct CallHandlerFn<F> {
    f: F,
}

/// Wrap a closure as a [`SharedCallHandler`].
///
/// ```rust
/// use rpc_core::call::NoopListener;
/// use rpc_core::handler::call_handler_fn;
///
/// let handler = call_handler_fn(|_method: &str, _call, _headers| Ok(Box::new(NoopListener) as _));
/// # let _ = handler;
/// ```
pub fn call_handler_fn<F>(f: F) -> SharedCallHandler
where
    F: Fn(&str, ServerCallRef, Metadata) -> RpcResult<Listener> + Send + Sync + 'static,
{
    Arc::new(CallHandlerFn { f })
}

impl<F> ServerCallHandler for CallHandlerFn<F>
where
    F: Fn(&str, ServerCallRef, Metadata) -> RpcResult<Listener>,
{
    fn start_call(
        &self,
        method: &str,
        call: ServerCallRef,
        headers: Metadata,
    ) -> RpcResult<Listener> {
        (self.f)(method, call, headers)
    }
}

/// Interceptor backed by a closure. See [`interceptor_fn`].
pub struct InterceptorFn<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a named [`SharedInterceptor`].
pub fn interceptor_fn<F>(name: impl Into<String>, f: F) -> SharedInterceptor
where
    F: Fn(&str, ServerCallRef, Metadata, &dyn ServerCallHandler) -> RpcResult<Listener>
        + Send
        + Sync
        + 'static,
{
    Arc::new(InterceptorFn {
        name: name.into(),
        f,
    })
}

impl<F> ServerInterceptor for InterceptorFn<F>
where
    F: Fn(&str, ServerCallRef, Metadata, &dyn ServerCallHandler) -> RpcResult<Listener>
        + Send
        + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn intercept_call(
        &self,
        method: &str,
        call: ServerCallRef,
        headers: Metadata,
        next: &dyn ServerCallHandler,
    ) -> RpcResult<Listener> {
        (self.f)(method, call, headers, next)
    }
}
