//! Server-side view of a call and the listener returned from call setup.
//!
//! [`ServerCall`] is what a handler uses to answer: send headers, send response
//! payloads, close with a status. Interceptors that need to change part of that
//! behavior implement [`ForwardingServerCall`], override only the operations
//! they care about, and pass the wrapper down the chain in place of the
//! original call. The same pattern exists for inbound events through
//! [`ForwardingServerCallListener`].

use crate::error::RpcResult;
use crate::metadata::Metadata;
use crate::status::Status;
use std::sync::Arc;

/// Payload carried by a call. Framing and typed decoding happen outside the core.
pub type Payload = serde_json::Value;

/// Shared handle to a call, cheap to clone into listeners and forwarders.
pub type ServerCallRef = Arc<dyn ServerCall>;

/// Listener returned from call setup.
pub type Listener = Box<dyn ServerCallListener>;

/// Outbound half of a server call.
///
/// Implementations are provided by the transport. All methods take `&self`;
/// implementations own whatever interior mutability they need.
pub trait ServerCall: Send + Sync {
    /// Send response headers. Must be called at most once, before any payload.
    fn send_headers(&self, headers: Metadata) -> RpcResult<()>;

    /// Send one response payload.
    fn send_payload(&self, payload: Payload) -> RpcResult<()>;

    /// Close the call with a status and trailing metadata.
    fn close(&self, status: Status, trailers: Metadata) -> RpcResult<()>;

    /// Whether the peer has cancelled the call.
    fn is_cancelled(&self) -> bool;
}

/// A [`ServerCall`] decorator that forwards everything to a delegate.
///
/// Only [`delegate`](ForwardingServerCall::delegate) is required. Every other
/// method forwards unchanged unless overridden, and every implementor is a
/// [`ServerCall`] through a blanket impl.
///
/// ```rust
/// use rpc_core::call::{ForwardingServerCall, ServerCall, ServerCallRef};
/// use rpc_core::error::RpcResult;
/// use rpc_core::metadata::Metadata;
/// use rpc_core::status::Status;
///
/// struct ServedBy {
///     delegate: ServerCallRef,
/// }
///
/// impl ForwardingServerCall for ServedBy {
///     fn delegate(&self) -> &dyn ServerCall {
///         &*self.delegate
///     }
///
///     fn close(&self, status: Status, mut trailers: Metadata) -> RpcResult<()> {
///         trailers.insert("x-served-by", "node-1");
///         self.delegate().close(status, trailers)
///     }
/// }
/// ```
pub trait ForwardingServerCall: Send + Sync {
    /// The call every non-overridden operation is forwarded to.
    fn delegate(&self) -> &dyn ServerCall;

    /// Forwards to the delegate.
    fn send_headers(&self, headers: Metadata) -> RpcResult<()> {
        self.delegate().send_headers(headers)
    }

    /// Forwards to the delegate.
    fn send_payload(&self, payload: Payload) -> RpcResult<()> {
        self.delegate().send_payload(payload)
    }

    /// Forwards to the delegate.
    fn close(&self, status: Status, trailers: Metadata) -> RpcResult<()> {
        self.delegate().close(status, trailers)
    }

    /// Forwards to the delegate.
    fn is_cancelled(&self) -> bool {
        self.delegate().is_cancelled()
    }
}

impl<T: ForwardingServerCall> ServerCall for T {
    fn send_headers(&self, headers: Metadata) -> RpcResult<()> {
        ForwardingServerCall::send_headers(self, headers)
    }

    fn send_payload(&self, payload: Payload) -> RpcResult<()> {
        ForwardingServerCall::send_payload(self, payload)
    }

    fn close(&self, status: Status, trailers: Metadata) -> RpcResult<()> {
        ForwardingServerCall::close(self, status, trailers)
    }

    fn is_cancelled(&self) -> bool {
        ForwardingServerCall::is_cancelled(self)
    }
}

/// Forwarder that overrides nothing.
#[derive(Clone)]
pub struct SimpleForwardingServerCall {
    delegate: ServerCallRef,
}

impl SimpleForwardingServerCall {
    /// Wrap `delegate`.
    pub fn new(delegate: ServerCallRef) -> Self {
        Self { delegate }
    }
}

impl ForwardingServerCall for SimpleForwardingServerCall {
    fn delegate(&self) -> &dyn ServerCall {
        &*self.delegate
    }
}

/// Inbound events for a call, delivered by the transport after setup.
///
/// Every callback defaults to doing nothing.
pub trait ServerCallListener: Send {
    /// A request payload arrived.
    fn on_payload(&mut self, _payload: Payload) {}

    /// The client finished sending.
    fn on_half_close(&mut self) {}

    /// The call was cancelled; no further events follow.
    fn on_cancel(&mut self) {}

    /// The call completed normally; no further events follow.
    fn on_complete(&mut self) {}

    /// The call can accept more outbound payloads without buffering.
    fn on_ready(&mut self) {}
}

/// Listener that ignores every event.
///
/// Interceptors that short-circuit a call return this after closing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl ServerCallListener for NoopListener {}

/// A [`ServerCallListener`] decorator that forwards everything to a delegate.
pub trait ForwardingServerCallListener: Send {
    /// The listener every non-overridden callback is forwarded to.
    fn delegate_mut(&mut self) -> &mut dyn ServerCallListener;

    /// Forwards to the delegate.
    fn on_payload(&mut self, payload: Payload) {
        self.delegate_mut().on_payload(payload)
    }

    /// Forwards to the delegate.
    fn on_half_close(&mut self) {
        self.delegate_mut().on_half_close()
    }

    /// Forwards to the delegate.
    fn on_cancel(&mut self) {
        self.delegate_mut().on_cancel()
    }

    /// Forwards to the delegate.
    fn on_complete(&mut self) {
        self.delegate_mut().on_complete()
    }

    /// Forwards to the delegate.
    fn on_ready(&mut self) {
        self.delegate_mut().on_ready()
    }
}

impl<T: ForwardingServerCallListener> ServerCallListener for T {
    fn on_payload(&mut self, payload: Payload) {
        ForwardingServerCallListener::on_payload(self, payload)
    }

    fn on_half_close(&mut self) {
        ForwardingServerCallListener::on_half_close(self)
    }

    fn on_cancel(&mut self) {
        ForwardingServerCallListener::on_cancel(self)
    }

    fn on_complete(&mut self) {
        ForwardingServerCallListener::on_complete(self)
    }

    fn on_ready(&mut self) {
        ForwardingServerCallListener::on_ready(self)
    }
}

/// Listener forwarder that overrides nothing.
pub struct SimpleForwardingServerCallListener {
    delegate: Listener,
}

impl SimpleForwardingServerCallListener {
    /// Wrap `delegate`.
    pub fn new(delegate: Listener) -> Self {
        Self { delegate }
    }
}

impl ForwardingServerCallListener for SimpleForwardingServerCallListener {
    fn delegate_mut(&mut self) -> &mut dyn ServerCallListener {
        &mut *self.delegate
    }
}
