//! Call and handler doubles shared by the unit tests.

use parking_lot::Mutex;
use rpc_core::{
    call_handler_fn, CallError, Metadata, NoopListener, Payload, RpcResult, ServerCall, Status,
    SharedCallHandler,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Headers(Metadata),
    Payload(Payload),
    Close(Status, Metadata),
}

#[derive(Default)]
pub struct RecordingCall {
    pub sent: Mutex<Vec<Sent>>,
    closed: AtomicBool,
}

impl RecordingCall {
    pub fn closed_with(&self) -> Option<(Status, Metadata)> {
        self.sent.lock().iter().find_map(|sent| match sent {
            Sent::Close(status, trailers) => Some((status.clone(), trailers.clone())),
            _ => None,
        })
    }
}

impl ServerCall for RecordingCall {
    fn send_headers(&self, headers: Metadata) -> RpcResult<()> {
        self.sent.lock().push(Sent::Headers(headers));
        Ok(())
    }

    fn send_payload(&self, payload: Payload) -> RpcResult<()> {
        self.sent.lock().push(Sent::Payload(payload));
        Ok(())
    }

    fn close(&self, status: Status, trailers: Metadata) -> RpcResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(CallError::AlreadyClosed {
                method: "test".to_string(),
            }
            .into());
        }
        self.sent.lock().push(Sent::Close(status, trailers));
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Terminal handler that answers OK and counts invocations.
pub fn ok_handler(count: &Arc<AtomicUsize>) -> SharedCallHandler {
    let count = count.clone();
    call_handler_fn(move |_method: &str, call, _headers| {
        count.fetch_add(1, Ordering::SeqCst);
        call.send_headers(Metadata::new())?;
        call.send_payload(serde_json::json!({ "ok": true }))?;
        call.close(Status::OK, Metadata::new())?;
        Ok(Box::new(NoopListener))
    })
}
