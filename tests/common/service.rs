//! Test service and a minimal dispatcher

use rpc_core::{
    call_handler_fn, Listener, Metadata, MethodDescriptor, MethodType, NoopListener, RpcResult,
    ServerCallRef, ServerServiceDefinition, SharedCallHandler, Status,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Name of the test service
pub const ECHO_SERVICE: &str = "echo.Echo";
/// Unary method of the test service
pub const ECHO_SAY: &str = "echo.Echo/Say";
/// Server streaming method of the test service
pub const ECHO_WATCH: &str = "echo.Echo/Watch";

/// Echo service whose handlers count how often they run
pub struct EchoService {
    pub definition: Arc<ServerServiceDefinition>,
    invocations: Arc<AtomicUsize>,
}

impl EchoService {
    pub fn new() -> RpcResult<Self> {
        let invocations = Arc::new(AtomicUsize::new(0));
        let definition = ServerServiceDefinition::builder(ECHO_SERVICE)
            .add_method_with(
                MethodDescriptor::new(ECHO_SERVICE, "Say", MethodType::Unary, "SayRequest", "SayReply"),
                echo_handler(&invocations, 1),
            )
            .add_method_with(
                MethodDescriptor::new(
                    ECHO_SERVICE,
                    "Watch",
                    MethodType::ServerStreaming,
                    "WatchRequest",
                    "WatchEvent",
                ),
                echo_handler(&invocations, 3),
            )
            .build()?;

        Ok(Self {
            definition: Arc::new(definition),
            invocations,
        })
    }

    /// How many times any terminal handler of this service ran
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

/// Terminal handler echoing the caller's `x-call-id` in `replies` payloads.
fn echo_handler(invocations: &Arc<AtomicUsize>, replies: usize) -> SharedCallHandler {
    let invocations = invocations.clone();
    call_handler_fn(move |method: &str, call, headers| {
        invocations.fetch_add(1, Ordering::SeqCst);
        if call.is_cancelled() {
            call.close(Status::cancelled("peer went away"), Metadata::new())?;
            return Ok(Box::new(NoopListener));
        }

        let mut response_headers = Metadata::new();
        response_headers.insert("x-handler", "echo");
        call.send_headers(response_headers)?;

        let call_id = headers.get("x-call-id").unwrap_or("anonymous").to_string();
        for seq in 0..replies {
            call.send_payload(json!({ "method": method, "call_id": call_id, "seq": seq }))?;
        }
        call.close(Status::OK, Metadata::new())?;
        Ok(Box::new(NoopListener))
    })
}

/// Route `method` to its handler on `service`, the way a transport would
pub fn dispatch(
    service: &ServerServiceDefinition,
    method: &str,
    call: ServerCallRef,
    headers: Metadata,
) -> RpcResult<Listener> {
    let definition = service
        .methods()
        .iter()
        .find(|definition| definition.name() == method)
        .ok_or_else(|| Status::unimplemented(format!("unknown method '{}'", method)))?;
    definition.handler().start_call(method, call, headers)
}
