//! Chain traversal under concurrency and call substitution, driven through the public API

use parking_lot::Mutex;
use rpc_core::{
    call_handler_fn, intercept, interceptor_fn, ForwardingServerCall, Metadata, MethodDescriptor,
    MethodType, NoopListener, RpcResult, ServerCall, ServerCallRef, ServerServiceDefinition,
    SharedCallHandler, SharedInterceptor, Status, StatusCode,
};
use rpc_tests::{RecordingCall, Sent};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Barrier};

/// Per-call log keyed by the `x-call-id` header.
type CallLog = Arc<Mutex<HashMap<String, Vec<String>>>>;

fn call_id(headers: &Metadata) -> String {
    headers.get("x-call-id").unwrap_or("none").to_string()
}

fn echo_service(handler: SharedCallHandler) -> Arc<ServerServiceDefinition> {
    Arc::new(
        ServerServiceDefinition::builder("echo.Echo")
            .add_method_with(
                MethodDescriptor::new("echo.Echo", "Say", MethodType::Unary, "Req", "Resp"),
                handler,
            )
            .build()
            .unwrap(),
    )
}

fn echo_terminal(log: &CallLog) -> SharedCallHandler {
    let log = log.clone();
    call_handler_fn(move |_method: &str, call, headers| {
        log.lock().entry(call_id(&headers)).or_default().push("T".to_string());
        call.send_payload(json!({ "echo": call_id(&headers) }))?;
        call.close(Status::OK, Metadata::new())?;
        Ok(Box::new(NoopListener))
    })
}

fn labelled(label: &'static str, log: &CallLog) -> SharedInterceptor {
    let log = log.clone();
    interceptor_fn(label, move |method, call, headers, next| {
        log.lock()
            .entry(call_id(&headers))
            .or_default()
            .push(label.to_string());
        next.start_call(method, call, headers)
    })
}

#[test]
fn test_concurrent_calls_traverse_independently() {
    let log = CallLog::default();
    let barrier = Arc::new(Barrier::new(2));
    let rendezvous = {
        let barrier = barrier.clone();
        let log = log.clone();
        interceptor_fn("rendezvous", move |method, call, headers, next| {
            log.lock()
                .entry(call_id(&headers))
                .or_default()
                .push("A".to_string());
            // both calls are inside the chain at the same time past this point
            barrier.wait();
            next.start_call(method, call, headers)
        })
    };

    let service = intercept(
        echo_service(echo_terminal(&log)),
        vec![rendezvous, labelled("B", &log)],
    )
    .unwrap();

    let workers: Vec<_> = ["first", "second"]
        .into_iter()
        .map(|id| {
            let service = service.clone();
            std::thread::spawn(move || {
                let method = &service.methods()[0];
                let mut headers = Metadata::new();
                headers.insert("x-call-id", id);
                let call = Arc::new(RecordingCall::default());
                method
                    .handler()
                    .start_call(method.name(), call.clone(), headers)
                    .unwrap();
                call
            })
        })
        .collect();

    let calls: Vec<Arc<RecordingCall>> = workers.into_iter().map(|w| w.join().unwrap()).collect();

    let log = log.lock();
    assert_eq!(log["first"], vec!["A", "B", "T"]);
    assert_eq!(log["second"], vec!["A", "B", "T"]);
    assert_eq!(calls[0].sent()[0], Sent::Payload(json!({ "echo": "first" })));
    assert_eq!(calls[1].sent()[0], Sent::Payload(json!({ "echo": "second" })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_calls_on_shared_handler() {
    let log = CallLog::default();
    let service = intercept(
        echo_service(echo_terminal(&log)),
        vec![labelled("A", &log), labelled("B", &log)],
    )
    .unwrap();

    let mut tasks = Vec::new();
    for i in 0..32 {
        let service = service.clone();
        tasks.push(tokio::task::spawn_blocking(move || {
            let method = &service.methods()[0];
            let mut headers = Metadata::new();
            headers.insert("x-call-id", format!("call-{}", i));
            method
                .handler()
                .start_call(method.name(), Arc::new(RecordingCall::default()), headers)
                .map(|_| ())
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let log = log.lock();
    assert_eq!(log.len(), 32);
    assert!(log.values().all(|entries| *entries == vec!["A", "B", "T"]));
}

struct AuditTrailers {
    delegate: ServerCallRef,
}

impl ForwardingServerCall for AuditTrailers {
    fn delegate(&self) -> &dyn ServerCall {
        &*self.delegate
    }

    fn close(&self, status: Status, mut trailers: Metadata) -> RpcResult<()> {
        trailers.insert("x-audited", "true");
        self.delegate().close(status, trailers)
    }
}

#[test]
fn test_interceptor_substitutes_call_for_downstream_links() {
    let log = CallLog::default();
    let auditing = interceptor_fn("audit", |method, call, headers, next| {
        let wrapped: ServerCallRef = Arc::new(AuditTrailers { delegate: call });
        next.start_call(method, wrapped, headers)
    });
    let service = intercept(echo_service(echo_terminal(&log)), vec![auditing]).unwrap();

    let call = Arc::new(RecordingCall::default());
    let method = &service.methods()[0];
    method
        .handler()
        .start_call(method.name(), call.clone(), Metadata::new())
        .unwrap();

    let sent = call.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], Sent::Payload(json!({ "echo": "none" })));
    match &sent[1] {
        Sent::Close(status, trailers) => {
            assert_eq!(status.code(), StatusCode::Ok);
            assert_eq!(trailers.get("x-audited"), Some("true"));
        }
        other => panic!("expected close, got {:?}", other),
    }
}

#[test]
fn test_original_definition_stays_usable() {
    let log = CallLog::default();
    let original = echo_service(echo_terminal(&log));
    let _intercepted = intercept(original.clone(), vec![labelled("A", &log)]).unwrap();

    let method = &original.methods()[0];
    let mut headers = Metadata::new();
    headers.insert("x-call-id", "direct");
    method
        .handler()
        .start_call(method.name(), Arc::new(RecordingCall::default()), headers)
        .unwrap();

    assert_eq!(log.lock()["direct"], vec!["T"]);
}
