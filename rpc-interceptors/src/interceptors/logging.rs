//! Logging interceptor that records call setup and completion

use parking_lot::Mutex;
use rpc_core::{
    ForwardingServerCall, InterceptorStats, Listener, Metadata, RpcResult, ServerCall,
    ServerCallHandler, ServerCallRef, ServerInterceptor, Status,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Interceptor that logs every call for debugging and monitoring
pub struct LoggingInterceptor {
    name: String,
    stats: Arc<Mutex<InterceptorStats>>,
    /// Whether to log request headers (can be verbose)
    log_headers: bool,
}

impl LoggingInterceptor {
    /// Create a new logging interceptor
    pub fn new(log_headers: bool) -> Self {
        Self {
            name: "LoggingInterceptor".to_string(),
            stats: Arc::new(Mutex::new(InterceptorStats::default())),
            log_headers,
        }
    }

    /// Get statistics about this interceptor
    pub fn stats(&self) -> InterceptorStats {
        self.stats.lock().clone()
    }
}

impl ServerInterceptor for LoggingInterceptor {
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
        let call_id = Uuid::new_v4();

        if self.log_headers {
            let rendered: Vec<String> = headers
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            info!(
                "[{}] call {} started: {} headers: [{}]",
                self.name,
                call_id,
                method,
                rendered.join(", ")
            );
        } else {
            info!("[{}] call {} started: {}", self.name, call_id, method);
        }

        self.stats.lock().record(true);

        let logged: ServerCallRef = Arc::new(LoggingServerCall {
            delegate: call,
            interceptor: self.name.clone(),
            method: method.to_string(),
            call_id,
            started: Instant::now(),
        });

        next.start_call(method, logged, headers).map_err(|e| {
            warn!("[{}] call {} failed during setup: {}", self.name, call_id, e);
            e
        })
    }
}

/// Call wrapper that logs how a call ends.
struct LoggingServerCall {
    delegate: ServerCallRef,
    interceptor: String,
    method: String,
    call_id: Uuid,
    started: Instant,
}

impl ForwardingServerCall for LoggingServerCall {
    fn delegate(&self) -> &dyn ServerCall {
        &*self.delegate
    }

    fn send_headers(&self, headers: Metadata) -> RpcResult<()> {
        debug!(
            "[{}] call {} sending {} response headers",
            self.interceptor,
            self.call_id,
            headers.len()
        );
        self.delegate().send_headers(headers)
    }

    fn close(&self, status: Status, trailers: Metadata) -> RpcResult<()> {
        let elapsed_ms = self.started.elapsed().as_millis();
        if status.is_ok() {
            info!(
                "[{}] call {} {} completed: {} in {}ms",
                self.interceptor, self.call_id, self.method, status, elapsed_ms
            );
        } else {
            warn!(
                "[{}] call {} {} failed: {} in {}ms",
                self.interceptor, self.call_id, self.method, status, elapsed_ms
            );
        }
        self.delegate().close(status, trailers)
    }
}
