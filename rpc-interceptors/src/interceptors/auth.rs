//! Authentication interceptor that rejects calls without a known bearer token

use parking_lot::Mutex;
use rpc_core::{
    InterceptorStats, Listener, Metadata, NoopListener, RpcResult, ServerCallHandler, ServerCallRef,
    ServerInterceptor, Status,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default header carrying credentials
pub const DEFAULT_AUTH_HEADER: &str = "authorization";

/// Interceptor that only lets calls carrying an accepted bearer token through
///
/// Calls without a valid token are closed with `UNAUTHENTICATED` and never
/// reach later interceptors or the method handler.
pub struct AuthInterceptor {
    name: String,
    stats: Arc<Mutex<InterceptorStats>>,
    header: String,
    tokens: HashSet<String>,
    exempt_methods: HashSet<String>,
}

impl AuthInterceptor {
    /// Create an interceptor accepting `tokens` from the `authorization` header
    pub fn new(tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: "AuthInterceptor".to_string(),
            stats: Arc::new(Mutex::new(InterceptorStats::default())),
            header: DEFAULT_AUTH_HEADER.to_string(),
            tokens: tokens.into_iter().map(Into::into).collect(),
            exempt_methods: HashSet::new(),
        }
    }

    /// Read credentials from `header` instead
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Let `method` (full name) through without credentials
    pub fn exempt(mut self, method: impl Into<String>) -> Self {
        self.exempt_methods.insert(method.into());
        self
    }

    /// Get statistics about this interceptor
    pub fn stats(&self) -> InterceptorStats {
        self.stats.lock().clone()
    }

    /// Check the credentials carried in `headers`
    fn authenticate(&self, headers: &Metadata) -> Result<(), String> {
        let value = headers
            .get(&self.header)
            .ok_or_else(|| format!("missing '{}' header", self.header))?;
        let token = match value.trim_start().split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token,
            _ => return Err("expected a bearer token".to_string()),
        };
        if self.tokens.contains(token.trim()) {
            Ok(())
        } else {
            Err("unknown token".to_string())
        }
    }
}

impl ServerInterceptor for AuthInterceptor {
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
        if self.exempt_methods.contains(method) {
            debug!("[{}] {} is exempt from authentication", self.name, method);
            self.stats.lock().record(true);
            return next.start_call(method, call, headers);
        }

        match self.authenticate(&headers) {
            Ok(()) => {
                self.stats.lock().record(true);
                next.start_call(method, call, headers)
            }
            Err(reason) => {
                self.stats.lock().record(false);
                warn!("[{}] rejecting {}: {}", self.name, method, reason);
                call.close(Status::unauthenticated(reason), Metadata::new())?;
                Ok(Box::new(NoopListener))
            }
        }
    }
}
