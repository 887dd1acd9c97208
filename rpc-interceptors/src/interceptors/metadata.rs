//! Metadata interceptor for rule-based header and trailer modification

use parking_lot::Mutex;
use rpc_core::{
    ForwardingServerCall, InterceptorStats, Listener, Metadata, RpcResult, ServerCall,
    ServerCallHandler, ServerCallRef, ServerInterceptor, Status,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A rule for modifying the metadata a call sends back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRule {
    /// Name of this rule
    pub name: String,
    /// Method pattern to match ("echo.Echo/Say", "echo.Echo/*", "*" for all)
    pub method_pattern: String,
    /// Which metadata the rule applies to
    pub target: MetadataTarget,
    /// Modification to perform
    pub operation: MetadataOperation,
}

/// Response metadata a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataTarget {
    /// Response headers
    Headers,
    /// Trailers sent on close
    Trailers,
}

/// Operations that can be performed on metadata entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum MetadataOperation {
    /// Set a key, replacing existing values
    Set { key: String, value: String },
    /// Set a key only if it is absent
    AddIfMissing { key: String, value: String },
    /// Remove every value of a key
    Remove { key: String },
}

impl MetadataOperation {
    /// Key the operation touches
    pub fn key(&self) -> &str {
        match self {
            MetadataOperation::Set { key, .. }
            | MetadataOperation::AddIfMissing { key, .. }
            | MetadataOperation::Remove { key } => key,
        }
    }
}

impl MetadataRule {
    /// Check if this rule matches the given method
    pub fn matches(&self, method: &str) -> bool {
        if self.method_pattern == "*" {
            return true;
        }
        match self.method_pattern.strip_suffix("/*") {
            Some(service) => method
                .strip_prefix(service)
                .is_some_and(|rest| rest.starts_with('/')),
            None => self.method_pattern == method,
        }
    }

    /// Apply this rule to `metadata`
    fn apply(&self, metadata: &mut Metadata) {
        match &self.operation {
            MetadataOperation::Set { key, value } => metadata.insert(key, value.clone()),
            MetadataOperation::AddIfMissing { key, value } => {
                if !metadata.contains_key(key) {
                    metadata.insert(key, value.clone());
                }
            }
            MetadataOperation::Remove { key } => {
                metadata.remove(key);
            }
        }
    }
}

/// Interceptor that rewrites response headers and trailers by rule
pub struct MetadataInterceptor {
    name: String,
    stats: Arc<Mutex<InterceptorStats>>,
    rules: Vec<MetadataRule>,
}

impl MetadataInterceptor {
    /// Create a new metadata interceptor
    pub fn new(rules: Vec<MetadataRule>) -> Self {
        Self {
            name: "MetadataInterceptor".to_string(),
            stats: Arc::new(Mutex::new(InterceptorStats::default())),
            rules,
        }
    }

    /// Get statistics about this interceptor
    pub fn stats(&self) -> InterceptorStats {
        self.stats.lock().clone()
    }
}

impl ServerInterceptor for MetadataInterceptor {
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
        self.stats.lock().record(true);

        let rules: Vec<MetadataRule> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(method))
            .cloned()
            .collect();
        if rules.is_empty() {
            return next.start_call(method, call, headers);
        }

        debug!(
            "[{}] applying {} rule(s) to {}",
            self.name,
            rules.len(),
            method
        );
        let rewritten: ServerCallRef = Arc::new(MetadataServerCall {
            delegate: call,
            rules,
        });
        next.start_call(method, rewritten, headers)
    }
}

/// Call wrapper applying rules to outgoing headers and trailers.
struct MetadataServerCall {
    delegate: ServerCallRef,
    rules: Vec<MetadataRule>,
}

impl MetadataServerCall {
    fn rewrite(&self, target: MetadataTarget, metadata: &mut Metadata) {
        for rule in self.rules.iter().filter(|rule| rule.target == target) {
            rule.apply(metadata);
        }
    }
}

impl ForwardingServerCall for MetadataServerCall {
    fn delegate(&self) -> &dyn ServerCall {
        &*self.delegate
    }

    fn send_headers(&self, mut headers: Metadata) -> RpcResult<()> {
        self.rewrite(MetadataTarget::Headers, &mut headers);
        self.delegate().send_headers(headers)
    }

    fn close(&self, status: Status, mut trailers: Metadata) -> RpcResult<()> {
        self.rewrite(MetadataTarget::Trailers, &mut trailers);
        self.delegate().close(status, trailers)
    }
}
