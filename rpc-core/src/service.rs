//! Service and method definitions.
//!
//! A [`ServerServiceDefinition`] is an immutable, named, ordered list of
//! [`ServerMethodDefinition`]s. Definitions are built once through
//! [`ServiceDefinitionBuilder`] and never mutated afterwards; replacing a
//! method's handler produces a new method definition that shares the original
//! [`MethodDescriptor`].

use crate::error::{DefinitionError, RpcResult};
use crate::handler::SharedCallHandler;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Shape of a method's request and response streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodType {
    /// One request, one response
    Unary,
    /// Request stream, one response
    ClientStreaming,
    /// One request, response stream
    ServerStreaming,
    /// Request and response streams
    BidiStreaming,
}

impl MethodType {
    /// Whether the client sends exactly one request.
    pub fn client_sends_one_message(self) -> bool {
        matches!(self, MethodType::Unary | MethodType::ServerStreaming)
    }

    /// Whether the server sends exactly one response.
    pub fn server_sends_one_message(self) -> bool {
        matches!(self, MethodType::Unary | MethodType::ClientStreaming)
    }
}

/// Type metadata for one method. Interceptor wrapping never changes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Fully qualified name, `service/method`
    pub full_name: String,
    /// Stream shape
    pub method_type: MethodType,
    /// Name of the request message type
    pub request_type: String,
    /// Name of the response message type
    pub response_type: String,
}

impl MethodDescriptor {
    /// Create a descriptor for `method` on `service`.
    pub fn new(
        service: &str,
        method: &str,
        method_type: MethodType,
        request_type: impl Into<String>,
        response_type: impl Into<String>,
    ) -> Self {
        Self {
            full_name: generate_full_method_name(service, method),
            method_type,
            request_type: request_type.into(),
            response_type: response_type.into(),
        }
    }

    /// Service part of the full name.
    pub fn service_name(&self) -> Option<&str> {
        self.full_name.rsplit_once('/').map(|(service, _)| service)
    }

    /// Method part of the full name.
    pub fn method_name(&self) -> &str {
        self.full_name
            .rsplit_once('/')
            .map(|(_, method)| method)
            .unwrap_or(&self.full_name)
    }
}

/// Build `service/method`.
pub fn generate_full_method_name(service: &str, method: &str) -> String {
    format!("{}/{}", service, method)
}

/// One method's descriptor plus the handler that starts its calls.
#[derive(Clone)]
pub struct ServerMethodDefinition {
    descriptor: Arc<MethodDescriptor>,
    handler: SharedCallHandler,
}

impl ServerMethodDefinition {
    /// Create a method definition.
    pub fn new(descriptor: impl Into<Arc<MethodDescriptor>>, handler: SharedCallHandler) -> Self {
        Self {
            descriptor: descriptor.into(),
            handler,
        }
    }

    /// The method's type metadata.
    pub fn descriptor(&self) -> &Arc<MethodDescriptor> {
        &self.descriptor
    }

    /// Fully qualified method name.
    pub fn name(&self) -> &str {
        &self.descriptor.full_name
    }

    /// The handler that starts calls of this method.
    pub fn handler(&self) -> &SharedCallHandler {
        &self.handler
    }

    /// Same method with a different handler; the descriptor is shared, not copied.
    pub fn with_server_call_handler(&self, handler: SharedCallHandler) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            handler,
        }
    }
}

impl fmt::Debug for ServerMethodDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerMethodDefinition")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Immutable named collection of method definitions.
#[derive(Debug, Clone)]
pub struct ServerServiceDefinition {
    name: String,
    methods: Vec<ServerMethodDefinition>,
}

impl ServerServiceDefinition {
    /// Start building a definition for `name`.
    pub fn builder(name: impl Into<String>) -> ServiceDefinitionBuilder {
        ServiceDefinitionBuilder {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Methods in registration order.
    pub fn methods(&self) -> &[ServerMethodDefinition] {
        &self.methods
    }
}

/// Accumulates methods for a [`ServerServiceDefinition`].
#[derive(Debug)]
pub struct ServiceDefinitionBuilder {
    name: String,
    methods: Vec<ServerMethodDefinition>,
}

impl ServiceDefinitionBuilder {
    /// Add a method.
    pub fn add_method(mut self, method: ServerMethodDefinition) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a method from its descriptor and handler.
    pub fn add_method_with(
        self,
        descriptor: impl Into<Arc<MethodDescriptor>>,
        handler: SharedCallHandler,
    ) -> Self {
        self.add_method(ServerMethodDefinition::new(descriptor, handler))
    }

    /// Validate and build the definition.
    ///
    /// Fails when the name is empty, when a method's full name belongs to
    /// another service, or when a method name repeats.
    pub fn build(self) -> RpcResult<ServerServiceDefinition> {
        if self.name.is_empty() {
            return Err(DefinitionError::EmptyServiceName.into());
        }

        for (index, method) in self.methods.iter().enumerate() {
            if method.descriptor.service_name() != Some(self.name.as_str()) {
                return Err(DefinitionError::ServiceNameMismatch {
                    service: self.name.clone(),
                    method: method.name().to_string(),
                }
                .into());
            }
            if self.methods[..index]
                .iter()
                .any(|earlier| earlier.name() == method.name())
            {
                return Err(DefinitionError::DuplicateMethod {
                    service: self.name.clone(),
                    method: method.name().to_string(),
                }
                .into());
            }
        }

        Ok(ServerServiceDefinition {
            name: self.name,
            methods: self.methods,
        })
    }
}
