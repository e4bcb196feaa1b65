//! Directive dispatcher
//!
//! Routes inbound directives to the handler registered for their namespace
//! and turns whatever the handler does into a response envelope. No raw
//! error leaves this module: client failures, network control failures and
//! panics all become structured `EndpointBusy` errors.

use std::collections::HashMap;
use std::sync::Arc;

use alexa_types::{DeltaId, DirectiveError, DirectiveRequest, DirectiveResponse, Namespace};
use parking_lot::RwLock;

use crate::endpoint::Endpoint;
use crate::error::{HandlerError, HandlerResult};
use crate::handler::CapabilityHandler;

/// Handler registry and directive router of one endpoint
pub struct Dispatcher {
    endpoint: Arc<Endpoint>,
    handlers: RwLock<Vec<Arc<dyn CapabilityHandler>>>,
    directives: RwLock<HashMap<Namespace, Arc<dyn CapabilityHandler>>>,
}

impl Dispatcher {
    pub fn new(endpoint: Arc<Endpoint>) -> Self {
        Self {
            endpoint,
            handlers: RwLock::new(Vec::new()),
            directives: RwLock::new(HashMap::new()),
        }
    }

    pub fn endpoint(&self) -> &Arc<Endpoint> {
        &self.endpoint
    }

    /// Initialize a handler and wire it into the endpoint
    ///
    /// The handler receives events once this returns, and directives too if
    /// it declares any operations.
    pub async fn register(&self, handler: Arc<dyn CapabilityHandler>) -> HandlerResult<()> {
        let namespace = handler.namespace();
        handler.initialize().await?;
        Arc::clone(&handler).subscribe(self.endpoint.events());

        if !handler.supported_operations().is_empty() {
            self.directives.write().insert(namespace, Arc::clone(&handler));
        }
        self.handlers.write().push(handler);

        tracing::debug!(endpoint = %self.endpoint.id(), %namespace, "handler registered");
        Ok(())
    }

    /// Namespaces that accept directives
    pub fn namespaces(&self) -> Vec<Namespace> {
        let mut namespaces: Vec<Namespace> = self.directives.read().keys().copied().collect();
        namespaces.sort();
        namespaces
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Run a directive and publish the response under its reply token
    pub async fn dispatch(&self, request: DirectiveRequest) -> DirectiveResponse {
        let reply_to = request.reply_to.clone();
        let response = self.execute(request).await;

        if let Err(e) = self
            .endpoint
            .publisher()
            .publish_response(self.endpoint.id(), &reply_to, &response)
            .await
        {
            tracing::error!(endpoint = %self.endpoint.id(), reply_to = %reply_to, "failed to publish response: {}", e);
        }
        response
    }

    /// Run a directive without publishing the response
    pub async fn execute(&self, request: DirectiveRequest) -> DirectiveResponse {
        let DirectiveRequest {
            namespace,
            operation,
            payload,
            ..
        } = request;

        let handler = self.directives.read().get(&namespace).cloned();
        let handler = match handler {
            Some(handler) if handler.supported_operations().contains(&operation.as_str()) => handler,
            _ => {
                tracing::warn!(endpoint = %self.endpoint.id(), %namespace, operation = %operation, "unsupported directive");
                return DirectiveResponse::failure(&DirectiveError::invalid_directive(format!(
                    "Capability not supported: {namespace}.{operation}"
                )));
            }
        };

        tracing::info!(endpoint = %self.endpoint.id(), %namespace, operation = %operation, "dispatching directive");

        // A panicking handler must still produce a response
        let op = operation.clone();
        let outcome = tokio::spawn(async move { handler.handle(&op, payload).await })
            .await
            .unwrap_or_else(|e| Err(HandlerError::Internal(join_error_message(e))));

        match outcome {
            Ok(response) => DirectiveResponse::success(response.payload, response.state),
            Err(e) => {
                let error = e.into_directive_error();
                tracing::warn!(
                    endpoint = %self.endpoint.id(),
                    %namespace,
                    operation = %operation,
                    "directive failed: {}",
                    error
                );
                DirectiveResponse::failure(&error)
            }
        }
    }

    /// Ask every handler to republish its capability, state and metadata
    pub fn refresh(&self, delta: DeltaId) {
        let handlers: Vec<_> = self.handlers.read().clone();
        tracing::debug!(endpoint = %self.endpoint.id(), %delta, handlers = handlers.len(), "refreshing");
        for handler in handlers {
            Arc::clone(&handler).refresh_capability(delta);
            Arc::clone(&handler).refresh_state(delta);
            handler.refresh_info(delta);
        }
    }
}

fn join_error_message(error: tokio::task::JoinError) -> String {
    if error.is_panic() {
        let panic = error.into_panic();
        panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "handler panicked".to_string())
    } else {
        "handler cancelled".to_string()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("endpoint", self.endpoint.id())
            .field("namespaces", &self.namespaces())
            .finish()
    }
}
