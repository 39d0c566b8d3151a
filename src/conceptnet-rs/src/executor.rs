use conceptnet_core::RequestTarget;
use serde_json::Value;
use std::sync::Arc;

use crate::transport::Transport;
use crate::{Completion, RequestError};

/// Lifecycle of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Sent,
    Succeeded,
    Failed,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestState::Succeeded | RequestState::Failed)
    }

    pub fn can_advance_to(self, next: RequestState) -> bool {
        matches!(
            (self, next),
            (RequestState::Idle, RequestState::Sent)
                | (RequestState::Sent, RequestState::Succeeded)
                | (RequestState::Sent, RequestState::Failed)
        )
    }
}

struct Invocation {
    state: RequestState,
}

impl Invocation {
    fn new() -> Self {
        Self {
            state: RequestState::Idle,
        }
    }

    fn advance(&mut self, next: RequestState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(from = ?self.state, to = ?next, "Request state");
        self.state = next;
    }
}

/// Sends requests through a [`Transport`] and decodes the responses.
#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
}

impl Executor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Issue one GET and settle it. Never retries.
    #[tracing::instrument(skip(self, target), fields(url = %target))]
    pub async fn execute(&self, target: RequestTarget) -> Completion {
        let mut invocation = Invocation::new();
        invocation.advance(RequestState::Sent);

        let response = match self.transport.get(&target).await {
            Ok(response) => response,
            Err(e) => {
                invocation.advance(RequestState::Failed);
                tracing::warn!("Request failed: {}", e);
                return Err(RequestError::Transport(e));
            }
        };

        if !(200..300).contains(&response.status) {
            tracing::warn!(status = response.status, "Service returned non-success status");
        }

        match decode(&response.body) {
            Ok(document) => {
                invocation.advance(RequestState::Succeeded);
                Ok(document)
            }
            Err(e) => {
                invocation.advance(RequestState::Failed);
                tracing::warn!("Response is not valid JSON: {}", e);
                Err(RequestError::Decode(e))
            }
        }
    }
}

/// Parse a response body as JSON
pub fn decode(body: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(body)
}
