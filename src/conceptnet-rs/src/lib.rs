//! ConceptNet Client Library
//!
//! HTTP client for the ConceptNet REST API.
//!
//! Invalid input is rejected synchronously with a [`ClientError`]; once a
//! request is under way its outcome arrives exactly once as a
//! [`Completion`], either by awaiting a [`PendingRequest`] or through the
//! callback handed to [`Client::invoke`].

mod client;
mod executor;
mod transport;

pub use client::{callback, Client, PendingRequest};
pub use executor::{decode, Executor, RequestState};
pub use transport::{HttpTransport, RawResponse, Transport};

pub use conceptnet_core::{
    ApiProfile, ArgumentError, AssociationOptions, ClientConfig, FilterPolicy, LookupOptions,
    Operation, RequestTarget, ResolveError, SearchParams, UriOptions, ValidationError,
};

/// Raised before any request is sent.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No async runtime to run the request: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}

impl From<ResolveError> for ClientError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Argument(e) => ClientError::Argument(e),
            ResolveError::Validation(e) => ClientError::Validation(e),
        }
    }
}

/// Network-level failure reported by a [`Transport`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport failure: {0}")]
    Other(String),
}

/// Failure of a request that was sent.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid JSON in response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Outcome of one request: the decoded document or the error.
pub type Completion = std::result::Result<serde_json::Value, RequestError>;

/// Handler receiving a [`Completion`] from [`Client::invoke`].
pub type Callback = Box<dyn FnOnce(Completion) + Send + 'static>;

/// One argument to [`Client::invoke`].
pub type Arg = conceptnet_core::Arg<Callback>;

pub type Result<T> = std::result::Result<T, ClientError>;
