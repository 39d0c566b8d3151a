use conceptnet_core::resolver::{self, Resolved, ResolvedRequest};
use conceptnet_core::{
    build_target, AssociationOptions, ClientConfig, LookupOptions, Operation, RequestTarget,
    SearchParams, UriOptions,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::executor::Executor;
use crate::transport::{HttpTransport, Transport};
use crate::{Arg, Completion, Result};

/// A request that has passed validation.
///
/// Awaiting it sends the GET and yields the [`Completion`]; dropping it
/// first abandons the request.
pub struct PendingRequest {
    target: RequestTarget,
    future: BoxFuture<'static, Completion>,
}

impl PendingRequest {
    pub fn target(&self) -> &RequestTarget {
        &self.target
    }
}

impl Future for PendingRequest {
    type Output = Completion;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Completion> {
        self.future.as_mut().poll(cx)
    }
}

/// ConceptNet REST API Client
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    executor: Executor,
}

impl Client {
    /// Client for the default (legacy) service
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::default()))
    }

    /// Create a client that sends through `transport`
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            executor: Executor::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Look up the edges of a concept URI
    pub fn lookup(&self, uri: &str, options: LookupOptions) -> PendingRequest {
        self.send(&resolver::lookup(uri, &options))
    }

    /// Find the concept URI for a piece of text
    pub fn resolve_uri(&self, text: &str, options: UriOptions) -> PendingRequest {
        self.send(&resolver::resolve_uri(text, &options))
    }

    /// Search edges matching all of `params`
    pub fn search(&self, params: SearchParams) -> PendingRequest {
        self.send(&resolver::search(params))
    }

    /// Find concepts associated with a concept URI or term list
    pub fn associate(&self, input: &str, options: AssociationOptions) -> Result<PendingRequest> {
        let request = resolver::associate(input, &options, self.config.filter_policy())?;
        Ok(self.send(&request))
    }

    /// Relatedness query; same input rules as [`Client::associate`]
    pub fn relatedness(&self, input: &str, options: AssociationOptions) -> Result<PendingRequest> {
        let request = resolver::relatedness(input, &options, self.config.filter_policy())?;
        Ok(self.send(&request))
    }

    /// Where `request` would be sent, without sending it
    pub fn prepare(&self, request: &ResolvedRequest) -> RequestTarget {
        build_target(&self.config, request)
    }

    pub fn send(&self, request: &ResolvedRequest) -> PendingRequest {
        let target = self.prepare(request);
        tracing::debug!(operation = %request.operation(), url = %target, "Prepared request");

        let executor = self.executor.clone();
        let sent = target.clone();
        PendingRequest {
            target,
            future: async move { executor.execute(sent).await }.boxed(),
        }
    }

    /// Run `operation` with a loosely typed argument list whose last element
    /// is a [`callback`].
    ///
    /// Argument and validation errors are returned immediately and nothing
    /// is sent. Otherwise the request runs on the current tokio runtime and
    /// the callback receives its completion exactly once.
    pub fn invoke(&self, operation: Operation, args: Vec<Arg>) -> Result<()> {
        let Resolved {
            request,
            completion,
        } = resolver::resolve(operation, args, self.config.filter_policy())?;
        let runtime = tokio::runtime::Handle::try_current()?;

        let pending = self.send(&request);
        runtime.spawn(async move {
            completion(pending.await);
        });
        Ok(())
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a closure as the completion argument of [`Client::invoke`]
pub fn callback<F>(f: F) -> Arg
where
    F: FnOnce(Completion) + Send + 'static,
{
    conceptnet_core::Arg::Callback(Box::new(f))
}
