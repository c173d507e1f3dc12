//! Automatic connection pagination for outgoing operations.
//!
//! [`ConnectionLayer`] wraps the next stage of the link chain in a
//! [`ConnectionService`]: every operation document is rewritten through
//! [`expand_connections`] before being forwarded, so that flagged fields
//! always reach the execution engine with their `edges` / `pageInfo`
//! sub-selections in place. Subscription responses are re-delivered event by
//! event; queries and mutations pass through untouched.

use std::task::Poll;

use apollo_compiler::name;
use apollo_compiler::Name;
use futures::future::ready;
use futures::future::BoxFuture;
use futures::SinkExt;
use futures::StreamExt;
use tower::BoxError;
use tower::Layer;
use tower::Service;
use tracing::Instrument;

use crate::configuration::ConnectionConfig;
use crate::error::ConnectionLinkError;
use crate::graphql::ResponseStream;
use crate::services::operation;
use crate::spec::query::connection::expand_connections;
use crate::spec::OperationKind;

/// How many subscription events may sit between the upstream stream and a
/// slow consumer before the forwarding task waits.
const EVENT_CHANNEL_CAPACITY: usize = 10;

/// [`Layer`] that rewrites connection-flagged fields of every operation
/// passing through the chain.
#[derive(Clone, Debug)]
pub struct ConnectionLayer {
    directive_name: Name,
}

impl ConnectionLayer {
    /// Build a layer from configuration.
    ///
    /// Fails if the configured directive name is not a valid GraphQL name.
    pub fn new(config: ConnectionConfig) -> Result<Self, ConnectionLinkError> {
        let directive_name = Name::new(&config.directive_name).map_err(|e| {
            ConnectionLinkError::InvalidDirectiveName {
                name: config.directive_name.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { directive_name })
    }
}

impl Default for ConnectionLayer {
    fn default() -> Self {
        Self {
            directive_name: name!("connection"),
        }
    }
}

impl<S> Layer<S> for ConnectionLayer {
    type Service = ConnectionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ConnectionService {
            inner: Some(inner),
            directive_name: self.directive_name.clone(),
        }
    }
}

/// [`Service`] implementing the connection pagination rewrite. See
/// [`ConnectionLayer`].
#[derive(Clone)]
pub struct ConnectionService<S> {
    inner: Option<S>,
    directive_name: Name,
}

impl<S> ConnectionService<S> {
    /// Wrap the next stage of the chain.
    pub fn new(inner: S, directive_name: Name) -> Self {
        Self {
            inner: Some(inner),
            directive_name,
        }
    }

    /// A terminal service: there is nothing to forward to, so every operation
    /// short-circuits to an empty response stream.
    pub fn terminal(directive_name: Name) -> Self {
        Self {
            inner: None,
            directive_name,
        }
    }
}

impl<S> Service<operation::Request> for ConnectionService<S>
where
    S: Service<operation::Request, Response = operation::Response, Error = BoxError>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = operation::Response;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        match self.inner.as_mut() {
            Some(inner) => inner.poll_ready(cx),
            None => Poll::Ready(Ok(())),
        }
    }

    fn call(&mut self, mut req: operation::Request) -> Self::Future {
        let Some(inner) = self.inner.as_mut() else {
            return Box::pin(ready(Ok(operation::Response::empty(req.context))));
        };

        req.document = expand_connections(&req.document, &self.directive_name);
        let kind = req.operation_kind();

        let clone = inner.clone();
        let mut inner = std::mem::replace(inner, clone);
        Box::pin(async move {
            let mut response = inner.call(req).await?;
            if kind == OperationKind::Subscription {
                response.response = forward_events(response.response);
            }
            Ok(response)
        })
    }
}

/// Re-deliver every upstream event, in order, on a fresh stream.
///
/// Dropping the returned stream closes the channel, which stops the
/// forwarding task and releases the upstream subscription.
fn forward_events(mut upstream: ResponseStream) -> ResponseStream {
    let (mut sender, receiver) = futures::channel::mpsc::channel(EVENT_CHANNEL_CAPACITY);
    tokio::task::spawn(
        async move {
            while let Some(event) = upstream.next().await {
                if sender.send(event).await.is_err() {
                    tracing::trace!("subscription consumer went away, dropping upstream stream");
                    break;
                }
            }
        }
        .in_current_span(),
    );
    receiver.boxed()
}
