//! The operation stage of the link chain.
//!
//! Every link service consumes a [`Request`] holding the parsed query
//! document and resolves to a [`Response`] wrapping a stream of GraphQL
//! responses: one item for queries and mutations, one per event for
//! subscriptions.

use std::collections::HashMap;

use apollo_compiler::ast;
use futures::future::ready;
use futures::stream;
use futures::stream::once;
use futures::stream::StreamExt;
use serde_json_bytes::ByteString;
use serde_json_bytes::Value;
use static_assertions::assert_impl_all;
use tower::BoxError;

use crate::graphql;
use crate::graphql::Object;
use crate::graphql::ResponseStream;
use crate::spec;
use crate::spec::OperationKind;
use crate::Context;

/// A boxed service taking operations through the link chain.
pub type BoxService = tower::util::BoxService<Request, Response, BoxError>;
/// A boxed clonable service taking operations through the link chain.
pub type BoxCloneService = tower::util::BoxCloneService<Request, Response, BoxError>;
/// The result of calling a link service.
pub type ServiceResult = Result<Response, BoxError>;

assert_impl_all!(Request: Send);
/// An outgoing operation: the parsed query document plus everything needed to
/// dispatch it.
pub struct Request {
    /// The query document, as authored by the caller. Links may replace it
    /// with a rewritten document before dispatch.
    pub document: ast::Document,

    /// The operation to execute when the document defines several.
    pub operation_name: Option<String>,

    /// The operation variables.
    pub variables: Object,

    /// The operation extensions.
    pub extensions: Object,

    /// Context for extensions.
    pub context: Context,
}

#[buildstructor::buildstructor]
impl Request {
    /// This is the constructor (or builder) to use when constructing a real
    /// Request.
    ///
    /// Required parameters are required in non-testing code to create a
    /// Request.
    #[builder(visibility = "pub")]
    fn new(
        document: ast::Document,
        operation_name: Option<String>,
        variables: HashMap<String, Value>,
        extensions: HashMap<String, Value>,
        context: Context,
    ) -> Request {
        let variables: Object = variables
            .into_iter()
            .map(|(name, value)| (ByteString::from(name), value))
            .collect();
        let extensions: Object = extensions
            .into_iter()
            .map(|(name, value)| (ByteString::from(name), value))
            .collect();
        Self {
            document,
            operation_name,
            variables,
            extensions,
            context,
        }
    }

    /// This is the constructor (or builder) to use when constructing a "fake"
    /// Request: it is usually enough for testing, when a fully constructed
    /// Request is difficult to construct and not required for the purposes of
    /// the test.
    #[builder(visibility = "pub")]
    fn fake_new(
        document: Option<ast::Document>,
        operation_name: Option<String>,
        variables: HashMap<String, Value>,
        extensions: HashMap<String, Value>,
        context: Option<Context>,
    ) -> Request {
        Request::new(
            document.unwrap_or_else(ast::Document::new),
            operation_name,
            variables,
            extensions,
            context.unwrap_or_default(),
        )
    }
}

impl Request {
    /// The kind of the operation this request will execute.
    pub fn operation_kind(&self) -> OperationKind {
        spec::operation_kind(&self.document)
    }

    /// The wire-format request for this operation, ready for dispatch to an
    /// execution engine: the current document serialized back to text,
    /// alongside the operation name, variables and extensions.
    pub fn to_graphql_request(&self) -> graphql::Request {
        graphql::Request::builder()
            .query(self.document.to_string())
            .and_operation_name(self.operation_name.clone())
            .variables(self.variables.clone())
            .extensions(self.extensions.clone())
            .build()
    }
}

assert_impl_all!(Response: Send);
/// The stream of GraphQL responses an operation resolved to, plus the
/// [`Context`] it was dispatched with.
pub struct Response {
    /// The responses emitted by the execution layer.
    pub response: ResponseStream,

    /// Context for extensions.
    pub context: Context,
}

#[buildstructor::buildstructor]
impl Response {
    /// This is the constructor (or builder) to use when constructing a real
    /// Response, resolving to a single GraphQL response.
    #[builder(visibility = "pub")]
    fn new(
        data: Option<Value>,
        errors: Vec<graphql::Error>,
        extensions: HashMap<String, Value>,
        context: Context,
    ) -> Response {
        let extensions: Object = extensions
            .into_iter()
            .map(|(name, value)| (ByteString::from(name), value))
            .collect();
        let response = graphql::Response::builder()
            .and_data(data)
            .errors(errors)
            .extensions(extensions)
            .build();
        Self {
            response: once(ready(response)).boxed(),
            context,
        }
    }

    /// This is the constructor (or builder) to use when constructing a "fake"
    /// Response.
    #[builder(visibility = "pub")]
    fn fake_new(
        data: Option<Value>,
        errors: Vec<graphql::Error>,
        extensions: HashMap<String, Value>,
        context: Option<Context>,
    ) -> Response {
        Response::new(data, errors, extensions, context.unwrap_or_default())
    }
}

impl Response {
    /// Wrap an already-running response stream, as produced by a terminal
    /// link or an upstream subscription.
    pub fn new_from_stream(response: ResponseStream, context: Context) -> Self {
        Self { response, context }
    }

    /// A response that resolves without emitting anything, for links with
    /// nothing to forward to.
    pub fn empty(context: Context) -> Self {
        Self {
            response: stream::empty().boxed(),
            context,
        }
    }

    /// Wait for the next GraphQL response of the stream, if any.
    pub async fn next_response(&mut self) -> Option<graphql::Response> {
        self.response.next().await
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::name;
    use serde_json_bytes::json;

    use super::*;
    use crate::expand_connections;

    fn parse(source: &str) -> ast::Document {
        ast::Document::parse(source, "operation.graphql").expect("valid test document")
    }

    #[test]
    fn request_reports_its_operation_kind() {
        let request = Request::fake_builder()
            .document(parse("subscription { robotEvents { id } }"))
            .build();
        assert_eq!(request.operation_kind(), OperationKind::Subscription);

        let request = Request::fake_builder().build();
        assert_eq!(request.operation_kind(), OperationKind::Query);
    }

    #[test]
    fn wire_request_carries_the_rewritten_document() {
        let mut request = Request::builder()
            .document(parse("{ robots @connection { edges { node { id } } } }"))
            .variable("first".to_string(), json!(10))
            .context(Context::new())
            .build();
        request.document = expand_connections(&request.document, &name!("connection"));

        let wire = request.to_graphql_request();
        let query = wire.query.expect("query text");
        assert!(query.contains("pageInfo"));
        assert!(query.contains("cursor"));
        assert_eq!(wire.variables.get("first"), Some(&json!(10)));
    }

    #[tokio::test]
    async fn response_builder_resolves_to_a_single_response() {
        let mut response = Response::fake_builder()
            .data(json!({"robots": []}))
            .build();
        let first = response.next_response().await.expect("one response");
        assert_eq!(first.data, Some(json!({"robots": []})));
        assert!(response.next_response().await.is_none());
    }

    #[tokio::test]
    async fn empty_response_resolves_without_emitting() {
        let mut response = Response::empty(Context::new());
        assert!(response.next_response().await.is_none());
    }
}
