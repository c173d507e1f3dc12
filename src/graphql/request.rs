use serde::Deserialize;
use serde::Serialize;

use crate::graphql::Object;

/// A GraphQL request in wire format, ready for an execution engine.
///
/// This is what a terminal link serializes onto the transport once every
/// document rewrite has run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// The GraphQL query document, as text.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub query: Option<String>,

    /// The optional GraphQL operation name.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub operation_name: Option<String>,

    /// The optional variables in the form of a JSON object.
    #[serde(skip_serializing_if = "Object::is_empty", default)]
    pub variables: Object,

    /// The optional extensions in the form of a JSON object.
    #[serde(skip_serializing_if = "Object::is_empty", default)]
    pub extensions: Object,
}

#[buildstructor::buildstructor]
impl Request {
    /// Returns a builder that builds a GraphQL [`Request`] from its
    /// components.
    #[builder(visibility = "pub")]
    fn new(
        query: Option<String>,
        operation_name: Option<String>,
        variables: Option<Object>,
        extensions: Option<Object>,
    ) -> Self {
        Self {
            query,
            operation_name,
            variables: variables.unwrap_or_default(),
            extensions: extensions.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;

    #[test]
    fn request_serialization_skips_empty_fields() {
        let request = Request::builder().query("{ robots { id } }".to_string()).build();
        let serialized = serde_json::to_string(&request).unwrap();
        assert_eq!(serialized, r#"{"query":"{ robots { id } }"}"#);
    }

    #[test]
    fn request_round_trip() {
        let mut variables = Object::new();
        variables.insert("first", json!(10));
        let request = Request::builder()
            .query("query Robots($first: Int) { robots(first: $first) { id } }".to_string())
            .operation_name("Robots".to_string())
            .variables(variables)
            .build();

        let serialized = serde_json::to_string(&request).unwrap();
        let deserialized: Request = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, request);
    }
}
