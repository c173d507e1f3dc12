//! Link configuration.

use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

/// Default name of the directive that flags a paginated field.
pub(crate) const DEFAULT_DIRECTIVE_NAME: &str = "connection";

/// Connection pagination configuration.
///
/// The directive name is fixed for the lifetime of the link; it is validated
/// as a GraphQL name when the [`ConnectionLayer`](crate::ConnectionLayer) is
/// built.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct ConnectionConfig {
    /// Name of the directive that flags a paginated field.
    pub directive_name: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            directive_name: DEFAULT_DIRECTIVE_NAME.to_string(),
        }
    }
}
