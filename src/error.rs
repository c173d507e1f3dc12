//! Link errors.

use displaydoc::Display;
use thiserror::Error;

/// Errors raised while assembling the pagination link.
///
/// Once a link is built the transform itself is total: rewriting a parsed
/// document cannot fail, and service errors are carried as
/// [`tower::BoxError`] like everywhere else in the chain.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConnectionLinkError {
    /// invalid connection directive name '{name}': {reason}
    InvalidDirectiveName {
        /// The configured directive name.
        name: String,

        /// Why it is not a valid GraphQL name.
        reason: String,
    },
}
