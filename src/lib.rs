//! Rewrites outgoing GraphQL operations so that fields flagged with a
//! connection directive always carry the cursor pagination sub-selections.
//!
//! A field written as
//!
//! ```graphql
//! robots @connection {
//!     edges { node { id } }
//! }
//! ```
//!
//! is expanded, before the operation is handed to the next stage of the
//! request chain, into
//!
//! ```graphql
//! robots @connection {
//!     edges { node { id } cursor }
//!     pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
//! }
//! ```
//!
//! Caller-authored sub-selections always win; the templates only contribute
//! the fields that are missing. The rewrite is exposed both as a plain
//! document transform ([`expand_connections`]) and as a tower layer
//! ([`ConnectionLayer`]) that plugs into a chain of
//! [`services::operation`] services, forwarding subscription events
//! one by one.

#![warn(unreachable_pub)]

mod configuration;
mod context;
pub mod error;
pub mod graphql;
pub mod layers;
pub mod services;
mod spec;

pub use configuration::ConnectionConfig;
pub use context::Context;
pub use error::ConnectionLinkError;
pub use layers::connection::ConnectionLayer;
pub use layers::connection::ConnectionService;
pub use layers::ServiceBuilderExt;
pub use spec::query::connection::expand_connections;
pub use spec::OperationKind;
