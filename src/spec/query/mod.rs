//! Rewrites applied to outgoing query documents.

pub(crate) mod connection;
