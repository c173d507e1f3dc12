//! Reusable layers for assembling a link chain.

use tower::layer::util::Stack;
use tower::ServiceBuilder;

pub mod connection;

pub use connection::ConnectionLayer;
pub use connection::ConnectionService;

/// Extension to the [`ServiceBuilder`] trait to make it easy to add link
/// layers to a [`tower::Service`].
pub trait ServiceBuilderExt<L>: Sized {
    /// Rewrite connection-flagged fields of every outgoing operation before
    /// it is dispatched. See [`ConnectionLayer`].
    fn connection_pagination(self, layer: ConnectionLayer) -> ServiceBuilder<Stack<ConnectionLayer, L>>;
}

impl<L> ServiceBuilderExt<L> for ServiceBuilder<L> {
    fn connection_pagination(self, layer: ConnectionLayer) -> ServiceBuilder<Stack<ConnectionLayer, L>> {
        self.layer(layer)
    }
}
