//! Vertex data for drawing crack layers
//!
//! Produces plain `Pod` vertices for the host renderer to upload.
//! Nothing here touches a GPU.

pub mod shapes;
pub mod vertex;

pub use shapes::{crack_vertices, layers_vertices};
pub use vertex::{Vertex, colors};
