//! Bounds, bounding spheres, float helpers, and soft assertions shared by the Tessera crates.

mod assert;
mod bounds;
mod float;
mod sphere;

pub use bounds::Bounds;
pub use float::{EPSILON, clamp, equiv, equiv_eps};
pub use sphere::BoundingSphere;

#[doc(hidden)]
pub use tracing as __tracing;
