//! Pooled terrain tile geometry.
//!
//! [`GeometryPool`] builds tessellated tile meshes in a tile-local frame and
//! shares them between every tile that needs an identical mesh. Builds for the
//! same [`GeometryKey`] are serialized through a [`KeyGate`]; builds for
//! different keys run concurrently. Geometry no consumer still holds is handed
//! back to a [`DeviceContext`] by [`GeometryPool::sweep`].

mod builder;
mod cancel;
mod device;
mod error;
mod gate;
mod indices;
mod key;
mod pool;
mod settings;
mod shared_geometry;
mod vertex;

pub use builder::tile_local_frame;
pub use cancel::CancelToken;
pub use device::DeviceContext;
pub use error::GeometryError;
pub use gate::{GateGuard, KeyGate};
pub use indices::{create_indices, num_skirt_elements};
pub use key::GeometryKey;
pub use pool::GeometryPool;
pub use settings::{GeometrySettings, MAX_TILE_SIZE, MIN_TILE_SIZE};
pub use shared_geometry::SharedGeometry;
pub use vertex::{MorphVertex, TerrainVertex, marker};
