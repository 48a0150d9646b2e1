//! Tile pyramid profiles and tile addressing.
//!
//! A [`Profile`] describes a quad-tree tiling scheme over a bounded extent in a
//! spatial reference system. A [`TileKey`] addresses one tile of that pyramid.

mod descriptor;
mod error;
mod profile;
mod tile_key;

pub use descriptor::ProfileDescriptor;
pub use error::ProfileError;
pub use profile::Profile;
pub use tile_key::TileKey;
