//! Compact persisted form of a [`crate::Profile`].

use serde::{Deserialize, Serialize};
use tessera_srs::GeoExtent;

/// Either a well-known profile name or an explicit extent with base tile counts.
///
/// In JSON a well-known profile is a bare string and an explicit one is an
/// object `{"extent": {...}, "tx": 2, "ty": 1}`. Invalid profiles have no
/// descriptor and serialize as `null`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileDescriptor {
    WellKnown(String),
    Explicit { extent: GeoExtent, tx: u32, ty: u32 },
}
