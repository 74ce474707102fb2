//! mesh-codec: binary `.mesh` codec and patcher
//!
//! Decodes the fixed-layout, variable-record mesh format written by the
//! external format producer, validates attachment-point names, and patches
//! meshpoint and material names into a fresh buffer that is byte-identical
//! to the original everywhere else.
//!
//! # Usage
//!
//! ```ignore
//! use mesh_codec::{decode, patch, MaterialRemap, NamingRules, PatchPlan};
//!
//! let data = std::fs::read("ship.mesh")?;
//! let decoded = decode(&data)?;
//! NamingRules::builtin().ensure_valid(&decoded.document.meshpoints)?;
//!
//! let plan = PatchPlan::from_document(&decoded.document)
//!     .with_materials(MaterialRemap::sorted_used(&decoded.document));
//! let patched = patch::assemble(&decoded, &plan)?;
//! std::fs::write("ship.mesh", patched)?;
//! ```
//!
//! Everything here is synchronous and free of I/O. The only shared state is
//! the builtin naming table, which is immutable once built.

mod decoder;
mod document;
mod encoder;
mod error;
pub mod io;
pub mod naming;
pub mod patch;
pub mod producer;
pub mod transform;

#[cfg(test)]
mod testing;

pub use decoder::{DecodedMesh, OffsetMap, decode};
pub use document::{
    BoundingBox, BoundingSphere, Bounds, DEFAULT_TAG, IDENTITY_ROTATION, MeshDocument, MeshHeader,
    Meshpoint, Primitive, Vertex,
};
pub use encoder::encode;
pub use error::{MeshError, Section, Table};
pub use naming::{InvalidName, NamingRule, NamingRules, canonical_name, validate_all};
pub use patch::{LiveMeshpoint, MaterialRemap, PatchPlan, assemble};
pub use producer::{ProducerFailure, classify_output};

/// Conventional file extension for mesh files
pub const MESH_EXTENSION: &str = "mesh";
