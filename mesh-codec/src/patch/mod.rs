//! Byte-exact patching of meshpoint and material names
//!
//! Names are variable-length, so a changed name shifts every byte after
//! it. The assembler therefore never edits a buffer in place: it walks the
//! original buffer using the record widths stored there, copies untouched
//! spans verbatim and emits freshly length-prefixed names into a new
//! buffer.
//!
//! Output layout:
//! ```text
//! [0, primitive table)              copied
//! primitive records                 material index remapped
//! [primitive end, meshpoint table)  copied
//! meshpoint records                 new name + original 50-byte trailer
//! [meshpoint end, material count)   copied (bone section)
//! material count + padding          count rewritten, padding copied
//! material records                  new names
//! [material end, EOF)               copied
//! ```

mod materials;


pub use materials::MaterialRemap;

use crate::decoder::{COUNT_PADDING, DecodedMesh};
use crate::document::{MeshDocument, Meshpoint, Primitive};
use crate::encoder::write_primitive;
use crate::error::{MeshError, Table};
use crate::io::{MeshReader, MeshWriter};
use crate::naming::canonical_name;

/// A meshpoint as it exists in the authoring scene
///
/// Excluded entries are not part of the binary and are skipped before
/// pairing names with records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveMeshpoint {
    pub name: String,
    pub excluded: bool,
}

impl LiveMeshpoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            excluded: false,
        }
    }

    pub fn excluded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            excluded: true,
        }
    }
}

/// Semantic edits to apply to a decoded buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchPlan {
    /// Live meshpoints, in the same relative order as the decoded records
    pub meshpoints: Vec<LiveMeshpoint>,
    /// Replacement material table; `None` leaves materials untouched
    pub materials: Option<MaterialRemap>,
}

impl PatchPlan {
    /// Keep every decoded meshpoint name (the assembler canonicalizes them)
    pub fn from_document(doc: &MeshDocument) -> Self {
        Self {
            meshpoints: doc
                .meshpoints
                .iter()
                .map(|mp| LiveMeshpoint::new(mp.name.clone()))
                .collect(),
            materials: None,
        }
    }

    pub fn with_materials(mut self, remap: MaterialRemap) -> Self {
        self.materials = Some(remap);
        self
    }
}

/// Assemble a patched copy of the decoded buffer
///
/// Meshpoint names are written in canonical form (duplication suffix
/// stripped). The decoded buffer is never modified.
pub fn assemble(decoded: &DecodedMesh<'_>, plan: &PatchPlan) -> Result<Vec<u8>, MeshError> {
    let src = decoded.source();
    let offsets = &decoded.offsets;

    let live: Vec<&LiveMeshpoint> = plan.meshpoints.iter().filter(|mp| !mp.excluded).collect();
    if live.len() != offsets.meshpoint_count {
        return Err(MeshError::RecordCountMismatch {
            table: Table::Meshpoints,
            expected: offsets.meshpoint_count,
            actual: live.len(),
        });
    }

    if let Some(remap) = &plan.materials {
        check_remap(&decoded.document, remap, offsets.material_count)?;
    }

    let mut out = MeshWriter::with_capacity(src.len());

    // Primitives: fixed width, only the material index may change
    let primitive_start = offsets.primitive_table_start;
    let primitive_end = primitive_start + offsets.primitive_count * Primitive::SIZE;
    out.write_bytes(&src[..primitive_start]);
    match &plan.materials {
        Some(remap) if !remap.is_identity() => {
            let mut r = MeshReader::at(src, primitive_start)?;
            for _ in 0..offsets.primitive_count {
                let material_index = r.read_i16()?;
                let start_index = r.read_u32()?;
                let index_count = r.read_u32()?;
                // check_remap guarantees every referenced slot has a target
                let target = usize::try_from(material_index)
                    .ok()
                    .and_then(|i| remap.target(i))
                    .unwrap_or_default();
                write_primitive(
                    &mut out,
                    &Primitive {
                        material_index: target as i16,
                        start_index,
                        index_count,
                    },
                );
            }
        }
        _ => out.write_bytes(&src[primitive_start..primitive_end]),
    }

    // Meshpoints: walk original record widths, emit new names
    out.write_bytes(&src[primitive_end..offsets.meshpoint_table_start]);
    let mut r = MeshReader::at(src, offsets.meshpoint_table_start)?;
    for mp in &live {
        let name_len = r.read_u32()? as usize;
        r.skip(name_len)?;
        let trailer = r.read_bytes(Meshpoint::TRAILER_SIZE)?;

        out.write_prefixed_string(canonical_name(&mp.name));
        out.write_bytes(trailer);
    }
    let meshpoint_end = r.position();

    // Materials: locate the end of the original table first
    let mut r = MeshReader::at(src, offsets.material_table_start)?;
    for _ in 0..offsets.material_count {
        let name_len = r.read_u32()? as usize;
        r.skip(name_len)?;
    }
    let material_end = r.position();

    match &plan.materials {
        Some(remap) => {
            out.write_bytes(&src[meshpoint_end..offsets.material_count_offset]);
            out.write_u32(remap.names().len() as u32);
            let padding_start = offsets.material_count_offset + 4;
            out.write_bytes(&src[padding_start..padding_start + COUNT_PADDING]);
            for name in remap.names() {
                out.write_prefixed_string(name);
            }
        }
        None => out.write_bytes(&src[meshpoint_end..material_end]),
    }

    out.write_bytes(&src[material_end..]);

    tracing::debug!(
        original = src.len(),
        patched = out.len(),
        meshpoints = live.len(),
        "Assembled patched mesh"
    );

    Ok(out.into_inner())
}

fn check_remap(doc: &MeshDocument, remap: &MaterialRemap, original: usize) -> Result<(), MeshError> {
    if remap.original_len() != original {
        return Err(MeshError::RecordCountMismatch {
            table: Table::Materials,
            expected: original,
            actual: remap.original_len(),
        });
    }

    for p in &doc.primitives {
        let Ok(index) = usize::try_from(p.material_index) else {
            continue;
        };
        if remap.target(index).is_none() {
            return Err(MeshError::MaterialInUse {
                index,
                name: doc.materials.get(index).cloned().unwrap_or_default(),
            });
        }
    }

    Ok(())
}
