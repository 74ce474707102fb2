//! Single-pass `.mesh` decoder
//!
//! # Layout
//! ```text
//! tag            [u8; 4]
//! is_skinned     u8 (0/1)
//! bounding box   2 x vec3f
//! bounding sph.  vec3f center, f32 radius
//! reserved       8 bytes
//! vertices       u32 count, 4 pad, count x vertex
//! indices        u32 count, 4 pad, count x u32
//! primitives     u32 count, 4 pad, count x (i16 material, u32 start, u32 count)
//! meshpoints     u32 count, 4 pad, count x (u32 len, name, vec3f, 9 x f32, i16 bone)
//! bones          u32 count, 4 pad (records not supported)
//! materials      u32 count, 4 pad, count x (u32 len, name)
//! ```
//! Anything after the material table is preserved untouched by the patcher.

use crate::document::{
    BoundingBox, BoundingSphere, MeshDocument, MeshHeader, Meshpoint, Primitive, Vertex,
};
use crate::error::{MeshError, Section};
use crate::io::MeshReader;

/// Bytes of reserved padding after each section count
pub(crate) const COUNT_PADDING: usize = 4;

/// Bytes of reserved padding after the bounding sphere
pub(crate) const HEADER_PADDING: usize = 8;

/// Byte offsets of the variable-length tables, measured against one buffer
///
/// Only [`decode`] creates these, and they travel inside the
/// [`DecodedMesh`] that borrows the measured buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetMap {
    pub(crate) primitive_table_start: usize,
    pub(crate) primitive_count: usize,
    pub(crate) meshpoint_table_start: usize,
    pub(crate) meshpoint_count: usize,
    pub(crate) material_count_offset: usize,
    pub(crate) material_table_start: usize,
    pub(crate) material_count: usize,
}

impl OffsetMap {
    pub fn primitive_table_start(&self) -> usize {
        self.primitive_table_start
    }

    /// First byte of the first meshpoint record
    pub fn meshpoint_table_start(&self) -> usize {
        self.meshpoint_table_start
    }

    pub fn meshpoint_count(&self) -> usize {
        self.meshpoint_count
    }

    /// Offset of the u32 material count field
    pub fn material_count_offset(&self) -> usize {
        self.material_count_offset
    }

    /// First byte of the first material name record
    pub fn material_table_start(&self) -> usize {
        self.material_table_start
    }

    pub fn material_count(&self) -> usize {
        self.material_count
    }
}

/// A decoded document together with the buffer it came from
#[derive(Debug, Clone)]
pub struct DecodedMesh<'a> {
    source: &'a [u8],
    pub document: MeshDocument,
    pub offsets: OffsetMap,
}

impl<'a> DecodedMesh<'a> {
    /// The original, unmodified buffer
    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    pub fn into_document(self) -> MeshDocument {
        self.document
    }
}

/// Decode a `.mesh` buffer
///
/// Any short read or inconsistent count is reported as
/// [`MeshError::MalformedMesh`]; no partial document is returned.
pub fn decode(data: &[u8]) -> Result<DecodedMesh<'_>, MeshError> {
    let mut r = MeshReader::new(data);

    let header = read_header(&mut r).map_err(|e| wrap(Section::Header, e))?;

    let vertex_count = read_count(&mut r, Section::Vertices)?;
    let vertices = read_records(&mut r, vertex_count, Section::Vertices, read_vertex)?;

    let index_count = read_count(&mut r, Section::Indices)?;
    let indices = read_records(&mut r, index_count, Section::Indices, |r| r.read_u32())?;

    let primitive_count = read_count(&mut r, Section::Primitives)?;
    let primitive_table_start = r.position();
    let primitives = read_records(&mut r, primitive_count, Section::Primitives, read_primitive)?;

    let meshpoint_count = read_count(&mut r, Section::Meshpoints)?;
    let meshpoint_table_start = r.position();
    let meshpoints = read_records(&mut r, meshpoint_count, Section::Meshpoints, read_meshpoint)?;

    let bone_count = read_count(&mut r, Section::Bones)?;
    if bone_count != 0 {
        return Err(MeshError::malformed(
            Section::Bones,
            format!("{bone_count} bone records present, bone record layout is not supported"),
        ));
    }

    let material_count_offset = r.position();
    let material_count = read_count(&mut r, Section::Materials)?;
    let material_table_start = r.position();
    let materials = read_records(&mut r, material_count, Section::Materials, |r| {
        r.read_prefixed_string()
    })?;

    if !r.is_empty() {
        tracing::debug!(
            trailing = r.remaining(),
            "Trailing bytes after material table"
        );
    }

    let document = MeshDocument {
        header,
        vertices,
        indices,
        primitives,
        meshpoints,
        bone_count: bone_count as u32,
        materials,
    };
    validate(&document)?;

    tracing::debug!(
        vertices = document.vertices.len(),
        indices = document.indices.len(),
        primitives = document.primitives.len(),
        meshpoints = document.meshpoints.len(),
        materials = document.materials.len(),
        "Decoded mesh"
    );

    Ok(DecodedMesh {
        source: data,
        document,
        offsets: OffsetMap {
            primitive_table_start,
            primitive_count,
            meshpoint_table_start,
            meshpoint_count,
            material_count_offset,
            material_table_start,
            material_count,
        },
    })
}

fn wrap(section: Section, err: MeshError) -> MeshError {
    MeshError::malformed(section, err)
}

fn read_header(r: &mut MeshReader<'_>) -> Result<MeshHeader, MeshError> {
    let mut tag = [0u8; 4];
    tag.copy_from_slice(r.read_bytes(4)?);
    let is_skinned = r.read_bool()?;
    let bounding_box = BoundingBox {
        min: r.read_vec3f()?,
        max: r.read_vec3f()?,
    };
    let bounding_sphere = BoundingSphere {
        center: r.read_vec3f()?,
        radius: r.read_f32()?,
    };
    r.skip(HEADER_PADDING)?;

    Ok(MeshHeader {
        tag,
        is_skinned,
        bounding_box,
        bounding_sphere,
    })
}

/// Read a section count and its trailing padding
fn read_count(r: &mut MeshReader<'_>, section: Section) -> Result<usize, MeshError> {
    let count = r.read_u32().map_err(|e| wrap(section, e))? as usize;
    r.skip(COUNT_PADDING).map_err(|e| wrap(section, e))?;
    Ok(count)
}

fn read_records<'a, T>(
    r: &mut MeshReader<'a>,
    count: usize,
    section: Section,
    mut read: impl FnMut(&mut MeshReader<'a>) -> Result<T, MeshError>,
) -> Result<Vec<T>, MeshError> {
    // Counts come from untrusted input; never reserve more than the buffer could hold
    let mut records = Vec::with_capacity(count.min(r.remaining()));
    for index in 0..count {
        let record = read(r).map_err(|e| {
            MeshError::malformed(section, format!("record {index} of {count}: {e}"))
        })?;
        records.push(record);
    }
    Ok(records)
}

fn read_vertex(r: &mut MeshReader<'_>) -> Result<Vertex, MeshError> {
    let position = r.read_vec3f()?;
    let normal = r.read_vec3f()?;
    let tangent = r.read_vec4f()?;
    let uv0 = r.read_vec2f()?;
    let uv1 = if r.read_bool()? {
        Some(r.read_vec2f()?)
    } else {
        None
    };

    Ok(Vertex {
        position,
        normal,
        tangent,
        uv0,
        uv1,
    })
}

fn read_primitive(r: &mut MeshReader<'_>) -> Result<Primitive, MeshError> {
    Ok(Primitive {
        material_index: r.read_i16()?,
        start_index: r.read_u32()?,
        index_count: r.read_u32()?,
    })
}

fn read_meshpoint(r: &mut MeshReader<'_>) -> Result<Meshpoint, MeshError> {
    Ok(Meshpoint {
        name: r.read_prefixed_string()?,
        position: r.read_vec3f()?,
        rotation: r.read_mat3f()?,
        bone_index: r.read_i16()?,
    })
}

/// Cross-section invariants that a single forward pass cannot check inline
fn validate(doc: &MeshDocument) -> Result<(), MeshError> {
    if doc.indices.len() % 3 != 0 {
        return Err(MeshError::malformed(
            Section::Indices,
            format!("{} indices is not a triangle list", doc.indices.len()),
        ));
    }

    for (i, p) in doc.primitives.iter().enumerate() {
        if p.index_range().end > doc.indices.len() {
            return Err(MeshError::malformed(
                Section::Primitives,
                format!(
                    "primitive {i} covers indices {:?} but only {} exist",
                    p.index_range(),
                    doc.indices.len()
                ),
            ));
        }
        if doc.material_of(p).is_none() {
            return Err(MeshError::malformed(
                Section::Primitives,
                format!(
                    "primitive {i} uses material {} but only {} are defined",
                    p.material_index,
                    doc.materials.len()
                ),
            ));
        }
    }

    Ok(())
}
