//! `.mesh` encoder
//!
//! Writes a [`MeshDocument`] in the layout described in [`crate::decoder`],
//! with zeroed padding.

use crate::decoder::{COUNT_PADDING, HEADER_PADDING};
use crate::document::{MeshDocument, Meshpoint, Primitive, Vertex};
use crate::io::MeshWriter;

/// Encode a document to a fresh buffer
pub fn encode(doc: &MeshDocument) -> Vec<u8> {
    let mut w = MeshWriter::with_capacity(estimated_len(doc));

    let header = &doc.header;
    w.write_bytes(&header.tag);
    w.write_bool(header.is_skinned);
    w.write_vec3f(&header.bounding_box.min);
    w.write_vec3f(&header.bounding_box.max);
    w.write_vec3f(&header.bounding_sphere.center);
    w.write_f32(header.bounding_sphere.radius);
    w.write_zeros(HEADER_PADDING);

    write_count(&mut w, doc.vertices.len());
    for v in &doc.vertices {
        write_vertex(&mut w, v);
    }

    write_count(&mut w, doc.indices.len());
    for &i in &doc.indices {
        w.write_u32(i);
    }

    write_count(&mut w, doc.primitives.len());
    for p in &doc.primitives {
        write_primitive(&mut w, p);
    }

    write_count(&mut w, doc.meshpoints.len());
    for mp in &doc.meshpoints {
        write_meshpoint(&mut w, mp);
    }

    write_count(&mut w, doc.bone_count as usize);

    write_count(&mut w, doc.materials.len());
    for name in &doc.materials {
        w.write_prefixed_string(name);
    }

    w.into_inner()
}

pub(crate) fn write_count(w: &mut MeshWriter, count: usize) {
    w.write_u32(count as u32);
    w.write_zeros(COUNT_PADDING);
}

fn write_vertex(w: &mut MeshWriter, v: &Vertex) {
    w.write_vec3f(&v.position);
    w.write_vec3f(&v.normal);
    w.write_vec4f(&v.tangent);
    w.write_vec2f(&v.uv0);
    w.write_bool(v.uv1.is_some());
    if let Some(uv1) = &v.uv1 {
        w.write_vec2f(uv1);
    }
}

pub(crate) fn write_primitive(w: &mut MeshWriter, p: &Primitive) {
    w.write_i16(p.material_index);
    w.write_u32(p.start_index);
    w.write_u32(p.index_count);
}

fn write_meshpoint(w: &mut MeshWriter, mp: &Meshpoint) {
    w.write_prefixed_string(&mp.name);
    w.write_vec3f(&mp.position);
    w.write_mat3f(&mp.rotation);
    w.write_i16(mp.bone_index);
}

fn estimated_len(doc: &MeshDocument) -> usize {
    let header = 4 + 1 + 24 + 16 + HEADER_PADDING;
    let counts = 6 * (4 + COUNT_PADDING);
    let vertices: usize = doc.vertices.iter().map(Vertex::encoded_len).sum();
    let meshpoints: usize = doc
        .meshpoints
        .iter()
        .map(|mp| 4 + mp.name.len() + Meshpoint::TRAILER_SIZE)
        .sum();
    let materials: usize = doc.materials.iter().map(|m| 4 + m.len()).sum();

    header
        + counts
        + vertices
        + doc.indices.len() * 4
        + doc.primitives.len() * Primitive::SIZE
        + meshpoints
        + materials
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;
    use crate::testing::sample_document;

    #[test]
    fn test_estimated_len_is_exact() {
        let doc = sample_document();
        assert_eq!(encode(&doc).len(), estimated_len(&doc));
    }

    #[test]
    fn test_empty_document() {
        let doc = MeshDocument::default();
        let data = encode(&doc);
        assert_eq!(&data[0..4], b"mesh");
        assert_eq!(decode(&data).unwrap().document, doc);
    }

    #[test]
    fn test_encode_is_stable() {
        let doc = sample_document();
        let once = encode(&doc);
        let twice = encode(&decode(&once).unwrap().document);
        assert_eq!(once, twice);
    }
}
