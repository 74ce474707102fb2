//! Shared fixtures for unit tests

use crate::document::{
    BoundingBox, BoundingSphere, MeshDocument, MeshHeader, Meshpoint, Primitive, Vertex,
};

fn vertex(position: [f32; 3], uv0: [f32; 2], uv1: Option<[f32; 2]>) -> Vertex {
    Vertex {
        position,
        normal: [0.0, 1.0, 0.0],
        tangent: [1.0, 0.0, 0.0, 1.0],
        uv0,
        uv1,
    }
}

/// Quad plus one extra triangle, two materials in use out of three,
/// meshpoints with duplication suffixes
pub(crate) fn sample_document() -> MeshDocument {
    MeshDocument {
        header: MeshHeader {
            tag: *b"mesh",
            is_skinned: false,
            bounding_box: BoundingBox {
                min: [-1.0, 0.0, -1.0],
                max: [1.0, 0.0, 1.0],
            },
            bounding_sphere: BoundingSphere {
                center: [0.0; 3],
                radius: std::f32::consts::SQRT_2,
            },
        },
        vertices: vec![
            vertex([-1.0, 0.0, -1.0], [0.0, 0.0], Some([0.0, 0.0])),
            vertex([1.0, 0.0, -1.0], [1.0, 0.0], None),
            vertex([1.0, 0.0, 1.0], [1.0, 1.0], Some([0.5, 0.5])),
            vertex([-1.0, 0.0, 1.0], [0.0, 1.0], None),
        ],
        indices: vec![0, 1, 2, 2, 3, 0, 0, 2, 3],
        primitives: vec![
            Primitive {
                material_index: 1,
                start_index: 0,
                index_count: 3,
            },
            Primitive {
                material_index: 0,
                start_index: 3,
                index_count: 6,
            },
        ],
        meshpoints: vec![
            Meshpoint {
                name: "ability.0-1".into(),
                position: [0.5, 1.0, -0.5],
                rotation: [0.0, 0.0, 1.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0],
                bone_index: -1,
            },
            Meshpoint {
                name: "ability.0-2".into(),
                position: [-0.5, 1.0, 0.5],
                rotation: crate::document::IDENTITY_ROTATION,
                bone_index: 3,
            },
            Meshpoint::new("center", [0.0, 0.25, 0.0]),
            Meshpoint::new("weapon.torpedo", [0.0, 0.0, 2.0]),
        ],
        bone_count: 0,
        materials: vec!["b".into(), "a".into(), "c".into()],
    }
}

/// [`sample_document`] with every meshpoint name already canonical
pub(crate) fn canonical_document() -> MeshDocument {
    let mut doc = sample_document();
    doc.meshpoints[0].name = "ability.0".into();
    doc.meshpoints[1].name = "ability.1".into();
    doc
}
