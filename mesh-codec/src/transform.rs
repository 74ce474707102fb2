//! Conversion between authoring-tool space and engine space
//!
//! The authoring tool is right-handed Z-up; the engine is Y-up with X
//! mirrored. Attachment points additionally carry a local orientation
//! correction applied on the right of their rotation.

use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::document::{BoundingBox, MeshDocument, MeshHeader, Meshpoint, Vertex};

/// Tool space to engine space (axis swap, X mirrored)
pub const ENGINE_SPACE: Mat4 = Mat4::from_cols(
    Vec4::new(-1.0, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 1.0, 0.0),
    Vec4::new(0.0, 1.0, 0.0, 0.0),
    Vec4::W,
);

/// Local orientation correction for attachment points
pub const POINT_LOCAL_SPACE: Mat4 = Mat4::from_cols(
    Vec4::new(-1.0, 0.0, 0.0, 0.0),
    Vec4::Y,
    Vec4::new(0.0, 0.0, -1.0, 0.0),
    Vec4::W,
);

pub fn point_to_engine(p: [f32; 3]) -> [f32; 3] {
    ENGINE_SPACE.transform_point3(Vec3::from_array(p)).to_array()
}

pub fn point_to_tool(p: [f32; 3]) -> [f32; 3] {
    ENGINE_SPACE
        .inverse()
        .transform_point3(Vec3::from_array(p))
        .to_array()
}

/// Normals and other directions (translation ignored)
pub fn direction_to_engine(d: [f32; 3]) -> [f32; 3] {
    ENGINE_SPACE.transform_vector3(Vec3::from_array(d)).to_array()
}

pub fn direction_to_tool(d: [f32; 3]) -> [f32; 3] {
    ENGINE_SPACE
        .inverse()
        .transform_vector3(Vec3::from_array(d))
        .to_array()
}

/// Tangent direction converted, handedness sign in `w` kept
pub fn tangent_to_engine(t: [f32; 4]) -> [f32; 4] {
    let [x, y, z] = direction_to_engine([t[0], t[1], t[2]]);
    [x, y, z, t[3]]
}

pub fn tangent_to_tool(t: [f32; 4]) -> [f32; 4] {
    let [x, y, z] = direction_to_tool([t[0], t[1], t[2]]);
    [x, y, z, t[3]]
}

fn mat3_from_rows(rows: &[f32; 9]) -> Mat3 {
    Mat3::from_cols_array(rows).transpose()
}

fn mat3_to_rows(m: Mat3) -> [f32; 9] {
    m.transpose().to_cols_array()
}

/// Attachment point rotation (row-major) into engine space
pub fn rotation_to_engine(rotation: [f32; 9]) -> [f32; 9] {
    let engine = Mat3::from_mat4(ENGINE_SPACE);
    let local = Mat3::from_mat4(POINT_LOCAL_SPACE);
    mat3_to_rows(engine * mat3_from_rows(&rotation) * local)
}

pub fn rotation_to_tool(rotation: [f32; 9]) -> [f32; 9] {
    let engine = Mat3::from_mat4(ENGINE_SPACE).inverse();
    let local = Mat3::from_mat4(POINT_LOCAL_SPACE).inverse();
    mat3_to_rows(engine * mat3_from_rows(&rotation) * local)
}

pub fn meshpoint_to_engine(mp: &Meshpoint) -> Meshpoint {
    Meshpoint {
        name: mp.name.clone(),
        position: point_to_engine(mp.position),
        rotation: rotation_to_engine(mp.rotation),
        bone_index: mp.bone_index,
    }
}

pub fn meshpoint_to_tool(mp: &Meshpoint) -> Meshpoint {
    Meshpoint {
        name: mp.name.clone(),
        position: point_to_tool(mp.position),
        rotation: rotation_to_tool(mp.rotation),
        bone_index: mp.bone_index,
    }
}

fn vertex_with(
    v: &Vertex,
    point: fn([f32; 3]) -> [f32; 3],
    tangent: fn([f32; 4]) -> [f32; 4],
    direction: fn([f32; 3]) -> [f32; 3],
) -> Vertex {
    Vertex {
        position: point(v.position),
        normal: direction(v.normal),
        tangent: tangent(v.tangent),
        uv0: v.uv0,
        uv1: v.uv1,
    }
}

/// Corners are converted then re-sorted, which is exact for axis
/// permutations with sign flips
fn header_with(h: &MeshHeader, point: fn([f32; 3]) -> [f32; 3]) -> MeshHeader {
    let a = point(h.bounding_box.min);
    let b = point(h.bounding_box.max);
    let mut header = h.clone();
    header.bounding_box = BoundingBox {
        min: std::array::from_fn(|i| a[i].min(b[i])),
        max: std::array::from_fn(|i| a[i].max(b[i])),
    };
    header.bounding_sphere.center = point(h.bounding_sphere.center);
    header
}

impl MeshDocument {
    /// Copy of this document with geometry and meshpoints in engine space
    pub fn to_engine_space(&self) -> MeshDocument {
        MeshDocument {
            header: header_with(&self.header, point_to_engine),
            vertices: self
                .vertices
                .iter()
                .map(|v| vertex_with(v, point_to_engine, tangent_to_engine, direction_to_engine))
                .collect(),
            meshpoints: self.meshpoints.iter().map(meshpoint_to_engine).collect(),
            ..self.clone()
        }
    }

    /// Copy of this document with geometry and meshpoints in tool space
    pub fn to_tool_space(&self) -> MeshDocument {
        MeshDocument {
            header: header_with(&self.header, point_to_tool),
            vertices: self
                .vertices
                .iter()
                .map(|v| vertex_with(v, point_to_tool, tangent_to_tool, direction_to_tool))
                .collect(),
            meshpoints: self.meshpoints.iter().map(meshpoint_to_tool).collect(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_document;

    fn assert_close(a: &[f32], b: &[f32]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-5, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_point_to_engine() {
        assert_close(&point_to_engine([1.0, 2.0, 3.0]), &[-1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_identity_rotation_to_engine() {
        let r = rotation_to_engine(crate::document::IDENTITY_ROTATION);
        assert_close(&r, &[1.0, 0.0, 0.0, 0.0, 0.0, -1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_point_symmetry() {
        for p in [[0.0, 0.0, 0.0], [1.5, -2.0, 7.25], [-3.0, 0.5, -0.125]] {
            assert_close(&point_to_tool(point_to_engine(p)), &p);
            assert_close(&point_to_engine(point_to_tool(p)), &p);
            assert_close(&direction_to_tool(direction_to_engine(p)), &p);
        }
    }

    #[test]
    fn test_rotation_symmetry() {
        let (s, c) = 0.3f32.sin_cos();
        let rotations = [
            crate::document::IDENTITY_ROTATION,
            [c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c],
        ];
        for r in rotations {
            assert_close(&rotation_to_tool(rotation_to_engine(r)), &r);
            assert_close(&rotation_to_engine(rotation_to_tool(r)), &r);
        }
    }

    #[test]
    fn test_document_symmetry() {
        let doc = sample_document();
        let back = doc.to_engine_space().to_tool_space();

        assert_eq!(back.meshpoints.len(), doc.meshpoints.len());
        for (a, b) in back.meshpoints.iter().zip(&doc.meshpoints) {
            assert_eq!(a.name, b.name);
            assert_close(&a.position, &b.position);
            assert_close(&a.rotation, &b.rotation);
        }
        for (a, b) in back.vertices.iter().zip(&doc.vertices) {
            assert_close(&a.position, &b.position);
            assert_close(&a.normal, &b.normal);
            assert_close(&a.tangent, &b.tangent);
            assert_eq!(a.uv1, b.uv1);
        }
        assert_close(&back.header.bounding_box.min, &doc.header.bounding_box.min);
        assert_close(&back.header.bounding_box.max, &doc.header.bounding_box.max);
        assert_eq!(back.materials, doc.materials);
    }

    #[test]
    fn test_bounding_box_stays_ordered() {
        let doc = sample_document().to_engine_space();
        let bb = doc.header.bounding_box;
        for axis in 0..3 {
            assert!(bb.min[axis] <= bb.max[axis]);
        }
    }
}
