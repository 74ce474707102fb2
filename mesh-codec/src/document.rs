//! Decoded mesh data model

use serde::Serialize;

/// Fixed header fields, carried through without reinterpretation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshHeader {
    /// 4-byte format identifier
    pub tag: [u8; 4],
    /// Informational only
    pub is_skinned: bool,
    pub bounding_box: BoundingBox,
    pub bounding_sphere: BoundingSphere,
}

impl Default for MeshHeader {
    fn default() -> Self {
        Self {
            tag: *DEFAULT_TAG,
            is_skinned: false,
            bounding_box: BoundingBox::default(),
            bounding_sphere: BoundingSphere::default(),
        }
    }
}

/// Tag written by the format producer
pub const DEFAULT_TAG: &[u8; 4] = b"mesh";

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn center(&self) -> [f32; 3] {
        std::array::from_fn(|i| (self.min[i] + self.max[i]) * 0.5)
    }

    /// Half-size along each axis
    pub fn extents(&self) -> [f32; 3] {
        std::array::from_fn(|i| (self.max[i] - self.min[i]) * 0.5)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoundingSphere {
    pub center: [f32; 3],
    pub radius: f32,
}

/// Bounds recomputed from vertex positions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub bounding_box: BoundingBox,
    pub bounding_sphere: BoundingSphere,
}

impl Bounds {
    /// Box enclosing every position, plus a sphere centred on the box that
    /// reaches its farthest corner. Empty input yields zeroed bounds.
    pub fn from_positions(positions: &[[f32; 3]]) -> Self {
        let Some(first) = positions.first() else {
            return Self::default();
        };

        let mut min = *first;
        let mut max = *first;
        for p in &positions[1..] {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }

        let bounding_box = BoundingBox { min, max };
        let center = bounding_box.center();
        let radius = bounding_box
            .extents()
            .iter()
            .map(|e| e * e)
            .sum::<f32>()
            .sqrt();

        Self {
            bounding_box,
            bounding_sphere: BoundingSphere { center, radius },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub uv0: [f32; 2],
    /// Second UV set; its presence is flagged in the stream
    pub uv1: Option<[f32; 2]>,
}

impl Vertex {
    /// Encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        // pos + normal + tangent + uv0 + flag
        let base = 12 + 12 + 16 + 8 + 1;
        if self.uv1.is_some() { base + 8 } else { base }
    }
}

/// A contiguous run of triangle indices drawn with one material
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Primitive {
    pub material_index: i16,
    pub start_index: u32,
    pub index_count: u32,
}

impl Primitive {
    /// Encoded size in bytes (i16 + u32 + u32)
    pub const SIZE: usize = 10;

    /// Index range into [`MeshDocument::indices`]
    pub fn index_range(&self) -> std::ops::Range<usize> {
        let start = self.start_index as usize;
        start..start + self.index_count as usize
    }
}

/// Named attachment point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meshpoint {
    pub name: String,
    pub position: [f32; 3],
    /// 3x3 rotation, row-major
    pub rotation: [f32; 9],
    pub bone_index: i16,
}

impl Meshpoint {
    /// Width of the fixed trailing part of a record (position, rotation, bone index)
    pub const TRAILER_SIZE: usize = 12 + 36 + 2;

    pub fn new(name: impl Into<String>, position: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            position,
            rotation: IDENTITY_ROTATION,
            bone_index: -1,
        }
    }
}

pub const IDENTITY_ROTATION: [f32; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeshDocument {
    pub header: MeshHeader,
    pub vertices: Vec<Vertex>,
    /// Triangle list
    pub indices: Vec<u32>,
    pub primitives: Vec<Primitive>,
    pub meshpoints: Vec<Meshpoint>,
    /// Count only; bone records are not decoded
    pub bone_count: u32,
    pub materials: Vec<String>,
}

impl MeshDocument {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Material name a primitive draws with, if its index is in range
    pub fn material_of(&self, primitive: &Primitive) -> Option<&str> {
        usize::try_from(primitive.material_index)
            .ok()
            .and_then(|i| self.materials.get(i))
            .map(String::as_str)
    }

    /// Sorted, deduplicated material slots referenced by at least one primitive
    pub fn used_material_indices(&self) -> Vec<usize> {
        let mut used: Vec<usize> = self
            .primitives
            .iter()
            .filter_map(|p| usize::try_from(p.material_index).ok())
            .filter(|&i| i < self.materials.len())
            .collect();
        used.sort_unstable();
        used.dedup();
        used
    }

    /// Bounds of the current vertex positions
    pub fn compute_bounds(&self) -> Bounds {
        let positions: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.position).collect();
        Bounds::from_positions(&positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primitive(material_index: i16, start_index: u32, index_count: u32) -> Primitive {
        Primitive {
            material_index,
            start_index,
            index_count,
        }
    }

    #[test]
    fn test_bounds_from_positions() {
        let bounds = Bounds::from_positions(&[[-1.0, 0.0, 2.0], [3.0, 4.0, -2.0], [0.0, 1.0, 0.0]]);
        assert_eq!(bounds.bounding_box.min, [-1.0, 0.0, -2.0]);
        assert_eq!(bounds.bounding_box.max, [3.0, 4.0, 2.0]);
        assert_eq!(bounds.bounding_sphere.center, [1.0, 2.0, 0.0]);
        // extents (2, 2, 2)
        assert!((bounds.bounding_sphere.radius - 12.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_bounds_empty() {
        assert_eq!(Bounds::from_positions(&[]), Bounds::default());
    }

    #[test]
    fn test_used_material_indices() {
        let doc = MeshDocument {
            primitives: vec![primitive(1, 0, 3), primitive(0, 3, 3), primitive(1, 6, 3)],
            materials: vec!["b".into(), "a".into(), "c".into()],
            ..Default::default()
        };
        assert_eq!(doc.used_material_indices(), vec![0, 1]);
        assert_eq!(doc.material_of(&doc.primitives[0]), Some("a"));
        assert_eq!(doc.material_of(&primitive(-1, 0, 0)), None);
        assert_eq!(doc.material_of(&primitive(7, 0, 0)), None);
    }

    #[test]
    fn test_vertex_encoded_len() {
        let mut v = Vertex::default();
        assert_eq!(v.encoded_len(), 49);
        v.uv1 = Some([0.5, 0.5]);
        assert_eq!(v.encoded_len(), 57);
    }

    #[test]
    fn test_serializes_to_json() {
        let doc = MeshDocument {
            meshpoints: vec![Meshpoint::new("center", [1.0, 2.0, 3.0])],
            materials: vec!["hull".into()],
            ..Default::default()
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["meshpoints"][0]["name"], "center");
        assert_eq!(json["meshpoints"][0]["bone_index"], -1);
        assert_eq!(json["header"]["tag"], serde_json::json!([109, 101, 115, 104]));
        assert_eq!(json["materials"][0], "hull");
    }
}
