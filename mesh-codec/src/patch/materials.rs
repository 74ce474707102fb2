//! Material table remapping

use hashbrown::HashMap;

use crate::document::MeshDocument;

/// New material table plus where each original slot ends up
///
/// `mapping[i]` is the new index of original slot `i`, or `None` when the
/// slot is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRemap {
    names: Vec<String>,
    mapping: Vec<Option<usize>>,
}

impl MaterialRemap {
    /// Keep every slot in place, giving each one a (possibly new) name
    pub fn identity(names: Vec<String>) -> Self {
        let mapping = (0..names.len()).map(Some).collect();
        Self { names, mapping }
    }

    /// Sorted, deduplicated table of the materials primitives actually use
    ///
    /// Slots no primitive references are dropped. Slots sharing a name
    /// collapse onto one entry.
    pub fn sorted_used(doc: &MeshDocument) -> Self {
        let used = doc.used_material_indices();

        let mut names: Vec<String> = used.iter().map(|&i| doc.materials[i].clone()).collect();
        names.sort();
        names.dedup();

        let mapping = {
            let position: HashMap<&str, usize> = names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.as_str(), i))
                .collect();

            doc.materials
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    if used.binary_search(&i).is_ok() {
                        position.get(name.as_str()).copied()
                    } else {
                        None
                    }
                })
                .collect()
        };

        Self { names, mapping }
    }

    /// The rebuilt material table
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of original slots this remap covers
    pub fn original_len(&self) -> usize {
        self.mapping.len()
    }

    /// New index for an original slot
    pub fn target(&self, original: usize) -> Option<usize> {
        self.mapping.get(original).copied().flatten()
    }

    /// True when every slot stays where it is
    pub fn is_identity(&self) -> bool {
        self.mapping.len() == self.names.len()
            && self
                .mapping
                .iter()
                .enumerate()
                .all(|(i, target)| *target == Some(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Primitive;

    fn doc_with(materials: &[&str], used: &[i16]) -> MeshDocument {
        MeshDocument {
            primitives: used
                .iter()
                .map(|&material_index| Primitive {
                    material_index,
                    start_index: 0,
                    index_count: 0,
                })
                .collect(),
            materials: materials.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sorted_used_drops_unused() {
        let remap = MaterialRemap::sorted_used(&doc_with(&["b", "a", "c"], &[0, 1]));
        assert_eq!(remap.names(), ["a", "b"]);
        assert_eq!(remap.target(0), Some(1));
        assert_eq!(remap.target(1), Some(0));
        assert_eq!(remap.target(2), None);
        assert_eq!(remap.original_len(), 3);
        assert!(!remap.is_identity());
    }

    #[test]
    fn test_sorted_used_merges_duplicates() {
        let remap = MaterialRemap::sorted_used(&doc_with(&["hull", "glow", "hull"], &[2, 0, 1]));
        assert_eq!(remap.names(), ["glow", "hull"]);
        assert_eq!(remap.target(0), Some(1));
        assert_eq!(remap.target(1), Some(0));
        assert_eq!(remap.target(2), Some(1));
    }

    #[test]
    fn test_sorted_already_sorted_is_identity() {
        let remap = MaterialRemap::sorted_used(&doc_with(&["a", "b"], &[1, 0]));
        assert!(remap.is_identity());
    }

    #[test]
    fn test_identity() {
        let remap = MaterialRemap::identity(vec!["x".into(), "y".into()]);
        assert!(remap.is_identity());
        assert_eq!(remap.target(1), Some(1));
        assert_eq!(remap.target(2), None);
    }
}
