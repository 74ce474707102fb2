//! Material descriptor side files (`<name>.mesh_material`)
//!
//! Each material in an exported mesh gets a descriptor naming its four
//! texture maps. Descriptors already present in the shared
//! `../mesh_materials` directory are left alone; new ones go there when it
//! exists, otherwise next to the mesh.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Descriptor file extension
pub const DESCRIPTOR_EXTENSION: &str = "mesh_material";

/// Sibling directory shared between meshes
pub const SHARED_DIR: &str = "mesh_materials";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialDescriptor {
    #[serde(rename = "base_color_texture")]
    pub clr: String,
    #[serde(rename = "normal_texture")]
    pub nrm: String,
    #[serde(rename = "mask_texture")]
    pub msk: String,
    #[serde(rename = "occlusion_roughness_metallic_texture")]
    pub orm: String,
}

impl MaterialDescriptor {
    /// Conventional texture names for a material
    pub fn for_material(name: &str) -> Self {
        Self {
            clr: format!("{name}_clr"),
            nrm: format!("{name}_nrm"),
            msk: format!("{name}_msk"),
            orm: format!("{name}_orm"),
        }
    }

    /// Four-space indented JSON
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8(buf)?)
    }
}

fn descriptor_file_name(material: &str) -> Result<String> {
    if material.is_empty() || material.contains(['/', '\\']) || material == ".." {
        bail!("Material name cannot be used as a file name: {:?}", material);
    }
    Ok(format!("{material}.{DESCRIPTOR_EXTENSION}"))
}

/// Write descriptors for every material not already in the shared directory
///
/// Returns the paths written.
pub fn write_descriptors(mesh_dir: &Path, materials: &[String]) -> Result<Vec<PathBuf>> {
    let shared = mesh_dir.join("..").join(SHARED_DIR);
    let dest = if shared.is_dir() { shared.as_path() } else { mesh_dir };

    let mut written = Vec::new();
    for material in materials {
        let file_name = descriptor_file_name(material)?;
        if shared.join(&file_name).exists() {
            tracing::debug!("Descriptor for {} already shared, skipping", material);
            continue;
        }

        let path = dest.join(&file_name);
        let json = MaterialDescriptor::for_material(material).to_json()?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write descriptor: {}", path.display()))?;
        tracing::info!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_descriptor_json() {
        let json = MaterialDescriptor::for_material("hull").to_json().unwrap();
        assert!(json.contains("\n    \"base_color_texture\": \"hull_clr\""));
        let parsed: MaterialDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.orm, "hull_orm");
    }

    #[test]
    fn test_writes_next_to_mesh_without_shared_dir() {
        let dir = tempdir().unwrap();
        let mesh_dir = dir.path().join("meshes");
        std::fs::create_dir(&mesh_dir).unwrap();

        let written = write_descriptors(&mesh_dir, &["hull".into(), "glow".into()]).unwrap();
        assert_eq!(written.len(), 2);
        assert!(mesh_dir.join("hull.mesh_material").exists());
        assert!(mesh_dir.join("glow.mesh_material").exists());
    }

    #[test]
    fn test_shared_dir_used_and_existing_skipped() {
        let dir = tempdir().unwrap();
        let mesh_dir = dir.path().join("meshes");
        let shared = dir.path().join(SHARED_DIR);
        std::fs::create_dir(&mesh_dir).unwrap();
        std::fs::create_dir(&shared).unwrap();
        std::fs::write(shared.join("hull.mesh_material"), "{}").unwrap();

        let written = write_descriptors(&mesh_dir, &["hull".into(), "glow".into()]).unwrap();
        assert_eq!(written.len(), 1);
        assert!(shared.join("glow.mesh_material").exists());
        assert!(!mesh_dir.join("glow.mesh_material").exists());
        // Untouched
        assert_eq!(
            std::fs::read_to_string(shared.join("hull.mesh_material")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_path_like_names_rejected() {
        let dir = tempdir().unwrap();
        assert!(write_descriptors(dir.path(), &["../evil".into()]).is_err());
        assert!(write_descriptors(dir.path(), &["".into()]).is_err());
    }
}
