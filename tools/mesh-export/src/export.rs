//! Patch and export pipelines
//!
//! `patch_file` rewrites an existing `.mesh` file; `export_with_producer`
//! runs a producer first and then patches its output in place. Both
//! validate meshpoint names before anything is written.

use anyhow::{Context, Result};
use mesh_codec::{LiveMeshpoint, MaterialRemap, MeshError, NamingRules, PatchPlan, assemble, decode};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::ExportConfig;
use crate::materials::write_descriptors;
use crate::producer::FormatProducer;

/// What to do with the material table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MaterialMode {
    /// Copy the table unchanged
    Keep,
    /// Sort, deduplicate and drop unused slots
    #[default]
    SortUsed,
    /// Rename every slot in place
    Rename(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct PatchOptions {
    pub materials: MaterialMode,
    /// Scene meshpoints; `None` keeps the decoded names
    pub meshpoints: Option<Vec<LiveMeshpoint>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub meshpoints: usize,
    /// Final material table
    pub materials: Vec<String>,
    pub original_len: usize,
    pub patched_len: usize,
}

/// Validate and patch an in-memory buffer
pub fn patch_buffer(
    data: &[u8],
    rules: &NamingRules,
    options: &PatchOptions,
) -> Result<(Vec<u8>, PatchReport), MeshError> {
    let decoded = decode(data)?;
    let doc = &decoded.document;

    let mut plan = match &options.meshpoints {
        Some(live) => PatchPlan {
            meshpoints: live.clone(),
            materials: None,
        },
        None => PatchPlan::from_document(doc),
    };

    let invalid = rules.validate_names(
        plan.meshpoints
            .iter()
            .filter(|mp| !mp.excluded)
            .map(|mp| mp.name.as_str()),
    );
    if !invalid.is_empty() {
        return Err(MeshError::InvalidMeshpointName(invalid));
    }

    plan.materials = match &options.materials {
        MaterialMode::Keep => None,
        MaterialMode::SortUsed => Some(MaterialRemap::sorted_used(doc)),
        MaterialMode::Rename(names) => Some(MaterialRemap::identity(names.clone())),
    };

    let patched = assemble(&decoded, &plan)?;
    let materials = match &plan.materials {
        Some(remap) => remap.names().to_vec(),
        None => doc.materials.clone(),
    };

    let report = PatchReport {
        meshpoints: decoded.offsets.meshpoint_count(),
        materials,
        original_len: data.len(),
        patched_len: patched.len(),
    };
    Ok((patched, report))
}

/// Patch `input`, writing the result to `output`
///
/// Nothing is written if decoding, validation or assembly fails.
/// `output` may be the same path as `input`.
pub fn patch_file(
    input: &Path,
    output: &Path,
    rules: &NamingRules,
    options: &PatchOptions,
) -> Result<PatchReport> {
    let data =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let (patched, report) = patch_buffer(&data, rules, options)
        .with_context(|| format!("Failed to patch {}", input.display()))?;

    replace_file(output, &patched)?;

    tracing::info!(
        "Patched {} -> {} ({} -> {} bytes)",
        input.display(),
        output.display(),
        report.original_len,
        report.patched_len
    );
    Ok(report)
}

/// Write through a temp file in the target directory, then rename over
/// `path`; the old contents survive any failure before the rename
fn replace_file(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(data)
        .with_context(|| format!("Failed to write {}", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Result of a full export
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub mesh_path: PathBuf,
    pub patch: PatchReport,
    /// Material descriptors written by this export
    pub descriptors: Vec<PathBuf>,
}

/// Produce, validate and patch a mesh, then write material descriptors
///
/// A produced file that fails validation or patching is removed so no
/// half-exported mesh is left behind.
pub fn export_with_producer(
    producer: &dyn FormatProducer,
    input: &Path,
    out_dir: &Path,
    config: &ExportConfig,
) -> Result<ExportReport> {
    let rules = config.naming_rules()?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mesh_path = producer.produce(input, out_dir)?;

    let options = PatchOptions {
        materials: if config.materials.sort {
            MaterialMode::SortUsed
        } else {
            MaterialMode::Keep
        },
        meshpoints: None,
    };

    let patch = match patch_file(&mesh_path, &mesh_path, &rules, &options) {
        Ok(report) => report,
        Err(e) => {
            if let Err(remove) = std::fs::remove_file(&mesh_path) {
                tracing::warn!("Failed to remove {}: {}", mesh_path.display(), remove);
            }
            return Err(e);
        }
    };

    let descriptors = if config.materials.write_descriptors {
        let mesh_dir = mesh_path.parent().unwrap_or(out_dir);
        write_descriptors(mesh_dir, &patch.materials)?
    } else {
        Vec::new()
    };

    Ok(ExportReport {
        mesh_path,
        patch,
        descriptors,
    })
}
