//! External format producer invocation
//!
//! The producer converts an interchange geometry file into a `.mesh`
//! binary. It reports failures in its log output rather than through exit
//! codes, so the output is scanned for known failure lines.

use anyhow::{Context, Result, bail};
use mesh_codec::{MeshError, classify_output};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ProducerSection;

/// Something that turns a geometry file into a `.mesh` file
pub trait FormatProducer {
    /// Convert `input`, writing into `out_dir`. Returns the written path.
    fn produce(&self, input: &Path, out_dir: &Path) -> Result<PathBuf>;
}

/// Deterministic output path: `<out_dir>/<input stem>.<extension>`
pub fn output_path(input: &Path, out_dir: &Path, extension: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .with_context(|| format!("Input has no file name: {}", input.display()))?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(extension);
    Ok(out_dir.join(name))
}

/// Runs the producer executable as a child process
#[derive(Debug, Clone)]
pub struct ExternalProducer {
    pub executable: String,
    pub args: Vec<String>,
    pub output_extension: String,
}

impl ExternalProducer {
    pub fn from_config(section: &ProducerSection) -> Self {
        Self {
            executable: section.executable.clone(),
            args: section.args.clone(),
            output_extension: section.output_extension.clone(),
        }
    }
}

impl FormatProducer for ExternalProducer {
    fn produce(&self, input: &Path, out_dir: &Path) -> Result<PathBuf> {
        let executable = which::which(&self.executable)
            .with_context(|| format!("Format producer not found: {}", self.executable))?;

        tracing::info!("Running {} on {}", executable.display(), input.display());

        let output = Command::new(&executable)
            .arg(format!("--input_path={}", input.display()))
            .arg(format!("--output_folder_path={}", out_dir.display()))
            .arg("--mesh_output_format=binary")
            .args(&self.args)
            .output()
            .with_context(|| format!("Failed to execute {}", executable.display()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines().chain(stderr.lines()) {
            tracing::debug!(target: "producer", "{}", line.trim());
        }

        if let Some(failure) = classify_output(stdout.lines().chain(stderr.lines())) {
            return Err(MeshError::from(failure).into());
        }

        if !output.status.success() {
            bail!(
                "Format producer failed (exit code: {})\n{}",
                output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                stderr.trim()
            );
        }

        let path = output_path(input, out_dir, &self.output_extension)?;
        if !path.exists() {
            bail!(
                "Format producer finished but did not write {}",
                path.display()
            );
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let path = output_path(
            Path::new("/work/ships/frigate.gltf"),
            Path::new("/out"),
            "mesh",
        )
        .unwrap();
        assert_eq!(path, Path::new("/out/frigate.mesh"));
    }

    #[test]
    fn test_output_path_keeps_dotted_stem() {
        let path = output_path(
            Path::new("/work/ships/frigate.v2.gltf"),
            Path::new("/out"),
            "mesh",
        )
        .unwrap();
        assert_eq!(path, Path::new("/out/frigate.v2.mesh"));
    }

    #[test]
    fn test_output_path_requires_file_name() {
        assert!(output_path(Path::new("/"), Path::new("/out"), "mesh").is_err());
    }

    #[test]
    fn test_missing_executable() {
        let producer = ExternalProducer {
            executable: "definitely-not-a-mesh-producer-binary".into(),
            args: Vec::new(),
            output_extension: "mesh".into(),
        };
        let err = producer
            .produce(Path::new("in.gltf"), Path::new("."))
            .unwrap_err();
        assert!(err.to_string().contains("Format producer not found"));
    }
}
