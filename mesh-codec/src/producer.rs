//! Format producer diagnostics
//!
//! The external producer reports failures as free-form log lines. The known
//! failure classes are recognized here so callers get a typed error instead
//! of scraping output themselves.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::MeshError;

/// Recognized producer failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProducerFailure {
    /// The producer rejected a meshpoint name
    #[error("unexpected mesh point name: '{0}'")]
    UnexpectedMeshpointName(String),

    /// A mesh has no texture coordinates
    #[error("the mesh is missing UV coordinates")]
    MissingUvCoordinates,

    /// The input contained no meshes; carries the producer's line
    #[error("{0}")]
    NoMeshesFound(String),
}

impl From<ProducerFailure> for MeshError {
    fn from(failure: ProducerFailure) -> Self {
        MeshError::UnexpectedProducerOutput(failure)
    }
}

struct Patterns {
    meshpoint_name: Regex,
    missing_uv: Regex,
    no_meshes: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        meshpoint_name: Regex::new(r"Unexpected\s+mesh\s+point\s+name\s*:\s*'(.*)'")
            .expect("valid pattern"),
        missing_uv: Regex::new(r"Attribute\s+not\s+found\s*:\s*TEXCOORD_\d").expect("valid pattern"),
        no_meshes: Regex::new(r"No\s+meshes\s+found\.").expect("valid pattern"),
    })
}

/// Classify one line of producer output
pub fn classify_line(line: &str) -> Option<ProducerFailure> {
    let line = line.trim();
    let p = patterns();

    if let Some(caps) = p.meshpoint_name.captures(line) {
        return Some(ProducerFailure::UnexpectedMeshpointName(caps[1].to_string()));
    }
    if p.missing_uv.is_match(line) {
        return Some(ProducerFailure::MissingUvCoordinates);
    }
    if p.no_meshes.is_match(line) {
        return Some(ProducerFailure::NoMeshesFound(line.to_string()));
    }
    None
}

/// First recognized failure in the producer's output, if any
pub fn classify_output<'a>(lines: impl IntoIterator<Item = &'a str>) -> Option<ProducerFailure> {
    lines.into_iter().find_map(classify_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_meshpoint_name() {
        assert_eq!(
            classify_line("Unexpected mesh point name : 'ablity.0'"),
            Some(ProducerFailure::UnexpectedMeshpointName("ablity.0".into()))
        );
    }

    #[test]
    fn test_missing_uvs() {
        assert_eq!(
            classify_line("  Attribute not found : TEXCOORD_0"),
            Some(ProducerFailure::MissingUvCoordinates)
        );
    }

    #[test]
    fn test_no_meshes() {
        assert_eq!(
            classify_line("No meshes found."),
            Some(ProducerFailure::NoMeshesFound("No meshes found.".into()))
        );
    }

    #[test]
    fn test_first_failure_wins() {
        let log = "loading input\nwriting points\nAttribute not found : TEXCOORD_1\nNo meshes found.";
        assert_eq!(
            classify_output(log.lines()),
            Some(ProducerFailure::MissingUvCoordinates)
        );
        assert_eq!(classify_output("all good\ndone".lines()), None);
    }

    #[test]
    fn test_into_mesh_error() {
        let err: MeshError = ProducerFailure::MissingUvCoordinates.into();
        assert_eq!(
            err.to_string(),
            "format producer failed: the mesh is missing UV coordinates"
        );
    }
}
