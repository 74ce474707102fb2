//! Codec error types

use std::fmt;

use crate::naming::InvalidName;
use crate::producer::ProducerFailure;

/// Section of the mesh layout, used to locate decode failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Vertices,
    Indices,
    Primitives,
    Meshpoints,
    Bones,
    Materials,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Header => "header",
            Section::Vertices => "vertex",
            Section::Indices => "index",
            Section::Primitives => "primitive",
            Section::Meshpoints => "meshpoint",
            Section::Bones => "bone",
            Section::Materials => "material",
        };
        f.write_str(name)
    }
}

/// Variable-length table rewritten by the patcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Meshpoints,
    Materials,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Table::Meshpoints => f.write_str("meshpoint"),
            Table::Materials => f.write_str("material"),
        }
    }
}

/// Errors produced by the mesh codec
///
/// None of these are retryable: the input has to be fixed and the export
/// run again.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// A primitive read ran past the end of the buffer
    #[error(
        "unexpected end of buffer at offset {offset}: needed {needed} bytes, {remaining} remaining"
    )]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A boolean byte held something other than 0 or 1
    #[error("invalid boolean value {value} at offset {offset}")]
    InvalidBool { offset: usize, value: u8 },

    /// A string field was not valid UTF-8
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidString { offset: usize },

    /// The buffer does not describe a well-formed mesh
    #[error("malformed mesh ({section} section): {reason}")]
    MalformedMesh { section: Section, reason: String },

    /// One or more meshpoint names fail the naming grammar
    #[error("invalid meshpoint names: {}", join_names(.0))]
    InvalidMeshpointName(Vec<InvalidName>),

    /// Live record count diverges from the decoded original
    #[error("{table} record count mismatch: original has {expected}, got {actual}")]
    RecordCountMismatch {
        table: Table,
        expected: usize,
        actual: usize,
    },

    /// A material remap drops a slot that a primitive still draws with
    #[error("material {index} ('{name}') is used by a primitive but dropped by the remap")]
    MaterialInUse { index: usize, name: String },

    /// A naming rule pattern failed to compile
    #[error("invalid naming rule '{category}': {source}")]
    InvalidNamingRule {
        category: String,
        #[source]
        source: regex::Error,
    },

    /// The format producer reported a recognized failure
    #[error("format producer failed: {0}")]
    UnexpectedProducerOutput(ProducerFailure),
}

impl MeshError {
    pub(crate) fn malformed(section: Section, reason: impl fmt::Display) -> Self {
        MeshError::MalformedMesh {
            section,
            reason: reason.to_string(),
        }
    }
}

fn join_names(names: &[InvalidName]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n.name))
        .collect::<Vec<_>>()
        .join(", ")
}
