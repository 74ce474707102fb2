//! mesh-export library
//!
//! Producer invocation, meshpoint validation and `.mesh` patching, usable
//! from other tools as well as from the `mesh-export` binary.

pub mod config;
pub mod export;
pub mod inspect;
pub mod materials;
pub mod producer;

pub use config::{EditFile, ExportConfig};
pub use export::{
    ExportReport, MaterialMode, PatchOptions, PatchReport, export_with_producer, patch_buffer,
    patch_file,
};
pub use producer::{ExternalProducer, FormatProducer};
