//! # Ingest
//!
//! Turns dropped level archives into validated directories under the host's
//! managed `CustomWipLevels` folder.
//!
//! Each archive gets a sanitized, collision-free directory name, is extracted
//! with path confinement and a size limit, and is validated as a level. Any
//! failure removes the directory again, so the managed folder only ever gains
//! complete levels.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ingest::{resolve_target_base, ArchiveImporter, ImportPipeline, LibraryRefresher};
//! use ingest::SessionImportTracker;
//! use std::path::{Path, PathBuf};
//! use std::sync::Arc;
//!
//! struct Rescan;
//!
//! impl LibraryRefresher for Rescan {
//!     fn refresh(&self) {
//!         println!("rescanning levels");
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let target = resolve_target_base(Path::new("C:/Games/Beat Saber"))?;
//! let pipeline = ImportPipeline::new(
//!     ArchiveImporter::default(),
//!     target,
//!     Arc::new(SessionImportTracker::new()),
//!     Arc::new(Rescan),
//! );
//!
//! let summary = pipeline.process_batch(&[PathBuf::from("C:/Downloads/MyMap.zip")]);
//! println!("imported {}, failed {}", summary.succeeded, summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod importer;
pub mod naming;
pub mod paths;
pub mod pipeline;
pub mod safety;
pub mod session;
pub mod settings;
pub mod types;
pub mod validate;

// Re-export main types
pub use error::{ExtractError, ImportFailureKind, PathError, SecurityError, SettingsError};
pub use importer::ArchiveImporter;
pub use naming::sanitize_dir_name;
pub use paths::resolve_target_base;
pub use pipeline::{is_archive, ImportPipeline, LibraryRefresher};
pub use session::SessionImportTracker;
pub use settings::Settings;
pub use types::{BatchSummary, ImportOptions, ImportOutcome};
pub use validate::is_valid_content_dir;
