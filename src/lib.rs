//! Package the files changed between git revisions into a zip or tar archive.
//!
//! The work happens in [`pipeline::run`]: list the changed paths with
//! `git diff --name-only`, keep the ones that still exist as regular files,
//! render the output path and entry prefix templates, then write the archive.

pub mod archive;
pub mod classify;
pub mod config;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod template;

pub use archive::ArchiveFormat;
pub use config::Options;
pub use error::ArchiveError;
pub use git::RevisionPair;
pub use pipeline::{run, run_in, run_to, ArchiveOutcome, Environment};
