pub mod commands;
pub mod types;

pub use commands::{DiffListing, GitCli};
pub use types::RevisionPair;
