use thiserror::Error;

/// Every way an archive invocation can fail. All variants are terminal.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("git command not exist")]
    ToolUnavailable,
    #[error("specified format type is not supported")]
    UnsupportedFormat(String),
    #[error("diff file does not exist")]
    NoDiffFiles,
    #[error("`{command}` failed: {message}")]
    Execution { command: String, message: String },
    #[error("archive error: {0}")]
    Archive(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => ArchiveError::Io(e),
            other => ArchiveError::Archive(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
