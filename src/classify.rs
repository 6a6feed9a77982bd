use std::fs;
use std::path::PathBuf;

/// The diff listing split into files that can be archived and everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub included: Vec<PathBuf>,
    pub excluded: Vec<PathBuf>,
}

/// Partition `paths` by whether each one is currently a regular file.
///
/// Paths that cannot be stat'ed (typically deleted by the diffed change)
/// land in `excluded`; this never fails. Symlinks are followed.
pub fn classify(paths: Vec<PathBuf>) -> Classification {
    let mut result = Classification::default();
    for path in paths {
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => result.included.push(path),
            Ok(_) => result.excluded.push(path),
            Err(e) => {
                log::debug!("excluding {}: {e}", path.display());
                result.excluded.push(path);
            }
        }
    }
    result
}
