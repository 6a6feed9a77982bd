use std::path::{Path, PathBuf};
use std::process::Command;

use super::types::RevisionPair;
use crate::error::{ArchiveError, Result};

const GIT: &str = "git";

/// Files reported by `git diff --name-only`, plus the command line that produced them.
#[derive(Debug, Clone)]
pub struct DiffListing {
    pub command: String,
    pub files: Vec<PathBuf>,
}

/// Thin wrapper over the `git` executable, run from a fixed working directory.
pub struct GitCli {
    program: PathBuf,
    workdir: PathBuf,
}

impl GitCli {
    /// Find `git` on `PATH`.
    pub fn locate(workdir: &Path) -> Result<Self> {
        Self::locate_program(GIT, workdir)
    }

    fn locate_program(name: &str, workdir: &Path) -> Result<Self> {
        let program = which::which(name).map_err(|_| ArchiveError::ToolUnavailable)?;
        log::debug!("using git at {}", program.display());
        Ok(Self {
            program,
            workdir: workdir.to_path_buf(),
        })
    }

    /// Absolute path of the repository's top-level directory.
    pub fn toplevel(&self) -> Result<PathBuf> {
        let args = ["rev-parse", "--show-toplevel"];
        let stdout = self.run(&args, &command_line(&args))?;
        Ok(PathBuf::from(String::from_utf8_lossy(&stdout).trim()))
    }

    /// List the files that differ for `revisions`, as absolute paths under `root`.
    ///
    /// git is asked for NUL-terminated, unquoted names so paths with
    /// non-ASCII bytes, quotes or newlines come back verbatim. The reported
    /// command is the plain `git diff --name-only ...` form.
    pub fn diff_names(
        &self,
        diff_filter: &str,
        revisions: &RevisionPair,
        root: &Path,
    ) -> Result<DiffListing> {
        let filter_arg = format!("--diff-filter={diff_filter}");
        let mut shown = vec!["diff", "--name-only", filter_arg.as_str()];
        shown.extend(revisions.args());
        let command = command_line(&shown);

        let mut args = vec!["-c", "core.quotePath=false", "diff", "-z"];
        args.extend_from_slice(&shown[1..]);

        let stdout = self.run(&args, &command)?;
        let files = split_nul(&stdout)
            .into_iter()
            .map(|rel| root.join(rel))
            .collect();

        Ok(DiffListing { command, files })
    }

    fn run(&self, args: &[&str], command: &str) -> Result<Vec<u8>> {
        log::debug!("running `{command}` in {}", self.workdir.display());

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| ArchiveError::Execution {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => output.status.to_string(),
                msg => msg.to_string(),
            };
            return Err(ArchiveError::Execution {
                command: command.to_string(),
                message,
            });
        }

        Ok(output.stdout)
    }
}

fn command_line(args: &[&str]) -> String {
    std::iter::once(GIT)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split `-z` output into relative paths, dropping empty records.
fn split_nul(output: &[u8]) -> Vec<PathBuf> {
    output
        .split(|&b| b == 0)
        .filter(|record| !record.is_empty())
        .map(path_from_bytes)
        .collect()
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_nul_records() {
        assert_eq!(
            split_nul(b"a.txt\0src/b.rs\0c.md\0"),
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("src/b.rs"),
                PathBuf::from("c.md")
            ]
        );
    }

    #[test]
    fn test_split_nul_empty_output() {
        assert!(split_nul(b"").is_empty());
        assert!(split_nul(b"\0").is_empty());
    }

    #[test]
    fn test_split_nul_keeps_names_verbatim() {
        assert_eq!(
            split_nul("caf\u{e9}.txt\0my \"odd\"\nname.txt\0".as_bytes()),
            vec![
                PathBuf::from("caf\u{e9}.txt"),
                PathBuf::from("my \"odd\"\nname.txt")
            ]
        );
    }

    #[test]
    fn test_missing_executable() {
        let result = GitCli::locate_program("git-diff-archive-no-such-tool", Path::new("."));
        assert!(matches!(result, Err(ArchiveError::ToolUnavailable)));
    }

    #[test]
    fn test_command_line() {
        assert_eq!(
            command_line(&["diff", "--name-only", "--diff-filter=ACDMRTUXB", "HEAD"]),
            "git diff --name-only --diff-filter=ACDMRTUXB HEAD"
        );
    }
}
