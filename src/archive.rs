use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::error::{ArchiveError, Result};

/// Supported archive containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
}

impl ArchiveFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tar => "tar",
        }
    }
}

impl FromStr for ArchiveFormat {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zip" => Ok(ArchiveFormat::Zip),
            "tar" => Ok(ArchiveFormat::Tar),
            other => Err(ArchiveError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted once per entry after it has been written.
#[derive(Debug, Clone, Copy)]
pub struct EntryEvent<'a> {
    /// 1-based position of the entry.
    pub index: usize,
    pub total: usize,
    pub name: &'a str,
}

/// Everything needed to write one archive.
pub struct ArchiveRequest<'a> {
    pub files: &'a [PathBuf],
    /// Entry names are taken relative to this directory.
    pub root: &'a Path,
    pub format: ArchiveFormat,
    pub output: &'a Path,
    pub prefix: &'a str,
    pub dry_run: bool,
}

/// Stored name for `file`: `<prefix>/<path relative to root>`, `/`-separated.
pub fn entry_name(prefix: &str, root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let segments = prefix
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_string)
        .chain(relative.components().filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        }));
    segments.collect::<Vec<_>>().join("/")
}

/// Removes the output file on drop unless the archive was completed.
struct PartialOutput<'a> {
    path: &'a Path,
    complete: bool,
}

impl Drop for PartialOutput<'_> {
    fn drop(&mut self) {
        if !self.complete {
            log::debug!("removing incomplete archive {}", self.path.display());
            let _ = fs::remove_file(self.path);
        }
    }
}

/// Write the archive described by `req` and return its size in bytes.
///
/// In dry-run mode nothing is touched and the size is 0. `on_entry` is
/// called after each file has been appended.
pub fn build_archive(req: &ArchiveRequest<'_>, on_entry: &mut dyn FnMut(EntryEvent<'_>)) -> Result<u64> {
    if req.dry_run {
        return Ok(0);
    }

    if let Some(parent) = req.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(req.output)?;
    let mut guard = PartialOutput {
        path: req.output,
        complete: false,
    };

    let entries: Vec<(&PathBuf, String)> = req
        .files
        .iter()
        .map(|f| (f, entry_name(req.prefix, req.root, f)))
        .collect();

    let file = match req.format {
        ArchiveFormat::Zip => write_zip(file, &entries, on_entry)?,
        ArchiveFormat::Tar => write_tar(file, &entries, on_entry)?,
    };

    let bytes = file.metadata()?.len();
    guard.complete = true;
    log::info!("wrote {} ({bytes} bytes)", req.output.display());
    Ok(bytes)
}

fn write_zip(
    file: File,
    entries: &[(&PathBuf, String)],
    on_entry: &mut dyn FnMut(EntryEvent<'_>),
) -> Result<File> {
    let mut zip = zip::ZipWriter::new(BufWriter::new(file));
    let total = entries.len();

    for (i, (path, name)) in entries.iter().enumerate() {
        let mut src = File::open(path)?;
        let meta = src.metadata()?;

        let mut options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(meta.len() >= u64::from(u32::MAX));
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            options = options.unix_permissions(meta.permissions().mode());
        }

        zip.start_file(name.as_str(), options)?;
        io::copy(&mut src, &mut zip)?;
        on_entry(EntryEvent {
            index: i + 1,
            total,
            name,
        });
    }

    let writer = zip.finish()?;
    writer.into_inner().map_err(|e| ArchiveError::Io(e.into_error()))
}

fn write_tar(
    file: File,
    entries: &[(&PathBuf, String)],
    on_entry: &mut dyn FnMut(EntryEvent<'_>),
) -> Result<File> {
    let mut builder = tar::Builder::new(BufWriter::new(file));
    let total = entries.len();

    for (i, (path, name)) in entries.iter().enumerate() {
        builder.append_path_with_name(path, name)?;
        on_entry(EntryEvent {
            index: i + 1,
            total,
            name,
        });
    }

    let writer = builder.into_inner()?;
    writer.into_inner().map_err(|e| ArchiveError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn fixture() -> (tempfile::TempDir, Vec<PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("myproj");
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("a.txt"), "alpha").unwrap();
        fs::write(root.join("src/lib.rs"), "pub fn x() {}\n").unwrap();
        let files = vec![root.join("a.txt"), root.join("src/lib.rs")];
        (dir, files)
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("zip".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::Zip);
        assert_eq!("tar".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::Tar);
        assert!(matches!(
            "rar".parse::<ArchiveFormat>(),
            Err(ArchiveError::UnsupportedFormat(f)) if f == "rar"
        ));
        assert!("ZIP".parse::<ArchiveFormat>().is_err());
    }

    #[test]
    fn test_entry_name() {
        let root = Path::new("/repo/myproj");
        let file = Path::new("/repo/myproj/src/lib.rs");
        assert_eq!(entry_name("myproj", root, file), "myproj/src/lib.rs");
        assert_eq!(entry_name("a/b/", root, file), "a/b/src/lib.rs");
        assert_eq!(entry_name("/out//x", root, file), "out/x/src/lib.rs");
        assert_eq!(entry_name("", root, file), "src/lib.rs");
    }

    #[test]
    fn test_zip_contents_and_events() {
        let (dir, files) = fixture();
        let root = dir.path().join("myproj");
        let output = dir.path().join("out/nested/archive.zip");
        let mut seen = Vec::new();

        let bytes = build_archive(
            &ArchiveRequest {
                files: &files,
                root: &root,
                format: ArchiveFormat::Zip,
                output: &output,
                prefix: "myproj",
                dry_run: false,
            },
            &mut |e| seen.push((e.index, e.total, e.name.to_string())),
        )
        .unwrap();

        assert_eq!(bytes, fs::metadata(&output).unwrap().len());
        assert_eq!(
            seen,
            vec![
                (1, 2, "myproj/a.txt".to_string()),
                (2, 2, "myproj/src/lib.rs".to_string()),
            ]
        );

        let mut zip = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(zip.len(), 2);
        let mut body = String::new();
        zip.by_name("myproj/a.txt")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "alpha");
    }

    #[test]
    fn test_tar_contents() {
        let (dir, files) = fixture();
        let root = dir.path().join("myproj");
        let output = dir.path().join("archive.tar");

        let bytes = build_archive(
            &ArchiveRequest {
                files: &files,
                root: &root,
                format: ArchiveFormat::Tar,
                output: &output,
                prefix: "pkg",
                dry_run: false,
            },
            &mut |_| {},
        )
        .unwrap();
        assert!(bytes > 0);

        let mut archive = tar::Archive::new(File::open(&output).unwrap());
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["pkg/a.txt", "pkg/src/lib.rs"]);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let (dir, files) = fixture();
        let root = dir.path().join("myproj");
        let output = dir.path().join("never/made.zip");
        let mut events = 0;

        let bytes = build_archive(
            &ArchiveRequest {
                files: &files,
                root: &root,
                format: ArchiveFormat::Zip,
                output: &output,
                prefix: "myproj",
                dry_run: true,
            },
            &mut |_| events += 1,
        )
        .unwrap();

        assert_eq!(bytes, 0);
        assert_eq!(events, 0);
        assert!(!dir.path().join("never").exists());
    }

    #[test]
    fn test_failed_build_removes_output() {
        let (dir, mut files) = fixture();
        let root = dir.path().join("myproj");
        files.push(root.join("vanished.txt"));
        let output = dir.path().join("broken.zip");

        let result = build_archive(
            &ArchiveRequest {
                files: &files,
                root: &root,
                format: ArchiveFormat::Zip,
                output: &output,
                prefix: "",
                dry_run: false,
            },
            &mut |_| {},
        );

        assert!(matches!(result, Err(ArchiveError::Io(_))));
        assert!(!output.exists());
    }
}
