use crossterm::style::Stylize;
use std::io::{self, Write};

use crate::archive::EntryEvent;
use crate::pipeline::ArchiveOutcome;

/// Blue and bold when `color` is set, plain otherwise.
fn label(text: &str, color: bool) -> String {
    if color {
        text.blue().bold().to_string()
    } else {
        text.to_string()
    }
}

/// One line of verbose per-entry progress.
pub fn write_entry(out: &mut dyn Write, event: &EntryEvent<'_>, color: bool) -> io::Result<()> {
    let text = format!("Entry ({}/{}):", event.index, event.total);
    writeln!(out, "{} {}", label(&text, color), event.name)
}

/// Summary printed after a dry run or a verbose run.
///
/// The included file list is skipped in verbose mode since every entry was
/// already reported as it was written.
pub fn write_summary(
    out: &mut dyn Write,
    outcome: &ArchiveOutcome,
    dry_run: bool,
    verbose: bool,
    color: bool,
) -> io::Result<()> {
    let heading = if dry_run { "[DRY RUN]" } else { "[DONE]" };
    writeln!(out)?;
    writeln!(out, "{}", label(heading, color))?;
    writeln!(out, "{} {}", label("  command:", color), outcome.cmd)?;
    writeln!(out, "{} {}", label("  prefix :", color), outcome.prefix)?;
    if !verbose {
        writeln!(out, "{}", label("  files  :", color))?;
        for file in &outcome.files {
            writeln!(out, "    {}", file.display())?;
        }
    }
    writeln!(out, "{}", label("  exclude:", color))?;
    for file in &outcome.exclude {
        writeln!(out, "    {}", file.display())?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn outcome() -> ArchiveOutcome {
        ArchiveOutcome {
            bytes: 0,
            output: "myproj-20240101000000.zip".to_string(),
            prefix: "myproj".to_string(),
            cmd: "git diff --name-only --diff-filter=ACDMRTUXB HEAD".to_string(),
            files: vec![PathBuf::from("/r/myproj/a.txt")],
            exclude: vec![PathBuf::from("/r/myproj/b.txt")],
        }
    }

    fn render(dry_run: bool, verbose: bool) -> String {
        let mut buf = Vec::new();
        write_summary(&mut buf, &outcome(), dry_run, verbose, false).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_dry_run_summary() {
        let text = render(true, false);
        assert!(text.contains("[DRY RUN]"));
        assert!(text.contains("git diff --name-only --diff-filter=ACDMRTUXB HEAD"));
        assert!(text.contains("files  :"));
        assert!(text.contains("    /r/myproj/a.txt"));
        assert!(text.contains("    /r/myproj/b.txt"));
    }

    #[test]
    fn test_verbose_summary_omits_file_list() {
        let text = render(false, true);
        assert!(text.contains("[DONE]"));
        assert!(!text.contains("files  :"));
        assert!(!text.contains("a.txt"));
        assert!(text.contains("    /r/myproj/b.txt"));
    }

    #[test]
    fn test_entry_line() {
        let mut buf = Vec::new();
        write_entry(
            &mut buf,
            &EntryEvent {
                index: 2,
                total: 5,
                name: "myproj/src/main.rs",
            },
            false,
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Entry (2/5):"));
        assert_eq!(text, "Entry (2/5): myproj/src/main.rs\n");
    }

    #[test]
    fn test_plain_output_has_no_escape_codes() {
        let text = render(true, false);
        assert!(!text.contains('\x1b'));
        assert!(text.contains("\n[DRY RUN]\n  command: git diff"));
    }
}
