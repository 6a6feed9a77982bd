use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use crate::archive::{build_archive, ArchiveFormat, ArchiveRequest, EntryEvent};
use crate::classify::{classify, Classification};
use crate::config::Options;
use crate::error::{ArchiveError, Result};
use crate::git::{GitCli, RevisionPair};
use crate::progress::Spinner;
use crate::report;
use crate::template::{random_token, render_template, TemplateContext};

/// Result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveOutcome {
    /// Size of the written archive; 0 for a dry run.
    pub bytes: u64,
    /// Rendered output path, as given (relative paths are against the working directory).
    pub output: String,
    /// Rendered entry prefix.
    pub prefix: String,
    /// The `git diff` command line that produced the file list.
    pub cmd: String,
    pub files: Vec<PathBuf>,
    pub exclude: Vec<PathBuf>,
}

/// Process-wide inputs captured once per invocation.
#[derive(Debug, Clone)]
pub struct Environment {
    pub cwd: PathBuf,
    pub now: DateTime<Local>,
    /// Shared by every template that uses `{random}`.
    pub random: String,
    /// Style the summary and progress lines.
    pub color: bool,
}

impl Environment {
    pub fn capture() -> Result<Self> {
        Ok(Self {
            cwd: std::env::current_dir()?,
            now: Local::now(),
            random: random_token(&mut rand::thread_rng()),
            color: io::stdout().is_terminal(),
        })
    }
}

/// Archive the files changed for `revisions`, from the current directory.
/// Summaries and progress go to stdout.
pub fn run(revisions: &RevisionPair, options: &Options) -> Result<ArchiveOutcome> {
    run_to(revisions, options, &mut io::stdout())
}

/// Like [`run`], but summaries and progress go to `out`.
pub fn run_to(
    revisions: &RevisionPair,
    options: &Options,
    out: &mut dyn Write,
) -> Result<ArchiveOutcome> {
    let env = Environment::capture()?;
    run_in(&env, revisions, options, out)
}

/// Run the pipeline against explicit ambient inputs, writing any summary or
/// per-entry progress to `out`.
pub fn run_in(
    env: &Environment,
    revisions: &RevisionPair,
    options: &Options,
    out: &mut dyn Write,
) -> Result<ArchiveOutcome> {
    let git = GitCli::locate(&env.cwd)?;
    let format: ArchiveFormat = options.format.parse()?;

    let root = git.toplevel()?;
    log::debug!("repository root {}, comparing {}", root.display(), revisions.label());
    let listing = git.diff_names(&options.diff_filter, revisions, &root)?;
    if listing.files.is_empty() {
        return Err(ArchiveError::NoDiffFiles);
    }

    let Classification { included, excluded } = classify(listing.files);

    let ctx = TemplateContext::new(&env.now, &root, &env.random, format.as_str());
    let output = render_template(&options.output, &ctx);
    let prefix = render_template(&options.prefix, &ctx);
    log::debug!("output {output}, prefix {prefix}");

    if included.is_empty() {
        return Err(ArchiveError::NoDiffFiles);
    }

    let mut spinner = (!options.verbose).then(|| Spinner::start("processing..."));

    let output_path = env.cwd.join(&output);
    let request = ArchiveRequest {
        files: &included,
        root: &root,
        format,
        output: &output_path,
        prefix: &prefix,
        dry_run: options.dry_run,
    };
    let bytes = {
        let verbose = options.verbose;
        let color = env.color;
        let mut on_entry = |event: EntryEvent<'_>| {
            if verbose {
                if let Err(e) = report::write_entry(&mut *out, &event, color) {
                    log::warn!("could not print progress: {e}");
                }
            }
        };
        build_archive(&request, &mut on_entry)?
    };

    if let Some(spinner) = spinner.as_mut() {
        spinner.stop();
    }

    let outcome = ArchiveOutcome {
        bytes,
        output,
        prefix,
        cmd: listing.command,
        files: included,
        exclude: excluded,
    };

    if options.dry_run || options.verbose {
        if let Err(e) = report::write_summary(
            out,
            &outcome,
            options.dry_run,
            options.verbose,
            env.color,
        ) {
            log::warn!("could not print summary: {e}");
        }
    }

    Ok(outcome)
}
