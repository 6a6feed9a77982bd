mod cli;

use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};

use git_diff_archive::{config, pipeline, Options, RevisionPair};

use crate::cli::Cli;

fn main() -> Result<()> {
    color_eyre::install().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Defaults, then config file, then CLI flags
    let options = Options::default()
        .merged(&config::load_config())
        .merged(&cli.overrides());
    let revisions = RevisionPair::from_args(cli.from.as_deref(), cli.to.as_deref());

    // Keep stdout pure JSON when it was asked for
    let mut sink = io::sink();
    let mut stdout = io::stdout();
    let progress: &mut dyn Write = if cli.json { &mut sink } else { &mut stdout };

    let outcome = match pipeline::run_to(&revisions, &options, progress) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("git-diff-archive: {e}");
            std::process::exit(1);
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if !options.dry_run {
        println!("{} ({} bytes)", outcome.output, outcome.bytes);
    }

    Ok(())
}
