use clap::Parser;

use git_diff_archive::config::OptionOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "git-diff-archive",
    version,
    about = "Archive the files changed between git revisions"
)]
pub struct Cli {
    /// Revision to compare (against the working tree when TO is omitted)
    pub from: Option<String>,

    /// Second revision to compare FROM against
    pub to: Option<String>,

    /// Change types to include, as accepted by `git diff --diff-filter`
    #[arg(long, value_name = "FILTER")]
    pub diff_filter: Option<String>,

    /// Archive format (zip or tar)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Directory every entry is stored under; supports {tokens}
    #[arg(short, long, value_name = "TEMPLATE")]
    pub prefix: Option<String>,

    /// Output path; supports {date} {time} {datetime} {dirname} {random} {format}
    #[arg(short, long, value_name = "TEMPLATE")]
    pub output: Option<String>,

    /// Print every entry as it is written
    #[arg(short, long)]
    pub verbose: bool,

    /// Report what would be archived without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Options given on the command line; unset flags leave lower layers alone.
    pub fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            diff_filter: self.diff_filter.clone(),
            format: self.format.clone(),
            prefix: self.prefix.clone(),
            output: self.output.clone(),
            verbose: self.verbose.then_some(true),
            dry_run: self.dry_run.then_some(true),
        }
    }
}
