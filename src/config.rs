use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_DIFF_FILTER: &str = "ACDMRTUXB";
pub const DEFAULT_FORMAT: &str = "zip";
pub const DEFAULT_PREFIX: &str = "{dirname}";
pub const DEFAULT_OUTPUT: &str = "{dirname}-{datetime}.{format}";

/// Fully merged options for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Change types passed to `git diff --diff-filter`.
    pub diff_filter: String,
    /// Container format name; validated when the pipeline starts.
    pub format: String,
    /// Template for the directory every entry is stored under.
    pub prefix: String,
    /// Template for the archive path.
    pub output: String,
    pub verbose: bool,
    pub dry_run: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            diff_filter: DEFAULT_DIFF_FILTER.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            output: DEFAULT_OUTPUT.to_string(),
            verbose: false,
            dry_run: false,
        }
    }
}

/// A partial set of options, as read from the config file or the command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionOverrides {
    #[serde(default)]
    pub diff_filter: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub verbose: Option<bool>,
    #[serde(default)]
    pub dry_run: Option<bool>,
}

impl Options {
    /// Apply `overrides` on top of `self`; set fields win.
    pub fn merged(mut self, overrides: &OptionOverrides) -> Self {
        if let Some(ref v) = overrides.diff_filter {
            self.diff_filter = v.clone();
        }
        if let Some(ref v) = overrides.format {
            self.format = v.clone();
        }
        if let Some(ref v) = overrides.prefix {
            self.prefix = v.clone();
        }
        if let Some(ref v) = overrides.output {
            self.output = v.clone();
        }
        if let Some(v) = overrides.verbose {
            self.verbose = v;
        }
        if let Some(v) = overrides.dry_run {
            self.dry_run = v;
        }
        self
    }
}

fn config_path() -> PathBuf {
    let mut path = dirs_home().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("git-diff-archive");
    path.push("config.toml");
    path
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

pub fn parse_config(contents: &str) -> Result<OptionOverrides, toml::de::Error> {
    toml::from_str(contents)
}

/// Load `~/.config/git-diff-archive/config.toml`. A missing file yields no
/// overrides; an unreadable or malformed one is reported and ignored.
pub fn load_config() -> OptionOverrides {
    let path = config_path();

    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return OptionOverrides::default(),
        Err(e) => {
            log::warn!("could not read {}: {e}", path.display());
            return OptionOverrides::default();
        }
    };

    match parse_config(&contents) {
        Ok(overrides) => overrides,
        Err(e) => {
            log::warn!("ignoring malformed {}: {e}", path.display());
            OptionOverrides::default()
        }
    }
}
