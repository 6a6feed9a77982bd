/// Which two states of the repository are compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionPair {
    /// Working tree against the last commit.
    HeadVsWorkdir,
    /// A revision against the working tree.
    Single(String),
    /// Two revisions against each other.
    Range(String, String),
}

impl RevisionPair {
    /// Map the `[FROM] [TO]` argument shapes onto a comparison.
    /// A `to` without a `from` is treated as a single revision.
    pub fn from_args(from: Option<&str>, to: Option<&str>) -> Self {
        match (from, to) {
            (Some(from), Some(to)) => RevisionPair::Range(from.to_string(), to.to_string()),
            (Some(rev), None) | (None, Some(rev)) => RevisionPair::Single(rev.to_string()),
            (None, None) => RevisionPair::HeadVsWorkdir,
        }
    }

    /// Revision arguments passed to `git diff`.
    pub fn args(&self) -> Vec<&str> {
        match self {
            RevisionPair::HeadVsWorkdir => vec!["HEAD"],
            RevisionPair::Single(rev) => vec![rev.as_str()],
            RevisionPair::Range(from, to) => vec![from.as_str(), to.as_str()],
        }
    }

    pub fn label(&self) -> String {
        match self {
            RevisionPair::HeadVsWorkdir => "HEAD..working tree".to_string(),
            RevisionPair::Single(rev) => format!("{rev}..working tree"),
            RevisionPair::Range(from, to) => format!("{from}..{to}"),
        }
    }
}
