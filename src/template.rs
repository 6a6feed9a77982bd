use chrono::{DateTime, Local};
use rand::Rng;
use std::path::Path;

const RANDOM_LEN: usize = 8;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Context variables available for path template substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    pub date: String,
    pub time: String,
    pub dirname: String,
    pub random: String,
    pub format: String,
}

impl TemplateContext {
    /// Build the context for one invocation. `random` is reused for every
    /// template rendered with this context.
    pub fn new(now: &DateTime<Local>, repo_root: &Path, random: &str, format: &str) -> Self {
        Self {
            date: now.format("%Y%m%d").to_string(),
            time: now.format("%H%M%S").to_string(),
            dirname: repo_root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            random: random.to_string(),
            format: format.to_string(),
        }
    }

    fn lookup(&self, token: &str) -> Option<String> {
        match token {
            "date" => Some(self.date.clone()),
            "time" => Some(self.time.clone()),
            "datetime" => Some(format!("{}{}", self.date, self.time)),
            "dirname" => Some(self.dirname.clone()),
            "random" => Some(self.random.clone()),
            "format" => Some(self.format.clone()),
            _ => None,
        }
    }
}

/// Render a template string by substituting `{token}` placeholders.
///
/// Only the tokens known to [`TemplateContext`] are replaced. Anything else
/// in braces, and unbalanced braces, is copied through unchanged. A doubled
/// `{{name}}` is an escape and renders as the literal `{name}`. Substituted
/// values are never rescanned.
pub fn render_template(template: &str, ctx: &TemplateContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        if let Some((escaped, len)) = escaped_name(&rest[open..]) {
            out.push('{');
            out.push_str(escaped);
            out.push('}');
            rest = &rest[open + len..];
            continue;
        }
        let after = &rest[open + 1..];
        // A nested '{' restarts the scan so "{{date}" keeps its first brace
        let close = after.find(['}', '{']);
        match close {
            Some(end) if after.as_bytes()[end] == b'}' => {
                let name = &after[..end];
                match ctx.lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            Some(end) => {
                out.push('{');
                out.push_str(&after[..end]);
                rest = &after[end..];
            }
            None => {
                out.push('{');
                out.push_str(after);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Match `{{name}}` at the start of `s`, returning `name` and the match length.
fn escaped_name(s: &str) -> Option<(&str, usize)> {
    let inner = s.strip_prefix("{{")?;
    let end = inner.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))?;
    if end == 0 || !inner[end..].starts_with("}}") {
        return None;
    }
    Some((&inner[..end], end + 4))
}

/// Generate the 8 character lowercase base-36 value used for `{random}`.
pub fn random_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..RANDOM_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}
