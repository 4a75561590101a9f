use regex::Regex;

use crate::error::{FetchError, FetchResult};

/// Regular-expression metacharacters that must be escaped when they appear
/// in a version rule. `*` is deliberately absent: it is the one character
/// with glob meaning.
const ESCAPED: &[char] = &[
    '\\', '.', '+', '?', '(', ')', '[', ']', '{', '}', '^', '$', '|',
];

/// A compiled version rule, reusable across every release of a reference.
///
/// Rules are restricted globs over tag names: `*` matches any run of
/// characters, everything else is literal, and the whole tag must match.
#[derive(Debug, Clone)]
pub struct VersionMatcher {
    rule: String,
    regex: Regex,
}

impl VersionMatcher {
    /// Compile a version rule. `""`, `"latest"` and `"LATEST"` all mean
    /// "any version".
    pub fn compile(rule: &str) -> FetchResult<Self> {
        let rule = match rule {
            "" | "latest" | "LATEST" => "*",
            other => other,
        }
        .to_owned();

        let regex = Regex::new(&rule_to_regex(&rule)).map_err(|e| {
            FetchError::Config(format!("failed to compile version rule {rule:?}: {e}"))
        })?;
        Ok(Self { rule, regex })
    }

    /// The normalized rule this matcher was compiled from.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }
}

/// Translate a version rule into an anchored regular expression.
///
/// Adjacent wildcards collapse into one `.*`, so a user-supplied `**`
/// behaves the same as `*`.
fn rule_to_regex(rule: &str) -> String {
    let mut out = String::with_capacity(rule.len() + 4);
    out.push('^');
    let mut prev_wildcard = false;
    for c in rule.chars() {
        if c == '*' {
            if !prev_wildcard {
                out.push_str(".*");
            }
            prev_wildcard = true;
            continue;
        }
        prev_wildcard = false;
        if ESCAPED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('$');
    out
}
