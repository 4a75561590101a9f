//! Attachment include/exclude filtering.
//!
//! File rules are newline- or comma-separated lists of filesystem globs
//! (`*`, `?`, `[...]`). Patterns are matched per attachment name; a pattern
//! that fails to compile simply never matches.

use globset::Glob;

/// Split a raw rule string into individual glob patterns, trimming
/// whitespace and a single layer of matching quote characters.
pub fn split_rules(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(unquote)
        .filter(|s| !s.is_empty())
        .collect()
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    let s = strip_quotes(s, '\'')
        .or_else(|| strip_quotes(s, '"'))
        .unwrap_or(s);
    s.trim().to_owned()
}

fn strip_quotes(s: &str, quote: char) -> Option<&str> {
    s.strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
}

/// An attachment is selected iff its name matches at least one include
/// pattern and no exclude pattern.
pub fn selects(name: &str, includes: &[String], excludes: &[String]) -> bool {
    includes.iter().any(|p| glob_match(p, name)) && !excludes.iter().any(|p| glob_match(p, name))
}

fn glob_match(pattern: &str, name: &str) -> bool {
    match Glob::new(pattern) {
        Ok(glob) => glob.compile_matcher().is_match(name),
        Err(_) => false,
    }
}
