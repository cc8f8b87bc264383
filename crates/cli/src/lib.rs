//! Common utilities for the command line interface.
use regex::Regex;
use std::path::Path;

pub mod args;
pub mod config;
pub mod inspect;
pub mod output;
pub mod run;
pub mod ui;

/// Converts a basic glob pattern to a regular expression.
///
/// # Example
///
/// ```
/// use demask::glob_to_regex;
/// let re = glob_to_regex("src/*.as").unwrap();
/// assert!(re.is_match("src/Tank.as"));
/// ```
pub fn glob_to_regex(pat: &str) -> Result<Regex, regex::Error> {
    if pat.contains('[') || pat.contains(']') {
        // character classes are not supported
        return Regex::new("[");
    }
    let mut regex = String::from("^");
    let mut chars = pat.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    regex.push_str(".*");
                } else {
                    regex.push_str("[^/]*");
                }
            }
            '?' => regex.push('.'),
            '.' => regex.push_str("\\."),
            '/' => regex.push('/'),
            '(' | ')' | '+' | '|' | '^' | '$' | '{' | '}' | '\\' => {
                regex.push('\\');
                regex.push(c);
            }
            _ => regex.push(c),
        }
    }
    regex.push('$');
    Regex::new(&regex)
}

/// Transforms a glob-style exclusion string into [`Regex`].
/// Accepts trailing slashes and expands them to `**`.
///
/// # Example
///
/// ```
/// use demask::parse_exclude;
/// let re = parse_exclude("build/").unwrap();
/// assert!(re.is_match("build/generated/Main.as"));
/// ```
pub fn parse_exclude(s: &str) -> Result<Regex, String> {
    let glob_str = if s.ends_with('/') {
        format!("{s}**")
    } else {
        s.to_string()
    };
    glob_to_regex(&glob_str).map_err(|e| e.to_string())
}

/// Default exclusion patterns.
pub fn default_excludes() -> Vec<Regex> {
    vec![parse_exclude("**/.git/**").expect("valid default")]
}

/// Indicates whether a path should be omitted according to patterns.
/// Separators are normalised to support Windows and Unix.
pub fn is_excluded(path: &Path, patterns: &[Regex]) -> bool {
    let path_str = path.to_string_lossy().replace('\\', "/");
    patterns.iter().any(|re| re.is_match(&path_str))
}
