//! Token-level helpers: per-line keyword classification and the
//! character scan that pulls dotted identifier chains out of words.

use ir::Visibility;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Package,
    Import,
    Class,
    Interface,
    Var,
    Function,
}

/// Classifies a tokenized line by its first declaration keyword.
/// Returns the kind together with the keyword's token index.
pub(crate) fn classify(toks: &[&str]) -> Option<(LineKind, usize)> {
    for (i, tok) in toks.iter().enumerate() {
        let kind = match *tok {
            "package" => LineKind::Package,
            "import" => LineKind::Import,
            "class" => LineKind::Class,
            "interface" => LineKind::Interface,
            "var" => LineKind::Var,
            "function" => LineKind::Function,
            _ => continue,
        };
        return Some((kind, i));
    }
    None
}

/// Leading visibility modifier, defaulting to public when the first
/// token is not one.
pub(crate) fn visibility_of(toks: &[&str]) -> Visibility {
    toks.first()
        .and_then(|t| t.parse().ok())
        .unwrap_or_default()
}

pub(crate) fn has_static(toks: &[&str]) -> bool {
    toks.contains(&"static")
}

/// Extracts a period-delimited identifier chain from the front of a
/// word: identifier characters and `.` are accepted, the first other
/// character terminates the chain. Chains need at least two whole
/// segments to be useful; anything shorter or with an empty segment is
/// discarded.
pub(crate) fn extract_chain(word: &str) -> Option<Vec<String>> {
    let mut prefix = String::new();
    for ch in word.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == '.' {
            prefix.push(ch);
        } else {
            break;
        }
    }
    let segments: Vec<&str> = prefix.split('.').collect();
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments.into_iter().map(str::to_string).collect())
}
