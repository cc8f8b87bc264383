//! Output stage: rewrites the obfuscated tree through the rename table.
//!
//! Obfuscated tokens sit between paired marker characters
//! (`§token§`); the bracketed text, markers included, is the rename
//! table key. Tokens with a mapping are substituted (following chained
//! mappings, so a token cleaned to a placeholder and later resolved
//! collapses to its final name); tokens without one lose their markers
//! and keep their inner text. Output package paths are recomputed from
//! the renamed directory segments.

use anyhow::{Context, Result};
use ir::RenameTable;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod clean;

pub use clean::{CleanedFile, Cleaner};

/// Marker character used by the obfuscator this tool grew up against.
pub const DEFAULT_MARKER: char = '\u{a7}';

#[derive(Debug, Clone, Copy)]
pub struct EmitOptions {
    pub marker: char,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct EmitStats {
    pub files_written: usize,
    /// Tokens rewritten to a resolved name.
    pub tokens_replaced: usize,
    /// Tokens still mapped only to a placeholder.
    pub tokens_kept_placeholder: usize,
    /// Tokens with no mapping at all; markers stripped, text kept.
    pub tokens_stripped: usize,
}

fn substitute(token: &str, names: &RenameTable, marker: char, stats: &mut EmitStats) -> String {
    let resolved = names.resolve_chain(token);
    if resolved != token {
        if names.is_placeholder(resolved) {
            stats.tokens_kept_placeholder += 1;
        } else {
            stats.tokens_replaced += 1;
        }
        return resolved.to_string();
    }
    stats.tokens_stripped += 1;
    token.trim_matches(marker).to_string()
}

/// Rewrites one line. Consecutive marker occurrences bracket one token;
/// multiple tokens on a line are processed left to right and every
/// occurrence is substituted independently. An unpaired trailing marker
/// passes through untouched.
pub fn rewrite_line(
    line: &str,
    names: &RenameTable,
    marker: char,
    stats: &mut EmitStats,
) -> String {
    let mut out = String::with_capacity(line.len());
    let mut token = String::new();
    let mut inside = false;
    for ch in line.chars() {
        if ch == marker {
            if inside {
                token.push(ch);
                out.push_str(&substitute(&token, names, marker, stats));
                token.clear();
                inside = false;
            } else {
                inside = true;
                token.clear();
                token.push(ch);
            }
            continue;
        }
        if inside {
            token.push(ch);
        } else {
            out.push(ch);
        }
    }
    if inside {
        out.push_str(&token);
    }
    out
}

/// Output-relative path for a target file: directory segments resolve
/// through the table individually, the dot-joined result gets one more
/// whole-candidate lookup (package names are committed whole), and the
/// file stem resolves the same way as any token.
fn remap_rel_path(rel: &Path, names: &RenameTable, marker: char) -> PathBuf {
    let resolve_segment = |seg: &str| {
        let resolved = names.resolve_chain(seg);
        if resolved == seg && seg.contains(marker) {
            seg.replace(marker, "")
        } else {
            resolved.to_string()
        }
    };

    let mut out = PathBuf::new();
    if let Some(parent) = rel.parent() {
        let segments: Vec<String> = parent
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(os) => {
                    Some(resolve_segment(&os.to_string_lossy()))
                }
                _ => None,
            })
            .collect();
        if !segments.is_empty() {
            let candidate = segments.join(".");
            for dir in names.resolve_chain(&candidate).split('.') {
                out.push(dir);
            }
        }
    }

    let stem = rel
        .file_stem()
        .map(|s| resolve_segment(&s.to_string_lossy()))
        .unwrap_or_default();
    let name = match rel.extension() {
        Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
        None => stem,
    };
    out.push(name);
    out
}

/// Rewrites every accepted source file under `target_root` into
/// `out_root`. Each file is fully rewritten before the next; output
/// directories are created as needed.
pub fn emit_tree<F>(
    target_root: &Path,
    out_root: &Path,
    names: &RenameTable,
    opts: &EmitOptions,
    excludes: &F,
) -> Result<EmitStats>
where
    F: Fn(&Path) -> bool,
{
    let mut stats = EmitStats::default();
    let mut files = Vec::new();
    loader::visit(target_root, excludes, &mut |p| {
        if parsers::detect_type(p).is_some() {
            files.push(p.to_path_buf());
        }
        Ok(())
    })?;
    files.sort();

    for path in files {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let rewritten: String = content
            .split_inclusive('\n')
            .map(|line| rewrite_line(line, names, opts.marker, &mut stats))
            .collect();

        let rel = path
            .strip_prefix(target_root)
            .expect("walked file under root");
        let out_path = out_root.join(remap_rel_path(rel, names, opts.marker));
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&out_path, rewritten)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        debug!(from = %path.display(), to = %out_path.display(), "File rewritten");
        stats.files_written += 1;
    }

    info!(
        files = stats.files_written,
        replaced = stats.tokens_replaced,
        stripped = stats.tokens_stripped,
        "Emit finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RenameTable {
        let mut names = RenameTable::default();
        names.insert("\u{a7}x7\u{a7}", "deobfuscated_name_0");
        names.insert("deobfuscated_name_0", "Widget");
        names.insert("\u{a7}q2\u{a7}", "deobfuscated_name_1");
        names
    }

    #[test]
    fn mapped_tokens_follow_the_chain() {
        let mut stats = EmitStats::default();
        let out = rewrite_line(
            "var a:\u{a7}x7\u{a7} = new \u{a7}x7\u{a7}();",
            &table(),
            DEFAULT_MARKER,
            &mut stats,
        );
        assert_eq!(out, "var a:Widget = new Widget();");
        assert_eq!(stats.tokens_replaced, 2);
    }

    #[test]
    fn unresolved_tokens_keep_their_placeholder() {
        let mut stats = EmitStats::default();
        let out = rewrite_line("\u{a7}q2\u{a7}.run();", &table(), DEFAULT_MARKER, &mut stats);
        assert_eq!(out, "deobfuscated_name_1.run();");
        assert_eq!(stats.tokens_kept_placeholder, 1);
    }

    #[test]
    fn unmapped_tokens_are_stripped() {
        let mut stats = EmitStats::default();
        let out = rewrite_line("call(\u{a7}zz\u{a7});", &table(), DEFAULT_MARKER, &mut stats);
        assert_eq!(out, "call(zz);");
        assert_eq!(stats.tokens_stripped, 1);
    }

    #[test]
    fn rewriting_marker_free_text_is_identity() {
        let mut stats = EmitStats::default();
        let line = "public class Widget extends Sprite";
        assert_eq!(
            rewrite_line(line, &table(), DEFAULT_MARKER, &mut stats),
            line
        );
        assert_eq!(stats.tokens_replaced, 0);
        assert_eq!(stats.tokens_stripped, 0);
    }

    #[test]
    fn unpaired_marker_passes_through() {
        let mut stats = EmitStats::default();
        let out = rewrite_line("broken \u{a7}tail", &table(), DEFAULT_MARKER, &mut stats);
        assert_eq!(out, "broken \u{a7}tail");
    }

    #[test]
    fn path_remap_resolves_segments_then_whole_package() {
        let mut names = RenameTable::default();
        names.insert("\u{a7}a\u{a7}", "deobfuscated_name_0");
        names.insert("\u{a7}b\u{a7}", "deobfuscated_name_1");
        names.insert(
            "deobfuscated_name_0.deobfuscated_name_1",
            "com.tanks",
        );
        names.insert("\u{a7}f\u{a7}", "deobfuscated_name_2");
        names.insert("deobfuscated_name_2", "Tank");

        let rel = Path::new("\u{a7}a\u{a7}/\u{a7}b\u{a7}/\u{a7}f\u{a7}.as");
        let out = remap_rel_path(rel, &names, DEFAULT_MARKER);
        assert_eq!(out, Path::new("com/tanks/Tank.as"));
    }

    #[test]
    fn unmapped_path_segments_lose_their_markers() {
        let names = RenameTable::default();
        let rel = Path::new("\u{a7}a\u{a7}/Main.as");
        let out = remap_rel_path(rel, &names, DEFAULT_MARKER);
        assert_eq!(out, Path::new("a/Main.as"));
    }
}
