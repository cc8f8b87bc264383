//! Marker pre-pass: before the resolution pipeline can parse the
//! obfuscated tree, every marker-delimited token is rewritten to a
//! stable sequential placeholder name. The `token → placeholder`
//! mappings go into the same rename table the passes later extend, so
//! the emitter can chain from the raw token all the way to the inferred
//! name.

use anyhow::{Context, Result};
use ir::RenameTable;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One cleaned source file, kept in memory: the core pipeline parses
/// these, while the emitter reads the original tree again.
#[derive(Debug, Clone)]
pub struct CleanedFile {
    pub rel_path: PathBuf,
    pub file_stem: String,
    pub content: String,
}

#[derive(Debug)]
pub struct Cleaner {
    marker: char,
    counter: usize,
}

impl Cleaner {
    pub fn new(marker: char) -> Self {
        Self { marker, counter: 0 }
    }

    fn placeholder_for(&mut self, token: &str, names: &mut RenameTable) -> String {
        if let Some(existing) = names.get(token) {
            return existing.to_string();
        }
        let fresh = format!("{}_{}", names.placeholder_stem(), self.counter);
        self.counter += 1;
        names.insert(token, fresh.clone());
        fresh
    }

    fn clean_line(&mut self, line: &str, names: &mut RenameTable) -> String {
        let mut out = String::with_capacity(line.len());
        let mut token = String::new();
        let mut inside = false;
        for ch in line.chars() {
            if ch == self.marker {
                if inside {
                    token.push(ch);
                    let placeholder = self.placeholder_for(&token, names);
                    out.push_str(&placeholder);
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

    /// Replaces every marker-delimited token with its placeholder,
    /// assigning fresh ones on first sight. The same token always gets
    /// the same placeholder, across files and across calls. Tokens do
    /// not span lines; an unpaired marker passes through untouched.
    pub fn clean_text(&mut self, text: &str, names: &mut RenameTable) -> String {
        text.split_inclusive('\n')
            .map(|line| self.clean_line(line, names))
            .collect()
    }

    /// Walks `root` and cleans every accepted source file, including
    /// its name stem. Nothing is written back to disk.
    pub fn clean_tree<F>(
        &mut self,
        root: &Path,
        excludes: &F,
        names: &mut RenameTable,
    ) -> Result<Vec<CleanedFile>>
    where
        F: Fn(&Path) -> bool,
    {
        let mut paths = Vec::new();
        loader::visit(root, excludes, &mut |p| {
            if parsers::detect_type(p).is_some() {
                paths.push(p.to_path_buf());
            }
            Ok(())
        })?;
        paths.sort();

        let mut cleaned = Vec::new();
        for path in paths {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let content = self.clean_text(&raw, names);
            let file_stem = self.clean_text(&stem, names);
            let file = CleanedFile {
                rel_path: path
                    .strip_prefix(root)
                    .expect("walked file under root")
                    .to_path_buf(),
                file_stem,
                content,
            };
            debug!(file = %path.display(), stem = %file.file_stem, "File cleaned");
            cleaned.push(file);
        }
        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_MARKER;

    #[test]
    fn distinct_tokens_get_sequential_placeholders() {
        let mut cleaner = Cleaner::new(DEFAULT_MARKER);
        let mut names = RenameTable::default();
        let out = cleaner.clean_text(
            "class \u{a7}a\u{a7} extends \u{a7}b\u{a7}",
            &mut names,
        );
        assert_eq!(out, "class deobfuscated_name_0 extends deobfuscated_name_1");
    }

    #[test]
    fn repeated_tokens_are_stable_across_calls() {
        let mut cleaner = Cleaner::new(DEFAULT_MARKER);
        let mut names = RenameTable::default();
        let first = cleaner.clean_text("var x:\u{a7}a\u{a7};", &mut names);
        let second = cleaner.clean_text("new \u{a7}a\u{a7}();", &mut names);
        assert_eq!(first, "var x:deobfuscated_name_0;");
        assert_eq!(second, "new deobfuscated_name_0();");
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn marker_free_text_is_untouched() {
        let mut cleaner = Cleaner::new(DEFAULT_MARKER);
        let mut names = RenameTable::default();
        let text = "package game\n{\n}\n";
        assert_eq!(cleaner.clean_text(text, &mut names), text);
        assert!(names.is_empty());
    }
}
