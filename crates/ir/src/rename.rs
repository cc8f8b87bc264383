//! The accumulated old-name → new-name mapping, the pipeline's one
//! piece of state that persists across passes.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Stem the marker pre-pass builds placeholder names from
/// (`deobfuscated_name_0`, `deobfuscated_name_1`, ...).
pub const DEFAULT_PLACEHOLDER_STEM: &str = "deobfuscated_name";

/// Result of proposing a mapping. A key that is already mapped to a
/// different value is never overwritten; the disagreement is counted
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Inserted,
    AlreadyMapped,
    Conflict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameTable {
    map: HashMap<String, String>,
    placeholder_stem: String,
    #[serde(default)]
    conflicts: usize,
}

impl Default for RenameTable {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_STEM)
    }
}

impl RenameTable {
    pub fn new(placeholder_stem: impl Into<String>) -> Self {
        Self {
            map: HashMap::new(),
            placeholder_stem: placeholder_stem.into(),
            conflicts: 0,
        }
    }

    /// Whether `text` still carries a not-yet-resolved placeholder name.
    /// Dotted names count as placeholders while any segment does.
    pub fn is_placeholder(&self, text: &str) -> bool {
        text.contains(&self.placeholder_stem)
    }

    /// Mapped name, or `name` itself when no mapping exists.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.map.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Resolves a dotted name. A mapping for the whole string wins
    /// (package names are committed whole); otherwise every segment is
    /// resolved on its own.
    ///
    /// # Example
    /// ```
    /// use ir::RenameTable;
    /// let mut t = RenameTable::default();
    /// t.insert("deobfuscated_name_0", "tanks");
    /// assert_eq!(t.resolve_dotted("com.deobfuscated_name_0.ui"), "com.tanks.ui");
    /// ```
    pub fn resolve_dotted(&self, dotted: &str) -> String {
        if let Some(whole) = self.map.get(dotted) {
            return whole.clone();
        }
        dotted
            .split('.')
            .map(|seg| self.resolve(seg))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Follows mappings transitively, so a markered token cleaned to a
    /// placeholder and later resolved collapses to the final name.
    /// Stops on the first repeated name if the table ever cycles.
    pub fn resolve_chain<'a>(&'a self, name: &'a str) -> &'a str {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = name;
        while let Some(next) = self.map.get(current) {
            if !seen.insert(current) {
                break;
            }
            current = next;
        }
        current
    }

    /// The resolved value of `name` when it no longer looks like a
    /// placeholder; `None` while it does (wildcard for matching).
    pub fn known<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        let resolved = self.resolve(name);
        (!self.is_placeholder(resolved)).then_some(resolved)
    }

    /// Segment-wise variant of [`RenameTable::known`] for dotted names.
    pub fn known_dotted(&self, dotted: &str) -> Option<String> {
        let resolved = self.resolve_dotted(dotted);
        (!self.is_placeholder(&resolved)).then_some(resolved)
    }

    /// First write wins: a key, once mapped, is treated as resolved by
    /// every later lookup. A later disagreeing proposal is dropped and
    /// counted as a conflict.
    pub fn insert(
        &mut self,
        old: impl Into<String>,
        new: impl Into<String>,
    ) -> RenameOutcome {
        let old = old.into();
        let new = new.into();
        match self.map.get(&old) {
            Some(existing) if *existing == new => RenameOutcome::AlreadyMapped,
            Some(_) => {
                self.conflicts += 1;
                RenameOutcome::Conflict
            }
            None => {
                self.map.insert(old, new);
                RenameOutcome::Inserted
            }
        }
    }

    pub fn get(&self, old: &str) -> Option<&str> {
        self.map.get(old).map(String::as_str)
    }

    pub fn mappings(&self) -> &HashMap<String, String> {
        &self.map
    }

    pub fn placeholder_stem(&self) -> &str {
        &self.placeholder_stem
    }

    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
