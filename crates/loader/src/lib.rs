//! Loads a source tree into a [`ProjectIndex`]: walks the directory,
//! parses every accepted file and indexes the resulting models for the
//! lookups the resolution passes need.

use anyhow::Result;
use ir::FileModel;
use parsers::ParseError;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

mod walk;
pub use walk::visit;

#[derive(Debug, Default, Serialize)]
pub struct LoadStats {
    pub files_seen: usize,
    pub files_parsed: usize,
    pub files_skipped: usize,
}

/// All parsed files of one tree, addressable by index, by qualified
/// class name and by import count.
///
/// Models never reference each other directly; every cross-file link is
/// a qualified-name key resolved back through this index, so cyclic
/// import graphs cost nothing.
#[derive(Debug, Default)]
pub struct ProjectIndex {
    files: Vec<FileModel>,
    by_qualified: HashMap<String, usize>,
    by_import_count: HashMap<usize, Vec<usize>>,
}

impl ProjectIndex {
    /// Indexes parsed models. Files are sorted by package and stem
    /// first so that iteration order (and with it pass order) does not
    /// depend on directory visitation order.
    ///
    /// Qualified names key on the *first* class of a file; a second
    /// class in the same file still matches positionally but is not
    /// addressable on its own.
    pub fn from_files(mut files: Vec<FileModel>) -> Self {
        files.sort_by(|a, b| {
            (a.package_name.as_str(), a.file_stem.as_str())
                .cmp(&(b.package_name.as_str(), b.file_stem.as_str()))
        });
        let mut by_qualified = HashMap::new();
        let mut by_import_count: HashMap<usize, Vec<usize>> = HashMap::new();
        for (idx, file) in files.iter().enumerate() {
            if let Some(q) = file.qualified_name() {
                if by_qualified.insert(q.clone(), idx).is_some() {
                    warn!(qualified = %q, "Duplicate qualified class name; keeping the last");
                }
            }
            by_import_count.entry(file.imports.len()).or_default().push(idx);
        }
        Self {
            files,
            by_qualified,
            by_import_count,
        }
    }

    pub fn files(&self) -> &[FileModel] {
        &self.files
    }

    pub fn file(&self, idx: usize) -> &FileModel {
        &self.files[idx]
    }

    pub fn file_mut(&mut self, idx: usize) -> &mut FileModel {
        &mut self.files[idx]
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Index of the file whose `package.FirstClass` equals `qualified`.
    pub fn lookup_qualified(&self, qualified: &str) -> Option<usize> {
        self.by_qualified.get(qualified).copied()
    }

    /// Indices of every file with exactly `count` imports.
    pub fn bucket(&self, count: usize) -> &[usize] {
        self.by_import_count
            .get(&count)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Walks `root`, parses every accepted source file and indexes the
/// results. Files that fail to parse are skipped with a warning; I/O
/// failures abort the load at the offending file.
pub fn load_tree<F>(root: &Path, excludes: &F, stats: &mut LoadStats) -> Result<ProjectIndex>
where
    F: Fn(&Path) -> bool,
{
    let mut paths = Vec::new();
    visit(root, excludes, &mut |p| {
        if parsers::detect_type(p).is_some() {
            paths.push(p.to_path_buf());
        }
        Ok(())
    })?;
    paths.sort();
    stats.files_seen = paths.len();
    debug!(root = %root.display(), files = paths.len(), "Source files collected");

    let parsed: Vec<_> = paths
        .par_iter()
        .map(|p| (p, parsers::parse_file(p, None)))
        .collect();

    let mut models = Vec::new();
    for (path, result) in parsed {
        match result {
            Ok(Some(model)) => {
                stats.files_parsed += 1;
                models.push(model);
            }
            Ok(None) => {}
            Err(e) if e.downcast_ref::<ParseError>().is_some() => {
                stats.files_skipped += 1;
                warn!(file = %path.display(), error = %e, "Skipping unparsable file");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(ProjectIndex::from_files(models))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn class_file(package: &str, class: &str, imports: &[&str]) -> String {
        let mut src = format!("package {package}\n{{\n");
        for i in imports {
            src.push_str(&format!("    import {i};\n"));
        }
        src.push_str(&format!("    public class {class}\n    {{\n    }}\n}}\n"));
        src
    }

    #[test]
    fn indexes_by_qualified_name_and_import_count() {
        let a = parsers::parse_source(&class_file("game", "Tank", &["a.B"]), "Tank").unwrap();
        let b = parsers::parse_source(&class_file("game", "Mine", &[]), "Mine").unwrap();
        let index = ProjectIndex::from_files(vec![a, b]);

        let tank = index.lookup_qualified("game.Tank").unwrap();
        assert_eq!(index.file(tank).file_stem, "Tank");
        assert!(index.lookup_qualified("game.Nope").is_none());
        assert_eq!(index.bucket(1), &[tank]);
        assert_eq!(index.bucket(0).len(), 1);
        assert!(index.bucket(7).is_empty());
    }

    #[test]
    fn file_order_is_stable_regardless_of_input_order() {
        let a = parsers::parse_source(&class_file("p", "A", &[]), "A").unwrap();
        let b = parsers::parse_source(&class_file("p", "B", &[]), "B").unwrap();
        let fwd = ProjectIndex::from_files(vec![a.clone(), b.clone()]);
        let rev = ProjectIndex::from_files(vec![b, a]);
        let stems =
            |ix: &ProjectIndex| ix.files().iter().map(|f| f.file_stem.clone()).collect::<Vec<_>>();
        assert_eq!(stems(&fwd), stems(&rev));
    }

    #[test]
    fn load_tree_skips_unparsable_files() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path();
        fs::create_dir_all(base.join("game")).unwrap();
        fs::write(base.join("game/Tank.as"), class_file("game", "Tank", &[])).unwrap();
        fs::write(base.join("game/Broken.as"), "public var broken;\n").unwrap();
        fs::write(base.join("game/notes.txt"), "not a source file").unwrap();

        let mut stats = LoadStats::default();
        let index = load_tree(base, &|_: &Path| false, &mut stats).unwrap();

        assert_eq!(stats.files_seen, 2);
        assert_eq!(stats.files_parsed, 1);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(index.len(), 1);
        assert!(index.lookup_qualified("game.Tank").is_some());
    }
}
