//! Whole-file pass over import usage: two files that use an imported
//! class from the same resolved sites are talking about the same class,
//! even when nothing else about the imported file has been matched yet.

use ir::RenameTable;
use loader::ProjectIndex;
use std::collections::BTreeSet;

use super::{commit, Pass};
use crate::matching::{resolved_site, site_equals};

pub struct ImportMatchPass;

impl Pass for ImportMatchPass {
    fn name(&self) -> &'static str {
        "import-match"
    }

    fn run(
        &self,
        target: &ProjectIndex,
        reference: &ProjectIndex,
        names: &mut RenameTable,
    ) -> usize {
        let mut committed = 0;
        for t in target.files() {
            for imp in &t.imports {
                if names.known_dotted(&imp.qualified).is_some() {
                    continue;
                }
                let edges: Vec<_> = imp
                    .accessed_by
                    .iter()
                    .filter_map(|site| resolved_site(site, names))
                    .collect();
                // an import nobody resolved a use of would match every
                // reference import
                if edges.is_empty() {
                    continue;
                }
                let mut candidates: BTreeSet<&str> = BTreeSet::new();
                for rf in reference.files() {
                    for rimp in &rf.imports {
                        let covered = edges.iter().all(|edge| {
                            rimp.accessed_by.iter().any(|re| site_equals(re, edge))
                        });
                        if covered {
                            candidates.insert(rimp.qualified.as_str());
                        }
                    }
                }
                if candidates.len() != 1 {
                    continue;
                }
                let matched = candidates.into_iter().next().expect("single candidate");
                committed += commit_imported_file(&imp.qualified, matched, target, reference, names);
            }
        }
        committed
    }
}

/// A unique import match identifies the imported *file*: commit its
/// package, stem and, when the class counts agree, its class names by
/// position.
fn commit_imported_file(
    t_qualified: &str,
    r_qualified: &str,
    target: &ProjectIndex,
    reference: &ProjectIndex,
    names: &mut RenameTable,
) -> usize {
    let (Some(t_idx), Some(r_idx)) = (
        target.lookup_qualified(t_qualified),
        reference.lookup_qualified(r_qualified),
    ) else {
        // imported class lives outside the tree; nothing to pull in
        return 0;
    };
    let t = target.file(t_idx);
    let r = reference.file(r_idx);
    let mut committed = 0;
    committed += commit(names, &t.package_name, &r.package_name);
    committed += commit(names, &t.file_stem, &r.file_stem);
    if t.classes.len() == r.classes.len() {
        for (tc, rc) in t.classes.iter().zip(&r.classes) {
            committed += commit(names, &tc.name, &rc.name);
        }
    }
    committed
}
