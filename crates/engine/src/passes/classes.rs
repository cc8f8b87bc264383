//! File-level pass: matches whole target files against reference files
//! of equal import count and commits class, interface, package and file
//! names when exactly one reference candidate survives every filter.

use ir::{FileModel, RenameTable};
use loader::ProjectIndex;

use super::{commit, Pass};
use crate::matching::{
    class_matches, file_identity_resolved, function_matches, imports_match, interface_matches,
    var_signature_matches,
};

pub struct ClassPackagePass {
    pub line_tolerance: usize,
}

impl ClassPackagePass {
    fn file_matches(&self, t: &FileModel, r: &FileModel, names: &RenameTable) -> bool {
        if let Some(package) = names.known_dotted(&t.package_name) {
            if package != r.package_name {
                return false;
            }
        }
        if t.classes.len() != r.classes.len()
            || t.interfaces.len() != r.interfaces.len()
            || t.vars.len() != r.vars.len()
            || t.functions.len() != r.functions.len()
        {
            return false;
        }
        if !t
            .classes
            .iter()
            .zip(&r.classes)
            .all(|(tc, rc)| class_matches(tc, rc, names))
        {
            return false;
        }
        if !t
            .interfaces
            .iter()
            .zip(&r.interfaces)
            .all(|(ti, ri)| interface_matches(ti, ri, names))
        {
            return false;
        }
        if !imports_match(t, r, names) {
            return false;
        }
        // no reuse tracking: each target member independently needs some
        // satisfying reference member
        if !t
            .vars
            .iter()
            .all(|tv| r.vars.iter().any(|rv| var_signature_matches(tv, rv, names)))
        {
            return false;
        }
        t.functions.iter().all(|tf| {
            r.functions
                .iter()
                .any(|rf| function_matches(tf, rf, names, self.line_tolerance))
        })
    }
}

impl Pass for ClassPackagePass {
    fn name(&self) -> &'static str {
        "class-package"
    }

    fn run(
        &self,
        target: &ProjectIndex,
        reference: &ProjectIndex,
        names: &mut RenameTable,
    ) -> usize {
        let mut committed = 0;
        for t in target.files() {
            if file_identity_resolved(t, names) {
                continue;
            }
            let mut survivors = 0usize;
            let mut matched = None;
            for &r_idx in reference.bucket(t.imports.len()) {
                let r = reference.file(r_idx);
                if !self.file_matches(t, r, names) {
                    continue;
                }
                survivors += 1;
                if survivors > 1 {
                    break;
                }
                matched = Some(r);
            }
            if survivors == 1 {
                committed += commit_file_pair(t, matched.expect("single survivor"), names);
            }
        }
        committed
    }
}

/// Maps the identities of a uniquely matched file pair: classes and
/// interfaces by position, the package as a whole (plus per segment
/// when the segment counts line up) and the file stem.
fn commit_file_pair(t: &FileModel, r: &FileModel, names: &mut RenameTable) -> usize {
    let mut committed = 0;
    for (tc, rc) in t.classes.iter().zip(&r.classes) {
        committed += commit(names, &tc.name, &rc.name);
    }
    for (ti, ri) in t.interfaces.iter().zip(&r.interfaces) {
        committed += commit(names, &ti.name, &ri.name);
    }
    committed += commit(names, &t.package_name, &r.package_name);
    let t_segments: Vec<&str> = t.package_name.split('.').collect();
    let r_segments: Vec<&str> = r.package_name.split('.').collect();
    if t_segments.len() == r_segments.len() && t_segments.len() > 1 {
        for (ts, rs) in t_segments.into_iter().zip(r_segments) {
            committed += commit(names, ts, rs);
        }
    }
    committed += commit(names, &t.file_stem, &r.file_stem);
    committed
}
