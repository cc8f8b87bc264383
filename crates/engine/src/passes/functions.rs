//! Member pass: resolves function names inside files whose own identity
//! the class/package pass already pinned down.

use ir::RenameTable;
use loader::ProjectIndex;

use super::{commit, Pass};
use crate::matching::{params_match, resolved_counterpart};

pub struct FunctionNamePass {
    /// When set, candidate functions must agree on the exact body line
    /// count instead of the file-level tolerance.
    pub strict_lines: bool,
}

impl Pass for FunctionNamePass {
    fn name(&self) -> &'static str {
        "function-name"
    }

    fn run(
        &self,
        target: &ProjectIndex,
        reference: &ProjectIndex,
        names: &mut RenameTable,
    ) -> usize {
        let mut committed = 0;
        for t in target.files() {
            let Some(r_idx) = resolved_counterpart(t, reference, names) else {
                continue;
            };
            let r = reference.file(r_idx);
            for tf in &t.functions {
                if names.known(&tf.name).is_some() {
                    continue;
                }
                let mut survivors = 0usize;
                let mut matched = None;
                for rf in &r.functions {
                    if tf.visibility != rf.visibility || tf.is_static != rf.is_static {
                        continue;
                    }
                    if let Some(ret) = names.known(&tf.return_type) {
                        if ret != rf.return_type {
                            continue;
                        }
                    }
                    if !params_match(tf, rf, names) {
                        continue;
                    }
                    if self.strict_lines && tf.body_lines != rf.body_lines {
                        continue;
                    }
                    survivors += 1;
                    if survivors > 1 {
                        break;
                    }
                    matched = Some(rf);
                }
                if survivors == 1 {
                    committed += commit(names, &tf.name, &matched.expect("single survivor").name);
                }
            }
        }
        committed
    }
}
