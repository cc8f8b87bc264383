//! Member pass: resolves variable names inside identified files.
//!
//! Many variables share identical declared signatures, so this pass is
//! two-tier: exact signature matching first, then usage-context
//! narrowing over the access edges the cross-reference builder
//! attached. Only edges local to the declaring file participate.

use ir::{RenameTable, VarModel};
use loader::ProjectIndex;

use super::{commit, Pass};
use crate::matching::{resolved_counterpart, resolved_site, site_equals, var_signature_matches};

pub struct VariableNamePass;

impl Pass for VariableNamePass {
    fn name(&self) -> &'static str {
        "variable-name"
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
            for tv in &t.vars {
                if names.known(&tv.name).is_some() {
                    continue;
                }
                let by_signature: Vec<&VarModel> = r
                    .vars
                    .iter()
                    .filter(|rv| var_signature_matches(tv, rv, names))
                    .collect();
                match by_signature.len() {
                    0 => {}
                    1 => committed += commit(names, &tv.name, &by_signature[0].name),
                    _ => {
                        committed += narrow_by_access(tv, &by_signature, t, names);
                    }
                }
            }
        }
        committed
    }
}

/// Keeps the signature candidates whose reference edges cover every
/// resolved local edge of the target variable; commits on a unique
/// survivor. With no resolved local edges there is nothing to narrow
/// with and the ambiguity stands.
fn narrow_by_access(
    tv: &VarModel,
    candidates: &[&VarModel],
    t_file: &ir::FileModel,
    names: &mut RenameTable,
) -> usize {
    let local_edges: Vec<_> = tv
        .accessed_by
        .iter()
        .filter(|site| site.file == t_file.file_stem)
        .filter_map(|site| resolved_site(site, names))
        .collect();
    if local_edges.is_empty() {
        return 0;
    }
    let survivors: Vec<&&VarModel> = candidates
        .iter()
        .filter(|rv| {
            local_edges
                .iter()
                .all(|edge| rv.accessed_by.iter().any(|re| site_equals(re, edge)))
        })
        .collect();
    if survivors.len() == 1 {
        commit(names, &tv.name, &survivors[0].name)
    } else {
        0
    }
}
