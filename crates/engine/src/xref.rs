//! Resolves the raw member accesses collected at parse time into
//! accessed-by edges on the declarations they touch. Runs once per
//! tree, after every file of that tree has been parsed; the raw records
//! are drained afterwards.

use ir::AccessSite;
use loader::ProjectIndex;
use tracing::debug;

enum MemberKind {
    Var,
    Function,
}

struct PendingEdge {
    file: usize,
    kind: MemberKind,
    member: usize,
    site: AccessSite,
}

/// Walks every file's raw access log, resolves each dotted chain
/// through the index and appends an access edge to each declaration the
/// chain touches. Chains whose class is not in the tree are dropped;
/// resolution continues across files while the matched member is a
/// variable of an imported type.
pub fn link_accesses(index: &mut ProjectIndex) {
    let mut edges: Vec<PendingEdge> = Vec::new();
    let mut dropped = 0usize;

    for src_idx in 0..index.len() {
        let src = index.file(src_idx);
        for access in &src.accesses {
            let Some(mut file_idx) = index.lookup_qualified(&access.class_qualified) else {
                dropped += 1;
                continue;
            };
            let mut segments = access.path.iter().peekable();
            while let Some(segment) = segments.next() {
                let target = index.file(file_idx);
                let site = AccessSite {
                    package: src.package_name.clone(),
                    file: src.file_stem.clone(),
                    function: access.function.clone(),
                };
                if let Some(vi) = target.vars.iter().position(|v| v.name == *segment) {
                    edges.push(PendingEdge {
                        file: file_idx,
                        kind: MemberKind::Var,
                        member: vi,
                        site,
                    });
                    if segments.peek().is_none() {
                        break;
                    }
                    // chained member access: continue into the var's own
                    // class when that type is imported by the file we
                    // are looking at
                    let next = target
                        .import_for_short_name(&target.vars[vi].ty)
                        .and_then(|imp| index.lookup_qualified(&imp.qualified));
                    match next {
                        Some(idx) => file_idx = idx,
                        None => break,
                    }
                } else if let Some(fi) = target.functions.iter().position(|f| f.name == *segment) {
                    edges.push(PendingEdge {
                        file: file_idx,
                        kind: MemberKind::Function,
                        member: fi,
                        site,
                    });
                    // function results are opaque; the chain ends here
                    break;
                } else {
                    break;
                }
            }
        }
    }

    debug!(edges = edges.len(), dropped, "Access graph built");

    for edge in edges {
        let file = index.file_mut(edge.file);
        match edge.kind {
            MemberKind::Var => file.vars[edge.member].accessed_by.push(edge.site),
            MemberKind::Function => file.functions[edge.member].accessed_by.push(edge.site),
        }
    }
    for idx in 0..index.len() {
        index.file_mut(idx).accesses.clear();
    }
}
