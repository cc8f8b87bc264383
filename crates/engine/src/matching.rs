//! Signature comparisons shared by the passes.
//!
//! Every comparison follows the same acceptance rule: a field counts
//! only when its value, substituted through the current rename table,
//! no longer looks like a placeholder; otherwise the field is a
//! wildcard. This lets a pass match on partial information and tighten
//! on later rounds.

use ir::{AccessSite, ClassModel, FileModel, FunctionModel, InterfaceModel, RenameTable, VarModel};

pub(crate) fn class_matches(t: &ClassModel, r: &ClassModel, names: &RenameTable) -> bool {
    if t.visibility != r.visibility {
        return false;
    }
    if let Some(n) = names.known(&t.name) {
        if n != r.name {
            return false;
        }
    }
    if t.implements.len() != r.implements.len() {
        return false;
    }
    for (ti, ri) in t.implements.iter().zip(&r.implements) {
        if let Some(n) = names.known(ti) {
            if n != ri.as_str() {
                return false;
            }
        }
    }
    if t.extends.is_empty() != r.extends.is_empty() {
        return false;
    }
    if let Some(n) = names.known(&t.extends) {
        if n != r.extends {
            return false;
        }
    }
    true
}

pub(crate) fn interface_matches(t: &InterfaceModel, r: &InterfaceModel, names: &RenameTable) -> bool {
    if t.visibility != r.visibility {
        return false;
    }
    match names.known(&t.name) {
        Some(n) => n == r.name,
        None => true,
    }
}

pub(crate) fn var_signature_matches(t: &VarModel, r: &VarModel, names: &RenameTable) -> bool {
    t.visibility == r.visibility
        && t.is_static == r.is_static
        && names.known(&t.ty).map_or(true, |n| n == r.ty)
        && names.known(&t.name).map_or(true, |n| n == r.name)
}

/// Parameter type list, only when every entry is resolved.
fn known_type_list<'a>(types: &'a [String], names: &'a RenameTable) -> Option<Vec<&'a str>> {
    types.iter().map(|t| names.known(t)).collect()
}

pub(crate) fn function_matches(
    t: &FunctionModel,
    r: &FunctionModel,
    names: &RenameTable,
    line_tolerance: usize,
) -> bool {
    if t.visibility != r.visibility
        || t.is_static != r.is_static
        || t.accessor != r.accessor
        || t.param_names.len() != r.param_names.len()
    {
        return false;
    }
    if let Some(n) = names.known(&t.return_type) {
        if n != r.return_type {
            return false;
        }
    }
    if let Some(list) = known_type_list(&t.param_types, names) {
        if list != r.param_types {
            return false;
        }
    }
    if let Some(n) = names.known(&t.name) {
        if n != r.name {
            return false;
        }
    }
    t.body_lines.abs_diff(r.body_lines) <= line_tolerance
}

/// Pairwise parameter comparison used by the function-name pass, which
/// matches inside one already-identified file and can therefore afford
/// per-parameter granularity.
pub(crate) fn params_match(t: &FunctionModel, r: &FunctionModel, names: &RenameTable) -> bool {
    if t.param_names.len() != r.param_names.len() {
        return false;
    }
    for (tn, rn) in t.param_names.iter().zip(&r.param_names) {
        if let Some(n) = names.known(tn) {
            if n != rn.as_str() {
                return false;
            }
        }
    }
    for (tt, rt) in t.param_types.iter().zip(&r.param_types) {
        if let Some(n) = names.known(tt) {
            if n != rt.as_str() {
                return false;
            }
        }
    }
    true
}

/// Every resolved import of the target must appear literally among the
/// reference file's imports.
pub(crate) fn imports_match(t: &FileModel, r: &FileModel, names: &RenameTable) -> bool {
    for imp in &t.imports {
        let Some(resolved) = names.known_dotted(&imp.qualified) else {
            continue;
        };
        if !r.imports.iter().any(|ri| ri.qualified == resolved) {
            return false;
        }
    }
    true
}

/// An access edge participates in matching only once all three of its
/// coordinates are resolved.
pub(crate) fn resolved_site(
    site: &AccessSite,
    names: &RenameTable,
) -> Option<(String, String, String)> {
    let package = names.known_dotted(&site.package)?;
    let file = names.known(&site.file)?.to_string();
    let function = names.known(&site.function)?.to_string();
    Some((package, file, function))
}

pub(crate) fn site_equals(site: &AccessSite, triple: &(String, String, String)) -> bool {
    site.package == triple.0 && site.file == triple.1 && site.function == triple.2
}

/// True once nothing in the file's own identity is a placeholder any
/// more: package, every class name, every interface name.
pub(crate) fn file_identity_resolved(file: &FileModel, names: &RenameTable) -> bool {
    names.known_dotted(&file.package_name).is_some()
        && file.classes.iter().all(|c| names.known(&c.name).is_some())
        && file
            .interfaces
            .iter()
            .all(|i| names.known(&i.name).is_some())
}

/// Reference-file index for a target file whose package, stem and first
/// class are already resolved; the direct lookup the per-member passes
/// start from.
pub(crate) fn resolved_counterpart(
    t: &FileModel,
    reference: &loader::ProjectIndex,
    names: &RenameTable,
) -> Option<usize> {
    let package = names.known_dotted(&t.package_name)?;
    names.known(&t.file_stem)?;
    let class = names.known(&t.classes.first()?.name)?;
    reference.lookup_qualified(&format!("{package}.{class}"))
}
