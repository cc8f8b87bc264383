//! Line-oriented extractor for ActionScript declaration signatures.
//!
//! One forward cursor runs over the file's lines. Declaration dispatch
//! and function-body scanning share that cursor, so after a body closes
//! the outer loop resumes on the first line past it. Bodies are the only
//! construct that consumes extra lines; class and interface members come
//! back through the ordinary per-line dispatch.

use ir::{
    AccessSite, ClassModel, FileModel, FunctionModel, ImportModel, InterfaceModel, MemberAccess,
    VarModel,
};
use std::collections::HashMap;
use tracing::debug;

use crate::ParseError;

mod tokens;

use tokens::{classify, extract_chain, has_static, visibility_of, LineKind};

/// Parses one file's text into a [`FileModel`].
pub fn parse_actionscript(content: &str, file_stem: &str) -> Result<FileModel, ParseError> {
    let mut model = FileModel::new(file_stem);
    let mut lines = content.lines().enumerate();

    while let Some((idx, raw)) = lines.next() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let toks: Vec<&str> = line.split(' ').collect();
        match classify(&toks) {
            Some((LineKind::Package, at)) => parse_package(&toks, at, &mut model),
            Some((LineKind::Import, at)) => parse_import(&toks, at, idx + 1, &mut model)?,
            Some((LineKind::Class, at)) => parse_class(&toks, at, idx + 1, &mut model)?,
            Some((LineKind::Interface, at)) => parse_interface(&toks, at, idx + 1, &mut model)?,
            Some((LineKind::Var, at)) => {
                let var = parse_var(&toks, at, line, idx + 1)?;
                record_type_use(&mut model, &var.ty, "");
                model.vars.push(var);
            }
            Some((LineKind::Function, at)) => {
                parse_function(&toks, at, line, idx + 1, &mut lines, &mut model)?;
            }
            None => {}
        }
    }
    Ok(model)
}

fn parse_package(toks: &[&str], at: usize, model: &mut FileModel) {
    // `package {` without a name leaves the default (empty) package
    if let Some(name) = toks.get(at + 1) {
        let name = name.trim_end_matches(['{', ';']);
        if !name.is_empty() {
            model.package_name = name.to_string();
        }
    }
}

fn parse_import(
    toks: &[&str],
    at: usize,
    line_no: usize,
    model: &mut FileModel,
) -> Result<(), ParseError> {
    let name = toks
        .get(at + 1)
        .ok_or_else(|| ParseError::MalformedDeclaration {
            line: line_no,
            detail: "import without a name".into(),
        })?;
    model
        .imports
        .push(ImportModel::new(name.trim_end_matches(';')));
    Ok(())
}

fn parse_class(
    toks: &[&str],
    at: usize,
    line_no: usize,
    model: &mut FileModel,
) -> Result<(), ParseError> {
    let name = toks
        .get(at + 1)
        .ok_or_else(|| ParseError::MalformedDeclaration {
            line: line_no,
            detail: "class without a name".into(),
        })?;

    let mut implements = Vec::new();
    if let Some(pos) = toks.iter().position(|t| *t == "implements") {
        // comma-separated list; the first entry without a trailing comma
        // terminates it
        let mut i = pos + 1;
        while let Some(item) = toks.get(i) {
            if let Some(stripped) = item.strip_suffix(',') {
                implements.push(stripped.to_string());
                i += 1;
                continue;
            }
            implements.push(item.trim_end_matches('{').to_string());
            break;
        }
        if implements.is_empty() {
            return Err(ParseError::MalformedDeclaration {
                line: line_no,
                detail: "implements without a list".into(),
            });
        }
    }

    let extends = toks
        .iter()
        .position(|t| *t == "extends")
        .and_then(|pos| toks.get(pos + 1))
        .map(|t| t.trim_end_matches('{').to_string())
        .unwrap_or_default();

    model.classes.push(ClassModel {
        name: name.trim_end_matches('{').to_string(),
        implements,
        extends,
        visibility: visibility_of(toks),
    });
    Ok(())
}

fn parse_interface(
    toks: &[&str],
    at: usize,
    line_no: usize,
    model: &mut FileModel,
) -> Result<(), ParseError> {
    let name = toks
        .get(at + 1)
        .ok_or_else(|| ParseError::MalformedDeclaration {
            line: line_no,
            detail: "interface without a name".into(),
        })?;
    model.interfaces.push(InterfaceModel {
        name: name.trim_end_matches('{').to_string(),
        visibility: visibility_of(toks),
    });
    Ok(())
}

fn parse_var(toks: &[&str], at: usize, line: &str, line_no: usize) -> Result<VarModel, ParseError> {
    let name_and_type = toks
        .get(at + 1)
        .ok_or_else(|| ParseError::MalformedDeclaration {
            line: line_no,
            detail: "var without a declaration".into(),
        })?;
    let (name, ty) = name_and_type
        .trim_end_matches(';')
        .split_once(':')
        .ok_or_else(|| ParseError::MalformedDeclaration {
            line: line_no,
            detail: format!("var '{name_and_type}' has no type annotation"),
        })?;

    let initializer = line
        .split_once('=')
        .map(|(_, rest)| rest.trim().trim_end_matches(';').trim().to_string())
        .unwrap_or_default();

    Ok(VarModel {
        name: name.to_string(),
        ty: ty.trim_end_matches(';').to_string(),
        visibility: visibility_of(toks),
        is_static: has_static(toks),
        initializer,
        accessed_by: Vec::new(),
    })
}

fn parse_function<'a, I>(
    toks: &[&str],
    at: usize,
    line: &str,
    line_no: usize,
    lines: &mut I,
    model: &mut FileModel,
) -> Result<(), ParseError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut name_at = at + 1;
    let mut accessor = ir::AccessorKind::None;
    match toks.get(name_at) {
        Some(&"get") if toks.len() > name_at + 1 => {
            accessor = ir::AccessorKind::Get;
            name_at += 1;
        }
        Some(&"set") if toks.len() > name_at + 1 => {
            accessor = ir::AccessorKind::Set;
            name_at += 1;
        }
        _ => {}
    }
    let name = toks
        .get(name_at)
        .copied()
        .map(|t| t.split('(').next().unwrap_or(t))
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ParseError::MalformedDeclaration {
            line: line_no,
            detail: "function without a name".into(),
        })?
        .to_string();

    // parameters live between the first paired parentheses of the
    // space-stripped signature
    let joined = toks.concat();
    let params_str = joined
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(inner, _)| inner)
        .ok_or_else(|| ParseError::MalformedDeclaration {
            line: line_no,
            detail: format!("function '{name}' has no parameter list"),
        })?;

    let mut param_names = Vec::new();
    let mut param_types = Vec::new();
    if !params_str.is_empty() {
        for param in params_str.split(',') {
            if let Some(rest) = param.strip_prefix("...") {
                // trailing variadic parameter: no name:type split
                param_names.push(rest.to_string());
                param_types.push("...".to_string());
                continue;
            }
            let (pname, pty) =
                param
                    .split_once(':')
                    .ok_or_else(|| ParseError::MalformedDeclaration {
                        line: line_no,
                        detail: format!("parameter '{param}' of '{name}' has no type"),
                    })?;
            param_names.push(pname.to_string());
            param_types.push(pty.to_string());
        }
    }

    let return_type = match toks.len().checked_sub(2).and_then(|i| toks.get(i)) {
        Some(&":") => toks
            .last()
            .map(|t| t.trim_end_matches(';').to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    // interface stubs end in `;` and have no body to consume
    let body_lines = if line.ends_with(';') {
        0
    } else {
        scan_body(lines, model, &name)?
    };

    model.functions.push(FunctionModel {
        name,
        visibility: visibility_of(toks),
        is_static: has_static(toks),
        return_type,
        param_names,
        param_types,
        body_lines,
        accessor,
        accessed_by: Vec::new(),
    });
    Ok(())
}

/// Consumes body lines from the shared cursor, keeping a running brace
/// depth. Scanning stops on the line where the depth returns to zero;
/// that terminal line is excluded from the count. Body lines are also
/// mined for local `var` declarations (which seed the local type table)
/// and for dotted member accesses.
fn scan_body<'a, I>(
    lines: &mut I,
    model: &mut FileModel,
    function_name: &str,
) -> Result<usize, ParseError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut depth: i64 = 0;
    let mut body_lines = 0usize;
    let mut locals: HashMap<String, String> = HashMap::new();

    for (idx, raw) in lines {
        if raw.contains('{') {
            depth += 1;
        }
        if raw.contains('}') {
            depth -= 1;
        }
        if depth <= 0 {
            return Ok(body_lines);
        }
        body_lines += 1;

        let line = raw.trim();
        let toks: Vec<&str> = line.split(' ').collect();
        if let Some(at) = toks.iter().position(|t| *t == "var") {
            match parse_var(&toks, at, line, idx + 1) {
                Ok(var) => {
                    record_type_use(model, &var.ty, function_name);
                    locals.insert(var.name, var.ty);
                }
                Err(e) => {
                    // local declarations are best-effort; a malformed one
                    // only costs an access edge
                    debug!(function = function_name, error = %e, "Skipping local var");
                }
            }
        }
        scan_member_accesses(line, &locals, model, function_name);
    }

    Err(ParseError::UnterminatedScope {
        function: function_name.to_string(),
    })
}

/// Records a [`MemberAccess`] for every dotted expression whose first
/// segment resolves to a known class: an imported short name, `this`,
/// or a local variable of an imported type.
fn scan_member_accesses(
    line: &str,
    locals: &HashMap<String, String>,
    model: &mut FileModel,
    function_name: &str,
) {
    for word in line.split_whitespace() {
        if !word.contains('.') {
            continue;
        }
        let Some(chain) = extract_chain(word) else {
            continue;
        };
        let first = chain[0].as_str();
        let qualified = if let Some(imp) = model.import_for_short_name(first) {
            Some(imp.qualified.clone())
        } else if first == "this" {
            model.qualified_name()
        } else if let Some(ty) = locals.get(first) {
            model.import_for_short_name(ty).map(|i| i.qualified.clone())
        } else {
            None
        };
        if let Some(class_qualified) = qualified {
            model.accesses.push(MemberAccess {
                class_qualified,
                function: function_name.to_string(),
                path: chain[1..].to_vec(),
            });
        }
    }
}

/// Appends an access edge to the import whose short name equals `ty`.
fn record_type_use(model: &mut FileModel, ty: &str, function: &str) {
    let site = AccessSite {
        package: model.package_name.clone(),
        file: model.file_stem.clone(),
        function: function.to_string(),
    };
    if let Some(imp) = model.imports.iter_mut().find(|i| i.short_name() == ty) {
        imp.accessed_by.push(site);
    }
}
