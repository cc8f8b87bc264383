//! `demask inspect`: parse a file or tree and dump the declaration
//! models, for eyeballing what the extractor sees.

use anyhow::{Context, Result};
use ir::FileModel;
use std::path::Path;

use crate::args::InspectArgs;
use crate::output::Format;

fn collect(path: &Path) -> Result<Vec<FileModel>> {
    let mut models = Vec::new();
    if path.is_dir() {
        let mut stats = loader::LoadStats::default();
        let index = loader::load_tree(path, &|_: &Path| false, &mut stats)?;
        models.extend(index.files().iter().cloned());
    } else {
        let model = parsers::parse_file(path, None)?
            .with_context(|| format!("unsupported file type: {}", path.display()))?;
        models.push(model);
    }
    Ok(models)
}

fn render_text(models: &[FileModel]) -> String {
    let mut out = String::new();
    for model in models {
        out.push_str(&format!(
            "{} (package {})\n",
            model.file_stem,
            if model.package_name.is_empty() {
                "<default>"
            } else {
                &model.package_name
            }
        ));
        for imp in &model.imports {
            out.push_str(&format!("    import {}\n", imp.qualified));
        }
        for class in &model.classes {
            out.push_str(&format!("    class {}\n", class.name));
        }
        for iface in &model.interfaces {
            out.push_str(&format!("    interface {}\n", iface.name));
        }
        for var in &model.vars {
            out.push_str(&format!("    var {}:{}\n", var.name, var.ty));
        }
        for func in &model.functions {
            out.push_str(&format!(
                "    function {}({}) [{} body lines]\n",
                func.name,
                func.param_types.join(", "),
                func.body_lines
            ));
        }
    }
    out
}

pub fn run_inspect(args: InspectArgs) -> Result<()> {
    let models = collect(&args.path)?;
    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&models)?),
        Format::Text => print!("{}", render_text(&models)),
    }
    Ok(())
}
