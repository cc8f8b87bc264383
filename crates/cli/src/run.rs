//! The full pipeline: load the reference tree, clean and parse the
//! target tree, link the cross-reference graphs, run the resolution
//! passes and rewrite the target through the rename table.

use anyhow::{Context, Result};
use emitter::{Cleaner, EmitOptions, DEFAULT_MARKER};
use engine::{census, link_accesses, resolve_names, ResolveOptions};
use ir::{RenameTable, DEFAULT_PLACEHOLDER_STEM};
use loader::{LoadStats, ProjectIndex};
use regex::Regex;
use reporters::{RunInfo, TreeInfo};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::args::RunArgs;
use crate::config::load_config;
use crate::{default_excludes, is_excluded, parse_exclude, ui};

fn tree_info(stats: &LoadStats) -> TreeInfo {
    TreeInfo {
        files_seen: stats.files_seen,
        files_parsed: stats.files_parsed,
        files_skipped: stats.files_skipped,
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    let start = Instant::now();
    let user_cfg = load_config().context("failed to load configuration")?;

    let marker = args.marker.or(user_cfg.marker).unwrap_or(DEFAULT_MARKER);
    let stem = args
        .placeholder_stem
        .clone()
        .or(user_cfg.placeholder_stem)
        .unwrap_or_else(|| DEFAULT_PLACEHOLDER_STEM.to_string());

    let mut patterns: Vec<Regex> = if args.no_default_exclude {
        Vec::new()
    } else {
        default_excludes()
    };
    patterns.extend(args.exclude.iter().cloned());
    for raw in &user_cfg.exclude {
        patterns.push(parse_exclude(raw).map_err(anyhow::Error::msg)?);
    }
    let excludes = move |p: &Path| is_excluded(p, &patterns);

    if !args.quiet {
        ui::print_header();
    }

    // reference tree: parse and link as-is
    let mut reference_stats = LoadStats::default();
    let mut reference = loader::load_tree(&args.reference, &excludes, &mut reference_stats)
        .with_context(|| format!("failed to load reference tree {}", args.reference.display()))?;
    link_accesses(&mut reference);
    info!(
        files = reference_stats.files_parsed,
        skipped = reference_stats.files_skipped,
        "Reference tree loaded"
    );

    // target tree: assign placeholders first, then parse the cleaned
    // form; the emitter later rereads the raw tree
    let mut names = RenameTable::new(stem);
    let mut cleaner = Cleaner::new(marker);
    let cleaned = cleaner
        .clean_tree(&args.target, &excludes, &mut names)
        .with_context(|| format!("failed to clean target tree {}", args.target.display()))?;

    let mut target_stats = LoadStats {
        files_seen: cleaned.len(),
        ..LoadStats::default()
    };
    let mut models = Vec::new();
    for file in &cleaned {
        match parsers::parse_source(&file.content, &file.file_stem) {
            Ok(model) => {
                target_stats.files_parsed += 1;
                models.push(model);
            }
            Err(e) => {
                target_stats.files_skipped += 1;
                warn!(file = %file.rel_path.display(), error = %e, "Skipping unparsable file");
            }
        }
    }
    let mut target = ProjectIndex::from_files(models);
    link_accesses(&mut target);
    info!(
        files = target_stats.files_parsed,
        skipped = target_stats.files_skipped,
        "Target tree loaded"
    );

    let opts = ResolveOptions {
        rounds: args.rounds,
        stop_when_stable: !args.no_stable_stop,
        line_tolerance: args.line_tolerance,
        strict_function_lines: args.strict_function_lines,
    };
    let resolution = resolve_names(&target, &reference, &mut names, &opts);
    let tally = census(&target, &names);

    let emit_stats = emitter::emit_tree(
        &args.target,
        &args.out,
        &names,
        &EmitOptions { marker },
        &excludes,
    )
    .with_context(|| format!("failed to emit into {}", args.out.display()))?;

    if let Some(path) = &args.map_out {
        // stable key order for diffable exports
        let sorted: BTreeMap<&str, &str> = names
            .mappings()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let data = serde_json::to_string_pretty(&sorted)?;
        fs::write(path, data)
            .with_context(|| format!("failed to write rename table {}", path.display()))?;
    }

    let info = RunInfo {
        reference: tree_info(&reference_stats),
        target: tree_info(&target_stats),
        names_resolved: tally.resolved,
        names_obfuscated: tally.obfuscated,
        mappings: names.len(),
        conflicts: names.conflicts(),
        tokens_replaced: emit_stats.tokens_replaced,
        tokens_kept_placeholder: emit_stats.tokens_kept_placeholder,
        tokens_stripped: emit_stats.tokens_stripped,
        files_written: emit_stats.files_written,
        duration_ms: start.elapsed().as_millis() as u64,
        resolution,
    };
    crate::output::print_summary(&info, args.format)?;
    Ok(())
}
