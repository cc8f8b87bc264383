//! Formatters for the run summary in text and JSON.
//! The summary is what lets a user judge progress without digging
//! through the rename table: files parsed, names resolved versus still
//! obfuscated, and what the emitter actually rewrote.

use engine::ResolveReport;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

#[derive(Debug, Default, Serialize)]
pub struct TreeInfo {
    pub files_seen: usize,
    pub files_parsed: usize,
    pub files_skipped: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct RunInfo {
    pub reference: TreeInfo,
    pub target: TreeInfo,
    pub names_resolved: usize,
    pub names_obfuscated: usize,
    pub mappings: usize,
    pub conflicts: usize,
    pub tokens_replaced: usize,
    pub tokens_kept_placeholder: usize,
    pub tokens_stripped: usize,
    pub files_written: usize,
    pub duration_ms: u64,
    pub resolution: ResolveReport,
}

/// Green when everything resolved, yellow otherwise; plain ANSI codes,
/// no extra dependencies.
fn color_count(n: usize, good_when_zero: bool) -> String {
    let code = match (n, good_when_zero) {
        (0, true) => "\x1b[32m",
        (_, true) => "\x1b[33m",
        (0, false) => "\x1b[33m",
        (_, false) => "\x1b[32m",
    };
    format!("{code}{n}\x1b[0m")
}

fn render_text(info: &RunInfo, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "╭──────────────────╮")?;
    writeln!(out, "│ Demask  Summary  │")?;
    writeln!(out, "╰──────────────────╯")?;
    writeln!(out)?;
    writeln!(
        out,
        "    Reference files    {} parsed, {} skipped",
        info.reference.files_parsed, info.reference.files_skipped
    )?;
    writeln!(
        out,
        "    Target files       {} parsed, {} skipped",
        info.target.files_parsed, info.target.files_skipped
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "    Names resolved     {}",
        color_count(info.names_resolved, false)
    )?;
    writeln!(
        out,
        "    Still obfuscated   {}",
        color_count(info.names_obfuscated, true)
    )?;
    writeln!(out, "    Mappings           {}", info.mappings)?;
    if info.conflicts > 0 {
        writeln!(
            out,
            "    Conflicts          {}",
            color_count(info.conflicts, true)
        )?;
    }
    writeln!(out)?;
    for round in &info.resolution.rounds {
        let passes: Vec<String> = round
            .passes
            .iter()
            .map(|p| format!("{} {}", p.pass, p.committed))
            .collect();
        writeln!(
            out,
            "    Round {}            {}",
            round.round + 1,
            passes.join(", ")
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "    Emitted            {} files ({} tokens renamed, {} left as placeholders, {} stripped)",
        info.files_written,
        info.tokens_replaced,
        info.tokens_kept_placeholder,
        info.tokens_stripped
    )?;
    writeln!(out, "    Duration           {}ms", info.duration_ms)?;
    Ok(())
}

pub fn print_summary(info: &RunInfo, format: Format) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        Format::Text => render_text(info, &mut out)?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, info)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
