use clap::{Args as ClapArgs, Parser, Subcommand};
use regex::Regex;
use std::path::PathBuf;

use crate::output::Format;

fn parse_rounds(s: &str) -> Result<usize, String> {
    let v: usize = s
        .parse()
        .map_err(|e: std::num::ParseIntError| e.to_string())?;
    if v == 0 {
        Err("rounds must be greater than 0".into())
    } else {
        Ok(v)
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "demask - recovers original identifier names for an obfuscated ActionScript tree by structural comparison against a reference tree",
    long_about = "demask deobfuscates a tree of ActionScript sources by matching declaration
signatures, import graphs and usage patterns against a second, unobfuscated
tree that is believed to share most of its code with the target. Inferred
names are committed only when exactly one candidate survives all structural
filters, then the obfuscated tree is rewritten with them.

Examples:
  demask run --reference mytanks/src --target rtanks/src --out rtanks/clean
  demask run --reference ref --target obf --out clean --map-out names.json
  demask inspect src/Tank.as",
    subcommand_required = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve names against a reference tree and rewrite the target
    Run(RunArgs),
    /// Parse sources and dump their declaration models
    Inspect(InspectArgs),
}

#[derive(ClapArgs)]
pub struct RunArgs {
    /// Tree with original names, used as ground truth for matching
    #[arg(long)]
    pub reference: PathBuf,
    /// Obfuscated tree to deobfuscate
    #[arg(long)]
    pub target: PathBuf,
    /// Output directory for the rewritten tree
    #[arg(long)]
    pub out: PathBuf,
    /// Marker character bracketing obfuscated tokens
    #[arg(long)]
    pub marker: Option<char>,
    /// Stem for the placeholder names the marker pre-pass assigns
    #[arg(long = "placeholder-stem")]
    pub placeholder_stem: Option<String>,
    /// Upper bound on resolution pass rounds
    #[arg(long, default_value_t = 2, value_parser = parse_rounds)]
    pub rounds: usize,
    /// Run all rounds even when a round commits nothing new
    #[arg(long = "no-stable-stop")]
    pub no_stable_stop: bool,
    /// Allowed body-line-count difference during file matching
    #[arg(long = "line-tolerance", default_value_t = 2)]
    pub line_tolerance: usize,
    /// Require exact body line counts in the function-name pass
    #[arg(long = "strict-function-lines")]
    pub strict_function_lines: bool,
    /// Exclude files matching these patterns (supports globs)
    #[arg(long, value_parser = crate::parse_exclude, value_delimiter = ',')]
    pub exclude: Vec<Regex>,
    /// Don't use default exclusion patterns
    #[arg(long)]
    pub no_default_exclude: bool,
    /// Output format for the run summary
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
    /// Write the final rename table as JSON
    #[arg(long = "map-out")]
    pub map_out: Option<PathBuf>,
    /// Suppress the banner
    #[arg(long)]
    pub quiet: bool,
    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

#[derive(ClapArgs)]
pub struct InspectArgs {
    /// Source file or directory to parse
    pub path: PathBuf,
    /// Output format for the models
    #[arg(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {

    #[test]
    fn zero_rounds_are_rejected() {
        assert!(super::parse_rounds("0").is_err());
        assert_eq!(super::parse_rounds("3"), Ok(3));
    }
}
