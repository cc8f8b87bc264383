//! Converters of ActionScript source files into the declaration model
//! used by the resolution engine.
//!
//! Parsing is heuristic: lines are tokenized on single spaces and a
//! keyword dispatch drives focused extractors. There is no grammar, no
//! string/comment awareness, and no cross-file knowledge here; the
//! extractor only has to agree with itself across the two trees it is
//! run on.

use anyhow::Context;
use ir::FileModel;
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

mod actionscript;

pub use actionscript::parse_actionscript;

/// Extension accepted by [`detect_type`]; everything else is skipped.
pub const SOURCE_EXTENSION: &str = "as";

#[derive(Debug, Default, Serialize)]
pub struct ParserMetrics {
    pub files_parsed: usize,
    pub parse_errors: usize,
}

/// Parse failures scoped to one file. The tree scan recovers from these
/// by skipping the file; only I/O problems abort a run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed declaration at line {line}: {detail}")]
    MalformedDeclaration { line: usize, detail: String },
    #[error("scope opened in function '{function}' never closes")]
    UnterminatedScope { function: String },
}

/// Determines the supported file type from the extension.
///
/// # Example
/// ```
/// use parsers::detect_type;
/// assert_eq!(detect_type(std::path::Path::new("Tank.as")), Some("actionscript"));
/// assert_eq!(detect_type(std::path::Path::new("Tank.swf")), None);
/// ```
pub fn detect_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension().map(|e| e.to_string_lossy().to_lowercase());
    match ext.as_deref() {
        Some(SOURCE_EXTENSION) => Some("actionscript"),
        _ => None,
    }
}

/// Parses source text into a [`FileModel`]. `file_stem` is the name the
/// model is matched and renamed under (the file name without extension).
pub fn parse_source(content: &str, file_stem: &str) -> Result<FileModel, ParseError> {
    parse_actionscript(content, file_stem)
}

/// Reads a file and produces its [`FileModel`]. Returns `Ok(None)` for
/// files whose extension is not handled.
pub fn parse_file(
    path: &Path,
    metrics: Option<&mut ParserMetrics>,
) -> anyhow::Result<Option<FileModel>> {
    if detect_type(path).is_none() {
        return Ok(None);
    }
    debug!(file = %path.display(), "Parsing file");
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match parse_source(&content, &stem) {
        Ok(model) => {
            if let Some(m) = metrics {
                m.files_parsed += 1;
            }
            Ok(Some(model))
        }
        Err(e) => {
            if let Some(m) = metrics {
                m.parse_errors += 1;
            }
            Err(e).with_context(|| format!("failed to parse {}", path.display()))
        }
    }
}
