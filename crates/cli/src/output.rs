use clap::ValueEnum;
use reporters::RunInfo;

/// Supported output formats for run summaries and model dumps.
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

impl From<Format> for reporters::Format {
    fn from(fmt: Format) -> Self {
        match fmt {
            Format::Text => reporters::Format::Text,
            Format::Json => reporters::Format::Json,
        }
    }
}

pub fn print_summary(info: &RunInfo, fmt: Format) -> anyhow::Result<()> {
    reporters::print_summary(info, fmt.into())
}
