//! Entry point for the command-line interface.
//! Delegates to dedicated modules for argument handling, the run
//! pipeline and model inspection.

use demask::args::{parse_cli, Commands};
use demask::inspect::run_inspect;
use demask::run::run;
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = parse_cli();
    match cli.command {
        Commands::Run(args) => {
            init_tracing(args.debug);
            run(args)
        }
        Commands::Inspect(args) => {
            init_tracing(false);
            run_inspect(args)
        }
    }
}
