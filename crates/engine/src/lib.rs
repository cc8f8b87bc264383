//! Identity-resolution engine: walks the cross-reference graph between
//! an obfuscated project and its reference project and grows the rename
//! table, one unambiguous match at a time.
//!
//! The engine never guesses. Every pass collects candidates under
//! structural filters and commits only when exactly one survives; two or
//! more candidates are a non-event, not an error. Passes run in a fixed
//! order for a bounded number of rounds, so names resolved early widen
//! what later passes can compare.

use ir::RenameTable;
use loader::ProjectIndex;
use serde::Serialize;
use tracing::{debug, info};

mod matching;
mod xref;

pub mod passes;

pub use passes::{ClassPackagePass, FunctionNamePass, ImportMatchPass, Pass, VariableNamePass};
pub use xref::link_accesses;

/// Knobs of the resolution pipeline. The round count and the
/// convergence check are explicit so runs are reproducible and
/// testable.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveOptions {
    /// Upper bound on full pass rounds.
    pub rounds: usize,
    /// Stop early once a round commits nothing new.
    pub stop_when_stable: bool,
    /// Allowed difference in function body line counts during file
    /// matching.
    pub line_tolerance: usize,
    /// Require exact body line counts in the function-name pass.
    pub strict_function_lines: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            rounds: 2,
            stop_when_stable: true,
            line_tolerance: 2,
            strict_function_lines: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PassOutcome {
    pub pass: &'static str,
    pub committed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundReport {
    pub round: usize,
    pub committed: usize,
    pub passes: Vec<PassOutcome>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolveReport {
    pub rounds: Vec<RoundReport>,
    pub committed: usize,
    pub conflicts: usize,
}

/// Runs the four passes in their fixed order for up to `opts.rounds`
/// rounds, growing `names`. The table is append-only: the report's
/// `conflicts` counts proposals that disagreed with an existing mapping
/// and were dropped.
pub fn resolve_names(
    target: &ProjectIndex,
    reference: &ProjectIndex,
    names: &mut RenameTable,
    opts: &ResolveOptions,
) -> ResolveReport {
    let passes: Vec<Box<dyn Pass>> = vec![
        Box::new(ClassPackagePass {
            line_tolerance: opts.line_tolerance,
        }),
        Box::new(FunctionNamePass {
            strict_lines: opts.strict_function_lines,
        }),
        Box::new(VariableNamePass),
        Box::new(ImportMatchPass),
    ];

    let mut report = ResolveReport::default();
    for round in 0..opts.rounds {
        let mut outcomes = Vec::new();
        let mut round_committed = 0;
        for pass in &passes {
            let committed = pass.run(target, reference, names);
            debug!(round, pass = pass.name(), committed, "Pass finished");
            round_committed += committed;
            outcomes.push(PassOutcome {
                pass: pass.name(),
                committed,
            });
        }
        report.committed += round_committed;
        report.rounds.push(RoundReport {
            round,
            committed: round_committed,
            passes: outcomes,
        });
        if opts.stop_when_stable && round_committed == 0 {
            info!(round, "Resolution stable, stopping early");
            break;
        }
    }
    report.conflicts = names.conflicts();
    info!(
        committed = report.committed,
        conflicts = report.conflicts,
        "Resolution finished"
    );
    report
}

/// Resolved-versus-still-obfuscated tally over every name the target
/// tree declares. This is what the user sees to judge progress.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Census {
    pub resolved: usize,
    pub obfuscated: usize,
}

impl Census {
    fn count(&mut self, known: bool) {
        if known {
            self.resolved += 1;
        } else {
            self.obfuscated += 1;
        }
    }
}

pub fn census(target: &ProjectIndex, names: &RenameTable) -> Census {
    let mut tally = Census::default();
    for file in target.files() {
        tally.count(names.known_dotted(&file.package_name).is_some());
        tally.count(names.known(&file.file_stem).is_some());
        for c in &file.classes {
            tally.count(names.known(&c.name).is_some());
        }
        for i in &file.interfaces {
            tally.count(names.known(&i.name).is_some());
        }
        for v in &file.vars {
            tally.count(names.known(&v.name).is_some());
        }
        for f in &file.functions {
            tally.count(names.known(&f.name).is_some());
        }
    }
    tally
}
