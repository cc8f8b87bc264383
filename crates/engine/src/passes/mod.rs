//! The resolution passes. Each one reads the current rename table and
//! index state, proposes mappings and commits only unambiguous ones.

use ir::{RenameOutcome, RenameTable};
use loader::ProjectIndex;
use tracing::{debug, warn};

mod classes;
mod functions;
mod imports;
mod vars;

pub use classes::ClassPackagePass;
pub use functions::FunctionNamePass;
pub use imports::ImportMatchPass;
pub use vars::VariableNamePass;

/// One self-contained matching algorithm. Passes share nothing but the
/// rename table they grow.
pub trait Pass {
    fn name(&self) -> &'static str;

    /// Returns the number of mappings committed.
    fn run(&self, target: &ProjectIndex, reference: &ProjectIndex, names: &mut RenameTable)
        -> usize;
}

/// Commits `old → new` when `old` is still an unmapped placeholder.
/// Identity proposals and already-resolved keys are ignored;
/// disagreements with an existing mapping are dropped and logged (first
/// write wins).
pub(crate) fn commit(names: &mut RenameTable, old: &str, new: &str) -> usize {
    if !names.is_placeholder(old) || old == new {
        return 0;
    }
    match names.insert(old, new) {
        RenameOutcome::Inserted => {
            debug!(old, new, "Name resolved");
            1
        }
        RenameOutcome::AlreadyMapped => 0,
        RenameOutcome::Conflict => {
            warn!(
                old,
                proposed = new,
                existing = names.get(old).unwrap_or_default(),
                "Conflicting rename proposal dropped"
            );
            0
        }
    }
}
