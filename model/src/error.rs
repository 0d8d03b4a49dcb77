use colored::Colorize;

/// For re-throwing after we've printed a list of errors to the user.
#[derive(Debug, thiserror::Error)]
#[error("{0} failed due to {1} errors")]
pub struct AggregatedErrors(pub String, pub usize);

/// Collects fatal errors from independent units of work (e.g. several
/// procedure files in one run) so they can all be reported together.
pub struct Errors {
    errors: Vec<anyhow::Error>,
}

impl Default for Errors {
    fn default() -> Self {
        Self {
            // ideally we won't have any,
            // and we don't mind reallocating if we're already in an error state:
            errors: Vec::with_capacity(0),
        }
    }
}

impl Errors {
    pub fn add_context(&mut self, e: anyhow::Error, msg: String) {
        log::trace!("{msg}: {e:?}");
        self.errors.push(e.context(msg));
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Print full list of errors to stderr, fail w/ an aggregated error
    /// if there were one or more errors.
    pub fn print_recap(&self, label: &str) -> Result<(), AggregatedErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            eprintln!("\n{} {}:\n", "Encountered errors while".red(), label.red());
            for e in &self.errors {
                eprint!("{}: {}", "ERROR".red(), e);
                for cause in e.chain().skip(1) {
                    eprint!("\nCaused by:\n\t{}", cause);
                }
                eprintln!("\n");
            }
            Err(AggregatedErrors(label.to_owned(), self.errors.len()))
        }
    }
}

/// Non-fatal problems found while loading a procedure
/// (missing durations, malformed duration fields and so on).
/// Each one is logged as it is added.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    warnings: Vec<String>,
}

impl Diagnostics {
    pub fn warn(&mut self, msg: String) {
        log::warn!("{msg}");
        self.warnings.push(msg);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Move all warnings from `other` into `self`, prefixing them with `context`.
    pub fn absorb(&mut self, other: Diagnostics, context: &str) {
        self.warnings
            .extend(other.warnings.into_iter().map(|w| format!("{context}: {w}")));
    }
}
