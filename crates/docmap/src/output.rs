//! User-facing build progress on stderr.
//!
//! Colored when attached to a terminal; `console` handles detection. Log
//! records go through `tracing` instead, this is only the human-readable
//! build narrative.

use console::{Style, Term};

/// Writer for build progress messages.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn styled(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }

    /// Announce a build phase.
    pub(crate) fn step(&self, msg: &str) {
        self.styled(&Style::new().cyan().bold(), msg);
    }

    /// Plain progress note.
    pub(crate) fn note(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Report a written artifact.
    pub(crate) fn done(&self, msg: &str) {
        self.styled(&Style::new().green(), msg);
    }

    /// Warn without failing the build.
    pub(crate) fn warning(&self, msg: &str) {
        self.styled(&Style::new().yellow(), msg);
    }

    /// Report a fatal error.
    pub(crate) fn error(&self, msg: &str) {
        self.styled(&Style::new().red(), msg);
    }
}
