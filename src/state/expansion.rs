//! Expansion outcome definitions
//!
//! Every call into the traversal scheduler ends in exactly one of these states.

use std::fmt;

/// Terminal state of a single URL expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpansionState {
    /// Depth exceeded or the URL was already claimed; nothing was fetched
    Skipped,

    /// The page fetch failed; nothing was persisted for this URL
    Failed,

    /// The page was fetched, its record queued and its children expanded
    Completed,
}

impl ExpansionState {
    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ExpansionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
