//! Classification of a resolved link against the record store

use std::fmt;

/// What the frontier decided for one same-domain link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    /// No record existed; a depth-0 placeholder was written
    New,

    /// A record existed below the maximum depth; its depth was incremented
    Requeue,

    /// A record already sits at the maximum depth
    Done,
}

impl LinkClass {
    /// Returns true if the link should be expanded further
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::New | Self::Requeue)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Requeue => "requeue",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for LinkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_accepted() {
        assert!(LinkClass::New.is_accepted());
        assert!(LinkClass::Requeue.is_accepted());
        assert!(!LinkClass::Done.is_accepted());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", LinkClass::Requeue), "requeue");
    }
}
