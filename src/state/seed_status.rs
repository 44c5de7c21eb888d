/// Seed status definitions for tracking harvest progress
///
/// A seed starts out `Pending` and is moved exactly once to a terminal status
/// by the worker that paginated it.
use std::fmt;

/// Represents the current status of a seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedStatus {
    /// Seed has not been fully paginated yet
    Pending,

    /// Every page of the seed was visited
    Done,

    /// Pagination stopped on a page failure with no way to continue
    Failed,
}

impl SeedStatus {
    /// Returns true if the seed will never be processed again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// Only pending seeds may change status.
    pub fn can_transition_to(&self, next: SeedStatus) -> bool {
        matches!(self, Self::Pending) && next.is_terminal()
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all_statuses() -> [Self; 3] {
        [Self::Pending, Self::Done, Self::Failed]
    }
}

impl fmt::Display for SeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!SeedStatus::Pending.is_terminal());
        assert!(SeedStatus::Done.is_terminal());
        assert!(SeedStatus::Failed.is_terminal());
    }

    #[test]
    fn test_transitions_are_monotone() {
        assert!(SeedStatus::Pending.can_transition_to(SeedStatus::Done));
        assert!(SeedStatus::Pending.can_transition_to(SeedStatus::Failed));
        assert!(!SeedStatus::Pending.can_transition_to(SeedStatus::Pending));
        assert!(!SeedStatus::Done.can_transition_to(SeedStatus::Pending));
        assert!(!SeedStatus::Done.can_transition_to(SeedStatus::Failed));
        assert!(!SeedStatus::Failed.can_transition_to(SeedStatus::Done));
    }

    #[test]
    fn test_db_string_parsing() {
        for status in SeedStatus::all_statuses() {
            assert_eq!(SeedStatus::from_db_string(status.to_db_string()), Some(status));
        }
        assert_eq!(SeedStatus::from_db_string("running"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(SeedStatus::Failed.to_string(), "failed");
    }
}
