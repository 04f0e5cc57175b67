//! Exit code logic for the mirror process.
//!
//! Single responsibility: map succeeded/failed task counts to the process exit outcome.

/// How a completed run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every task succeeded (or there were none).
    Success,
    /// Some tasks succeeded, some failed.
    Partial,
    /// Every task failed.
    Failure,
}

impl ProcessExit {
    /// Exit status used under `--strict`.
    pub(crate) fn strict_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Partial | Self::Failure => 2,
        }
    }
}

/// Determines the process exit outcome from succeeded and failed task counts.
pub(crate) fn determine_exit_outcome(succeeded: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if succeeded > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::{ProcessExit, determine_exit_outcome};

    #[test]
    fn test_exit_outcome_success_when_no_failures() {
        assert_eq!(determine_exit_outcome(3, 0), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_success_when_zero_tasks() {
        assert_eq!(determine_exit_outcome(0, 0), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_partial_when_mixed() {
        assert_eq!(determine_exit_outcome(2, 1), ProcessExit::Partial);
    }

    #[test]
    fn test_exit_outcome_failure_when_all_failed() {
        assert_eq!(determine_exit_outcome(0, 2), ProcessExit::Failure);
    }

    #[test]
    fn test_strict_code_only_zero_on_success() {
        assert_eq!(ProcessExit::Success.strict_code(), 0);
        assert_eq!(ProcessExit::Partial.strict_code(), 2);
        assert_eq!(ProcessExit::Failure.strict_code(), 2);
    }
}
