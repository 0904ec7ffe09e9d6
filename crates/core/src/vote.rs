//! Helpful-vote transitions.
//!
//! A review's `helpfulCount` changes only through this table:
//!
//! | Caller      | Existing vote | Ledger change | Count change |
//! |-------------|---------------|---------------|--------------|
//! | anonymous   | n/a           | none          | +1           |
//! | identified  | no            | insert        | +1           |
//! | identified  | yes           | delete        | -1, floor 0  |
//! | identified  | lost a race   | none          | 0            |
//!
//! Anonymous votes have no ledger entry and cannot be undone.

/// Whether an identified user currently has a vote on a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    /// No vote recorded.
    NotVoted,
    /// A vote exists.
    Voted,
}

/// Change to apply to a review's helpful count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpfulDelta {
    /// Add one.
    Up,
    /// Subtract one, never below zero.
    Down,
    /// Leave the count as it is.
    Unchanged,
}

impl HelpfulDelta {
    /// Apply the delta to a stored count.
    ///
    /// A missing (`NULL`) count is treated as zero before arithmetic.
    #[must_use]
    pub fn apply(self, current: Option<i32>) -> i32 {
        let current = current.unwrap_or(0).max(0);
        match self {
            Self::Up => current.saturating_add(1),
            Self::Down => (current - 1).max(0),
            Self::Unchanged => current,
        }
    }
}

/// Result of a helpful toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Anonymous caller; counted without a ledger entry.
    Anonymous,
    /// A new vote was recorded.
    Cast,
    /// An existing vote was removed.
    Retracted,
    /// A concurrent toggle inserted the same vote first.
    Raced,
}

impl ToggleOutcome {
    /// Outcome for an identified caller given the vote state.
    #[must_use]
    pub const fn for_state(state: VoteState) -> Self {
        match state {
            VoteState::NotVoted => Self::Cast,
            VoteState::Voted => Self::Retracted,
        }
    }

    /// Count change for this outcome.
    #[must_use]
    pub const fn delta(self) -> HelpfulDelta {
        match self {
            Self::Anonymous | Self::Cast => HelpfulDelta::Up,
            Self::Retracted => HelpfulDelta::Down,
            Self::Raced => HelpfulDelta::Unchanged,
        }
    }
}
