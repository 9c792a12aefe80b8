//! Claim lifecycle states and the transition table.
//!
//! States are string-mapped so the database stores them as TEXT and the
//! optimistic status update can match on the column directly
//! (`UPDATE claims ... WHERE id = $1 AND status = $2`).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ClaimStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Submitted,
    PendingReview,
    UnderReview,
    AdditionalInfoRequired,
    Approved,
    Rejected,
    PaymentProcessing,
    PaymentSent,
    Completed,
    Cancelled,
}

/// All states, in lifecycle order. Used by tests and by the transition
/// matrix endpoint.
pub const ALL_STATUSES: &[ClaimStatus] = &[
    ClaimStatus::Submitted,
    ClaimStatus::PendingReview,
    ClaimStatus::UnderReview,
    ClaimStatus::AdditionalInfoRequired,
    ClaimStatus::Approved,
    ClaimStatus::Rejected,
    ClaimStatus::PaymentProcessing,
    ClaimStatus::PaymentSent,
    ClaimStatus::Completed,
    ClaimStatus::Cancelled,
];

impl ClaimStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::PendingReview => "pending_review",
            Self::UnderReview => "under_review",
            Self::AdditionalInfoRequired => "additional_info_required",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::PaymentProcessing => "payment_processing",
            Self::PaymentSent => "payment_sent",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// The state every new claim starts in.
    pub fn initial() -> Self {
        Self::Submitted
    }

    /// Terminal states have no outgoing edges in normal operation.
    ///
    /// `rejected` is terminal by default; reopening a rejected claim is
    /// a distinct admin override (see [`crate::claim::Claim::reopen`]),
    /// not a regular transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Rejected)
    }

    /// Whether a transition *into* this state requires a non-empty reason.
    ///
    /// Enforced here in the domain layer, not merely at the API surface,
    /// so the invariant holds for every caller.
    pub fn requires_reason(self) -> bool {
        matches!(self, Self::Rejected | Self::AdditionalInfoRequired)
    }

    /// Directed edges of the claim workflow.
    ///
    /// Every non-terminal state can also be cancelled (the universal
    /// escape hatch), which is folded into the lists below.
    pub fn valid_next_states(self) -> &'static [ClaimStatus] {
        match self {
            Self::Submitted => &[
                Self::PendingReview,
                Self::Rejected,
                Self::Cancelled,
            ],
            Self::PendingReview => &[
                Self::UnderReview,
                Self::Rejected,
                Self::Cancelled,
            ],
            Self::UnderReview => &[
                Self::Approved,
                Self::AdditionalInfoRequired,
                Self::Rejected,
                Self::Cancelled,
            ],
            Self::AdditionalInfoRequired => &[
                Self::UnderReview,
                Self::Rejected,
                Self::Cancelled,
            ],
            Self::Approved => &[Self::PaymentProcessing, Self::Cancelled],
            Self::PaymentProcessing => &[Self::PaymentSent, Self::Cancelled],
            Self::PaymentSent => &[Self::Completed, Self::Cancelled],
            Self::Completed | Self::Cancelled | Self::Rejected => &[],
        }
    }

    /// Whether the workflow permits moving from `self` to `target`.
    pub fn can_transition_to(self, target: ClaimStatus) -> bool {
        self.valid_next_states().contains(&target)
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "pending_review" => Ok(Self::PendingReview),
            "under_review" => Ok(Self::UnderReview),
            "additional_info_required" => Ok(Self::AdditionalInfoRequired),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "payment_processing" => Ok(Self::PaymentProcessing),
            "payment_sent" => Ok(Self::PaymentSent),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("Unknown claim status '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ClaimStatus::*;

    #[test]
    fn initial_state_is_submitted() {
        assert_eq!(ClaimStatus::initial(), Submitted);
    }

    #[test]
    fn terminal_states() {
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(Rejected.is_terminal());
        for status in [
            Submitted,
            PendingReview,
            UnderReview,
            AdditionalInfoRequired,
            Approved,
            PaymentProcessing,
            PaymentSent,
        ] {
            assert!(!status.is_terminal(), "{status} should not be terminal");
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        assert!(Completed.valid_next_states().is_empty());
        assert!(Cancelled.valid_next_states().is_empty());
        assert!(Rejected.valid_next_states().is_empty());
    }

    #[test]
    fn every_non_terminal_state_can_be_cancelled() {
        for &status in ALL_STATUSES {
            if !status.is_terminal() {
                assert!(
                    status.can_transition_to(Cancelled),
                    "{status} should allow cancellation"
                );
            }
        }
    }

    #[test]
    fn happy_path_edges_exist() {
        assert!(Submitted.can_transition_to(PendingReview));
        assert!(PendingReview.can_transition_to(UnderReview));
        assert!(UnderReview.can_transition_to(Approved));
        assert!(Approved.can_transition_to(PaymentProcessing));
        assert!(PaymentProcessing.can_transition_to(PaymentSent));
        assert!(PaymentSent.can_transition_to(Completed));
    }

    #[test]
    fn info_request_loop_edges_exist() {
        assert!(UnderReview.can_transition_to(AdditionalInfoRequired));
        assert!(AdditionalInfoRequired.can_transition_to(UnderReview));
    }

    #[test]
    fn rejection_edges_exist() {
        for status in [Submitted, PendingReview, UnderReview, AdditionalInfoRequired] {
            assert!(status.can_transition_to(Rejected), "{status} -> rejected");
        }
    }

    #[test]
    fn skipping_review_is_not_allowed() {
        assert!(!Submitted.can_transition_to(Approved));
        assert!(!Submitted.can_transition_to(UnderReview));
        assert!(!PendingReview.can_transition_to(Approved));
    }

    #[test]
    fn payment_states_cannot_be_rejected() {
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!PaymentProcessing.can_transition_to(Rejected));
        assert!(!PaymentSent.can_transition_to(Rejected));
    }

    #[test]
    fn no_backwards_edges_from_payment() {
        assert!(!PaymentSent.can_transition_to(PaymentProcessing));
        assert!(!PaymentProcessing.can_transition_to(Approved));
        assert!(!Completed.can_transition_to(PaymentSent));
    }

    #[test]
    fn rejected_has_no_normal_reopen_edge() {
        assert!(!Rejected.can_transition_to(UnderReview));
    }

    #[test]
    fn reason_required_targets() {
        assert!(Rejected.requires_reason());
        assert!(AdditionalInfoRequired.requires_reason());
        assert!(!Approved.requires_reason());
        assert!(!Cancelled.requires_reason());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for &status in ALL_STATUSES {
            assert_eq!(status.as_str().parse::<ClaimStatus>().unwrap(), status);
        }
        assert!("in_flight".parse::<ClaimStatus>().is_err());
    }
}
