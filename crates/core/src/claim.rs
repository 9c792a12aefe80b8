//! The claim aggregate and its append-only status history.
//!
//! [`Claim::transition`] is the single write path for status changes:
//! it validates the edge against the workflow table, enforces mandatory
//! reasons, finalizes the compensation amount on approval, and appends
//! a [`StatusHistoryEntry`]. Callers persist the result with an
//! optimistic status check (see `aeroclaim-db`), so a claim is never
//! advanced from a state it is no longer in.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::claim_status::ClaimStatus;
use crate::eligibility::{EligibilityResult, IncidentType, RegulationBasis};
use crate::error::CoreError;
use crate::flight::FlightLeg;
use crate::types::{DbId, Timestamp};

/// Actor name recorded for transitions not driven by a human admin.
pub const SYSTEM_ACTOR: &str = "system";

/// Placeholder written over personal data during GDPR erasure.
pub const ANONYMIZED_REFERENCE: &str = "anonymized";

// ---------------------------------------------------------------------------
// StatusHistoryEntry
// ---------------------------------------------------------------------------

/// One audit-trail record of a status change. Append-only: never
/// mutated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub from_status: ClaimStatus,
    pub to_status: ClaimStatus,
    /// Admin identifier, or [`SYSTEM_ACTOR`] for automated transitions.
    pub actor: String,
    pub reason: Option<String>,
    /// Marks the rejected -> under_review admin override so it is
    /// distinguishable from a normal review edge in the audit trail.
    pub reopened: bool,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Claim
// ---------------------------------------------------------------------------

/// The aggregate root: one customer's compensation claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: DbId,
    pub customer_reference: String,
    pub incident_type: IncidentType,
    pub regulation_basis: RegulationBasis,
    pub status: ClaimStatus,
    pub legs: Vec<FlightLeg>,
    /// Latest engine output. Recomputed whenever inputs change; becomes
    /// authoritative only when approval copies its amount below.
    pub eligibility: Option<EligibilityResult>,
    /// Set once on approval; afterwards only changed through
    /// [`Claim::override_compensation`], which is itself logged.
    pub compensation_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub history: Vec<StatusHistoryEntry>,
}

impl Claim {
    /// Apply a status transition on behalf of `actor`.
    ///
    /// On success the claim's status is updated, a history entry is
    /// appended, and that entry is returned for persistence. Fails with:
    ///
    /// - [`CoreError::InvalidTransition`] if the workflow has no edge
    ///   from the current status to `new_status`;
    /// - [`CoreError::ReasonRequired`] if `new_status` demands a reason
    ///   and none (or an empty one) was given;
    /// - [`CoreError::MissingEligibilityData`] when entering `approved`
    ///   without a computed eligibility amount to finalize.
    pub fn transition(
        &mut self,
        new_status: ClaimStatus,
        reason: Option<String>,
        actor: &str,
        now: Timestamp,
    ) -> Result<StatusHistoryEntry, CoreError> {
        if !self.status.can_transition_to(new_status) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: new_status,
            });
        }

        let reason = normalize_reason(reason);
        if new_status.requires_reason() && reason.is_none() {
            return Err(CoreError::ReasonRequired(new_status));
        }

        // Only approval finalizes money: the last computed eligibility
        // amount becomes the claim's compensation amount.
        if new_status == ClaimStatus::Approved {
            let result = self
                .eligibility
                .as_ref()
                .ok_or(CoreError::MissingEligibilityData)?;
            let amount = result
                .compensation_amount
                .ok_or(CoreError::MissingEligibilityData)?;
            self.compensation_amount = Some(amount);
            self.currency = result.currency.clone();
        }

        let entry = StatusHistoryEntry {
            from_status: self.status,
            to_status: new_status,
            actor: actor.to_string(),
            reason,
            reopened: false,
            created_at: now,
        };
        self.status = new_status;
        self.history.push(entry.clone());
        Ok(entry)
    }

    /// Admin override: reopen a rejected claim back into review.
    ///
    /// This is deliberately not an edge in the workflow table — it is a
    /// distinct operation with a mandatory reason, and its history entry
    /// carries the `reopened` marker.
    pub fn reopen(
        &mut self,
        reason: String,
        actor: &str,
        now: Timestamp,
    ) -> Result<StatusHistoryEntry, CoreError> {
        if self.status != ClaimStatus::Rejected {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: ClaimStatus::UnderReview,
            });
        }
        let Some(reason) = normalize_reason(Some(reason)) else {
            return Err(CoreError::ReasonRequired(ClaimStatus::UnderReview));
        };

        let entry = StatusHistoryEntry {
            from_status: ClaimStatus::Rejected,
            to_status: ClaimStatus::UnderReview,
            actor: actor.to_string(),
            reason: Some(reason),
            reopened: true,
            created_at: now,
        };
        self.status = ClaimStatus::UnderReview;
        self.history.push(entry.clone());
        Ok(entry)
    }

    /// Admin override of a finalized compensation amount.
    ///
    /// The only way the amount changes after approval. Requires a
    /// reason and appends a history entry (same status on both sides)
    /// so the adjustment is auditable.
    pub fn override_compensation(
        &mut self,
        amount: Decimal,
        reason: String,
        actor: &str,
        now: Timestamp,
    ) -> Result<StatusHistoryEntry, CoreError> {
        if self.compensation_amount.is_none() {
            return Err(CoreError::Validation(
                "Cannot override compensation before approval has set an amount".to_string(),
            ));
        }
        if amount < Decimal::ZERO {
            return Err(CoreError::Validation(
                "Compensation amount cannot be negative".to_string(),
            ));
        }
        let Some(reason) = normalize_reason(Some(reason)) else {
            return Err(CoreError::Validation(
                "A reason is required to override a compensation amount".to_string(),
            ));
        };

        self.compensation_amount = Some(amount);
        let entry = StatusHistoryEntry {
            from_status: self.status,
            to_status: self.status,
            actor: actor.to_string(),
            reason: Some(reason),
            reopened: false,
            created_at: now,
        };
        self.history.push(entry.clone());
        Ok(entry)
    }

    /// GDPR erasure: blank personal data without deleting the row.
    ///
    /// The claim, its legs, and its history survive for audit purposes;
    /// only the customer reference is overwritten.
    pub fn anonymize(&mut self) {
        self.customer_reference = ANONYMIZED_REFERENCE.to_string();
    }
}

/// Treat whitespace-only reasons the same as absent ones.
fn normalize_reason(reason: Option<String>) -> Option<String> {
    reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
