use crate::claim_status::ClaimStatus;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid status transition from '{from}' to '{to}'")]
    InvalidTransition { from: ClaimStatus, to: ClaimStatus },

    #[error("A reason is required when transitioning to '{0}'")]
    ReasonRequired(ClaimStatus),

    #[error("Cannot approve claim: no eligibility result with a compensation amount has been computed")]
    MissingEligibilityData,

    #[error("Claim was modified concurrently: status is no longer '{expected}'")]
    ConcurrentModification { expected: ClaimStatus },

    #[error("Internal error: {0}")]
    Internal(String),
}
