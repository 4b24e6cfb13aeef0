use crate::types::EntityId;

/// Domain-level errors raised by the host collaborators and by pure
/// computations over orders and fulfillments.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures of the fulfillment persistence boundary.
///
/// These are never folded into a result envelope: a failed fulfillment-state
/// write must reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Fulfillment not found: {0}")]
    NotFound(EntityId),

    #[error("Concurrent update conflict on fulfillment {0}")]
    Serialization(EntityId),

    #[error("Fulfillment {id} holds malformed data: {reason}")]
    Corrupt { id: EntityId, reason: String },

    #[error("Database error: {0}")]
    Database(String),
}
