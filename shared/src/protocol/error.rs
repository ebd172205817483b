use thiserror::Error;

use crate::EntityTypeId;

/// Errors that can occur during protocol operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Protocol is locked and cannot be modified
    #[error("Protocol is already locked and cannot be modified. Protocol.lock() has been called and no further changes are allowed")]
    AlreadyLocked,

    /// Two entity types were registered under the same id
    #[error("Entity type {type_id} is already registered")]
    DuplicateEntityType { type_id: EntityTypeId },
}
