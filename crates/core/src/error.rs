use crate::storage::StorageError;
use ward_types::ValueError;

#[derive(Debug, thiserror::Error)]
pub enum WardError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to serialize collection: {0}")]
    Serialization(serde_json::Error),
    #[error("record {id} already exists in {collection}")]
    DuplicateId {
        collection: &'static str,
        id: String,
    },
    #[error("cannot {action} a request that is {from}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },
    #[error("cannot return {returned} units, only {delivered} were delivered")]
    ReturnExceedsDelivered { returned: u32, delivered: u32 },
}

pub type WardResult<T> = std::result::Result<T, WardError>;
