use crate::item::ItemId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when manipulating a character.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested item ID does not exist on this character.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}
