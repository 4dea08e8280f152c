//! Error types and result types for catalog operations.
//!
//! Use [`CatalogResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

use crate::book::BookId;

/// Represents all possible errors that can occur when working with the catalog.
///
/// `NotFound` and `InvalidInput` are expected conditions the caller can act on.
/// `Backend` and `Serialization` are surfaced as-is and never retried.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No book with the given id exists in the collection.
    #[error("Livro não encontrado: {0}")]
    NotFound(BookId),
    /// A parameter or request body could not be coerced into the expected shape.
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
    /// Conversion between a book and its stored representation failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CatalogError {
    /// Shorthand for building an [`CatalogError::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        CatalogError::InvalidInput(message.into())
    }

    /// Whether the caller caused this error (as opposed to the storage layer).
    pub fn is_client_error(&self) -> bool {
        matches!(self, CatalogError::NotFound(_) | CatalogError::InvalidInput(_))
    }
}

/// A specialized `Result` type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<BsonError> for CatalogError {
    fn from(err: BsonError) -> Self {
        CatalogError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for CatalogError {
    fn from(err: SerdeJsonError) -> Self {
        CatalogError::Serialization(err.to_string())
    }
}
