//! Storage backend abstraction for the catalog.
//!
//! The [`CatalogBackend`] trait is the seam between the catalog and the place its records
//! live. Implementations own id generation so that a deleted id is never handed out again,
//! and execute [`Query`] values either in memory or by translation to a native query.
//!
//! # Examples
//!
//! ```ignore
//! use livraria::backend::{CatalogBackend, CatalogBackendBuilder};
//! use livraria::memory::InMemoryCatalog;
//!
//! let backend = InMemoryCatalog::builder().build().await?;
//! let created = backend.insert(new_book).await?;
//! assert_eq!(backend.get(created.id).await?, Some(created));
//! ```

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    book::{Book, BookId, BookPatch, NewBook},
    error::CatalogResult,
    query::Query,
};

/// Abstract interface for catalog storage backends.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` and may be shared across async tasks. Each call
/// must observe a single consistent state of the collection.
///
/// # Error Handling
///
/// Missing records are reported as [`CatalogError::NotFound`](crate::error::CatalogError::NotFound)
/// by `update` and `remove`, and as `Ok(None)` by `get`. Storage failures are reported as
/// [`CatalogError::Backend`](crate::error::CatalogError::Backend).
#[async_trait]
pub trait CatalogBackend: Send + Sync + Debug {
    /// Stores a new book under a freshly generated id and returns the stored record.
    async fn insert(&self, book: NewBook) -> CatalogResult<Book>;

    /// Retrieves the book with the given id.
    async fn get(&self, id: BookId) -> CatalogResult<Option<Book>>;

    /// Merges `patch` into the stored book with the given id and returns the result.
    ///
    /// The read and the write happen as one step, so concurrent patches touching different
    /// fields are all kept.
    async fn update(&self, id: BookId, patch: BookPatch) -> CatalogResult<Book>;

    /// Removes the book with the given id.
    async fn remove(&self, id: BookId) -> CatalogResult<()>;

    /// Returns the books selected by `query`.
    ///
    /// Unsorted results come back in ascending id order.
    async fn query(&self, query: Query) -> CatalogResult<Vec<Book>>;

    /// Releases backend resources. The default implementation is a no-op.
    async fn shutdown(&self) -> CatalogResult<()> {
        Ok(())
    }
}

#[async_trait]
impl<B> CatalogBackend for &B
where
    B: CatalogBackend + ?Sized,
{
    async fn insert(&self, book: NewBook) -> CatalogResult<Book> {
        (**self).insert(book).await
    }

    async fn get(&self, id: BookId) -> CatalogResult<Option<Book>> {
        (**self).get(id).await
    }

    async fn update(&self, id: BookId, patch: BookPatch) -> CatalogResult<Book> {
        (**self).update(id, patch).await
    }

    async fn remove(&self, id: BookId) -> CatalogResult<()> {
        (**self).remove(id).await
    }

    async fn query(&self, query: Query) -> CatalogResult<Vec<Book>> {
        (**self).query(query).await
    }

    async fn shutdown(&self) -> CatalogResult<()> {
        (**self).shutdown().await
    }
}

#[async_trait]
impl<B> CatalogBackend for Arc<B>
where
    B: CatalogBackend + ?Sized,
{
    async fn insert(&self, book: NewBook) -> CatalogResult<Book> {
        (**self).insert(book).await
    }

    async fn get(&self, id: BookId) -> CatalogResult<Option<Book>> {
        (**self).get(id).await
    }

    async fn update(&self, id: BookId, patch: BookPatch) -> CatalogResult<Book> {
        (**self).update(id, patch).await
    }

    async fn remove(&self, id: BookId) -> CatalogResult<()> {
        (**self).remove(id).await
    }

    async fn query(&self, query: Query) -> CatalogResult<Vec<Book>> {
        (**self).query(query).await
    }

    async fn shutdown(&self) -> CatalogResult<()> {
        (**self).shutdown().await
    }
}

/// Factory for backend instances, so connection setup can fail before serving.
#[async_trait]
pub trait CatalogBackendBuilder {
    type Backend: CatalogBackend;

    async fn build(self) -> CatalogResult<Self::Backend>;
}
