//! The catalog service: the queries and mutations exposed to callers.
//!
//! [`Catalog`] owns a backend and turns each query intent into a [`Query`]. It holds no
//! state of its own; every call reads the backend's current snapshot.
//!
//! ```ignore
//! use livraria::{catalog::Catalog, memory::InMemoryCatalog};
//!
//! let catalog = Catalog::new(InMemoryCatalog::new());
//! catalog.seed_if_empty().await?;
//! let classics = catalog.oldest().await?;
//! ```

use tracing::{debug, info};

use crate::{
    backend::CatalogBackend,
    book::{Book, BookField, BookId, BookPatch, NewBook},
    error::{CatalogError, CatalogResult},
    query::{Filter, Query, SortDirection},
    sample::sample_catalog,
};

#[derive(Debug)]
pub struct Catalog<B: CatalogBackend> {
    backend: B,
}

impl<B: CatalogBackend> Catalog<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Every book, in ascending id order.
    pub async fn list(&self) -> CatalogResult<Vec<Book>> {
        self.backend.query(Query::all()).await
    }

    /// The book with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no such book exists.
    pub async fn get(&self, id: BookId) -> CatalogResult<Book> {
        self.backend
            .get(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Books whose publisher equals `publisher`, ignoring case.
    pub async fn by_publisher(&self, publisher: &str) -> CatalogResult<Vec<Book>> {
        self.backend
            .query(Query::filtered(Filter::eq_ignore_case(BookField::Publisher, publisher)))
            .await
    }

    /// Books whose title contains `word`, ignoring case.
    pub async fn title_contains(&self, word: &str) -> CatalogResult<Vec<Book>> {
        self.backend
            .query(Query::filtered(Filter::contains_ignore_case(BookField::Title, word)))
            .await
    }

    /// Books priced strictly above `threshold`.
    pub async fn price_above(&self, threshold: f64) -> CatalogResult<Vec<Book>> {
        self.backend
            .query(Query::filtered(Filter::gt(BookField::Price, threshold)))
            .await
    }

    /// Books priced strictly below `threshold`.
    pub async fn price_below(&self, threshold: f64) -> CatalogResult<Vec<Book>> {
        self.backend
            .query(Query::filtered(Filter::lt(BookField::Price, threshold)))
            .await
    }

    /// Every book published in the latest year present in the catalog.
    ///
    /// Empty when the catalog is empty.
    pub async fn most_recent(&self) -> CatalogResult<Vec<Book>> {
        self.year_extremum(SortDirection::Desc).await
    }

    /// Every book published in the earliest year present in the catalog.
    ///
    /// Empty when the catalog is empty.
    pub async fn oldest(&self) -> CatalogResult<Vec<Book>> {
        self.year_extremum(SortDirection::Asc).await
    }

    /// Books with no units in stock.
    pub async fn out_of_stock(&self) -> CatalogResult<Vec<Book>> {
        self.backend
            .query(Query::filtered(Filter::eq(BookField::Quantity, 0)))
            .await
    }

    // One backend call, so the edge year and the books holding it come from the same state.
    async fn year_extremum(&self, direction: SortDirection) -> CatalogResult<Vec<Book>> {
        self.backend
            .query(Query::builder().extremum(BookField::Year, direction).build())
            .await
    }

    /// Validates and stores a new book, returning it with its assigned id.
    pub async fn create(&self, book: NewBook) -> CatalogResult<Book> {
        book.validate()?;
        let created = self.backend.insert(book).await?;
        info!(id = created.id, title = %created.title, "book created");

        Ok(created)
    }

    /// Merges `patch` into the book with the given id and returns the result.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no such book exists, or
    /// [`CatalogError::InvalidInput`] if the patch carries an invalid value.
    pub async fn update(&self, id: BookId, patch: BookPatch) -> CatalogResult<Book> {
        patch.validate()?;
        let book = self.backend.update(id, patch).await?;
        info!(id, "book updated");

        Ok(book)
    }

    /// Removes the book with the given id. The id is never reassigned.
    pub async fn delete(&self, id: BookId) -> CatalogResult<()> {
        self.backend.remove(id).await?;
        info!(id, "book deleted");

        Ok(())
    }

    /// Loads the starter catalog when the collection holds no books.
    ///
    /// Returns the number of books inserted.
    pub async fn seed_if_empty(&self) -> CatalogResult<usize> {
        let existing = self
            .backend
            .query(Query::builder().limit(1).build())
            .await?;

        if !existing.is_empty() {
            debug!("catalog already populated, skipping seed");
            return Ok(0);
        }

        let sample = sample_catalog();
        let count = sample.len();
        for book in sample {
            self.backend.insert(book).await?;
        }
        info!(count, "seeded sample catalog");

        Ok(count)
    }

    /// Shuts down the backend.
    pub async fn shutdown(&self) -> CatalogResult<()> {
        self.backend.shutdown().await
    }
}
