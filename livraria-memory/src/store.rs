//! In-memory storage implementation for the catalog.
//!
//! Books live in an ordered map keyed by id behind an async-aware read-write lock, next to
//! the counter that hands out ids.

use std::{collections::BTreeMap, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;

use livraria_core::{
    backend::{CatalogBackend, CatalogBackendBuilder},
    book::{Book, BookId, BookPatch, NewBook},
    engine,
    error::{CatalogError, CatalogResult},
    query::Query,
};

#[derive(Debug)]
struct State {
    books: BTreeMap<BookId, Book>,
    next_id: BookId,
}

impl Default for State {
    fn default() -> Self {
        Self { books: BTreeMap::new(), next_id: 1 }
    }
}

/// Thread-safe in-memory catalog backend.
///
/// Cloning is cheap and clones share the same underlying collection. Queries scan every
/// record while holding the read lock, so each one sees a single consistent snapshot.
/// Ids come from a counter that only moves forward: deleting the newest book does not
/// make its id available again.
///
/// # Example
///
/// ```ignore
/// use livraria_memory::InMemoryCatalog;
/// use livraria::backend::CatalogBackend;
///
/// let store = InMemoryCatalog::new();
/// let book = store.insert(new_book).await?;
/// assert_eq!(book.id, 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<State>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog whose first id is `1`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InMemoryCatalogBuilder {
        InMemoryCatalogBuilder::default()
    }
}

#[async_trait]
impl CatalogBackend for InMemoryCatalog {
    async fn insert(&self, book: NewBook) -> CatalogResult<Book> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;

        let book = book.into_book(id);
        state.books.insert(id, book.clone());

        Ok(book)
    }

    async fn get(&self, id: BookId) -> CatalogResult<Option<Book>> {
        Ok(
            self.state
                .read()
                .await
                .books
                .get(&id)
                .cloned()
        )
    }

    async fn update(&self, id: BookId, patch: BookPatch) -> CatalogResult<Book> {
        let mut state = self.state.write().await;
        let book = state
            .books
            .get_mut(&id)
            .ok_or(CatalogError::NotFound(id))?;
        patch.apply(book);

        Ok(book.clone())
    }

    async fn remove(&self, id: BookId) -> CatalogResult<()> {
        let mut state = self.state.write().await;

        if state.books.remove(&id).is_none() {
            return Err(CatalogError::NotFound(id));
        }

        Ok(())
    }

    async fn query(&self, query: Query) -> CatalogResult<Vec<Book>> {
        let state = self.state.read().await;

        engine::execute(state.books.values(), &query)
    }
}

/// Builder for [`InMemoryCatalog`] instances.
///
/// Preloaded books keep their ids; the id counter starts after the largest one.
#[derive(Default)]
pub struct InMemoryCatalogBuilder {
    books: Vec<Book>,
}

impl InMemoryCatalogBuilder {
    /// Preloads the catalog with existing records.
    pub fn with_books(mut self, books: impl IntoIterator<Item = Book>) -> Self {
        self.books.extend(books);
        self
    }
}

#[async_trait]
impl CatalogBackendBuilder for InMemoryCatalogBuilder {
    type Backend = InMemoryCatalog;

    /// Fails with [`CatalogError::InvalidInput`] if two preloaded books share an id.
    async fn build(self) -> CatalogResult<Self::Backend> {
        let mut state = State::default();

        for book in self.books {
            if state.books.contains_key(&book.id) {
                return Err(CatalogError::invalid(format!("duplicate book id {}", book.id)));
            }
            state.next_id = state.next_id.max(book.id + 1);
            state.books.insert(book.id, book);
        }

        Ok(InMemoryCatalog { state: Arc::new(RwLock::new(state)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livraria_core::{book::BookField, query::Filter, sample::sample_catalog};

    fn new_book(title: &str) -> NewBook {
        NewBook { title: title.into(), ..sample_catalog().remove(0) }
    }

    #[tokio::test]
    async fn ids_are_sequential_from_one() {
        let store = InMemoryCatalog::new();

        assert_eq!(store.insert(new_book("a")).await.unwrap().id, 1);
        assert_eq!(store.insert(new_book("b")).await.unwrap().id, 2);
    }

    #[tokio::test]
    async fn deleted_id_is_not_reused() {
        let store = InMemoryCatalog::new();
        store.insert(new_book("a")).await.unwrap();
        let second = store.insert(new_book("b")).await.unwrap();

        store.remove(second.id).await.unwrap();
        let third = store.insert(new_book("c")).await.unwrap();

        assert_eq!(third.id, 3);
        assert_eq!(store.get(second.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_and_remove_report_missing_ids() {
        let store = InMemoryCatalog::new();

        assert!(matches!(
            store.update(42, BookPatch::default()).await,
            Err(CatalogError::NotFound(42))
        ));
        assert!(matches!(store.remove(42).await, Err(CatalogError::NotFound(42))));
    }

    #[tokio::test]
    async fn concurrent_patches_to_different_fields_are_all_kept() {
        let store = InMemoryCatalog::new();
        let id = store.insert(new_book("a")).await.unwrap().id;

        for round in 0..50_u32 {
            let quantity = BookPatch { quantity: Some(round), ..Default::default() };
            let price = BookPatch { price: Some(f64::from(round)), ..Default::default() };

            let (left, right) = tokio::join!(
                tokio::spawn({
                    let store = store.clone();
                    async move { store.update(id, quantity).await }
                }),
                tokio::spawn({
                    let store = store.clone();
                    async move { store.update(id, price).await }
                }),
            );
            left.unwrap().unwrap();
            right.unwrap().unwrap();

            let stored = store.get(id).await.unwrap().unwrap();
            assert_eq!(stored.quantity, round);
            assert_eq!(stored.price, f64::from(round));
        }
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryCatalog::new();
        let clone = store.clone();
        let book = store.insert(new_book("shared")).await.unwrap();

        assert_eq!(clone.get(book.id).await.unwrap(), Some(book));
    }

    #[tokio::test]
    async fn builder_continues_after_preloaded_ids() {
        let store = InMemoryCatalog::builder()
            .with_books([new_book("x").into_book(7), new_book("y").into_book(3)])
            .build()
            .await
            .unwrap();

        assert_eq!(store.insert(new_book("z")).await.unwrap().id, 8);

        let titles: Vec<String> = store
            .query(Query::all())
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["y", "x", "z"]);
    }

    #[tokio::test]
    async fn builder_rejects_duplicate_ids() {
        let result = InMemoryCatalog::builder()
            .with_books([new_book("x").into_book(1), new_book("y").into_book(1)])
            .build()
            .await;

        assert!(matches!(result, Err(CatalogError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn query_runs_filter_through_engine() {
        let store = InMemoryCatalog::new();
        store.insert(new_book("O Hobbit")).await.unwrap();
        store.insert(new_book("Dom Quixote")).await.unwrap();

        let found = store
            .query(Query::filtered(Filter::contains_ignore_case(BookField::Title, "HOB")))
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "O Hobbit");
    }
}
