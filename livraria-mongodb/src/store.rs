use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Bson, Document, doc};
use mongodb::{
    Client, Collection as MongoCollection, Cursor,
    options::{ClientOptions, FindOptions, ReturnDocument},
};
use tracing::info;

use livraria_core::{
    backend::{CatalogBackend, CatalogBackendBuilder},
    book::{Book, BookId, BookPatch, NewBook},
    error::{CatalogError, CatalogResult},
    query::Query,
};

use crate::query::{extremum_pipeline, filter_document, sort_document};

const COUNTERS: &str = "counters";

fn backend_error(err: mongodb::error::Error) -> CatalogError {
    CatalogError::Backend(err.to_string())
}

/// Converts a book into its stored form, with the id moved to `_id`.
pub(crate) fn prepare_document(book: &Book) -> CatalogResult<Document> {
    let mut fields = book
        .to_bson()?
        .as_document()
        .cloned()
        .ok_or_else(|| CatalogError::Serialization("book did not serialize to a document".into()))?;
    fields.remove("id");

    Ok(Document::from_iter(
        [("_id".to_string(), Bson::Int64(book.id))]
            .into_iter()
            .chain(fields),
    ))
}

/// The `$set` operand for a patch: only the fields it carries.
pub(crate) fn set_document(patch: &BookPatch) -> CatalogResult<Document> {
    patch
        .to_bson()?
        .as_document()
        .cloned()
        .ok_or_else(|| CatalogError::Serialization("patch did not serialize to a document".into()))
}

/// Inverse of [`prepare_document`].
pub(crate) fn restore_document(mut document: Document) -> CatalogResult<Book> {
    let id = document
        .remove("_id")
        .ok_or_else(|| CatalogError::Serialization("stored book has no _id".into()))?;
    document.insert("id", id);

    Book::from_bson(Bson::Document(document))
}

/// MongoDB-backed catalog.
///
/// Books are stored one per document with the book id as `_id`. Ids are generated from a
/// per-collection sequence in the `counters` collection, incremented atomically, so an id
/// is never issued twice even after the book holding it is deleted.
#[derive(Debug)]
pub struct MongoDbCatalog {
    client: Client,
    database: String,
    collection: String,
}

impl MongoDbCatalog {
    pub fn new(client: Client, database: String, collection: String) -> Self {
        Self { client, database, collection }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbCatalogBuilder {
        MongoDbCatalogBuilder::new(dsn, database)
    }

    fn books(&self) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(&self.collection)
    }

    fn counters(&self) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(COUNTERS)
    }

    async fn next_id(&self) -> CatalogResult<BookId> {
        let counter = self.counters()
            .find_one_and_update(
                doc! { "_id": self.collection.as_str() },
                doc! { "$inc": { "seq": 1_i64 } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(backend_error)?
            .ok_or_else(|| CatalogError::Backend("id sequence missing after upsert".into()))?;

        counter
            .get_i64("seq")
            .map_err(|e| CatalogError::Backend(e.to_string()))
    }

    async fn collect(cursor: Cursor<Document>) -> CatalogResult<Vec<Book>> {
        cursor
            .try_collect::<Vec<Document>>()
            .await
            .map_err(backend_error)?
            .into_iter()
            .map(restore_document)
            .collect()
    }
}

#[async_trait]
impl CatalogBackend for MongoDbCatalog {
    async fn insert(&self, book: NewBook) -> CatalogResult<Book> {
        let book = book.into_book(self.next_id().await?);

        self.books()
            .insert_one(prepare_document(&book)?)
            .await
            .map_err(backend_error)?;

        Ok(book)
    }

    async fn get(&self, id: BookId) -> CatalogResult<Option<Book>> {
        self.books()
            .find_one(doc! { "_id": id })
            .await
            .map_err(backend_error)?
            .map(restore_document)
            .transpose()
    }

    async fn update(&self, id: BookId, patch: BookPatch) -> CatalogResult<Book> {
        let fields = set_document(&patch)?;
        if fields.is_empty() {
            return self.get(id).await?.ok_or(CatalogError::NotFound(id));
        }

        self.books()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await
            .map_err(backend_error)?
            .map(restore_document)
            .transpose()?
            .ok_or(CatalogError::NotFound(id))
    }

    async fn remove(&self, id: BookId) -> CatalogResult<()> {
        let result = self.books()
            .delete_one(doc! { "_id": id })
            .await
            .map_err(backend_error)?;

        if result.deleted_count == 0 {
            return Err(CatalogError::NotFound(id));
        }

        Ok(())
    }

    async fn query(&self, query: Query) -> CatalogResult<Vec<Book>> {
        if let Some(extremum) = &query.extremum {
            let cursor = self.books()
                .aggregate(extremum_pipeline(&query, extremum)?)
                .await
                .map_err(backend_error)?;

            return Self::collect(cursor).await;
        }

        let mut options = FindOptions::default();
        options.sort = Some(sort_document(&query));
        if let Some(limit) = query.limit {
            options.limit = Some(limit as i64);
        }

        let cursor = self.books()
            .find(filter_document(&query)?)
            .with_options(options)
            .await
            .map_err(backend_error)?;

        Self::collect(cursor).await
    }

    async fn shutdown(&self) -> CatalogResult<()> {
        self.client.clone().shutdown().await;

        Ok(())
    }
}

pub struct MongoDbCatalogBuilder {
    dsn: String,
    database: String,
    collection: String,
}

impl MongoDbCatalogBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
            collection: "livros".to_string(),
        }
    }

    /// Overrides the collection books are stored in (default `livros`).
    pub fn collection(mut self, name: &str) -> Self {
        self.collection = name.to_string();
        self
    }
}

#[async_trait]
impl CatalogBackendBuilder for MongoDbCatalogBuilder {
    type Backend = MongoDbCatalog;

    /// Connects and pings the server so a bad DSN fails at startup rather than on the
    /// first request.
    async fn build(self) -> CatalogResult<Self::Backend> {
        let client = Client::with_options(
            ClientOptions::parse(&self.dsn)
                .await
                .map_err(backend_error)?,
        )
        .map_err(backend_error)?;

        client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(backend_error)?;
        info!(database = %self.database, collection = %self.collection, "connected to MongoDB");

        Ok(MongoDbCatalog::new(client, self.database, self.collection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dom_quixote() -> Book {
        Book {
            id: 3,
            title: "Dom Quixote".into(),
            author: "Miguel de Cervantes".into(),
            publisher: "Editora C".into(),
            year: 1605,
            quantity: 2,
            price: 50.0,
        }
    }

    #[test]
    fn prepared_document_uses_id_as_primary_key() {
        let document = prepare_document(&dom_quixote()).unwrap();

        assert_eq!(document.get_i64("_id").unwrap(), 3);
        assert!(!document.contains_key("id"));
        assert_eq!(document.get_str("titulo").unwrap(), "Dom Quixote");
        assert_eq!(document.keys().next().map(String::as_str), Some("_id"));
    }

    #[test]
    fn restore_inverts_prepare() {
        let book = dom_quixote();

        assert_eq!(restore_document(prepare_document(&book).unwrap()).unwrap(), book);
    }

    #[test]
    fn set_document_leaves_absent_fields_alone() {
        let patch = BookPatch {
            quantity: Some(0),
            price: Some(39.9),
            ..Default::default()
        };

        let fields = set_document(&patch).unwrap();

        assert_eq!(fields.keys().collect::<Vec<_>>(), ["quant", "preco"]);
        assert_eq!(fields.get_f64("preco").unwrap(), 39.9);
        assert!(set_document(&BookPatch::default()).unwrap().is_empty());
    }

    #[test]
    fn builder_defaults_to_livros_collection() {
        let builder = MongoDbCatalogBuilder::new("mongodb://localhost:27017", "livraria");
        assert_eq!(builder.collection, "livros");

        let builder = builder.collection("estante");
        assert_eq!(builder.collection, "estante");
        assert_eq!(builder.database, "livraria");
    }

    #[test]
    fn restore_requires_primary_key() {
        let document = doc! { "titulo": "Sem id" };

        assert!(matches!(restore_document(document), Err(CatalogError::Serialization(_))));
    }
}
