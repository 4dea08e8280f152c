//! HTTP routes for the catalog.
//!
//! ## Routes
//!
//! - `POST /livros` - create a book (201)
//! - `GET /livros` - list every book
//! - `GET|PUT|DELETE /livros/:id` - lookup, partial update (200) and delete (204)
//! - `GET /livros/editora/:editora` - exact publisher match, ignoring case
//! - `GET /livros/titulo/:palavra` - title substring match, ignoring case
//! - `GET /livros/preco/acima/:preco` and `/livros/preco/abaixo/:preco` - strict price bounds
//! - `GET /livros/recentes`, `/livros/antigos` - books from the latest / earliest year
//! - `GET /livros/sem-estoque` - books with zero quantity
//!
//! Static segments take precedence over `:id`, so `/livros/recentes` never reaches the id
//! lookup.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tracing::debug;

use livraria::{
    backend::CatalogBackend,
    book::{Book, BookId, BookPatch, NewBook},
    catalog::Catalog,
    error::CatalogError,
};

use crate::error::{ApiError, ApiResult};

/// The catalog shared by every request, over whichever backend was configured.
pub type SharedCatalog = Arc<Catalog<Arc<dyn CatalogBackend>>>;

/// Wraps a backend into the shared catalog the router expects.
pub fn shared_catalog(backend: Arc<dyn CatalogBackend>) -> SharedCatalog {
    Arc::new(Catalog::new(backend))
}

pub fn router(catalog: SharedCatalog) -> Router {
    Router::new()
        .route("/livros", get(list_books).post(create_book))
        .route("/livros/recentes", get(most_recent))
        .route("/livros/antigos", get(oldest))
        .route("/livros/sem-estoque", get(out_of_stock))
        .route("/livros/editora/:editora", get(by_publisher))
        .route("/livros/titulo/:palavra", get(title_contains))
        .route("/livros/preco/acima/:preco", get(price_above))
        .route("/livros/preco/abaixo/:preco", get(price_below))
        .route("/livros/:id", get(get_book).put(update_book).delete(delete_book))
        .fallback(unknown_endpoint)
        .with_state(catalog)
}

fn parse_id(raw: &str) -> Result<BookId, ApiError> {
    raw.parse::<BookId>()
        .map_err(|_| CatalogError::invalid(format!("id deve ser um inteiro: {raw:?}")).into())
}

fn parse_price(raw: &str) -> Result<f64, ApiError> {
    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(CatalogError::invalid(format!("preço deve ser numérico: {raw:?}")).into()),
    }
}

async fn list_books(State(catalog): State<SharedCatalog>) -> ApiResult<Json<Vec<Book>>> {
    Ok(Json(catalog.list().await?))
}

async fn create_book(
    State(catalog): State<SharedCatalog>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(book) = payload?;
    let created = catalog.create(book).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_book(
    State(catalog): State<SharedCatalog>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Book>> {
    let Path(id) = path?;

    Ok(Json(catalog.get(parse_id(&id)?).await?))
}

async fn update_book(
    State(catalog): State<SharedCatalog>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> ApiResult<Json<Book>> {
    let Path(id) = path?;
    let id = parse_id(&id)?;
    let Json(patch) = payload?;

    Ok(Json(catalog.update(id, patch).await?))
}

async fn delete_book(
    State(catalog): State<SharedCatalog>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    catalog.delete(parse_id(&id)?).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn by_publisher(
    State(catalog): State<SharedCatalog>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Vec<Book>>> {
    let Path(publisher) = path?;
    let books = catalog.by_publisher(&publisher).await?;
    debug!(%publisher, count = books.len(), "publisher filter");

    Ok(Json(books))
}

async fn title_contains(
    State(catalog): State<SharedCatalog>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Vec<Book>>> {
    let Path(word) = path?;
    let books = catalog.title_contains(&word).await?;
    debug!(%word, count = books.len(), "title filter");

    Ok(Json(books))
}

async fn price_above(
    State(catalog): State<SharedCatalog>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Vec<Book>>> {
    let Path(price) = path?;

    Ok(Json(catalog.price_above(parse_price(&price)?).await?))
}

async fn price_below(
    State(catalog): State<SharedCatalog>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Vec<Book>>> {
    let Path(price) = path?;

    Ok(Json(catalog.price_below(parse_price(&price)?).await?))
}

async fn most_recent(State(catalog): State<SharedCatalog>) -> ApiResult<Json<Vec<Book>>> {
    Ok(Json(catalog.most_recent().await?))
}

async fn oldest(State(catalog): State<SharedCatalog>) -> ApiResult<Json<Vec<Book>>> {
    Ok(Json(catalog.oldest().await?))
}

async fn out_of_stock(State(catalog): State<SharedCatalog>) -> ApiResult<Json<Vec<Book>>> {
    Ok(Json(catalog.out_of_stock().await?))
}

async fn unknown_endpoint() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "erro": "Endpoint não encontrado" })))
}
