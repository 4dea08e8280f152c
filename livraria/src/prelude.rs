//! Convenient re-exports of commonly used types from livraria.
//!
//! ```ignore
//! use livraria::prelude::*;
//! ```

pub use livraria_core::{
    backend::{CatalogBackend, CatalogBackendBuilder},
    book::{Book, BookField, BookId, BookPatch, NewBook},
    catalog::Catalog,
    error::{CatalogError, CatalogResult},
    query::{Expr, FieldOp, Filter, Query, QueryBuilder, QueryVisitor, Sort, SortDirection},
};
