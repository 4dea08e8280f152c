//! Core of the livraria bookstore catalog.
//!
//! This crate provides:
//!
//! - **Book records** ([`book`]) - The catalog record, the create body and the partial-update patch
//! - **Query AST** ([`query`]) - Typed filter expressions, sorting and limits with a visitor
//! - **Snapshot engine** ([`engine`]) - Pure evaluation of queries over in-memory records
//! - **Backend abstraction** ([`backend`]) - The trait every storage implementation provides
//! - **Catalog service** ([`catalog`]) - Lookups, filters, extremum queries and mutations
//! - **Error handling** ([`error`]) - Error taxonomy and result alias
//! - **Sample data** ([`sample`]) - The starter catalog
//!
//! # Example
//!
//! ```ignore
//! use livraria::{catalog::Catalog, memory::InMemoryCatalog};
//!
//! let catalog = Catalog::new(InMemoryCatalog::new());
//! catalog.seed_if_empty().await?;
//!
//! let cheap = catalog.price_below(30.0).await?;
//! let orwell = catalog.by_publisher("editora b").await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as livraria_core;

pub mod backend;
pub mod book;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod query;
pub mod sample;
