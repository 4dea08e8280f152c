//! In-memory catalog backend for livraria.
//!
//! This crate provides a thread-safe, in-memory implementation of the `CatalogBackend` trait.
//! Queries are evaluated by the core snapshot engine while the collection is read-locked,
//! which makes it suitable for development, tests and small deployments.
//!
//! # Quick Start
//!
//! ```ignore
//! use livraria::{prelude::*, memory::InMemoryCatalog};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::new(InMemoryCatalog::builder().build().await?);
//!     catalog.seed_if_empty().await?;
//!
//!     for book in catalog.out_of_stock().await? {
//!         println!("{} is sold out", book.title);
//!     }
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as livraria_memory;

pub mod store;

pub use store::{InMemoryCatalog, InMemoryCatalogBuilder};
