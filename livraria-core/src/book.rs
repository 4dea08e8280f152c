//! The book record and the request shapes used to create and patch it.
//!
//! Field names on the wire follow the catalog's public JSON format (`titulo`, `autor`,
//! `editora`, `ano`, `quant`, `preco`). [`BookField`] maps each attribute to that key so
//! queries can address fields without stringly-typed names.

use bson::{Bson, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Identifier of a book within the catalog.
pub type BookId = i64;

/// A single book entry in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "autor")]
    pub author: String,
    #[serde(rename = "editora")]
    pub publisher: String,
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "quant")]
    pub quantity: u32,
    #[serde(rename = "preco")]
    pub price: f64,
}

impl Book {
    /// Converts this book to a BSON value for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_bson(&self) -> CatalogResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    /// Creates a book from a stored BSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not have the shape of a book.
    pub fn from_bson(bson: Bson) -> CatalogResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }
}

/// The body of a create request: every attribute except the id.
///
/// Unknown keys, including `id`, are rejected during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBook {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "autor")]
    pub author: String,
    #[serde(rename = "editora")]
    pub publisher: String,
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "quant")]
    pub quantity: u32,
    #[serde(rename = "preco")]
    pub price: f64,
}

impl NewBook {
    /// Checks the constraints serde cannot express.
    pub fn validate(&self) -> CatalogResult<()> {
        validate_price(self.price)
    }

    /// Attaches an id, producing the stored record.
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            publisher: self.publisher,
            year: self.year,
            quantity: self.quantity,
            price: self.price,
        }
    }
}

/// A partial update. Present fields overwrite the stored value, absent fields are kept.
///
/// Unknown keys are rejected during deserialization, and the id cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookPatch {
    #[serde(rename = "titulo", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "autor", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(rename = "editora", default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(rename = "ano", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "quant", default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(rename = "preco", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl BookPatch {
    pub fn validate(&self) -> CatalogResult<()> {
        match self.price {
            Some(price) => validate_price(price),
            None => Ok(()),
        }
    }

    /// The present fields as a BSON document keyed by their stored names.
    pub fn to_bson(&self) -> CatalogResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    /// Merges the present fields into `book`.
    pub fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(publisher) = self.publisher {
            book.publisher = publisher;
        }
        if let Some(year) = self.year {
            book.year = year;
        }
        if let Some(quantity) = self.quantity {
            book.quantity = quantity;
        }
        if let Some(price) = self.price {
            book.price = price;
        }
    }
}

fn validate_price(price: f64) -> CatalogResult<()> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(CatalogError::invalid(format!(
            "preco must be a non-negative number, got {price}"
        )))
    }
}

/// Addressable attributes of a [`Book`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookField {
    Id,
    Title,
    Author,
    Publisher,
    Year,
    Quantity,
    Price,
}

impl BookField {
    /// The key this field is serialized under.
    pub fn key(&self) -> &'static str {
        match self {
            BookField::Id => "id",
            BookField::Title => "titulo",
            BookField::Author => "autor",
            BookField::Publisher => "editora",
            BookField::Year => "ano",
            BookField::Quantity => "quant",
            BookField::Price => "preco",
        }
    }
}
