//! Query construction for the book catalog.
//!
//! Queries are small typed ASTs: a filter [`Expr`] over [`BookField`]s, an optional sort and
//! an optional limit. Backends execute them through the [`QueryVisitor`] trait, either by
//! evaluating the expression against in-memory records or by translating it into the query
//! language of a database.
//!
//! ```ignore
//! use livraria::query::{Query, Filter, SortDirection};
//! use livraria::book::BookField;
//!
//! let query = Query::builder()
//!     .filter(Filter::gt(BookField::Price, 30.0).and(Filter::eq(BookField::Quantity, 0)))
//!     .sort(BookField::Year, SortDirection::Desc)
//!     .limit(1)
//!     .build();
//!
//! // Every book from the latest year, resolved in a single backend call.
//! let newest = Query::builder().extremum(BookField::Year, SortDirection::Desc).build();
//! ```

use bson::Bson;

use crate::{book::BookField, error::CatalogError};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (0 to 9, earliest to latest).
    Asc,
    /// Descending order (9 to 0, latest to earliest).
    Desc,
}

/// Sort specification for query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub field: BookField,
    pub direction: SortDirection,
}

/// Field comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    /// Exact match.
    Eq,
    /// Exact match on text, ignoring case.
    EqIgnoreCase,
    /// Unanchored substring match on text, ignoring case.
    ContainsIgnoreCase,
    /// Strictly greater than.
    Gt,
    /// Strictly less than.
    Lt,
}

/// A filter expression over book fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// All sub-expressions must match.
    And(Vec<Expr>),
    /// Any sub-expression must match.
    Or(Vec<Expr>),
    /// Inverts the sub-expression.
    Not(Box<Expr>),
    /// Field comparison.
    Field {
        field: BookField,
        op: FieldOp,
        value: Bson,
    },
}

impl Expr {
    pub fn field(field: BookField, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    /// Combines this expression with another using logical OR.
    ///
    /// If this expression is already an OR, the other expression is appended.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut list) => {
                list.push(other);
                Expr::Or(list)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }

    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }
}

/// Helper for constructing filter expressions.
pub struct Filter;

impl Filter {
    pub fn eq(field: BookField, value: impl Into<Bson>) -> Expr {
        Expr::field(field, FieldOp::Eq, value.into())
    }

    pub fn eq_ignore_case(field: BookField, value: impl Into<String>) -> Expr {
        Expr::field(field, FieldOp::EqIgnoreCase, Bson::String(value.into()))
    }

    pub fn contains_ignore_case(field: BookField, value: impl Into<String>) -> Expr {
        Expr::field(field, FieldOp::ContainsIgnoreCase, Bson::String(value.into()))
    }

    pub fn gt(field: BookField, value: impl Into<Bson>) -> Expr {
        Expr::field(field, FieldOp::Gt, value.into())
    }

    pub fn lt(field: BookField, value: impl Into<Bson>) -> Expr {
        Expr::field(field, FieldOp::Lt, value.into())
    }

    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }
}

/// A structured query for retrieving books.
///
/// Results are ordered by ascending id unless a [`Sort`] is given; ties under a sort keep
/// ascending id order.
///
/// The stages run in order: `filter`, then `extremum`, then `sort`, then `limit`. A backend
/// evaluates all of them against one view of the collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Filter expression; `None` matches every book.
    pub filter: Option<Expr>,
    /// Keeps only the filtered books whose field equals the first value under this ordering:
    /// the maximum for [`SortDirection::Desc`], the minimum for [`SortDirection::Asc`].
    pub extremum: Option<Sort>,
    /// Maximum number of books to return.
    pub limit: Option<usize>,
    pub sort: Option<Sort>,
}

impl Query {
    /// A query matching every book.
    pub fn all() -> Self {
        Query::default()
    }

    /// A query matching the books selected by `filter`.
    pub fn filtered(filter: Expr) -> Self {
        Query { filter: Some(filter), ..Query::default() }
    }

    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(filter);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn sort(mut self, field: BookField, direction: SortDirection) -> Self {
        self.query.sort = Some(Sort { field, direction });
        self
    }

    /// Restricts the result to the books tied at the edge of `field`.
    pub fn extremum(mut self, field: BookField, direction: SortDirection) -> Self {
        self.query.extremum = Some(Sort { field, direction });
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}

/// Walks a filter expression, producing one output per node.
///
/// Implemented by the in-memory evaluator (output `bool`) and by database translators
/// (output a native filter document).
pub trait QueryVisitor {
    type Output;
    type Error: Into<CatalogError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: BookField,
        op: FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Not(expr) => self.visit_not(expr),
            Expr::Field { field, op, value } => self.visit_field(*field, *op, value),
        }
    }
}
