//! In-memory query evaluation over a snapshot of books.
//!
//! [`execute`] is a pure function: it reads the snapshot it is given and returns the
//! matching records without touching any shared state. Backends that hold their records in
//! memory call it while holding a consistent view of the collection.

use std::cmp::Ordering;

use bson::Bson;

use crate::{
    book::{Book, BookField},
    error::{CatalogError, CatalogResult},
    query::{Expr, FieldOp, Query, QueryVisitor, SortDirection},
};

/// Comparable view of a book attribute or a filter operand.
///
/// All numbers are normalized to `f64` so integer operands can be compared against
/// floating-point fields and vice versa.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Comparable<'a> {
    Null,
    Number(f64),
    Text(&'a str),
}

impl<'a> Comparable<'a> {
    pub(crate) fn of(book: &'a Book, field: BookField) -> Self {
        match field {
            BookField::Id => Comparable::Number(book.id as f64),
            BookField::Title => Comparable::Text(&book.title),
            BookField::Author => Comparable::Text(&book.author),
            BookField::Publisher => Comparable::Text(&book.publisher),
            BookField::Year => Comparable::Number(book.year as f64),
            BookField::Quantity => Comparable::Number(book.quantity as f64),
            BookField::Price => Comparable::Number(book.price),
        }
    }
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::String(value) => Comparable::Text(value),
            _ => Comparable::Null,
        }
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::Text(a), Comparable::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Comparable<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::Text(a), Comparable::Text(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Evaluates a filter expression against a single book.
pub struct BookEvaluator<'a> {
    book: &'a Book,
}

impl<'a> BookEvaluator<'a> {
    pub fn new(book: &'a Book) -> Self {
        Self { book }
    }

    pub fn matches(&mut self, expr: &Expr) -> CatalogResult<bool> {
        self.visit_expr(expr)
    }
}

impl QueryVisitor for BookEvaluator<'_> {
    type Output = bool;
    type Error = CatalogError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_field(
        &mut self,
        field: BookField,
        op: FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        let left = Comparable::of(self.book, field);
        let right = Comparable::from(value);

        match op {
            FieldOp::Eq => Ok(left == right),
            FieldOp::Gt => Ok(left.partial_cmp(&right) == Some(Ordering::Greater)),
            FieldOp::Lt => Ok(left.partial_cmp(&right) == Some(Ordering::Less)),
            FieldOp::EqIgnoreCase | FieldOp::ContainsIgnoreCase => match (left, right) {
                (Comparable::Text(haystack), Comparable::Text(needle)) => {
                    let haystack = haystack.to_lowercase();
                    let needle = needle.to_lowercase();

                    Ok(match op {
                        FieldOp::EqIgnoreCase => haystack == needle,
                        _ => haystack.contains(&needle),
                    })
                }
                (Comparable::Text(_), _) => Err(CatalogError::invalid(format!(
                    "{op:?} on {} requires a text operand",
                    field.key()
                ))),
                _ => Err(CatalogError::invalid(format!(
                    "{op:?} is only supported on text fields, not {}",
                    field.key()
                ))),
            },
        }
    }
}

/// Runs `query` over a snapshot of books.
///
/// The snapshot is expected in ascending id order; that order is kept for unsorted results
/// and for ties under a sort.
pub fn execute<'a>(
    books: impl IntoIterator<Item = &'a Book>,
    query: &Query,
) -> CatalogResult<Vec<Book>> {
    let mut selected = Vec::new();

    for book in books {
        let keep = match &query.filter {
            Some(filter) => BookEvaluator::new(book).matches(filter)?,
            None => true,
        };

        if keep {
            selected.push(book);
        }
    }

    if let Some(extremum) = &query.extremum {
        let edge = selected
            .iter()
            .map(|book| Comparable::of(*book, extremum.field))
            .reduce(|best, next| {
                let ahead = match extremum.direction {
                    SortDirection::Asc => next < best,
                    SortDirection::Desc => next > best,
                };
                if ahead { next } else { best }
            });

        if let Some(edge) = edge {
            selected.retain(|book| Comparable::of(book, extremum.field) == edge);
        }
    }

    if let Some(sort) = &query.sort {
        selected.sort_by(|a, b| {
            let left = Comparable::of(a, sort.field);
            let right = Comparable::of(b, sort.field);

            match sort.direction {
                SortDirection::Asc => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
                SortDirection::Desc => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
            }
        });
    }

    Ok(selected
        .into_iter()
        .take(query.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{query::Filter, sample::sample_catalog};

    fn snapshot() -> Vec<Book> {
        sample_catalog()
            .into_iter()
            .zip(1..)
            .map(|(book, id)| book.into_book(id))
            .collect()
    }

    fn ids(books: &[Book]) -> Vec<i64> {
        books.iter().map(|b| b.id).collect()
    }

    #[test]
    fn no_filter_returns_everything_in_order() {
        let books = snapshot();

        assert_eq!(ids(&execute(&books, &Query::all()).unwrap()), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn title_match_ignores_case_and_accents_are_kept() {
        let books = snapshot();
        let query = Query::filtered(Filter::contains_ignore_case(BookField::Title, "príncipe"));

        assert_eq!(ids(&execute(&books, &query).unwrap()), vec![1]);
    }

    #[test]
    fn publisher_match_is_exact_not_substring() {
        let books = snapshot();

        let exact = Query::filtered(Filter::eq_ignore_case(BookField::Publisher, "editora b"));
        let partial = Query::filtered(Filter::eq_ignore_case(BookField::Publisher, "editora"));

        assert_eq!(ids(&execute(&books, &exact).unwrap()), vec![2, 4]);
        assert!(execute(&books, &partial).unwrap().is_empty());
    }

    #[test]
    fn integer_operand_compares_against_float_field() {
        let books = snapshot();
        let query = Query::filtered(Filter::gt(BookField::Price, 30));

        assert_eq!(ids(&execute(&books, &query).unwrap()), vec![3, 5]);
    }

    #[test]
    fn sort_desc_with_limit_picks_extremum() {
        let books = snapshot();
        let query = Query::builder()
            .sort(BookField::Year, SortDirection::Desc)
            .limit(1)
            .build();

        assert_eq!(ids(&execute(&books, &query).unwrap()), vec![2]);
    }

    #[test]
    fn extremum_keeps_every_tie() {
        let mut books = snapshot();
        books[0].year = 1949;
        let newest = Query::builder().extremum(BookField::Year, SortDirection::Desc).build();
        let oldest = Query::builder().extremum(BookField::Year, SortDirection::Asc).build();

        assert_eq!(ids(&execute(&books, &newest).unwrap()), vec![1, 2]);
        assert_eq!(ids(&execute(&books, &oldest).unwrap()), vec![3]);
    }

    #[test]
    fn extremum_applies_after_filter() {
        let books = snapshot();
        let query = Query::builder()
            .filter(Filter::eq_ignore_case(BookField::Publisher, "editora b"))
            .extremum(BookField::Year, SortDirection::Asc)
            .build();

        assert_eq!(ids(&execute(&books, &query).unwrap()), vec![4]);
    }

    #[test]
    fn extremum_of_empty_snapshot_is_empty() {
        let query = Query::builder().extremum(BookField::Year, SortDirection::Desc).build();

        assert!(execute(&[], &query).unwrap().is_empty());
    }

    #[test]
    fn sort_keeps_id_order_for_ties() {
        let mut books = snapshot();
        books[4].year = 1949;
        let query = Query::builder().sort(BookField::Year, SortDirection::Desc).build();

        assert_eq!(ids(&execute(&books, &query).unwrap())[..2], [2, 5]);
    }

    #[test]
    fn not_and_or_compose() {
        let books = snapshot();
        let expr = Filter::or([
            Filter::eq(BookField::Quantity, 0),
            Filter::lt(BookField::Year, 1900),
        ])
        .not();

        assert_eq!(ids(&execute(&books, &Query::filtered(expr)).unwrap()), vec![1, 2, 5]);
    }

    #[test]
    fn text_operator_on_numeric_field_is_rejected() {
        let books = snapshot();
        let query = Query::filtered(Filter::contains_ignore_case(BookField::Price, "3"));

        assert!(matches!(execute(&books, &query), Err(CatalogError::InvalidInput(_))));
    }

    #[test]
    fn empty_snapshot_yields_empty_result() {
        let query = Query::filtered(Filter::eq(BookField::Quantity, 0));

        assert!(execute(&[], &query).unwrap().is_empty());
    }
}
