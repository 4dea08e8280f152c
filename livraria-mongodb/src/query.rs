//! Query translation from the catalog AST to MongoDB filter documents.
//!
//! Case-insensitive operators become regular expressions with the `i` option. Operands are
//! escaped first so user input such as `C++` or `(1984)` is matched literally.

use bson::{Bson, Document, doc};

use livraria_core::{
    book::BookField,
    error::CatalogError,
    query::{Expr, FieldOp, Query, QueryVisitor, Sort, SortDirection},
};

/// The stored key for a field. The book id doubles as the MongoDB primary key.
pub(crate) fn field_key(field: BookField) -> &'static str {
    match field {
        BookField::Id => "_id",
        other => other.key(),
    }
}

/// Escapes regular expression metacharacters so `input` matches itself.
pub(crate) fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '\\' | '.' | '^' | '$' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
                | '-' | '/'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// The filter document for `query`; an absent filter matches everything.
pub(crate) fn filter_document(query: &Query) -> Result<Document, CatalogError> {
    match &query.filter {
        Some(expr) => MongoQueryTranslator.visit_expr(expr),
        None => Ok(doc! {}),
    }
}

/// The sort document for `query`. Ascending `_id` breaks ties and orders unsorted results.
pub(crate) fn sort_document(query: &Query) -> Document {
    let mut sort = Document::new();
    if let Some(order) = &query.sort {
        sort.insert(
            field_key(order.field),
            match order.direction {
                SortDirection::Asc => 1,
                SortDirection::Desc => -1,
            },
        );
    }
    if !sort.contains_key("_id") {
        sort.insert("_id", 1);
    }
    sort
}

/// An aggregation pipeline that keeps the filtered books tied at the edge of
/// `extremum.field`, evaluated by the server as a single command.
pub(crate) fn extremum_pipeline(
    query: &Query,
    extremum: &Sort,
) -> Result<Vec<Document>, CatalogError> {
    let key = field_key(extremum.field);
    let value = format!("${key}");
    let grouped_value = format!("$books.{key}");
    let edge = match extremum.direction {
        SortDirection::Asc => doc! { "$min": value },
        SortDirection::Desc => doc! { "$max": value },
    };

    let mut pipeline = vec![
        doc! { "$match": filter_document(query)? },
        doc! { "$group": { "_id": Bson::Null, "edge": edge, "books": { "$push": "$$ROOT" } } },
        doc! { "$unwind": "$books" },
        doc! { "$match": { "$expr": { "$eq": [grouped_value, "$edge"] } } },
        doc! { "$replaceRoot": { "newRoot": "$books" } },
        doc! { "$sort": sort_document(query) },
    ];
    if let Some(limit) = query.limit {
        pipeline.push(doc! { "$limit": limit as i64 });
    }

    Ok(pipeline)
}

/// Translates catalog query expressions into MongoDB query documents.
pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    fn text_operand<'a>(
        field: BookField,
        op: FieldOp,
        value: &'a Bson,
    ) -> Result<&'a str, CatalogError> {
        match value {
            Bson::String(s) => Ok(s),
            _ => Err(CatalogError::invalid(format!(
                "{op:?} on {} requires a text operand",
                field.key()
            ))),
        }
    }
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = CatalogError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$or": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    // `$not` only applies to operator expressions, so a whole sub-filter is negated with `$nor`.
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$nor": [self.visit_expr(expr)?],
        })
    }

    fn visit_field(
        &mut self,
        field: BookField,
        op: FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field_key(field): match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::EqIgnoreCase => doc! {
                    "$regex": format!("^{}$", escape_regex(Self::text_operand(field, op, value)?)),
                    "$options": "i",
                },
                FieldOp::ContainsIgnoreCase => doc! {
                    "$regex": escape_regex(Self::text_operand(field, op, value)?),
                    "$options": "i",
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livraria_core::query::Filter;

    fn translate(expr: Expr) -> Result<Document, CatalogError> {
        MongoQueryTranslator.visit_expr(&expr)
    }

    #[test]
    fn comparison_operators_use_stored_keys() {
        assert_eq!(
            translate(Filter::gt(BookField::Price, 30.0)).unwrap(),
            doc! { "preco": { "$gt": 30.0 } }
        );
        assert_eq!(
            translate(Filter::eq(BookField::Quantity, 0)).unwrap(),
            doc! { "quant": { "$eq": 0 } }
        );
        assert_eq!(
            translate(Filter::eq(BookField::Id, 4_i64)).unwrap(),
            doc! { "_id": { "$eq": 4_i64 } }
        );
    }

    #[test]
    fn exact_ignore_case_is_anchored() {
        assert_eq!(
            translate(Filter::eq_ignore_case(BookField::Publisher, "Editora B")).unwrap(),
            doc! { "editora": { "$regex": "^Editora B$", "$options": "i" } }
        );
    }

    #[test]
    fn contains_escapes_metacharacters() {
        assert_eq!(
            translate(Filter::contains_ignore_case(BookField::Title, "C++ (2ª ed.)")).unwrap(),
            doc! { "titulo": { "$regex": r"C\+\+ \(2ª ed\.\)", "$options": "i" } }
        );
    }

    #[test]
    fn logical_operators_nest() {
        let expr = Filter::and([
            Filter::eq(BookField::Quantity, 0),
            Filter::lt(BookField::Year, 1900).not(),
        ]);

        assert_eq!(
            translate(expr).unwrap(),
            doc! {
                "$and": [
                    { "quant": { "$eq": 0 } },
                    { "$nor": [ { "ano": { "$lt": 1900 } } ] },
                ]
            }
        );
    }

    #[test]
    fn extremum_groups_then_keeps_ties() {
        let query = Query::builder()
            .extremum(BookField::Year, SortDirection::Desc)
            .build();
        let extremum = query.extremum.clone().unwrap();

        let pipeline = extremum_pipeline(&query, &extremum).unwrap();

        assert_eq!(
            pipeline,
            vec![
                doc! { "$match": {} },
                doc! {
                    "$group": {
                        "_id": Bson::Null,
                        "edge": { "$max": "$ano" },
                        "books": { "$push": "$$ROOT" },
                    }
                },
                doc! { "$unwind": "$books" },
                doc! { "$match": { "$expr": { "$eq": ["$books.ano", "$edge"] } } },
                doc! { "$replaceRoot": { "newRoot": "$books" } },
                doc! { "$sort": { "_id": 1 } },
            ]
        );
    }

    #[test]
    fn oldest_uses_min_and_keeps_limit() {
        let query = Query::builder()
            .filter(Filter::eq(BookField::Quantity, 0))
            .extremum(BookField::Year, SortDirection::Asc)
            .limit(2)
            .build();
        let extremum = query.extremum.clone().unwrap();

        let pipeline = extremum_pipeline(&query, &extremum).unwrap();

        assert_eq!(pipeline[0], doc! { "$match": { "quant": { "$eq": 0 } } });
        let group = pipeline[1].get_document("$group").unwrap();
        assert_eq!(group.get_document("edge").unwrap(), &doc! { "$min": "$ano" });
        assert_eq!(pipeline.last(), Some(&doc! { "$limit": 2_i64 }));
    }

    #[test]
    fn sort_document_breaks_ties_by_id() {
        let query = Query::builder().sort(BookField::Price, SortDirection::Desc).build();

        assert_eq!(sort_document(&query), doc! { "preco": -1, "_id": 1 });
        assert_eq!(sort_document(&Query::all()), doc! { "_id": 1 });
    }

    #[test]
    fn text_operator_needs_text_operand() {
        let expr = Expr::field(BookField::Title, FieldOp::ContainsIgnoreCase, Bson::Int32(3));

        assert!(matches!(translate(expr), Err(CatalogError::InvalidInput(_))));
    }
}
