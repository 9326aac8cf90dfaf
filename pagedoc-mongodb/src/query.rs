//! Query translation from pagedoc expressions to MongoDB query syntax.
//!
//! This module translates pagedoc's abstract filter expressions into
//! MongoDB BSON documents for execution by the MongoDB query engine.

use bson::{Bson, Document, doc};

use pagedoc_core::{
    error::PagedocError,
    query::{Expr, FieldOp, QueryVisitor},
};

/// Translates pagedoc filter expressions into MongoDB query documents.
///
/// This struct implements the [`QueryVisitor`] trait to convert abstract
/// filter expressions into MongoDB's native BSON query syntax.
pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    /// Translates an optional filter, mapping absence to the match-all
    /// document.
    pub fn translate(filter: Option<&Expr>) -> Result<Document, PagedocError> {
        match filter {
            Some(expr) => MongoQueryTranslator.visit_expr(expr),
            None => Ok(doc! {}),
        }
    }
}

fn string_operand(op: &FieldOp, value: &Bson) -> Result<String, PagedocError> {
    match value {
        Bson::String(s) => Ok(regex::escape(s)),
        _ => Err(PagedocError::Backend(format!(
            "{op:?} operator requires a string value"
        ))),
    }
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = PagedocError;

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

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$not": self.visit_expr(expr)?,
        })
    }

    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: { "$exists": should_exist },
        })
    }

    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Ne => doc! { "$ne": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::Contains => match value {
                    Bson::Array(arr) => doc! { "$all": arr },
                    _ => doc! { "$regex": string_operand(op, value)? },
                },
                FieldOp::NotContains => match value {
                    Bson::Array(arr) => doc! { "$nin": arr },
                    _ => doc! { "$not": { "$regex": string_operand(op, value)? } },
                },
                FieldOp::StartsWith => doc! { "$regex": format!("^{}", string_operand(op, value)?) },
                FieldOp::EndsWith => doc! { "$regex": format!("{}$", string_operand(op, value)?) },
                FieldOp::AnyOf => doc! { "$in": match value {
                    Bson::Array(_) => value.clone(),
                    single => Bson::Array(vec![single.clone()]),
                } },
                FieldOp::NoneOf => doc! { "$nin": match value {
                    Bson::Array(_) => value.clone(),
                    single => Bson::Array(vec![single.clone()]),
                } },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagedoc_core::query::Filter;

    #[test]
    fn translates_comparisons_and_combinators() {
        let expr = Filter::eq("status", "active").and(Filter::gt("rank", 3));

        let translated = MongoQueryTranslator.visit_expr(&expr).unwrap();

        assert_eq!(
            translated,
            doc! { "$and": [
                { "status": { "$eq": "active" } },
                { "rank": { "$gt": 3 } },
            ] }
        );
    }

    #[test]
    fn missing_filter_translates_to_match_all() {
        assert_eq!(MongoQueryTranslator::translate(None).unwrap(), doc! {});
    }

    #[test]
    fn string_patterns_are_escaped() {
        let translated = MongoQueryTranslator
            .visit_expr(&Filter::starts_with("name", "a.b"))
            .unwrap();

        assert_eq!(translated, doc! { "name": { "$regex": "^a\\.b" } });
    }

    #[test]
    fn any_of_wraps_scalar_operands() {
        let translated = MongoQueryTranslator
            .visit_expr(&Filter::any_of("tag", "red"))
            .unwrap();

        assert_eq!(translated, doc! { "tag": { "$in": ["red"] } });
    }
}
