//! Aggregation stages implementing populate joins.
//!
//! Each [`PopulateSpec`] expands into a `$lookup` against the source
//! collection followed by an `$addFields` that replaces the local reference
//! with the joined result. Array references keep their array shape; scalar
//! references unwrap to a single joined document or null when dangling.

use bson::{Bson, Document, doc};

use pagedoc_core::pagination::PopulateSpec;

/// Builds the pipeline stages for one populate join.
pub(crate) fn lookup_stages(spec: &PopulateSpec) -> Vec<Document> {
    let local_path = format!("${}", spec.local_field);
    let foreign_path = format!("${}", spec.foreign_field);
    let staging_field = format!("{}__joined", spec.local_field);
    let staging_path = format!("${staging_field}");

    // Match scalar references with $eq and array references with $in, so a
    // single lookup serves both shapes.
    let mut pipeline = vec![doc! {
        "$match": {
            "$expr": {
                "$cond": {
                    "if": { "$isArray": "$$reference" },
                    "then": { "$in": [foreign_path.clone(), "$$reference".to_string()] },
                    "else": { "$eq": [foreign_path, "$$reference".to_string()] },
                }
            }
        }
    }];

    if let Some(projection) = &spec.projection {
        let fields: Document = projection
            .iter()
            .map(|field| (field.clone(), Bson::Int32(1)))
            .collect();
        pipeline.push(doc! { "$project": fields });
    }

    vec![
        doc! {
            "$lookup": {
                "from": spec.collection.clone(),
                "let": { "reference": local_path.clone() },
                "pipeline": pipeline,
                "as": staging_field.clone(),
            }
        },
        doc! {
            "$addFields": {
                spec.local_field.clone(): {
                    "$cond": {
                        "if": { "$isArray": local_path },
                        "then": staging_path.clone(),
                        "else": { "$ifNull": [ { "$first": staging_path }, Bson::Null ] },
                    }
                }
            }
        },
        doc! { "$unset": staging_field },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_lookup_addfields_and_unset() {
        let stages = lookup_stages(&PopulateSpec::new("users", "author"));

        assert_eq!(stages.len(), 3);

        let lookup = stages[0].get_document("$lookup").unwrap();
        assert_eq!(lookup.get_str("from").unwrap(), "users");
        assert_eq!(lookup.get_str("as").unwrap(), "author__joined");
        assert_eq!(
            lookup.get_document("let").unwrap(),
            &doc! { "reference": "$author" }
        );

        assert!(stages[1].get_document("$addFields").unwrap().get("author").is_some());
        assert_eq!(stages[2], doc! { "$unset": "author__joined" });
    }

    #[test]
    fn custom_foreign_field_is_used_in_match() {
        let stages = lookup_stages(
            &PopulateSpec::new("users", "author").with_foreign_field("email"),
        );

        let pipeline = stages[0]
            .get_document("$lookup")
            .unwrap()
            .get_array("pipeline")
            .unwrap();
        let rendered = format!("{:?}", pipeline[0]);

        assert!(rendered.contains("$email"));
    }

    #[test]
    fn projection_adds_a_project_stage() {
        let stages = lookup_stages(
            &PopulateSpec::new("users", "author")
                .with_projection(vec!["name".to_string()]),
        );

        let pipeline = stages[0]
            .get_document("$lookup")
            .unwrap()
            .get_array("pipeline")
            .unwrap();

        assert_eq!(pipeline.len(), 2);
        assert_eq!(
            pipeline[1],
            Bson::Document(doc! { "$project": { "name": 1 } })
        );
    }
}
