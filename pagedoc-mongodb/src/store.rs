//! MongoDB storage implementation for pagedoc stores.

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    options::{
        AggregateOptions, ClientOptions, Collation as MongoCollation, CollationStrength,
        CountOptions, FindOptions, Hint,
    },
};
use std::time::Duration;

use pagedoc_core::{
    backend::{FindPlan, StoreBackend, StoreBackendBuilder},
    error::{PagedocError, PagedocResult},
    pagination::PopulateSpec,
    query::{Collation, Expr},
};

use crate::{populate::lookup_stages, query::MongoQueryTranslator};

/// MongoDB-backed storage for pagedoc stores.
///
/// Deadlines are propagated to the server as `maxTimeMS` on reads, counts,
/// and aggregations, so slow operations are cancelled server-side instead
/// of holding the connection.
#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    fn find_options(plan: &FindPlan, deadline: Duration) -> PagedocResult<FindOptions> {
        let mut options = FindOptions::default();
        options.max_time = Some(deadline);
        options.limit = plan.limit;

        if !plan.sort.is_empty() {
            options.sort = Some(sort_document(plan));
        }
        if let Some(projection) = &plan.projection {
            options.projection = Some(projection_document(projection));
        }
        if let Some(collation) = &plan.collation {
            options.collation = Some(mongo_collation(collation)?);
        }
        if let Some(hint) = &plan.hint {
            options.hint = Some(Hint::Name(hint.clone()));
        }

        Ok(options)
    }

    fn aggregation_pipeline(
        plan: &FindPlan,
        populate: &[PopulateSpec],
    ) -> PagedocResult<Vec<Document>> {
        let mut pipeline = vec![doc! {
            "$match": MongoQueryTranslator::translate(plan.filter.as_ref())?,
        }];

        if !plan.sort.is_empty() {
            pipeline.push(doc! { "$sort": sort_document(plan) });
        }
        if let Some(limit) = plan.limit {
            pipeline.push(doc! { "$limit": limit });
        }
        // Joins run on the already-bounded page, never on the full scan.
        for spec in populate {
            pipeline.extend(lookup_stages(spec));
        }
        if let Some(projection) = &plan.projection {
            pipeline.push(doc! { "$project": projection_document(projection) });
        }

        Ok(pipeline)
    }
}

fn sort_document(plan: &FindPlan) -> Document {
    plan.sort
        .iter()
        .map(|key| (key.field.clone(), Bson::Int32(key.direction.as_i32())))
        .collect()
}

fn projection_document(fields: &[String]) -> Document {
    fields
        .iter()
        .map(|field| (field.clone(), Bson::Int32(1)))
        .collect()
}

fn mongo_collation(collation: &Collation) -> PagedocResult<MongoCollation> {
    let strength = collation
        .strength
        .map(|level| match level {
            1 => Ok(CollationStrength::Primary),
            2 => Ok(CollationStrength::Secondary),
            3 => Ok(CollationStrength::Tertiary),
            4 => Ok(CollationStrength::Quaternary),
            5 => Ok(CollationStrength::Identical),
            other => Err(PagedocError::Backend(format!(
                "unsupported collation strength {other}"
            ))),
        })
        .transpose()?;

    Ok(MongoCollation::builder()
        .locale(collation.locale.clone())
        .strength(strength)
        .build())
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
        _deadline: Duration,
    ) -> PagedocResult<()> {
        self.get_collection(collection)
            .insert_many(documents)
            .await
            .map_err(|e| PagedocError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn find_documents(
        &self,
        plan: FindPlan,
        collection: &str,
        deadline: Duration,
    ) -> PagedocResult<Vec<Document>> {
        let filter = MongoQueryTranslator::translate(plan.filter.as_ref())?;
        let options = Self::find_options(&plan, deadline)?;

        self.get_collection(collection)
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| PagedocError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| PagedocError::Backend(e.to_string()))
    }

    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
        deadline: Duration,
    ) -> PagedocResult<u64> {
        let mut options = CountOptions::default();
        options.max_time = Some(deadline);

        self.get_collection(collection)
            .count_documents(MongoQueryTranslator::translate(filter.as_ref())?)
            .with_options(options)
            .await
            .map_err(|e| PagedocError::Backend(e.to_string()))
    }

    async fn aggregate_documents(
        &self,
        plan: FindPlan,
        populate: &[PopulateSpec],
        collection: &str,
        deadline: Duration,
    ) -> PagedocResult<Vec<Document>> {
        let pipeline = Self::aggregation_pipeline(&plan, populate)?;

        let mut options = AggregateOptions::default();
        options.max_time = Some(deadline);
        if let Some(collation) = &plan.collation {
            options.collation = Some(mongo_collation(collation)?);
        }
        if let Some(hint) = &plan.hint {
            options.hint = Some(Hint::Name(hint.clone()));
        }

        self.get_collection(collection)
            .aggregate(pipeline)
            .with_options(options)
            .await
            .map_err(|e| PagedocError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| PagedocError::Backend(e.to_string()))
    }

    async fn drop_collection(&self, collection: &str) -> PagedocResult<()> {
        self.get_collection(collection)
            .drop()
            .await
            .map_err(|e| PagedocError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn shutdown(self) -> PagedocResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

/// Builder for [`MongoDbStore`] holding the connection configuration.
pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> PagedocResult<Self::Backend> {
        if self.dsn.is_empty() {
            return Err(PagedocError::Initialization(
                "connection string must not be empty".to_string(),
            ));
        }
        if self.database.is_empty() {
            return Err(PagedocError::Initialization(
                "database name must not be empty".to_string(),
            ));
        }

        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| PagedocError::Initialization(e.to_string()))?,
            )
            .map_err(|e| PagedocError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagedoc_core::query::{Filter, Sort, SortDirection};

    #[test]
    fn find_options_carry_plan_settings() {
        let plan = FindPlan {
            filter: Some(Filter::gt("rank", 1)),
            sort: vec![
                Sort::new("rank", SortDirection::Asc),
                Sort::new("_id", SortDirection::Asc),
            ],
            limit: Some(3),
            projection: Some(vec!["rank".to_string()]),
            collation: Some(Collation::new("en")),
            hint: Some("rank_1".to_string()),
        };

        let options = MongoDbStore::find_options(&plan, Duration::from_secs(10)).unwrap();

        assert_eq!(options.limit, Some(3));
        assert_eq!(options.max_time, Some(Duration::from_secs(10)));
        assert_eq!(options.sort, Some(doc! { "rank": 1, "_id": 1 }));
        assert_eq!(options.projection, Some(doc! { "rank": 1 }));
        assert!(matches!(options.hint, Some(Hint::Name(ref name)) if name == "rank_1"));
    }

    #[test]
    fn aggregation_pipeline_orders_stages() {
        let plan = FindPlan {
            sort: vec![Sort::new("_id", SortDirection::Desc)],
            limit: Some(5),
            ..FindPlan::default()
        };

        let pipeline =
            MongoDbStore::aggregation_pipeline(&plan, &[PopulateSpec::new("users", "author")])
                .unwrap();

        assert!(pipeline[0].contains_key("$match"));
        assert_eq!(pipeline[1], doc! { "$sort": { "_id": -1 } });
        assert_eq!(pipeline[2], doc! { "$limit": 5_i64 });
        assert!(pipeline[3].contains_key("$lookup"));
    }

    #[test]
    fn rejects_out_of_range_collation_strength() {
        let collation = Collation { locale: "en".to_string(), strength: Some(9) };

        assert!(mongo_collation(&collation).is_err());
    }

    #[tokio::test]
    async fn builder_rejects_empty_configuration() {
        let err = MongoDbStoreBuilder::new("", "db")
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, PagedocError::Initialization(_)));

        let err = MongoDbStoreBuilder::new("mongodb://localhost:27017", "")
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, PagedocError::Initialization(_)));
    }
}
