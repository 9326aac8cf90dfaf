//! End-to-end pagination behavior against the in-memory backend.

use bson::{Bson, doc, oid::ObjectId};
use pagedoc::{memory::InMemoryStore, prelude::*};
use serde::{Deserialize, Serialize};

fn oid(n: u8) -> ObjectId {
    ObjectId::parse_str(format!("{:024x}", n)).unwrap()
}

async fn seeded_store(documents: Vec<bson::Document>) -> DocumentStore<InMemoryStore> {
    let store = DocumentStore::new(InMemoryStore::new());
    store
        .collection("items")
        .insert_many(documents)
        .await
        .unwrap();

    store
}

async fn three_items() -> DocumentStore<InMemoryStore> {
    seeded_store(vec![
        doc! { "_id": oid(1), "name": "a" },
        doc! { "_id": oid(2), "name": "b" },
        doc! { "_id": oid(3), "name": "c" },
    ])
    .await
}

#[tokio::test]
async fn first_page_walks_forward_and_back() {
    let store = three_items().await;
    let items = store.collection("items");

    let first = items
        .paginate(PaginationParams::builder(2).sort_ascending(true).build())
        .await
        .unwrap();

    let names: Vec<&str> = first
        .items
        .iter()
        .map(|d| d.get_str("name").unwrap())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(!first.page.has_previous);
    assert!(first.page.has_next);

    // The next cursor addresses the last item of the page.
    let boundary = Cursor::decode(first.page.next.as_deref().unwrap()).unwrap();
    assert_eq!(boundary.values(), vec![&Bson::ObjectId(oid(2))]);

    let second = items
        .paginate(
            PaginationParams::builder(2)
                .sort_ascending(true)
                .next(first.page.next.unwrap())
                .build(),
        )
        .await
        .unwrap();

    let names: Vec<&str> = second
        .items
        .iter()
        .map(|d| d.get_str("name").unwrap())
        .collect();
    assert_eq!(names, vec!["c"]);
    assert!(second.page.has_previous);
    assert!(!second.page.has_next);

    // Walking back from the second page restores the first, in display order.
    let back = items
        .paginate(
            PaginationParams::builder(2)
                .sort_ascending(true)
                .previous(second.page.previous.unwrap())
                .build(),
        )
        .await
        .unwrap();

    let names: Vec<&str> = back
        .items
        .iter()
        .map(|d| d.get_str("name").unwrap())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(!back.page.has_previous);
    assert!(back.page.has_next);
}

#[tokio::test]
async fn descending_display_order_pages_consistently() {
    let store = three_items().await;
    let items = store.collection("items");

    let first = items
        .paginate(PaginationParams::builder(2).sort_ascending(false).build())
        .await
        .unwrap();

    let names: Vec<&str> = first
        .items
        .iter()
        .map(|d| d.get_str("name").unwrap())
        .collect();
    assert_eq!(names, vec!["c", "b"]);

    let second = items
        .paginate(
            PaginationParams::builder(2)
                .sort_ascending(false)
                .next(first.page.next.unwrap())
                .build(),
        )
        .await
        .unwrap();

    let names: Vec<&str> = second
        .items
        .iter()
        .map(|d| d.get_str("name").unwrap())
        .collect();
    assert_eq!(names, vec!["a"]);
}

#[tokio::test]
async fn exactly_full_page_reports_no_neighbors() {
    let store = seeded_store(vec![
        doc! { "_id": oid(1) },
        doc! { "_id": oid(2) },
    ])
    .await;

    let page = store
        .collection("items")
        .paginate(PaginationParams::builder(2).sort_ascending(true).build())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert!(!page.page.has_previous);
    assert!(!page.page.has_next);
    assert!(page.page.previous.is_none());
    assert!(page.page.next.is_none());
}

#[tokio::test]
async fn duplicate_field_values_are_tie_broken_by_id() {
    let store = seeded_store(vec![
        doc! { "_id": oid(2), "rank": 1 },
        doc! { "_id": oid(1), "rank": 1 },
        doc! { "_id": oid(3), "rank": 1 },
    ])
    .await;
    let items = store.collection("items");

    let params = || {
        PaginationParams::builder(2)
            .paginated_field("rank")
            .sort_ascending(true)
    };

    let first = items.paginate(params().build()).await.unwrap();
    let ids: Vec<ObjectId> = first
        .items
        .iter()
        .map(|d| d.get_object_id("_id").unwrap())
        .collect();
    assert_eq!(ids, vec![oid(1), oid(2)]);

    let second = items
        .paginate(params().next(first.page.next.unwrap()).build())
        .await
        .unwrap();
    let ids: Vec<ObjectId> = second
        .items
        .iter()
        .map(|d| d.get_object_id("_id").unwrap())
        .collect();
    assert_eq!(ids, vec![oid(3)]);
}

#[tokio::test]
async fn filter_applies_before_pagination() {
    let store = seeded_store(vec![
        doc! { "_id": oid(1), "status": "active" },
        doc! { "_id": oid(2), "status": "archived" },
        doc! { "_id": oid(3), "status": "active" },
    ])
    .await;

    let page = store
        .collection("items")
        .paginate(
            PaginationParams::builder(10)
                .filter(Filter::eq("status", "active"))
                .sort_ascending(true)
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert!(!page.page.has_next);
}

#[tokio::test]
async fn total_count_ignores_the_page_boundary() {
    let store = three_items().await;
    let items = store.collection("items");

    let first = items
        .paginate(
            PaginationParams::builder(2)
                .sort_ascending(true)
                .count_total(true)
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(first.page.count, Some(3));

    // The count still covers every match on later pages.
    let second = items
        .paginate(
            PaginationParams::builder(2)
                .sort_ascending(true)
                .count_total(true)
                .next(first.page.next.unwrap())
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(second.page.count, Some(3));
}

#[tokio::test]
async fn malformed_cursors_are_rejected_with_their_side() {
    let store = three_items().await;
    let items = store.collection("items");

    let err = items
        .paginate(
            PaginationParams::builder(2)
                .next("!!definitely not a cursor!!")
                .build(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PagedocError::MalformedCursor { side: CursorSide::Next, .. }
    ));

    let err = items
        .paginate(
            PaginationParams::builder(2)
                .previous("!!definitely not a cursor!!")
                .build(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PagedocError::MalformedCursor { side: CursorSide::Previous, .. }
    ));
}

#[tokio::test]
async fn cursor_component_count_must_match_the_paginated_field() {
    let store = three_items().await;

    // A single-component cursor is only valid when paginating on the
    // identifier field.
    let single = Cursor::from_pairs(vec![("_id".to_string(), Bson::ObjectId(oid(1)))])
        .encode()
        .unwrap();

    let err = store
        .collection("items")
        .paginate(
            PaginationParams::builder(2)
                .paginated_field("rank")
                .next(single)
                .build(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PagedocError::CursorComponentMismatch { side: CursorSide::Next, expected: 2, found: 1 }
    ));
}

#[tokio::test]
async fn populate_joins_survive_pagination() {
    let author = oid(9);
    let store = seeded_store(vec![
        doc! { "_id": oid(1), "title": "first", "author": author },
        doc! { "_id": oid(2), "title": "second", "author": author },
        doc! { "_id": oid(3), "title": "third", "author": oid(8) },
    ])
    .await;
    store
        .collection("users")
        .insert_many(vec![doc! { "_id": author, "name": "ann" }])
        .await
        .unwrap();

    let page = store
        .collection("items")
        .paginate(
            PaginationParams::builder(3)
                .sort_ascending(true)
                .populate(PopulateSpec::new("users", "author"))
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(page.items.len(), 3);
    assert!(!page.page.has_next);
    assert_eq!(
        page.items[0]
            .get_document("author")
            .unwrap()
            .get_str("name")
            .unwrap(),
        "ann"
    );
    // A dangling reference joins to null instead of failing the page.
    assert_eq!(page.items[2].get("author"), Some(&Bson::Null));
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Article {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    rank: i64,
}

impl Model for Article {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn collection_name() -> &'static str {
        "articles"
    }
}

#[tokio::test]
async fn typed_collections_paginate_models() {
    let store = DocumentStore::new(InMemoryStore::new());
    let articles = store.model_collection::<Article>();

    let models: Vec<Article> = (1u8..=3)
        .map(|n| Article {
            id: oid(n),
            title: format!("article {n}"),
            rank: n as i64,
        })
        .collect();
    articles.insert_many(&models).await.unwrap();

    let page = articles
        .paginate(
            PaginationParams::builder(2)
                .paginated_field("rank")
                .sort_ascending(false)
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(page.items, vec![models[2].clone(), models[1].clone()]);
    assert!(page.page.has_next);

    let found = articles.find_by_id(&oid(1)).await.unwrap();
    assert_eq!(found, Some(models[0].clone()));
    assert_eq!(articles.count(None).await.unwrap(), 3);
}

#[tokio::test]
async fn inserted_documents_receive_identifiers() {
    let store = DocumentStore::new(InMemoryStore::new());
    let items = store.collection("items");

    let id = items.insert_one(doc! { "name": "a" }).await.unwrap();
    let found = items.find_by_id(&id).await.unwrap().unwrap();

    assert_eq!(found.get_str("name").unwrap(), "a");
}
