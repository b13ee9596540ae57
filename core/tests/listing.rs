mod common;

use std::sync::Arc;

use quarry_core::{
    domain::{
        common::entities::app_errors::CoreError,
        repository::{
            entities::{Listing, Record},
            ports::ResourceRepository,
            value_objects::{Capabilities, PaginationMode, RequestParameters, SortDirection},
        },
    },
    entity::products,
    infrastructure::repository::{Repository, RepositoryConfig, ResolvedConfig},
};
use sea_orm::{DatabaseConnection, DbBackend, QueryTrait};
use serde_json::json;

use common::{insert_product, setup_db, translate_product};

fn params(pairs: &[(&str, &str)]) -> RequestParameters {
    RequestParameters::from_pairs(pairs.iter().copied())
}

fn shop_config() -> Arc<ResolvedConfig<products::Entity>> {
    Arc::new(
        RepositoryConfig::new(Capabilities::ALL)
            .sortable(["price"])
            .searchable(["title"])
            .filter("status")
            .records_per_page(12)
            .resolve()
            .expect("config resolves"),
    )
}

async fn seed_shirts(db: &DatabaseConnection) {
    for i in 1..=25 {
        insert_product(
            db,
            &format!("shirt-{i}"),
            &format!("Cotton shirt {i}"),
            "active",
            i as f64,
        )
        .await;
    }
    for i in 1..=4 {
        insert_product(db, &format!("draft-shirt-{i}"), "Draft shirt", "draft", 100.0 + i as f64)
            .await;
        insert_product(db, &format!("pants-{i}"), "Linen pants", "active", 200.0 + i as f64).await;
    }
}

#[tokio::test]
async fn list_composes_search_filter_sort_and_page() {
    let db = setup_db().await;
    seed_shirts(&db).await;

    let request = params(&[
        ("q", "shirt"),
        ("status", "active"),
        ("sort_by", "price"),
        ("sort_type", "desc"),
        ("per_page", "10"),
    ]);

    let listing = Repository::new(db, shop_config(), request)
        .list()
        .await
        .expect("listing succeeds");

    let Listing::Paginated(page) = listing else {
        panic!("expected a paginated listing");
    };

    assert_eq!(page.data.len(), 10);
    assert_eq!(page.total, Some(25));
    assert_eq!(page.last_page, Some(3));
    assert!(page.has_more_pages);

    let prices = page
        .data
        .iter()
        .map(|entry| entry.model.price)
        .collect::<Vec<f64>>();
    assert_eq!(prices.first(), Some(&25.0));
    assert!(prices.windows(2).all(|pair| pair[0] > pair[1]));
    assert!(page.data.iter().all(|entry| {
        entry.model.status == "active" && entry.model.title.contains("shirt")
    }));
}

#[tokio::test]
async fn list_last_page_and_carried_query() {
    let db = setup_db().await;
    seed_shirts(&db).await;

    let request = params(&[
        ("q", "shirt"),
        ("status", "active"),
        ("per_page", "10"),
        ("page", "3"),
    ]);

    let Listing::Paginated(page) = Repository::new(db, shop_config(), request)
        .list()
        .await
        .expect("listing succeeds")
    else {
        panic!("expected a paginated listing");
    };

    assert_eq!(page.data.len(), 5);
    assert_eq!(page.from, Some(21));
    assert!(!page.has_more_pages);

    let page = page.with_path("/products");
    let links = page.links.expect("links");
    assert_eq!(links.next, None);
    assert!(links.first.contains("q=shirt"));
    assert!(links.first.ends_with("page=1"));
    assert!(!links.first.contains("page=3"));
}

#[tokio::test]
async fn list_simple_pagination_reports_more_pages_without_total() {
    let db = setup_db().await;
    seed_shirts(&db).await;

    let config = RepositoryConfig::<products::Entity>::new(Capabilities::ALL)
        .sort_field("price")
        .sort_type(SortDirection::Asc)
        .force_pagination(true)
        .records_per_page(5)
        .pagination_mode(PaginationMode::Simple)
        .resolve()
        .expect("config resolves");

    let Listing::Paginated(page) = Repository::new(db, Arc::new(config), RequestParameters::new())
        .list()
        .await
        .expect("listing succeeds")
    else {
        panic!("expected a paginated listing");
    };

    assert_eq!(page.data.len(), 5);
    assert_eq!(page.total, None);
    assert_eq!(page.last_page, None);
    assert!(page.has_more_pages);
    assert_eq!(page.data[0].model.price, 1.0);
}

#[tokio::test]
async fn list_without_per_page_returns_every_row() {
    let db = setup_db().await;
    seed_shirts(&db).await;

    let listing = Repository::new(db, shop_config(), params(&[("status", "draft")]))
        .list()
        .await
        .expect("listing succeeds");

    assert!(!listing.is_paginated());
    assert_eq!(listing.entries().len(), 4);
}

#[tokio::test]
async fn invalid_per_page_falls_back_to_default() {
    let db = setup_db().await;
    seed_shirts(&db).await;

    let Listing::Paginated(page) =
        Repository::new(db, shop_config(), params(&[("per_page", "abc")]))
            .list()
            .await
            .expect("listing succeeds")
    else {
        panic!("expected a paginated listing");
    };

    assert_eq!(page.per_page, 12);
    assert_eq!(page.data.len(), 12);
}

#[tokio::test]
async fn search_matches_wildcards_literally() {
    let db = setup_db().await;
    insert_product(&db, "full-cotton", "100% cotton tee", "active", 10.0).await;
    insert_product(&db, "thousand", "1000 cotton tee", "active", 10.0).await;
    insert_product(&db, "under", "cotton_blend tee", "active", 10.0).await;
    insert_product(&db, "space", "cotton blend tee", "active", 10.0).await;

    let percent = Repository::new(db.clone(), shop_config(), params(&[("q", "100%")]))
        .list()
        .await
        .expect("listing succeeds");
    let slugs = percent
        .entries()
        .iter()
        .map(|entry| entry.model.slug.as_str())
        .collect::<Vec<_>>();
    assert_eq!(slugs, vec!["full-cotton"]);

    let underscore = Repository::new(db, shop_config(), params(&[("q", "cotton_")]))
        .list()
        .await
        .expect("listing succeeds");
    assert_eq!(underscore.entries().len(), 1);
    assert_eq!(underscore.entries()[0].model.slug, "under");
}

#[tokio::test]
async fn blank_search_is_ignored() {
    let db = setup_db().await;
    seed_shirts(&db).await;

    let listing = Repository::new(db, shop_config(), params(&[("q", "   ")]))
        .list()
        .await
        .expect("listing succeeds");

    assert_eq!(listing.entries().len(), 33);
}

#[tokio::test]
async fn sort_and_search_on_translations() {
    let db = setup_db().await;
    let mug = insert_product(&db, "mug", "Mug", "active", 8.0).await;
    let cup = insert_product(&db, "cup", "Cup", "active", 6.0).await;
    translate_product(&db, mug.id, "en", "Mug").await;
    translate_product(&db, mug.id, "fr", "Tasse").await;
    translate_product(&db, cup.id, "en", "Cup").await;
    translate_product(&db, cup.id, "fr", "Gobelet").await;

    let config = Arc::new(
        RepositoryConfig::<products::Entity>::new(Capabilities::SORT | Capabilities::SEARCH)
            .sortable(["title", "translations.name"])
            .searchable(["translations.name"])
            .resolve()
            .expect("config resolves"),
    );

    let sorted = Repository::new(db.clone(), config.clone(), params(&[("sort_by", "name")]))
        .with_locale("fr")
        .list()
        .await
        .expect("listing succeeds");
    let slugs = sorted
        .entries()
        .iter()
        .map(|entry| entry.model.slug.as_str())
        .collect::<Vec<_>>();
    assert_eq!(slugs, vec!["cup", "mug"]);

    let found = Repository::new(db, config, params(&[("q", "tasse")]))
        .list()
        .await
        .expect("listing succeeds");
    assert_eq!(found.entries().len(), 1);
    assert_eq!(found.entries()[0].model.slug, "mug");
}

#[test]
fn composed_query_shape() {
    let config = Arc::new(
        RepositoryConfig::<products::Entity>::new(Capabilities::ALL)
            .sortable(["price", "translations.name"])
            .searchable(["title", "translations.name"])
            .filter("status")
            .filter(("category", "categories"))
            .resolve()
            .expect("config resolves"),
    );

    let request = params(&[
        ("q", "50%"),
        ("sort_by", "name"),
        ("sort_type", "desc"),
        ("status", "active"),
        ("category", "4"),
    ]);

    let state = Repository::new(DatabaseConnection::Disconnected, config, request)
        .with_locale("fr")
        .prepare()
        .expect("pipeline composes");
    let sql = state.select.build(DbBackend::Postgres).to_string();

    assert_eq!(sql.matches("ORDER BY").count(), 1, "{sql}");
    assert!(
        sql.contains(r#"LEFT JOIN "product_translations" AS "sort_translations""#),
        "{sql}"
    );
    assert!(sql.contains(r#""sort_translations"."locale" = 'fr'"#), "{sql}");
    assert!(sql.contains(r#"ORDER BY "sort_translations"."name" DESC"#), "{sql}");
    assert!(sql.contains(r#""products"."title" LIKE '%50!%%' ESCAPE '!'"#), "{sql}");
    assert!(sql.contains("EXISTS"), "{sql}");
    assert!(
        sql.contains(r#""product_translations"."name" LIKE '%50!%%' ESCAPE '!'"#),
        "{sql}"
    );
    assert!(sql.contains(r#""products"."status" = 'active'"#), "{sql}");
    assert!(
        sql.contains(
            r#""products"."id" IN (SELECT "product_id" FROM "category_product" WHERE "category_id" = 4)"#
        ),
        "{sql}"
    );
    assert!(sql.contains(r#""products"."deleted_at" IS NULL"#), "{sql}");
}

#[test]
fn forward_exposes_the_query() {
    let repository = Repository::new(
        DatabaseConnection::Disconnected,
        shop_config(),
        RequestParameters::new(),
    )
    .forward(|select| {
        use sea_orm::{ColumnTrait, QueryFilter};
        select.filter(products::Column::Price.gt(10.0))
    });

    let sql = repository.query().build(DbBackend::Postgres).to_string();
    assert!(sql.contains(r#""products"."price" > 10"#), "{sql}");
}

#[tokio::test]
async fn uncoercible_filter_is_rejected() {
    let db = setup_db().await;
    let config = Arc::new(
        RepositoryConfig::<products::Entity>::new(Capabilities::FILTER)
            .filter(("brand", "brand"))
            .resolve()
            .expect("config resolves"),
    );

    let result = Repository::new(db, config, params(&[("brand", "acme")]))
        .list()
        .await;

    assert_eq!(
        result.err(),
        Some(CoreError::InvalidParameter {
            key: "brand".to_string(),
            value: "acme".to_string(),
        })
    );
}

#[tokio::test]
async fn put_show_and_update_records() {
    let db = setup_db().await;
    let repository = Repository::new(db, shop_config(), RequestParameters::new());

    let created = repository
        .put(json!({
            "slug": "linen-shirt",
            "title": "Linen shirt",
            "status": "draft",
            "price": 42.5,
        }))
        .await
        .expect("product is created");
    assert_eq!(created.title, "Linen shirt");
    assert_eq!(created.sku, None);

    let shown = repository
        .show(Record::from("linen-shirt"))
        .await
        .expect("product is found");
    assert_eq!(shown.model.id, created.id);

    let updated = repository
        .update(Record::from("linen-shirt"), json!({ "status": "active", "price": 40 }))
        .await
        .expect("product is updated");
    assert_eq!(updated.status, "active");
    assert_eq!(updated.price, 40.0);
    assert_eq!(updated.title, "Linen shirt");

    let missing = repository.show(Record::from("wool-shirt")).await;
    assert_eq!(missing.err(), Some(CoreError::NotFound));
}

#[tokio::test]
async fn put_rejects_unknown_attributes() {
    let db = setup_db().await;
    let repository = Repository::new(db, shop_config(), RequestParameters::new());

    let result = repository
        .put(json!({ "slug": "x", "title": "X", "status": "draft", "price": 1, "colour": "red" }))
        .await;
    assert_eq!(
        result.err(),
        Some(CoreError::UnknownAttribute("colour".to_string()))
    );

    let not_an_object = repository.put(json!(["slug"])).await;
    assert!(matches!(not_an_object, Err(CoreError::DataShape(_))));
}

#[tokio::test]
async fn update_cannot_rewrite_the_primary_key() {
    let db = setup_db().await;
    let first = insert_product(&db, "first", "First", "active", 10.0).await;
    let second = insert_product(&db, "second", "Second", "active", 20.0).await;
    let repository = Repository::new(db, shop_config(), RequestParameters::new());

    let result = repository
        .update(
            Record::from("first"),
            json!({ "id": second.id, "title": "Hijacked" }),
        )
        .await;
    assert_eq!(
        result.err(),
        Some(CoreError::UnknownAttribute("id".to_string()))
    );

    let first_after = repository.show(Record::from("first")).await.expect("first exists");
    let second_after = repository.show(Record::from("second")).await.expect("second exists");
    assert_eq!(first_after.model.id, first.id);
    assert_eq!(first_after.model.title, "First");
    assert_eq!(second_after.model.title, "Second");
}

#[tokio::test]
async fn huge_page_number_returns_an_empty_page() {
    let db = setup_db().await;
    seed_shirts(&db).await;

    for mode in [PaginationMode::Full, PaginationMode::Simple] {
        let config = Arc::new(
            RepositoryConfig::<products::Entity>::new(Capabilities::ALL)
                .pagination_mode(mode)
                .records_per_page(12)
                .resolve()
                .expect("config resolves"),
        );
        let listing = Repository::new(
            db.clone(),
            config,
            params(&[("per_page", "12"), ("page", "18446744073709551615")]),
        )
        .list()
        .await
        .expect("listing succeeds");

        let Listing::Paginated(page) = listing else {
            panic!("expected a paginated listing");
        };
        assert!(page.data.is_empty());
        assert!(!page.has_more_pages);
    }
}
