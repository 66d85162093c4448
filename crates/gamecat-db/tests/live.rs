//! Live integration tests for gamecat-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/gamecat-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.
//!
//! These need a reachable `DATABASE_URL` and are ignored by default.
//! Run with: `cargo test -p gamecat-db --test live -- --ignored`

use gamecat_core::{Attribute, Offer, Price, ReleaseYear};
use gamecat_db::{
    copy_attributes_skip_duplicates, count_offers_by_product, delete_attributes, delete_product,
    list_attributes_for_product, list_offers_for_product, list_platform_values,
    list_products_for_dedup, reassign_offers, set_repeatable_read, try_advisory_xact_lock,
    AttributeRow, DbError, OfferRow,
};
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_product(pool: &sqlx::PgPool, name: &str, year: Option<i32>) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO products (canonical_name, release_year) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(year)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_product failed for '{name}': {e}"))
}

async fn insert_offer(pool: &sqlx::PgPool, product_id: i64, source_id: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO offers (product_id, website_name, source_id, price, price_currency, url) \
         VALUES ($1, 'steam', $2, $3, 'USD', $4) RETURNING id",
    )
    .bind(product_id)
    .bind(source_id)
    .bind(Decimal::new(999, 2))
    .bind(format!("https://store.example/app/{source_id}"))
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_offer failed for '{source_id}': {e}"))
}

async fn insert_attribute(pool: &sqlx::PgPool, product_id: i64, name: &str, value: &str) {
    sqlx::query(
        "INSERT INTO attributes (product_id, attribute_name, attribute_value) VALUES ($1, $2, $3)",
    )
    .bind(product_id)
    .bind(name)
    .bind(value)
    .execute(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_attribute failed for {name}={value}: {e}"));
}

// ---------------------------------------------------------------------------
// Section 1: Snapshot reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn list_products_returns_records_ordered_by_id(pool: sqlx::PgPool) {
    let a = insert_product(&pool, "Half Life 2", Some(2004)).await;
    let b = insert_product(&pool, "Limbo", None).await;

    let records: Vec<_> = list_products_for_dedup(&pool)
        .await
        .expect("list_products_for_dedup failed")
        .into_iter()
        .map(gamecat_db::ProductRow::into_record)
        .collect();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, a);
    assert_eq!(records[0].release_year, ReleaseYear::Known(2004));
    assert_eq!(records[1].id, b);
    assert_eq!(records[1].release_year, ReleaseYear::Unknown);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn offer_counts_skip_products_without_offers(pool: sqlx::PgPool) {
    let a = insert_product(&pool, "Portal", Some(2007)).await;
    let b = insert_product(&pool, "Braid", Some(2008)).await;
    insert_offer(&pool, a, "400").await;
    insert_offer(&pool, a, "401").await;

    let counts = count_offers_by_product(&pool)
        .await
        .expect("count_offers_by_product failed");

    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].product_id, a);
    assert_eq!(counts[0].offer_count, 2);
    assert!(counts.iter().all(|c| c.product_id != b));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn platform_values_only_include_platform_attributes(pool: sqlx::PgPool) {
    let a = insert_product(&pool, "Portal", Some(2007)).await;
    insert_attribute(&pool, a, "platform", "Windows").await;
    insert_attribute(&pool, a, "genre", "puzzle").await;

    let rows = list_platform_values(&pool)
        .await
        .expect("list_platform_values failed");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].product_id, a);
    assert_eq!(rows[0].attribute_value, "Windows");
}

// ---------------------------------------------------------------------------
// Section 2: Merge writes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn merge_steps_fold_loser_into_survivor(pool: sqlx::PgPool) {
    let survivor = insert_product(&pool, "Half Life 2", Some(2004)).await;
    let loser = insert_product(&pool, "half life 2", Some(2004)).await;
    insert_offer(&pool, survivor, "220").await;
    let moved_offer = insert_offer(&pool, loser, "220-gog").await;
    insert_attribute(&pool, survivor, "genre", "shooter").await;
    insert_attribute(&pool, loser, "genre", "shooter").await;
    insert_attribute(&pool, loser, "developer", "Valve").await;
    insert_attribute(&pool, loser, "developer", "Valve").await;

    let mut tx = pool.begin().await.expect("begin failed");
    let moved = reassign_offers(&mut *tx, loser, survivor)
        .await
        .expect("reassign_offers failed");
    let copied = copy_attributes_skip_duplicates(&mut *tx, loser, survivor)
        .await
        .expect("copy_attributes_skip_duplicates failed");
    let deleted = delete_attributes(&mut *tx, loser)
        .await
        .expect("delete_attributes failed");
    delete_product(&mut *tx, loser)
        .await
        .expect("delete_product failed");
    tx.commit().await.expect("commit failed");

    assert_eq!(moved, 1);
    assert_eq!(copied, 1);
    assert_eq!(deleted, 3);

    let offers: Vec<Offer> = list_offers_for_product(&pool, survivor)
        .await
        .expect("list_offers_for_product failed")
        .into_iter()
        .map(OfferRow::into_offer)
        .collect();
    assert_eq!(offers.len(), 2);
    let moved = offers
        .iter()
        .find(|o| o.id == moved_offer)
        .expect("moved offer should belong to the survivor");
    assert_eq!(moved.product_id, survivor);
    assert_eq!(moved.source_id, "220-gog");
    assert_eq!(
        moved.price,
        Some(Price {
            amount: Decimal::new(999, 2),
            currency: "USD".to_string(),
        })
    );

    let attributes: Vec<Attribute> = list_attributes_for_product(&pool, survivor)
        .await
        .expect("list_attributes_for_product failed")
        .into_iter()
        .map(AttributeRow::into_attribute)
        .collect();
    assert_eq!(
        attributes,
        vec![
            Attribute::new(survivor, "developer", "Valve"),
            Attribute::new(survivor, "genre", "shooter"),
        ]
    );
    assert!(list_attributes_for_product(&pool, loser)
        .await
        .expect("list_attributes_for_product failed")
        .is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_product_reports_missing_rows(pool: sqlx::PgPool) {
    let err = delete_product(&pool, 9_999)
        .await
        .expect_err("deleting a missing product should fail");
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_product_is_rejected_while_offers_reference_it(pool: sqlx::PgPool) {
    let product = insert_product(&pool, "Portal", Some(2007)).await;
    insert_offer(&pool, product, "400").await;

    let err = delete_product(&pool, product)
        .await
        .expect_err("foreign key should reject the delete");
    assert!(matches!(err, DbError::Sqlx(_)));
}

// ---------------------------------------------------------------------------
// Section 3: Advisory lock
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn advisory_lock_is_exclusive_until_commit(pool: sqlx::PgPool) {
    let key = 42_i64;
    let mut first = pool.begin().await.expect("begin failed");
    assert!(try_advisory_xact_lock(&mut *first, key).await.expect("lock failed"));

    let mut second = pool.begin().await.expect("begin failed");
    assert!(!try_advisory_xact_lock(&mut *second, key).await.expect("lock failed"));
    second.rollback().await.expect("rollback failed");

    first.commit().await.expect("commit failed");

    let mut third = pool.begin().await.expect("begin failed");
    assert!(try_advisory_xact_lock(&mut *third, key).await.expect("lock failed"));
    third.rollback().await.expect("rollback failed");
}

// ---------------------------------------------------------------------------
// Section 4: Transaction isolation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn repeatable_read_pins_the_snapshot(pool: sqlx::PgPool) {
    let mut tx = pool.begin().await.expect("begin failed");
    set_repeatable_read(&mut *tx)
        .await
        .expect("set_repeatable_read failed");

    let level = sqlx::query_scalar::<_, String>("SHOW transaction_isolation")
        .fetch_one(&mut *tx)
        .await
        .expect("SHOW transaction_isolation failed");
    assert_eq!(level, "repeatable read");

    let before = list_products_for_dedup(&mut *tx)
        .await
        .expect("list_products_for_dedup failed");
    insert_product(&pool, "Braid", Some(2008)).await;
    let after = list_products_for_dedup(&mut *tx)
        .await
        .expect("list_products_for_dedup failed");
    assert_eq!(before.len(), after.len());

    tx.rollback().await.expect("rollback failed");
    assert_eq!(
        list_products_for_dedup(&pool)
            .await
            .expect("list_products_for_dedup failed")
            .len(),
        1
    );
}
