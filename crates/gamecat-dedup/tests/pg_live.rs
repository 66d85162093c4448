//! Full deduplication passes against Postgres via `#[sqlx::test]`.
//!
//! Need a reachable `DATABASE_URL`; ignored by default.
//! Run with: `cargo test -p gamecat-dedup --test pg_live -- --ignored`

use gamecat_dedup::{
    run_dedup_pass, DedupEngine, DedupError, DedupStore, MergePlan, PgDedupStore, RunMode,
    DEDUP_LOCK_KEY,
};

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

async fn insert_offers(pool: &sqlx::PgPool, product_id: i64, count: usize) {
    for n in 0..count {
        sqlx::query(
            "INSERT INTO offers (product_id, website_name, source_id, url) \
             VALUES ($1, 'steam', $2, 'https://store.example')",
        )
        .bind(product_id)
        .bind(format!("{product_id}-{n}"))
        .execute(pool)
        .await
        .unwrap_or_else(|e| panic!("insert_offers failed for product {product_id}: {e}"));
    }
}

async fn product_ids(pool: &sqlx::PgPool) -> Vec<i64> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM products ORDER BY id")
        .fetch_all(pool)
        .await
        .expect("product_ids query failed")
}

async fn offer_owners(pool: &sqlx::PgPool) -> Vec<i64> {
    sqlx::query_scalar::<_, i64>("SELECT product_id FROM offers ORDER BY id")
        .fetch_all(pool)
        .await
        .expect("offer_owners query failed")
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pass_merges_duplicates_and_commits(pool: sqlx::PgPool) {
    let hl2 = insert_product(&pool, "Half Life 2", Some(2004)).await;
    let hl2_dup = insert_product(&pool, "half life 2 ", Some(2004)).await;
    let portal = insert_product(&pool, "Portal", Some(2007)).await;
    insert_offers(&pool, hl2, 3).await;
    insert_offers(&pool, hl2_dup, 1).await;
    insert_offers(&pool, portal, 2).await;

    let report = run_dedup_pass(&pool, &DedupEngine::default(), RunMode::Apply)
        .await
        .expect("dedup pass failed");

    assert_eq!(
        report.merges,
        vec![MergePlan {
            survivor: hl2,
            losers: vec![hl2_dup],
        }]
    );
    assert_eq!(report.products_merged, 1);
    assert_eq!(product_ids(&pool).await, vec![hl2, portal]);
    assert_eq!(
        offer_owners(&pool).await,
        vec![hl2, hl2, hl2, hl2, portal, portal]
    );
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn dry_run_rolls_back(pool: sqlx::PgPool) {
    let a = insert_product(&pool, "Braid", Some(2008)).await;
    let b = insert_product(&pool, "braid", Some(2008)).await;

    let report = run_dedup_pass(&pool, &DedupEngine::default(), RunMode::DryRun)
        .await
        .expect("dry run failed");

    assert_eq!(report.clusters_found, 1);
    assert_eq!(report.products_merged, 0);
    assert_eq!(product_ids(&pool).await, vec![a, b]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_pass_is_refused(pool: sqlx::PgPool) {
    insert_product(&pool, "Braid", Some(2008)).await;
    insert_product(&pool, "braid", Some(2008)).await;

    let mut holder = pool.begin().await.expect("begin failed");
    assert!(gamecat_db::try_advisory_xact_lock(&mut *holder, DEDUP_LOCK_KEY)
        .await
        .expect("lock failed"));

    let err = run_dedup_pass(&pool, &DedupEngine::default(), RunMode::Apply)
        .await
        .expect_err("second pass should be refused");
    assert!(matches!(err, DedupError::RunInProgress));

    holder.rollback().await.expect("rollback failed");
    assert_eq!(product_ids(&pool).await.len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn store_reads_one_snapshot_for_the_whole_pass(pool: sqlx::PgPool) {
    insert_product(&pool, "Braid", Some(2008)).await;

    let mut store = PgDedupStore::begin(&pool).await.expect("begin failed");
    let before = store.load_products().await.expect("load_products failed");
    insert_product(&pool, "braid", Some(2008)).await;
    let after = store.load_products().await.expect("load_products failed");
    store.rollback().await.expect("rollback failed");

    assert_eq!(before, after);
    assert_eq!(product_ids(&pool).await.len(), 2);
}
