//! `db` command handlers.

use anyhow::Context;

pub(crate) async fn run_ping(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    gamecat_db::ping(pool)
        .await
        .context("database did not answer")?;
    println!("database reachable");
    Ok(())
}

/// Apply pending migrations and list the versions this invocation applied.
pub(crate) async fn run_migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let statuses = gamecat_db::run_migrations(pool)
        .await
        .context("failed to apply migrations")?;

    let applied: Vec<_> = statuses.iter().filter(|s| s.applied).collect();
    for status in &applied {
        println!("applied {} {}", status.version, status.description);
    }
    println!(
        "{} migration(s) applied, {} known",
        applied.len(),
        statuses.len()
    );
    tracing::info!(applied = applied.len(), known = statuses.len(), "migrations complete");
    Ok(())
}
