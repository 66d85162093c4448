//! `dedup` command handlers.

use anyhow::Context;
use gamecat_dedup::{DedupEngine, DedupReport, RunMode};

/// Run one pass and print its report.
///
/// # Errors
///
/// Returns an error if the pass fails (the catalog is then unchanged) or the
/// report cannot be serialized.
pub(crate) async fn run_dedup(
    pool: &sqlx::PgPool,
    engine: &DedupEngine,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mode = if dry_run {
        RunMode::DryRun
    } else {
        RunMode::Apply
    };

    let report = gamecat_dedup::run_dedup_pass(pool, engine, mode)
        .await
        .context("dedup pass failed; no changes were committed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

pub(crate) fn render_report(report: &DedupReport) -> String {
    let mut out = String::new();
    for plan in &report.merges {
        let losers: Vec<String> = plan.losers.iter().map(ToString::to_string).collect();
        out.push_str(&format!(
            "cluster: keep {} <- [{}]\n",
            plan.survivor,
            losers.join(", ")
        ));
    }
    match report.mode {
        RunMode::DryRun => out.push_str(&format!(
            "dry-run: {} clusters found, {} products would be merged\n",
            report.clusters_found,
            report.planned_losers()
        )),
        RunMode::Apply => out.push_str(&format!(
            "{} clusters found, {} products merged, {} offers reassigned, {} attributes copied\n",
            report.clusters_found,
            report.products_merged,
            report.offers_reassigned,
            report.attributes_copied
        )),
    }
    out
}
