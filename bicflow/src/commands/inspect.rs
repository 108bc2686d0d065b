// bicflow/src/commands/inspect.rs
//
// USE CASE: Inspect the paired tables (counts, orphans, sample derived rows).

use anyhow::Context;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use std::path::Path;

use bicflow_core::infrastructure::adapters::DuckDbGateway;

use super::resolve_config;

pub async fn execute(db: Option<String>, limit: usize) -> anyhow::Result<()> {
    let db_path = match db {
        Some(db) => db,
        None => resolve_config(None)?.persistence.database,
    };

    if db_path != ":memory:" && !Path::new(&db_path).exists() {
        anyhow::bail!(
            "❌ Database not found at: {}\n👉 Have you run 'bicflow ingest'?",
            db_path
        );
    }

    let gateway = DuckDbGateway::open(&db_path)
        .with_context(|| format!("Failed to open DuckDB at {}", db_path))?;

    let report = gateway.pairing_report().await?;
    println!("\n🔍 Store: '{}'", db_path);

    let mut counts = Table::new();
    counts
        .load_preset(UTF8_FULL)
        .set_header(vec!["raw", "derived", "raw without derived", "derived without raw"])
        .add_row(vec![
            report.raw_records.to_string(),
            report.derived_records.to_string(),
            report.orphan_raw.to_string(),
            report.orphan_derived.to_string(),
        ]);
    println!("{counts}");

    if report.is_consistent() {
        println!("   ✅ Every raw record has exactly one derived record");
    } else {
        println!("   ⚠️  Pairing is inconsistent");
    }

    let samples = gateway.sample_features(limit).await?;
    println!("   --- Derived rows (Limit {}) ---", limit);

    let mut rows = Table::new();
    rows.load_preset(UTF8_FULL).set_header(vec![
        "raw_id",
        "clean_text",
        "la",
        "ld",
        "nf",
        "nd",
        "ns",
        "ent",
        "reviewed",
        "self",
        "label",
    ]);
    for sample in samples {
        let f = &sample.features;
        rows.add_row(vec![
            sample.raw_id.to_string(),
            f.clean_text.clone(),
            format!("{:.3}", f.la_norm),
            format!("{:.3}", f.ld_norm),
            format!("{:.3}", f.nf_norm),
            format!("{:.3}", f.nd_norm),
            format!("{:.3}", f.ns_norm),
            format!("{:.3}", f.ent_norm),
            f.is_reviewed_norm.to_string(),
            f.is_self_authored_norm.to_string(),
            f.label.clone().unwrap_or_default(),
        ]);
    }
    println!("{rows}");

    Ok(())
}
