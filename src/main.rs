use anyhow::{bail, Result};
use std::{env, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use wealthstats::pipeline;

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) args ─────────────────────────────────────────────────────
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        bail!(
            "usage: wealthstats <billionaires.csv> <ed_stats_country.csv> \
             [country_stats.csv] [out_dir (default: out)]"
        );
    }
    let billionaires = PathBuf::from(&args[0]);
    let ed_stats = PathBuf::from(&args[1]);
    let country_stats = args.get(2).map(PathBuf::from);
    let out_dir = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("out"));

    // ─── 3) run pipeline ─────────────────────────────────────────────
    let report = pipeline::run(
        &billionaires,
        &ed_stats,
        country_stats.as_deref(),
        &out_dir,
    )?;
    info!(
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        cols_out = report.columns_out,
        filled_columns = report.nulls_filled.len(),
        "done"
    );
    Ok(())
}
