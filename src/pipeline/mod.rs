// src/pipeline/mod.rs
//
// Thin I/O layer around the two transforms: CSVs in, one cleaned parquet
// plus a JSON run report out.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fs,
    fs::File,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{clean, merge};

/// Summary of one pipeline run, written next to the parquet output.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns_out: usize,
    /// Null counts per column as they stood after the merge, i.e. how many
    /// values the cleaning pass filled. Columns already complete are
    /// omitted.
    pub nulls_filled: BTreeMap<String, usize>,
    pub output_path: PathBuf,
}

pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let file =
        File::open(path).with_context(|| format!("failed to open CSV {}", path.display()))?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("failed to parse CSV {}", path.display()))?;
    debug!(
        path = %path.display(),
        rows = df.height(),
        cols = df.width(),
        "loaded CSV"
    );
    Ok(df)
}

/// Load, merge, clean, and write `cleaned.parquet` plus `report.json` into
/// `out_dir`. The parquet lands via a `.tmp` rename so a crash mid-write
/// never leaves a half-written final file.
#[tracing::instrument(skip_all, fields(out = %out_dir.display()))]
pub fn run(
    billionaires_csv: &Path,
    ed_stats_csv: &Path,
    country_stats_csv: Option<&Path>,
    out_dir: &Path,
) -> Result<RunReport> {
    let billionaires = load_csv(billionaires_csv)?;
    let ed_stats = load_csv(ed_stats_csv)?;
    let country_stats = country_stats_csv.map(load_csv).transpose()?;
    let rows_in = billionaires.height();

    let merged =
        merge::merge_billionaires_ed_stats(&billionaires, &ed_stats, country_stats.as_ref())?;
    let nulls_filled = null_counts(&merged);

    let mut cleaned = clean::clean_and_prepare_df(merged)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;
    let tmp_path = out_dir.join("cleaned.parquet.tmp");
    let final_path = out_dir.join("cleaned.parquet");
    {
        let mut tmp = File::create(&tmp_path)
            .with_context(|| format!("failed to create {}", tmp_path.display()))?;
        ParquetWriter::new(&mut tmp)
            .finish(&mut cleaned)
            .context("failed to write parquet")?;
    }
    fs::rename(&tmp_path, &final_path).with_context(|| {
        format!(
            "failed to rename {} to {}",
            tmp_path.display(),
            final_path.display()
        )
    })?;

    let report = RunReport {
        rows_in,
        rows_out: cleaned.height(),
        columns_out: cleaned.width(),
        nulls_filled,
        output_path: final_path.clone(),
    };
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(out_dir.join("report.json"), json)
        .with_context(|| format!("failed to write report in {}", out_dir.display()))?;

    info!(
        rows_out = report.rows_out,
        cols_out = report.columns_out,
        path = %final_path.display(),
        "wrote cleaned parquet"
    );
    Ok(report)
}

fn null_counts(df: &DataFrame) -> BTreeMap<String, usize> {
    clean::guaranteed_columns()
        .filter_map(|name| {
            let nulls = df.column(name).ok()?.null_count();
            (nulls > 0).then(|| (name.to_string(), nulls))
        })
        .collect()
}
