mod args;
mod input;

use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;
use serde::Serialize;
use solofeat_lib::solo::cell_counts::{CellCounts, CellFeatureCounter};
use solofeat_lib::solo::recorder::{merge_parts, FeatureRecorder, RecorderConfig, RecorderParts};
use solofeat_lib::solo::{FeatureStats, ReadEvidence, Whitelist};
use solofeat_lib::utils;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::commands::common;

pub use args::RecordArgs;
use input::{read_batch, InputLine};

/// Row of the per-cell feature count table.
#[derive(Debug, Serialize)]
struct CellCountRow<'a> {
    cb_index: u64,
    barcode: &'a str,
    features: u32,
}

/// Record one chunk of reads with a private recorder and stream buffer.
fn record_chunk(
    config: &RecorderConfig,
    counts_template: &CellCounts,
    chunk: &[InputLine],
) -> Result<RecorderParts<Vec<u8>>> {
    let mut recorder = FeatureRecorder::new(
        config.clone(),
        counts_template.empty_like(),
        Vec::with_capacity(chunk.len() * 48),
    );

    for line in chunk {
        let read = line.parse()?;
        let evidence = ReadEvidence {
            n_alignments: read.n_alignments,
            annotation: &read.annotation,
            alignment: &read.alignment,
        };
        recorder
            .record(
                &read.barcode,
                &evidence,
                read.read_index.unwrap_or(line.line_no),
            )
            .with_context(|| format!("Failed to record read on line {}", line.line_no + 1))?;
    }

    Ok(recorder.finish()?)
}

fn write_stats(path: &Path, stats: &FeatureStats) -> Result<()> {
    utils::make_parent_dirs(path)?;
    let mut writer = utils::get_writer(path, 6)?;
    stats.write_report(&mut writer)?;
    writer.flush()?;
    Ok(())
}

fn write_cell_counts(
    path: &Path,
    counts: &CellCounts,
    whitelist: Option<&Whitelist>,
) -> Result<()> {
    utils::make_parent_dirs(path)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(utils::get_writer(path, 6)?);

    for (cb_index, features) in counts.nonzero() {
        let barcode = whitelist
            .and_then(|wl| wl.barcode_by_id(cb_index))
            .unwrap_or("-");
        writer.serialize(CellCountRow {
            cb_index,
            barcode,
            features,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// `explicit`, or `<output><suffix>` when writing to a file.
fn report_path(explicit: &Option<PathBuf>, output: &Path, suffix: &str) -> Option<PathBuf> {
    explicit
        .clone()
        .or_else(|| common::sibling_path(output, suffix))
}

/// Entry point for the `record` command.
pub fn run_record(args: RecordArgs) -> Result<()> {
    let start_time = Instant::now();
    info!(
        "Recording {} features from {:?} into {:?}",
        args.feature, args.input, args.output
    );

    let active_threads = common::configure_global_thread_pool(args.threads)?;
    info!("Using {} worker threads", active_threads);

    let whitelist = match &args.whitelist {
        Some(path) => {
            info!("Loading cell barcode whitelist from {:?}", path);
            let whitelist = Whitelist::from_file(path)?;
            info!("Loaded {} whitelist barcodes", whitelist.len());
            Some(whitelist)
        }
        None => {
            info!("No whitelist given; keeping sparse per-cell counts");
            None
        }
    };

    let config = RecorderConfig {
        feature_type: args.feature,
        enabled: true,
        read_info: args.read_info,
    };
    let counts_template = CellCounts::new(whitelist.as_ref().map(Whitelist::len));

    utils::make_parent_dirs(&args.output)?;
    let mut out = utils::get_writer(&args.output, args.compression_level)?;
    let mut reader = utils::get_line_reader(&args.input)?;

    let chunk_size = args.chunk_size();
    let batch_lines = chunk_size.saturating_mul(active_threads.max(1));
    let mut next_line_no = 0u64;
    let mut total_reads = 0usize;
    let mut total_stats = FeatureStats::default();
    let mut total_counts = counts_template.empty_like();

    loop {
        let batch = read_batch(&mut reader, batch_lines, &mut next_line_no)?;
        if batch.is_empty() {
            break;
        }
        total_reads += batch.len();

        let parts = batch
            .par_chunks(chunk_size)
            .map(|chunk| record_chunk(&config, &counts_template, chunk))
            .collect::<Result<Vec<_>>>()?;

        for part in &parts {
            out.write_all(&part.out)
                .context("Failed to write feature records")?;
            merge_parts(&mut total_stats, &mut total_counts, part)?;
        }
        info!("Processed {} reads", total_reads);
    }
    out.flush().context("Failed to write feature records")?;
    drop(out);

    for (name, value) in total_stats.entries() {
        info!("{}: {}", name, value);
    }
    info!(
        "{} cells received {} feature units",
        total_counts.nonzero().len(),
        total_counts.total()
    );

    if let Some(path) = report_path(&args.stats, &args.output, ".stats") {
        write_stats(&path, &total_stats)?;
        info!("Wrote statistics to {:?}", path);
    }
    if let Some(path) = report_path(&args.cell_counts, &args.output, ".cell_counts.tsv") {
        write_cell_counts(&path, &total_counts, whitelist.as_ref())?;
        info!("Wrote per-cell counts to {:?}", path);
    }

    info!(
        "Recorded {} reads in {:.2?}",
        total_reads,
        start_time.elapsed()
    );
    Ok(())
}
