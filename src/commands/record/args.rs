use solofeat_lib::solo::FeatureType;
use std::path::PathBuf;
use structopt::StructOpt;

/// Arguments for the `record` command.
#[derive(Debug, Clone, StructOpt)]
#[structopt(
    name = "record",
    about = "Assign reads to features and write the per-read record stream"
)]
pub struct RecordArgs {
    /// JSON-lines read evidence (`.gz` accepted, `-` for stdin).
    #[structopt(short, long, parse(from_os_str))]
    pub input: PathBuf,

    /// Output record stream (`.gz` compresses, `-` for stdout).
    #[structopt(short, long, parse(from_os_str))]
    pub output: PathBuf,

    /// Feature type: Gene, GeneFull, SJ, Transcript3p, VelocytoSimple or Velocyto.
    #[structopt(short, long, default_value = "Gene")]
    pub feature: FeatureType,

    /// Cell barcode whitelist. Without it per-cell counts are kept sparse.
    #[structopt(short, long, parse(from_os_str))]
    pub whitelist: Option<PathBuf>,

    /// Add read indices to records and write a record for reads without a feature.
    #[structopt(long)]
    pub read_info: bool,

    /// Number of threads to use.
    #[structopt(short, long, default_value = "4")]
    pub threads: usize,

    /// Reads per worker chunk.
    #[structopt(short, long, default_value = "100000")]
    pub chunk_size: usize,

    /// Statistics report path (default: `<output>.stats`).
    #[structopt(long, parse(from_os_str))]
    pub stats: Option<PathBuf>,

    /// Per-cell feature count table (default: `<output>.cell_counts.tsv`).
    #[structopt(long, parse(from_os_str))]
    pub cell_counts: Option<PathBuf>,

    /// Gzip level for compressed output.
    #[structopt(long, default_value = "6")]
    pub compression_level: u32,
}

impl RecordArgs {
    #[inline]
    pub fn chunk_size(&self) -> usize {
        usize::max(self.chunk_size, 1)
    }
}
