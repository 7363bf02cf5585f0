//! solofeat - per-read feature assignment for single-cell RNA-seq
//!
//! Reads arrive with their alignment count, gene/transcript annotation and
//! cell barcode match. Each read is assigned to at most one feature of the
//! requested type (or to several splice junctions), and one line per feature
//! unit is written to an intermediate record stream for UMI collapsing.
//! Rejected reads are counted per reason.
//!
//! # Usage
//!
//! ```bash
//! # Gene-level records with a whitelist (dense per-cell counts)
//! solofeat record --input reads.jsonl.gz --output Gene.txt --whitelist 737K.txt
//!
//! # Splice junction records with read indices and diagnostics
//! solofeat record -i reads.jsonl -o SJ.txt --feature SJ --read-info
//! ```

extern crate solofeat_lib;
pub mod commands;
use anyhow::Result;
use env_logger::Env;
use log::*;
use solofeat_lib::utils;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case", author, about)]
/// Per-read feature assignment for single-cell counting
struct Args {
    #[structopt(subcommand)]
    subcommand: Subcommand,
}

#[derive(StructOpt)]
enum Subcommand {
    /// Classify reads against features and write the per-read record stream
    Record(commands::RecordArgs),
}

impl Subcommand {
    fn run(self) -> Result<()> {
        match self {
            Subcommand::Record(args) => commands::run_record(args)?,
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = Args::from_args().subcommand.run() {
        if utils::is_broken_pipe(&err) {
            std::process::exit(0);
        }
        error!("{:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
