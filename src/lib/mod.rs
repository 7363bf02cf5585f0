//! solofeat: per-read feature assignment for single-cell RNA-seq
//!
//! The library classifies processed reads against genes, full gene bodies,
//! splice junctions, 3' transcript ends or RNA-velocity states, writes the
//! intermediate per-read record stream consumed by UMI collapsing, and keeps
//! mergeable per-worker statistics.
//!
//! # Modules
//!
//! - [`core`]: errors, IO helpers and thread pool setup
//! - [`pipeline`]: feature classification and record emission
//! - [`utils`]: shortcuts to the most used `core` helpers

pub mod core;
pub mod pipeline;
pub mod utils;

pub use pipeline::solo;
