//! Per-read feature recording for single-cell counting
//!
//! For every read with a matched cell barcode, the recorder decides which
//! feature (gene, full gene body, splice junctions, 3' transcript proximity or
//! velocity state) the read counts towards, writes one line per feature unit
//! to an intermediate stream for UMI collapsing downstream, and keeps
//! rejection statistics plus per-cell feature counts.
//!
//! # Key Components
//!
//! - [`classifier`]: per-feature-type classification behind [`FeatureHandler`]
//! - [`encoder`]: record line layouts and a parser for the downstream side
//! - [`recorder`]: per-worker driver owning stream, statistics and counts
//! - [`stats`] and [`cell_counts`]: mergeable accumulators

pub mod annotation;
pub mod barcode;
pub mod cell_counts;
pub mod classifier;
pub mod encoder;
pub mod feature_type;
pub mod junction;
pub mod recorder;
pub mod stats;
pub mod whitelist;

pub use annotation::ReadAnnotation;
pub use barcode::{BarcodeMatch, MatchQuality};
pub use cell_counts::{CellCounts, CellFeatureCounter};
pub use classifier::{Classification, FeatureHandler, FeatureUnit, ReadEvidence, Rejection};
pub use feature_type::FeatureType;
pub use junction::{AlignedTranscript, JunctionSource};
pub use recorder::{FeatureRecorder, RecorderConfig, RecorderParts};
pub use stats::FeatureStats;
pub use whitelist::Whitelist;
