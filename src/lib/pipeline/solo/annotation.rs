//! Per-read gene and transcript evidence produced by the annotation stage

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Gene value marking "no gene" in [`VelocitySimple`].
pub const NO_GENE: u32 = u32::MAX;

/// A concordant transcript and the read's distance to its 3' end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptHit {
    pub transcript: u32,
    pub distance_to_3p: u32,
}

/// Velocity tag of one transcript the read is compatible with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptVelocity {
    pub transcript: u32,
    pub tag: u8,
}

/// Two-field velocity summary: a single gene and its velocity tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocitySimple {
    pub gene: u32,
    pub tag: u32,
}

impl Default for VelocitySimple {
    fn default() -> Self {
        Self {
            gene: NO_GENE,
            tag: 0,
        }
    }
}

impl VelocitySimple {
    #[inline]
    pub fn has_gene(&self) -> bool {
        self.gene != NO_GENE
    }
}

/// Read-only annotation evidence for one read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadAnnotation {
    /// Genes whose exons agree with every alignment of the read
    pub gene_concordant: BTreeSet<u32>,
    /// Genes whose full bodies contain the read
    pub gene_full: BTreeSet<u32>,
    /// Concordant transcripts, in the order the annotator produced them
    pub transcript_concordant: Vec<TranscriptHit>,
    /// Per-transcript velocity tags, in arbitrary order
    pub velocity_types: Vec<TranscriptVelocity>,
    pub velocity_simple: VelocitySimple,
}
