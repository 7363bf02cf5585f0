//! Per-read feature classification
//!
//! Each feature type has a [`FeatureHandler`] that decides whether a read
//! yields a usable feature and writes the record(s) for it. Rejections are
//! plain values mapped onto [`FeatureStats`] counters; they are never errors.

use smallvec::SmallVec;
use std::io::Write;

use super::annotation::{ReadAnnotation, TranscriptVelocity};
use super::barcode::BarcodeMatch;
use super::encoder;
use super::feature_type::FeatureType;
use super::junction::{JunctionList, JunctionSource};
use super::stats::{FeatureStats, StatOutcome};
use crate::core::error::Result;

/// Everything known about one read when it reaches the recorder.
#[derive(Clone, Copy)]
pub struct ReadEvidence<'a> {
    /// Number of alignments reported for the read; zero means unmapped
    pub n_alignments: u32,
    pub annotation: &'a ReadAnnotation,
    /// Best alignment, consulted for splice junctions only
    pub alignment: &'a dyn JunctionSource,
}

/// Feature payload of an accepted read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureUnit {
    Gene(u32),
    Junctions(JunctionList),
    /// Velocity tags ordered by transcript ID
    Velocity(Vec<TranscriptVelocity>),
    /// The record is written straight from the annotation
    FromAnnotation,
}

/// Why a read contributes no feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Unmapped,
    NoFeature,
    /// Several candidate features; `multimapping` when the read also had
    /// more than one alignment
    Ambiguous { multimapping: bool },
    /// Junctions are never taken from multimapping reads
    MultimappingJunction,
}

impl Rejection {
    /// Counters this rejection increments, in increment order.
    pub fn outcomes(self) -> SmallVec<[StatOutcome; 2]> {
        let mut outcomes = SmallVec::new();
        match self {
            Rejection::Unmapped => outcomes.push(StatOutcome::Unmapped),
            Rejection::NoFeature => outcomes.push(StatOutcome::NoFeature),
            Rejection::Ambiguous { multimapping } => {
                outcomes.push(StatOutcome::AmbiguousFeature);
                if multimapping {
                    outcomes.push(StatOutcome::AmbiguousFeatureMultimap);
                }
            }
            Rejection::MultimappingJunction => {
                outcomes.push(StatOutcome::AmbiguousFeatureMultimap)
            }
        }
        outcomes
    }

    pub fn apply(self, stats: &mut FeatureStats) {
        for outcome in self.outcomes() {
            stats.increment(outcome);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Accepted(FeatureUnit),
    Rejected(Rejection),
}

/// Where and how an accepted read's record is written.
#[derive(Clone, Copy)]
pub struct RecordContext<'a> {
    pub read_index: u64,
    /// Per-read diagnostic mode: records carry the read index
    pub read_info: bool,
    pub barcode: &'a BarcodeMatch,
    pub annotation: &'a ReadAnnotation,
}

impl RecordContext<'_> {
    #[inline]
    pub fn diagnostic_index(&self) -> Option<u64> {
        self.read_info.then_some(self.read_index)
    }
}

/// Classification and record layout of one feature type.
pub trait FeatureHandler: Sync {
    fn feature_type(&self) -> FeatureType;

    /// Decide what the read contributes. Only called for mapped reads.
    fn classify_mapped(&self, read: &ReadEvidence<'_>) -> Classification;

    /// Write the record(s) for an accepted read and return the number of
    /// feature units written.
    fn encode(&self, out: &mut dyn Write, ctx: &RecordContext<'_>, unit: &FeatureUnit)
        -> Result<u32>;

    fn classify(&self, read: &ReadEvidence<'_>) -> Classification {
        if read.n_alignments == 0 {
            return Classification::Rejected(Rejection::Unmapped);
        }
        self.classify_mapped(read)
    }
}

/// Gene or GeneFull: exactly one gene in the selected set.
pub struct GeneHandler {
    full: bool,
}

impl FeatureHandler for GeneHandler {
    fn feature_type(&self) -> FeatureType {
        if self.full {
            FeatureType::GeneFull
        } else {
            FeatureType::Gene
        }
    }

    fn classify_mapped(&self, read: &ReadEvidence<'_>) -> Classification {
        let genes = if self.full {
            &read.annotation.gene_full
        } else {
            &read.annotation.gene_concordant
        };

        let mut iter = genes.iter();
        match (iter.next(), iter.next()) {
            (None, _) => Classification::Rejected(Rejection::NoFeature),
            (Some(&gene), None) => Classification::Accepted(FeatureUnit::Gene(gene)),
            (Some(_), Some(_)) => Classification::Rejected(Rejection::Ambiguous {
                multimapping: read.n_alignments > 1,
            }),
        }
    }

    fn encode(
        &self,
        out: &mut dyn Write,
        ctx: &RecordContext<'_>,
        unit: &FeatureUnit,
    ) -> Result<u32> {
        encoder::encode_record(
            out,
            ctx.diagnostic_index(),
            self.feature_type(),
            ctx.barcode,
            unit,
            ctx.annotation,
        )
    }
}

/// Splice junctions of uniquely mapped reads within at most one gene.
pub struct JunctionHandler;

impl FeatureHandler for JunctionHandler {
    fn feature_type(&self) -> FeatureType {
        FeatureType::SJ
    }

    fn classify_mapped(&self, read: &ReadEvidence<'_>) -> Classification {
        if read.n_alignments > 1 {
            return Classification::Rejected(Rejection::MultimappingJunction);
        }

        let genes = &read.annotation.gene_concordant;
        if genes.len() > 1 {
            return Classification::Rejected(Rejection::Ambiguous {
                multimapping: false,
            });
        }

        let found = read.alignment.splice_junctions();
        // An annotated junction without a concordant gene means the read does
        // not fully match any known transcript.
        if found.junctions.is_empty() || (found.annotated && genes.is_empty()) {
            return Classification::Rejected(Rejection::NoFeature);
        }
        Classification::Accepted(FeatureUnit::Junctions(found.junctions))
    }

    fn encode(
        &self,
        out: &mut dyn Write,
        ctx: &RecordContext<'_>,
        unit: &FeatureUnit,
    ) -> Result<u32> {
        encoder::encode_record(
            out,
            ctx.diagnostic_index(),
            FeatureType::SJ,
            ctx.barcode,
            unit,
            ctx.annotation,
        )
    }
}

/// Concordant transcripts with distances to their 3' ends.
pub struct Transcript3pHandler;

impl FeatureHandler for Transcript3pHandler {
    fn feature_type(&self) -> FeatureType {
        FeatureType::Transcript3p
    }

    fn classify_mapped(&self, read: &ReadEvidence<'_>) -> Classification {
        if read.annotation.transcript_concordant.is_empty() {
            Classification::Rejected(Rejection::NoFeature)
        } else {
            Classification::Accepted(FeatureUnit::FromAnnotation)
        }
    }

    fn encode(
        &self,
        out: &mut dyn Write,
        ctx: &RecordContext<'_>,
        unit: &FeatureUnit,
    ) -> Result<u32> {
        encoder::encode_record(
            out,
            ctx.diagnostic_index(),
            FeatureType::Transcript3p,
            ctx.barcode,
            unit,
            ctx.annotation,
        )
    }
}

/// Gene-level velocity summary.
pub struct VelocitySimpleHandler;

impl FeatureHandler for VelocitySimpleHandler {
    fn feature_type(&self) -> FeatureType {
        FeatureType::VelocytoSimple
    }

    fn classify_mapped(&self, read: &ReadEvidence<'_>) -> Classification {
        if read.annotation.velocity_simple.has_gene() {
            Classification::Accepted(FeatureUnit::FromAnnotation)
        } else {
            Classification::Rejected(Rejection::NoFeature)
        }
    }

    fn encode(
        &self,
        out: &mut dyn Write,
        ctx: &RecordContext<'_>,
        _unit: &FeatureUnit,
    ) -> Result<u32> {
        encoder::write_velocity_simple(out, ctx.read_index, &ctx.annotation.velocity_simple)
    }
}

/// Per-transcript velocity tags.
pub struct VelocityHandler;

impl FeatureHandler for VelocityHandler {
    fn feature_type(&self) -> FeatureType {
        FeatureType::Velocyto
    }

    fn classify_mapped(&self, read: &ReadEvidence<'_>) -> Classification {
        if read.annotation.velocity_types.is_empty() {
            return Classification::Rejected(Rejection::NoFeature);
        }
        let mut tags = read.annotation.velocity_types.clone();
        tags.sort_by_key(|t| t.transcript);
        Classification::Accepted(FeatureUnit::Velocity(tags))
    }

    fn encode(
        &self,
        out: &mut dyn Write,
        ctx: &RecordContext<'_>,
        unit: &FeatureUnit,
    ) -> Result<u32> {
        match unit {
            FeatureUnit::Velocity(tags) => encoder::write_velocity(out, ctx.read_index, tags),
            _ => Err(encoder::unit_mismatch(FeatureType::Velocyto, unit)),
        }
    }
}

static GENE: GeneHandler = GeneHandler { full: false };
static GENE_FULL: GeneHandler = GeneHandler { full: true };
static SJ: JunctionHandler = JunctionHandler;
static TRANSCRIPT_3P: Transcript3pHandler = Transcript3pHandler;
static VELOCYTO_SIMPLE: VelocitySimpleHandler = VelocitySimpleHandler;
static VELOCYTO: VelocityHandler = VelocityHandler;

impl FeatureType {
    pub fn handler(self) -> &'static dyn FeatureHandler {
        match self {
            FeatureType::Gene => &GENE,
            FeatureType::GeneFull => &GENE_FULL,
            FeatureType::SJ => &SJ,
            FeatureType::Transcript3p => &TRANSCRIPT_3P,
            FeatureType::VelocytoSimple => &VELOCYTO_SIMPLE,
            FeatureType::Velocyto => &VELOCYTO,
        }
    }
}
