//! Per-worker read recorder: classify, write records, keep statistics

use log::debug;
use std::io::Write;

use super::barcode::BarcodeMatch;
use super::cell_counts::{CellCounts, CellFeatureCounter};
use super::classifier::{Classification, FeatureHandler, ReadEvidence, RecordContext};
use super::encoder;
use super::feature_type::FeatureType;
use super::stats::FeatureStats;
use crate::core::error::Result;

/// Configuration for recording reads of one feature type
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Feature type records are produced for
    pub feature_type: FeatureType,
    /// When false every read is ignored
    pub enabled: bool,
    /// Per-read diagnostic mode: add read indices to records and write a
    /// record for reads without a feature
    pub read_info: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            feature_type: FeatureType::Gene,
            enabled: true,
            read_info: false,
        }
    }
}

/// Records reads for one worker. Owns its output stream, statistics and
/// per-cell counts; workers are combined afterwards with [`merge_parts`].
pub struct FeatureRecorder<W: Write> {
    config: RecorderConfig,
    handler: &'static dyn FeatureHandler,
    out: W,
    stats: FeatureStats,
    cell_counts: CellCounts,
    reads_seen: u64,
}

/// What a finished recorder leaves behind.
pub struct RecorderParts<W> {
    pub out: W,
    pub stats: FeatureStats,
    pub cell_counts: CellCounts,
}

impl<W: Write> FeatureRecorder<W> {
    pub fn new(config: RecorderConfig, cell_counts: CellCounts, out: W) -> Self {
        Self {
            handler: config.feature_type.handler(),
            config,
            out,
            stats: FeatureStats::default(),
            cell_counts,
            reads_seen: 0,
        }
    }

    /// Record one read and return the number of feature units written.
    ///
    /// Reads are skipped when recording is disabled or the barcode did not
    /// match. Rejections only touch the statistics; the only error is a
    /// failed write to the output stream.
    pub fn record(
        &mut self,
        barcode: &BarcodeMatch,
        read: &ReadEvidence<'_>,
        read_index: u64,
    ) -> Result<u32> {
        if !self.config.enabled || barcode.is_failed() {
            return Ok(0);
        }
        self.reads_seen += 1;

        let units = match self.handler.classify(read) {
            Classification::Rejected(rejection) => {
                rejection.apply(&mut self.stats);
                0
            }
            Classification::Accepted(unit) => {
                let ctx = RecordContext {
                    read_index,
                    read_info: self.config.read_info,
                    barcode,
                    annotation: read.annotation,
                };
                self.handler.encode(&mut self.out, &ctx, &unit)?
            }
        };

        if units == 0 {
            if self.config.read_info {
                encoder::write_diagnostic(&mut self.out, read_index, barcode)?;
            }
            return Ok(0);
        }

        self.cell_counts.add(barcode, units);
        Ok(units)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<RecorderParts<W>> {
        self.flush()?;
        debug!(
            "{} recorder done: {} reads, {} cell units",
            self.config.feature_type,
            self.reads_seen,
            self.cell_counts.total()
        );
        Ok(RecorderParts {
            out: self.out,
            stats: self.stats,
            cell_counts: self.cell_counts,
        })
    }
}

/// Fold per-worker statistics and counts into `total`.
pub fn merge_parts<W>(
    total_stats: &mut FeatureStats,
    total_counts: &mut CellCounts,
    part: &RecorderParts<W>,
) -> Result<()> {
    total_stats.merge(&part.stats);
    total_counts.merge(&part.cell_counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::solo::annotation::{ReadAnnotation, TranscriptVelocity, VelocitySimple};
    use crate::pipeline::solo::barcode::MatchQuality;
    use crate::pipeline::solo::junction::{AlignedTranscript, Block, Gap};
    use crate::pipeline::solo::stats::StatOutcome;

    fn recorder(feature_type: FeatureType, read_info: bool) -> FeatureRecorder<Vec<u8>> {
        FeatureRecorder::new(
            RecorderConfig {
                feature_type,
                enabled: true,
                read_info,
            },
            CellCounts::new(Some(16)),
            Vec::new(),
        )
    }

    fn genes(ids: &[u32]) -> ReadAnnotation {
        ReadAnnotation {
            gene_concordant: ids.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn evidence<'a>(
        n_alignments: u32,
        annotation: &'a ReadAnnotation,
        alignment: &'a AlignedTranscript,
    ) -> ReadEvidence<'a> {
        ReadEvidence {
            n_alignments,
            annotation,
            alignment,
        }
    }

    fn output(recorder: FeatureRecorder<Vec<u8>>) -> (String, FeatureStats, CellCounts) {
        let parts = recorder.finish().unwrap();
        (
            String::from_utf8(parts.out).unwrap(),
            parts.stats,
            parts.cell_counts,
        )
    }

    #[test]
    fn single_gene_read_end_to_end() {
        let mut rec = recorder(FeatureType::Gene, false);
        let annotation = genes(&[42]);
        let alignment = AlignedTranscript::default();
        let barcode = BarcodeMatch {
            umi: "ACGT".to_string(),
            quality: MatchQuality::Exact,
            candidates: vec![3],
            display: "3".to_string(),
        };

        let units = rec
            .record(&barcode, &evidence(1, &annotation, &alignment), 0)
            .unwrap();
        assert_eq!(units, 1);

        let (text, stats, counts) = output(rec);
        assert_eq!(text, "ACGT 42 0 3\n");
        assert_eq!(stats, FeatureStats::default());
        assert_eq!(counts.count(3), 1);
    }

    #[test]
    fn multigene_multimapper_counts_both_ambiguities() {
        let mut rec = recorder(FeatureType::Gene, false);
        let annotation = genes(&[1, 2]);
        let alignment = AlignedTranscript::default();

        let units = rec
            .record(
                &BarcodeMatch::exact("ACGT", 0),
                &evidence(3, &annotation, &alignment),
                0,
            )
            .unwrap();
        assert_eq!(units, 0);

        let (text, stats, counts) = output(rec);
        assert!(text.is_empty());
        assert_eq!(stats.get(StatOutcome::AmbiguousFeature), 1);
        assert_eq!(stats.get(StatOutcome::AmbiguousFeatureMultimap), 1);
        assert_eq!(stats.get(StatOutcome::NoFeature), 0);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn unmapped_reads_only_touch_statistics() {
        let mut rec = recorder(FeatureType::SJ, false);
        let annotation = genes(&[7]);
        let alignment = AlignedTranscript::default();
        for i in 0..3 {
            rec.record(
                &BarcodeMatch::exact("TTTT", 1),
                &evidence(0, &annotation, &alignment),
                i,
            )
            .unwrap();
        }
        let (text, stats, _) = output(rec);
        assert!(text.is_empty());
        assert_eq!(stats.unmapped, 3);
        assert_eq!(stats.no_feature + stats.ambiguous_feature, 0);
    }

    #[test]
    fn disabled_or_unmatched_reads_are_ignored() {
        let annotation = genes(&[42]);
        let alignment = AlignedTranscript::default();

        let mut disabled = FeatureRecorder::new(
            RecorderConfig {
                enabled: false,
                ..Default::default()
            },
            CellCounts::new(None),
            Vec::new(),
        );
        disabled
            .record(
                &BarcodeMatch::exact("A", 0),
                &evidence(0, &annotation, &alignment),
                0,
            )
            .unwrap();
        let (text, stats, _) = output(disabled);
        assert!(text.is_empty());
        assert_eq!(stats, FeatureStats::default());

        let mut rec = recorder(FeatureType::Gene, true);
        let mut unmatched = BarcodeMatch::exact("A", 0);
        unmatched.quality = MatchQuality::NoMatch;
        rec.record(&unmatched, &evidence(0, &annotation, &alignment), 9)
            .unwrap();
        let (text, stats, _) = output(rec);
        assert!(text.is_empty());
        assert_eq!(stats.unmapped, 0);
    }

    #[test]
    fn junction_units_scale_cell_counts() {
        let mut rec = recorder(FeatureType::SJ, false);
        let annotation = genes(&[]);
        let alignment = AlignedTranscript {
            blocks: vec![
                Block { start: 0, len: 10 },
                Block { start: 50, len: 10 },
                Block { start: 90, len: 10 },
            ],
            gaps: vec![
                Gap::Junction { annotated: false },
                Gap::Junction { annotated: false },
            ],
        };
        let barcode = BarcodeMatch {
            umi: "GGCC".to_string(),
            quality: MatchQuality::MultipleInexact,
            candidates: vec![2, 6],
            display: "2 2 30 6 35".to_string(),
        };

        let units = rec
            .record(&barcode, &evidence(1, &annotation, &alignment), 11)
            .unwrap();
        assert_eq!(units, 2);

        let (text, _, counts) = output(rec);
        assert_eq!(text.lines().count(), 2);
        assert_eq!(counts.count(2), 2);
        assert_eq!(counts.count(6), 2);
    }

    #[test]
    fn read_info_adds_index_and_diagnostics() {
        let mut rec = recorder(FeatureType::Gene, true);
        let alignment = AlignedTranscript::default();
        let good = genes(&[5]);
        let empty = genes(&[]);

        rec.record(
            &BarcodeMatch::exact("AAAA", 1),
            &evidence(1, &good, &alignment),
            100,
        )
        .unwrap();
        rec.record(
            &BarcodeMatch::exact("CCCC", 1),
            &evidence(1, &empty, &alignment),
            101,
        )
        .unwrap();
        rec.record(
            &BarcodeMatch::exact("GGGG", 1),
            &evidence(0, &empty, &alignment),
            102,
        )
        .unwrap();

        let (text, stats, counts) = output(rec);
        assert_eq!(
            text,
            "AAAA 100 5 0 1\nCCCC 101 -1 0 1\nGGGG 102 -1 0 1\n"
        );
        assert_eq!(stats.no_feature, 1);
        assert_eq!(stats.unmapped, 1);
        assert_eq!(counts.count(1), 1);
    }

    #[test]
    fn velocity_records_bypass_barcode_fields() {
        let alignment = AlignedTranscript::default();
        let annotation = ReadAnnotation {
            velocity_simple: VelocitySimple { gene: 30, tag: 2 },
            velocity_types: vec![
                TranscriptVelocity {
                    transcript: 9,
                    tag: 1,
                },
                TranscriptVelocity {
                    transcript: 4,
                    tag: 2,
                },
            ],
            ..Default::default()
        };

        let mut simple = recorder(FeatureType::VelocytoSimple, false);
        simple
            .record(
                &BarcodeMatch::exact("AAAA", 5),
                &evidence(1, &annotation, &alignment),
                8,
            )
            .unwrap();
        let (text, _, counts) = output(simple);
        assert_eq!(text, "8 30 2\n");
        assert_eq!(counts.count(5), 1);

        let mut full = recorder(FeatureType::Velocyto, false);
        full.record(
            &BarcodeMatch::exact("AAAA", 5),
            &evidence(1, &annotation, &alignment),
            8,
        )
        .unwrap();
        let (text, _, _) = output(full);
        assert_eq!(text, "8 2 4 2 9 1\n");
    }

    #[test]
    fn worker_parts_merge_into_totals() {
        let alignment = AlignedTranscript::default();
        let one = genes(&[1]);
        let two = genes(&[1, 2]);

        let mut parts = Vec::new();
        for annotation in [&one, &two, &one] {
            let mut rec = FeatureRecorder::new(
                RecorderConfig::default(),
                CellCounts::new(None),
                Vec::new(),
            );
            rec.record(
                &BarcodeMatch::exact("ACGT", 4),
                &evidence(1, annotation, &alignment),
                0,
            )
            .unwrap();
            parts.push(rec.finish().unwrap());
        }

        let mut stats = FeatureStats::default();
        let mut counts = CellCounts::new(None);
        for part in &parts {
            merge_parts(&mut stats, &mut counts, part).unwrap();
        }
        assert_eq!(stats.ambiguous_feature, 1);
        assert_eq!(counts.nonzero(), vec![(4, 2)]);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_propagate() {
        let mut rec = FeatureRecorder::new(
            RecorderConfig::default(),
            CellCounts::new(None),
            FailingWriter,
        );
        let annotation = genes(&[3]);
        let alignment = AlignedTranscript::default();
        let result = rec.record(
            &BarcodeMatch::exact("ACGT", 0),
            &evidence(1, &annotation, &alignment),
            0,
        );
        assert!(result.is_err());
        let parts = rec.finish().unwrap();
        assert_eq!(parts.cell_counts.total(), 0);
    }
}
