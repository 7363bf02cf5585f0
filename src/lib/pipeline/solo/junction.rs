//! Splice junction extraction from an aligned read

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Junction as (first intronic base, last intronic base) in genome coordinates.
pub type Junction = [u64; 2];

/// Most reads span a handful of junctions at most.
pub type JunctionList = SmallVec<[Junction; 4]>;

/// Junctions found in one alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpliceJunctions {
    pub junctions: JunctionList,
    /// True when every junction is present in the annotation
    pub annotated: bool,
}

/// Source of splice junctions for the read currently being recorded.
pub trait JunctionSource {
    fn splice_junctions(&self) -> SpliceJunctions;
}

/// What separates two consecutive aligned blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gap {
    Junction { annotated: bool },
    Deletion,
    Insertion,
    /// Gap between the two mates of a pair
    MateGap,
}

/// Aligned block in genome coordinates (0-based start).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub start: u64,
    pub len: u64,
}

/// Best alignment of a read as a chain of blocks; `gaps[i]` sits between
/// `blocks[i]` and `blocks[i + 1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedTranscript {
    pub blocks: Vec<Block>,
    pub gaps: Vec<Gap>,
}

impl JunctionSource for AlignedTranscript {
    fn splice_junctions(&self) -> SpliceJunctions {
        let mut out = SpliceJunctions {
            junctions: JunctionList::new(),
            annotated: true,
        };

        for (pair, gap) in self.blocks.windows(2).zip(&self.gaps) {
            if let Gap::Junction { annotated } = *gap {
                let intron_start = pair[0].start.saturating_add(pair[0].len);
                let intron_end = pair[1].start.saturating_sub(1);
                out.junctions.push([intron_start, intron_end]);
                out.annotated &= annotated;
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(start: u64, len: u64) -> Block {
        Block { start, len }
    }

    #[test]
    fn extracts_only_junction_gaps() {
        let alignment = AlignedTranscript {
            blocks: vec![block(100, 50), block(300, 20), block(322, 30), block(900, 10)],
            gaps: vec![
                Gap::Junction { annotated: true },
                Gap::Deletion,
                Gap::Junction { annotated: true },
            ],
        };

        let found = alignment.splice_junctions();
        assert_eq!(found.junctions.as_slice(), &[[150, 299], [352, 899]]);
        assert!(found.annotated);
    }

    #[test]
    fn one_novel_junction_clears_annotated_flag() {
        let alignment = AlignedTranscript {
            blocks: vec![block(0, 10), block(20, 10), block(40, 10)],
            gaps: vec![
                Gap::Junction { annotated: true },
                Gap::Junction { annotated: false },
            ],
        };

        let found = alignment.splice_junctions();
        assert_eq!(found.junctions.len(), 2);
        assert!(!found.annotated);
    }

    #[test]
    fn extreme_block_coordinates_saturate() {
        let alignment = AlignedTranscript {
            blocks: vec![block(u64::MAX - 5, 10), block(u64::MAX, 1)],
            gaps: vec![Gap::Junction { annotated: false }],
        };
        let found = alignment.splice_junctions();
        assert_eq!(found.junctions.as_slice(), &[[u64::MAX, u64::MAX - 1]]);
    }

    #[test]
    fn unspliced_alignment_has_no_junctions() {
        let alignment = AlignedTranscript {
            blocks: vec![block(5, 90)],
            gaps: vec![],
        };
        assert!(alignment.splice_junctions().junctions.is_empty());
    }
}
