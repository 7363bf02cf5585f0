//! Per-cell feature counts accumulated while recording reads

use rustc_hash::FxHashMap;

use super::barcode::BarcodeMatch;
use crate::core::error::{Result, SoloError};

/// Accumulates the number of recorded feature units per cell barcode index.
pub trait CellFeatureCounter {
    /// Credit `units` feature units to the cell(s) `matched` points at.
    fn add(&mut self, matched: &BarcodeMatch, units: u32);

    fn count(&self, index: u64) -> u32;

    /// Cells with a non-zero count, ascending by index.
    fn nonzero(&self) -> Vec<(u64, u32)>;

    fn total(&self) -> u64 {
        self.nonzero().iter().map(|&(_, n)| n as u64).sum()
    }
}

/// One slot per whitelist entry. Every candidate of a match is credited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseCellCounts {
    counts: Vec<u32>,
}

impl DenseCellCounts {
    pub fn new(whitelist_len: usize) -> Self {
        Self {
            counts: vec![0; whitelist_len],
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn merge(&mut self, other: &DenseCellCounts) -> Result<()> {
        if self.counts.len() != other.counts.len() {
            return Err(SoloError::CountMerge(format!(
                "whitelist sizes differ ({} vs {})",
                self.counts.len(),
                other.counts.len()
            )));
        }
        for (slot, &n) in self.counts.iter_mut().zip(&other.counts) {
            *slot += n;
        }
        Ok(())
    }
}

impl CellFeatureCounter for DenseCellCounts {
    fn add(&mut self, matched: &BarcodeMatch, units: u32) {
        for &index in &matched.candidates {
            if let Some(slot) = self.counts.get_mut(index as usize) {
                *slot += units;
            }
        }
    }

    fn count(&self, index: u64) -> u32 {
        self.counts.get(index as usize).copied().unwrap_or(0)
    }

    fn nonzero(&self) -> Vec<(u64, u32)> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, n)| **n > 0)
            .map(|(i, &n)| (i as u64, n))
            .collect()
    }
}

/// Only observed cells are stored. A match credits its best candidate only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseCellCounts {
    counts: FxHashMap<u64, u32>,
}

impl SparseCellCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: &SparseCellCounts) {
        for (&index, &n) in &other.counts {
            *self.counts.entry(index).or_insert(0) += n;
        }
    }
}

impl CellFeatureCounter for SparseCellCounts {
    fn add(&mut self, matched: &BarcodeMatch, units: u32) {
        if let Some(index) = matched.best_candidate() {
            *self.counts.entry(index).or_insert(0) += units;
        }
    }

    fn count(&self, index: u64) -> u32 {
        self.counts.get(&index).copied().unwrap_or(0)
    }

    fn nonzero(&self) -> Vec<(u64, u32)> {
        let mut cells: Vec<(u64, u32)> = self
            .counts
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(&i, &n)| (i, n))
            .collect();
        cells.sort_unstable_by_key(|&(i, _)| i);
        cells
    }
}

/// Per-cell counts in the representation chosen at construction: dense when
/// a whitelist is active, sparse otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellCounts {
    Dense(DenseCellCounts),
    Sparse(SparseCellCounts),
}

impl CellCounts {
    pub fn new(whitelist_len: Option<usize>) -> Self {
        match whitelist_len {
            Some(len) => CellCounts::Dense(DenseCellCounts::new(len)),
            None => CellCounts::Sparse(SparseCellCounts::new()),
        }
    }

    /// Same-shape counts with everything at zero, for a new worker.
    pub fn empty_like(&self) -> Self {
        match self {
            CellCounts::Dense(dense) => CellCounts::Dense(DenseCellCounts::new(dense.len())),
            CellCounts::Sparse(_) => CellCounts::Sparse(SparseCellCounts::new()),
        }
    }

    pub fn merge(&mut self, other: &CellCounts) -> Result<()> {
        match (self, other) {
            (CellCounts::Dense(a), CellCounts::Dense(b)) => a.merge(b),
            (CellCounts::Sparse(a), CellCounts::Sparse(b)) => {
                a.merge(b);
                Ok(())
            }
            _ => Err(SoloError::CountMerge(
                "dense and sparse counts cannot be combined".to_string(),
            )),
        }
    }

    fn inner(&self) -> &dyn CellFeatureCounter {
        match self {
            CellCounts::Dense(dense) => dense,
            CellCounts::Sparse(sparse) => sparse,
        }
    }
}

impl CellFeatureCounter for CellCounts {
    fn add(&mut self, matched: &BarcodeMatch, units: u32) {
        match self {
            CellCounts::Dense(dense) => dense.add(matched, units),
            CellCounts::Sparse(sparse) => sparse.add(matched, units),
        }
    }

    fn count(&self, index: u64) -> u32 {
        self.inner().count(index)
    }

    fn nonzero(&self) -> Vec<(u64, u32)> {
        self.inner().nonzero()
    }
}
