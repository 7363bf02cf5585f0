//! Per-outcome read statistics

use std::io::Write;

use crate::core::error::Result;

/// Counter incremented when a read contributes no feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatOutcome {
    Unmapped,
    NoFeature,
    AmbiguousFeature,
    AmbiguousFeatureMultimap,
}

impl StatOutcome {
    pub fn name(self) -> &'static str {
        match self {
            StatOutcome::Unmapped => "nUnmapped",
            StatOutcome::NoFeature => "nNoFeature",
            StatOutcome::AmbiguousFeature => "nAmbigFeature",
            StatOutcome::AmbiguousFeatureMultimap => "nAmbigFeatureMultimap",
        }
    }
}

/// Rejection counters for one worker. Counters only grow during a run;
/// per-worker tables are combined with [`FeatureStats::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureStats {
    pub unmapped: u64,
    pub no_feature: u64,
    pub ambiguous_feature: u64,
    pub ambiguous_feature_multimap: u64,
}

impl FeatureStats {
    #[inline]
    pub fn increment(&mut self, outcome: StatOutcome) {
        *self.counter_mut(outcome) += 1;
    }

    pub fn get(&self, outcome: StatOutcome) -> u64 {
        match outcome {
            StatOutcome::Unmapped => self.unmapped,
            StatOutcome::NoFeature => self.no_feature,
            StatOutcome::AmbiguousFeature => self.ambiguous_feature,
            StatOutcome::AmbiguousFeatureMultimap => self.ambiguous_feature_multimap,
        }
    }

    /// Add another worker's counters into this one.
    pub fn merge(&mut self, other: &FeatureStats) {
        self.unmapped += other.unmapped;
        self.no_feature += other.no_feature;
        self.ambiguous_feature += other.ambiguous_feature;
        self.ambiguous_feature_multimap += other.ambiguous_feature_multimap;
    }

    /// Entries in report order.
    pub fn entries(&self) -> [(&'static str, u64); 4] {
        [
            StatOutcome::Unmapped,
            StatOutcome::NoFeature,
            StatOutcome::AmbiguousFeature,
            StatOutcome::AmbiguousFeatureMultimap,
        ]
        .map(|outcome| (outcome.name(), self.get(outcome)))
    }

    /// Write one `name value` line per counter.
    pub fn write_report<W: Write>(&self, out: &mut W) -> Result<()> {
        for (name, value) in self.entries() {
            writeln!(out, "{:>30} {}", name, value)?;
        }
        Ok(())
    }

    fn counter_mut(&mut self, outcome: StatOutcome) -> &mut u64 {
        match outcome {
            StatOutcome::Unmapped => &mut self.unmapped,
            StatOutcome::NoFeature => &mut self.no_feature,
            StatOutcome::AmbiguousFeature => &mut self.ambiguous_feature,
            StatOutcome::AmbiguousFeatureMultimap => &mut self.ambiguous_feature_multimap,
        }
    }
}
