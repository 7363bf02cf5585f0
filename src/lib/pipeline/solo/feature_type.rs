//! Feature types a read can be assigned to

use std::fmt;
use std::str::FromStr;

/// Molecular feature a read is counted against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureType {
    /// Gene whose exons are concordant with all alignments of the read
    Gene,
    /// Gene whose full body (exons and introns) overlaps the read
    GeneFull,
    /// Splice junctions spanned by a uniquely mapped read
    SJ,
    /// Concordant transcripts with the read's distance to their 3' end
    Transcript3p,
    /// Single gene plus a spliced/unspliced/ambiguous tag
    VelocytoSimple,
    /// Per-transcript velocity tags
    Velocyto,
}

impl FromStr for FeatureType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gene" => Ok(FeatureType::Gene),
            "genefull" => Ok(FeatureType::GeneFull),
            "sj" => Ok(FeatureType::SJ),
            "transcript3p" => Ok(FeatureType::Transcript3p),
            "velocytosimple" => Ok(FeatureType::VelocytoSimple),
            "velocyto" => Ok(FeatureType::Velocyto),
            _ => Err(format!(
                "Invalid feature type: {}. Valid types: Gene, GeneFull, SJ, Transcript3p, VelocytoSimple, Velocyto",
                s
            )),
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatureType::Gene => write!(f, "Gene"),
            FeatureType::GeneFull => write!(f, "GeneFull"),
            FeatureType::SJ => write!(f, "SJ"),
            FeatureType::Transcript3p => write!(f, "Transcript3p"),
            FeatureType::VelocytoSimple => write!(f, "VelocytoSimple"),
            FeatureType::Velocyto => write!(f, "Velocyto"),
        }
    }
}

impl FeatureType {
    pub fn all_types() -> [FeatureType; 6] {
        [
            FeatureType::Gene,
            FeatureType::GeneFull,
            FeatureType::SJ,
            FeatureType::Transcript3p,
            FeatureType::VelocytoSimple,
            FeatureType::Velocyto,
        ]
    }

    /// Velocity types write their own records straight from the annotation.
    pub fn is_velocity(&self) -> bool {
        matches!(self, FeatureType::VelocytoSimple | FeatureType::Velocyto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_type_parsing() {
        assert_eq!(FeatureType::from_str("gene").unwrap(), FeatureType::Gene);
        assert_eq!(FeatureType::from_str("GeneFull").unwrap(), FeatureType::GeneFull);
        assert_eq!(FeatureType::from_str("sj").unwrap(), FeatureType::SJ);
        assert!(FeatureType::from_str("exon").is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for feature in FeatureType::all_types() {
            assert_eq!(FeatureType::from_str(&feature.to_string()).unwrap(), feature);
        }
    }

    #[test]
    fn test_velocity_flag() {
        assert!(FeatureType::Velocyto.is_velocity());
        assert!(FeatureType::VelocytoSimple.is_velocity());
        assert!(!FeatureType::Transcript3p.is_velocity());
    }
}
