//! Intermediate per-read record stream
//!
//! One line per feature unit, space-separated, UMI first:
//!
//! ```text
//! no feature     UMI iRead -1 cbMatch cbMatchString
//! Gene/GeneFull  UMI [iRead] gene cbMatch cbMatchString
//! SJ             UMI [iRead] sjStart sjEnd cbMatch cbMatchString      (one line per junction)
//! Transcript3p   UMI [iRead] nTr tr1 dist1 ... cbMatch cbMatchString
//! VelocytoSimple iRead gene type
//! Velocyto       iRead nTr tr1 type1 ...
//! ```
//!
//! `iRead` in brackets is only present in per-read diagnostic mode.

use std::io::Write;

use super::annotation::{ReadAnnotation, TranscriptHit, TranscriptVelocity, VelocitySimple};
use super::barcode::BarcodeMatch;
use super::classifier::FeatureUnit;
use super::feature_type::FeatureType;
use super::junction::Junction;
use crate::core::error::{Result, SoloError};

/// Feature field of a diagnostic record for a read without a feature.
pub const NO_FEATURE: i64 = -1;

#[inline]
fn write_prefix(out: &mut dyn Write, umi: &str, read_index: Option<u64>) -> Result<()> {
    match read_index {
        Some(index) => write!(out, "{} {} ", umi, index)?,
        None => write!(out, "{} ", umi)?,
    }
    Ok(())
}

#[inline]
fn write_barcode_suffix(out: &mut dyn Write, barcode: &BarcodeMatch) -> Result<()> {
    writeln!(out, "{} {}", barcode.quality.code(), barcode.display)?;
    Ok(())
}

/// Number of feature units as recorded in the per-cell counts.
fn unit_count(units: usize) -> Result<u32> {
    u32::try_from(units)
        .map_err(|_| SoloError::InvalidInput(format!("{} feature units in one read", units)))
}

pub(crate) fn unit_mismatch(feature_type: FeatureType, unit: &FeatureUnit) -> SoloError {
    SoloError::InvalidInput(format!(
        "feature unit {:?} cannot be encoded as {}",
        unit, feature_type
    ))
}

/// Record for a read that produced no feature, written in diagnostic mode.
pub fn write_diagnostic(out: &mut dyn Write, read_index: u64, barcode: &BarcodeMatch) -> Result<u32> {
    write!(out, "{} {} {} ", barcode.umi, read_index, NO_FEATURE)?;
    write_barcode_suffix(out, barcode)?;
    Ok(1)
}

pub fn write_gene(
    out: &mut dyn Write,
    read_index: Option<u64>,
    barcode: &BarcodeMatch,
    gene: u32,
) -> Result<u32> {
    write_prefix(out, &barcode.umi, read_index)?;
    write!(out, "{} ", gene)?;
    write_barcode_suffix(out, barcode)?;
    Ok(1)
}

/// One line per junction; returns the number of junctions written.
pub fn write_junctions(
    out: &mut dyn Write,
    read_index: Option<u64>,
    barcode: &BarcodeMatch,
    junctions: &[Junction],
) -> Result<u32> {
    let units = unit_count(junctions.len())?;
    for junction in junctions {
        write_prefix(out, &barcode.umi, read_index)?;
        write!(out, "{} {} ", junction[0], junction[1])?;
        write_barcode_suffix(out, barcode)?;
    }
    Ok(units)
}

pub fn write_transcripts(
    out: &mut dyn Write,
    read_index: Option<u64>,
    barcode: &BarcodeMatch,
    hits: &[TranscriptHit],
) -> Result<u32> {
    write_prefix(out, &barcode.umi, read_index)?;
    write!(out, "{} ", hits.len())?;
    for hit in hits {
        write!(out, "{} {} ", hit.transcript, hit.distance_to_3p)?;
    }
    write_barcode_suffix(out, barcode)?;
    Ok(1)
}

pub fn write_velocity_simple(
    out: &mut dyn Write,
    read_index: u64,
    summary: &VelocitySimple,
) -> Result<u32> {
    writeln!(out, "{} {} {}", read_index, summary.gene, summary.tag)?;
    Ok(1)
}

/// `tags` must already be ordered by transcript ID.
pub fn write_velocity(
    out: &mut dyn Write,
    read_index: u64,
    tags: &[TranscriptVelocity],
) -> Result<u32> {
    write!(out, "{} {}", read_index, tags.len())?;
    for tag in tags {
        write!(out, " {} {}", tag.transcript, tag.tag as u32)?;
    }
    writeln!(out)?;
    Ok(1)
}

/// Encode an accepted read of a barcode-carrying feature type and return the
/// number of units written. Velocity types do not go through here.
pub fn encode_record(
    out: &mut dyn Write,
    read_index: Option<u64>,
    feature_type: FeatureType,
    barcode: &BarcodeMatch,
    unit: &FeatureUnit,
    annotation: &ReadAnnotation,
) -> Result<u32> {
    match (feature_type, unit) {
        (FeatureType::Gene | FeatureType::GeneFull, FeatureUnit::Gene(gene)) => {
            write_gene(out, read_index, barcode, *gene)
        }
        (FeatureType::SJ, FeatureUnit::Junctions(junctions)) => {
            write_junctions(out, read_index, barcode, junctions)
        }
        (FeatureType::Transcript3p, FeatureUnit::FromAnnotation) => {
            write_transcripts(out, read_index, barcode, &annotation.transcript_concordant)
        }
        _ => Err(unit_mismatch(feature_type, unit)),
    }
}

/// Feature field(s) of a parsed record line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedFeature {
    /// Diagnostic record of a read without a feature
    None,
    Gene(u32),
    Junction(Junction),
    Transcripts(Vec<TranscriptHit>),
}

/// One line of the record stream as seen by the downstream counting pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub umi: String,
    pub read_index: Option<u64>,
    pub feature: ParsedFeature,
    pub match_code: i32,
    pub display: String,
}

fn no_barcode_fields(feature_type: FeatureType) -> SoloError {
    SoloError::InvalidInput(format!(
        "{} records carry no barcode fields",
        feature_type
    ))
}

fn next_field<'a>(fields: &mut impl Iterator<Item = &'a str>, what: &str) -> Result<&'a str> {
    fields
        .next()
        .ok_or_else(|| SoloError::Parse(format!("record is missing the {} field", what)))
}

fn parse_number<T: std::str::FromStr>(field: &str, what: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| SoloError::Parse(format!("invalid {} '{}'", what, field)))
}

/// Parse one record line written for `feature_type`. `with_read_index` must
/// match the diagnostic mode the stream was written in; diagnostic records
/// (feature `-1`) always carry a read index.
pub fn parse_record(
    line: &str,
    feature_type: FeatureType,
    with_read_index: bool,
) -> Result<ParsedRecord> {
    if feature_type.is_velocity() {
        return Err(no_barcode_fields(feature_type));
    }

    let mut fields = line.trim_end_matches('\n').split(' ');
    let umi = next_field(&mut fields, "UMI")?.to_string();
    let first = next_field(&mut fields, "feature")?;

    let (read_index, feature_field) = if with_read_index {
        (
            Some(parse_number::<u64>(first, "read index")?),
            next_field(&mut fields, "feature")?,
        )
    } else {
        (None, first)
    };

    let feature = if feature_field == NO_FEATURE.to_string() {
        if read_index.is_none() {
            return Err(SoloError::Parse(
                "diagnostic record without read index".to_string(),
            ));
        }
        ParsedFeature::None
    } else {
        match feature_type {
            FeatureType::Gene | FeatureType::GeneFull => {
                ParsedFeature::Gene(parse_number(feature_field, "gene")?)
            }
            FeatureType::SJ => {
                let start = parse_number(feature_field, "junction start")?;
                let end = parse_number(next_field(&mut fields, "junction end")?, "junction end")?;
                ParsedFeature::Junction([start, end])
            }
            FeatureType::Transcript3p => {
                let n: usize = parse_number(feature_field, "transcript count")?;
                // Count comes from the line itself; do not trust it for allocation.
                let mut hits = Vec::with_capacity(n.min(64));
                for _ in 0..n {
                    let transcript = parse_number(next_field(&mut fields, "transcript")?, "transcript")?;
                    let distance_to_3p =
                        parse_number(next_field(&mut fields, "distance")?, "distance")?;
                    hits.push(TranscriptHit {
                        transcript,
                        distance_to_3p,
                    });
                }
                ParsedFeature::Transcripts(hits)
            }
            FeatureType::VelocytoSimple | FeatureType::Velocyto => {
                return Err(no_barcode_fields(feature_type))
            }
        }
    };

    let match_code = parse_number(next_field(&mut fields, "barcode match")?, "barcode match")?;
    let display = fields.collect::<Vec<_>>().join(" ");

    Ok(ParsedRecord {
        umi,
        read_index,
        feature,
        match_code,
        display,
    })
}
