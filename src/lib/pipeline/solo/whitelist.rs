//! Cell barcode whitelist

use crate::core::error::{Result, SoloError};
use crate::core::io::get_line_reader;
use rustc_hash::FxHashSet;
use std::io::BufRead;
use std::path::Path;

/// Ordered whitelist of cell barcodes. A barcode's position is its index in the
/// record stream and in the dense per-cell counts.
#[derive(Debug, Clone)]
pub struct Whitelist {
    ordered_barcodes: Vec<String>,
}

impl Whitelist {
    /// Load a whitelist from a plain or gzipped file, one barcode per line.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = get_line_reader(path).map_err(|e| {
            SoloError::InvalidInput(format!("cannot open whitelist {}: {:#}", path.display(), e))
        })?;

        Self::from_reader(reader)
    }

    #[inline]
    pub fn barcode_by_id(&self, id: u64) -> Option<&str> {
        self.ordered_barcodes.get(id as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.ordered_barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_barcodes.is_empty()
    }

    fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut ordered = Vec::with_capacity(1024);
        let mut seen = FxHashSet::default();

        for line in reader.lines() {
            let line = line?;
            let barcode = line.trim();
            if barcode.is_empty() {
                continue;
            }
            let clean_barcode = barcode.split('-').next().unwrap_or(barcode);
            if seen.insert(clean_barcode.to_string()) {
                ordered.push(clean_barcode.to_string());
            }
        }

        ordered.shrink_to_fit();
        Ok(Whitelist {
            ordered_barcodes: ordered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs::File;
    use std::io::Write;

    fn write_gzipped(path: &Path, content: &[u8]) {
        let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn loads_plain_file_and_strips_suffixes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "AAAC-1\nCCGT-1\n\nAAAC-2\nGGTA").unwrap();

        let whitelist = Whitelist::from_file(file.path()).unwrap();
        assert_eq!(whitelist.len(), 3);
        assert_eq!(whitelist.barcode_by_id(0), Some("AAAC"));
        assert_eq!(whitelist.barcode_by_id(1), Some("CCGT"));
        assert_eq!(whitelist.barcode_by_id(2), Some("GGTA"));
        assert_eq!(whitelist.barcode_by_id(3), None);
    }

    #[test]
    fn loads_every_compressed_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["whitelist.txt.gz", "whitelist.gzip", "whitelist.bgzf"] {
            let path = dir.path().join(name);
            write_gzipped(&path, b"TTTT\nCCCC\n");

            let whitelist = Whitelist::from_file(&path).unwrap();
            assert_eq!(whitelist.len(), 2, "{}", name);
            assert_eq!(whitelist.barcode_by_id(1), Some("CCCC"), "{}", name);
        }
    }

    #[test]
    fn missing_file_is_invalid_input() {
        let err = Whitelist::from_file("/nonexistent/whitelist.txt").unwrap_err();
        assert!(matches!(err, SoloError::InvalidInput(_)));
    }
}
