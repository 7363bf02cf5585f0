use anyhow::{Context, Result};
use serde::Deserialize;
use solofeat_lib::solo::{AlignedTranscript, BarcodeMatch, ReadAnnotation};
use std::io::BufRead;

/// One read as delivered by the upstream alignment/annotation stages.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadInput {
    /// Read number in the original input; defaults to the line number
    #[serde(default)]
    pub read_index: Option<u64>,
    pub n_alignments: u32,
    pub barcode: BarcodeMatch,
    #[serde(default)]
    pub annotation: ReadAnnotation,
    #[serde(default)]
    pub alignment: AlignedTranscript,
}

/// A raw input line tagged with its 0-based line number.
#[derive(Debug, Clone)]
pub struct InputLine {
    pub line_no: u64,
    pub text: String,
}

impl InputLine {
    pub fn parse(&self) -> Result<ReadInput> {
        serde_json::from_str(&self.text)
            .with_context(|| format!("Malformed read evidence on line {}", self.line_no + 1))
    }
}

/// Read up to `max_lines` non-blank lines, continuing the line numbering from
/// `next_line_no`.
pub fn read_batch<R: BufRead + ?Sized>(
    reader: &mut R,
    max_lines: usize,
    next_line_no: &mut u64,
) -> Result<Vec<InputLine>> {
    let mut batch = Vec::with_capacity(max_lines.min(1 << 20));
    let mut buf = String::new();

    while batch.len() < max_lines {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let line_no = *next_line_no;
        *next_line_no += 1;

        let text = buf.trim();
        if text.is_empty() {
            continue;
        }
        batch.push(InputLine {
            line_no,
            text: text.to_string(),
        });
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn batches_skip_blank_lines_and_keep_numbering() {
        let data = "{\"a\":1}\n\n{\"b\":2}\n{\"c\":3}\n";
        let mut reader = Cursor::new(data);
        let mut next = 0;

        let first = read_batch(&mut reader, 2, &mut next).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].line_no, 2);

        let second = read_batch(&mut reader, 2, &mut next).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].line_no, 3);
        assert!(read_batch(&mut reader, 2, &mut next).unwrap().is_empty());
    }

    #[test]
    fn parses_read_evidence() {
        let line = InputLine {
            line_no: 4,
            text: r#"{"n_alignments":1,"barcode":{"umi":"ACGT","quality":0,"candidates":[2],"display":"2"},"annotation":{"gene_concordant":[42]},"alignment":{"blocks":[{"start":10,"len":20},{"start":100,"len":30}],"gaps":[{"junction":{"annotated":false}}]}}"#.to_string(),
        };
        let read = line.parse().unwrap();
        assert_eq!(read.read_index, None);
        assert_eq!(read.barcode.umi, "ACGT");
        assert!(read.annotation.gene_concordant.contains(&42));
        assert_eq!(read.alignment.blocks.len(), 2);
    }

    #[test]
    fn reports_line_number_on_bad_json() {
        let line = InputLine {
            line_no: 6,
            text: "{not json".to_string(),
        };
        let err = line.parse().unwrap_err();
        assert!(err.to_string().contains("line 7"));
    }
}
