//! BOM Writer
//!
//! Serializes a parsed (and possibly extended) BOM back to delimited text.

use std::io::Write;

use super::parser::ParsedBom;
use crate::error::{DiamondError, DiamondResult};

pub struct BomWriter {
    delimiter: u8,
}

impl Default for BomWriter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl BomWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Header row followed by every data row, in table order
    pub fn to_csv(&self, bom: &ParsedBom) -> DiamondResult<Vec<u8>> {
        self.write_to(bom, Vec::new())
    }

    /// Writes the table to `sink` and hands the sink back once flushed.
    pub fn write_to<W: Write>(&self, bom: &ParsedBom, sink: W) -> DiamondResult<W> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_writer(sink);

        writer.write_record(&bom.column_headers).map_err(write_error)?;
        for row in &bom.rows {
            writer.write_record(&row.values).map_err(write_error)?;
        }

        writer
            .into_inner()
            .map_err(|e| DiamondError::export(format!("Failed to flush CSV output: {}", e)))
    }
}

fn write_error(error: csv::Error) -> DiamondError {
    DiamondError::export(format!("Failed to write CSV output: {}", error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::parser::BomParser;

    #[test]
    fn test_writes_appended_column() {
        let mut bom = BomParser::new()
            .parse_csv("bom.csv", b"MasterCode,Note\nO-1-2,\"a, b\"\nX-9,\n")
            .unwrap();
        bom.set_column("Frame", vec!["91000-01".into(), "ERROR".into()]).unwrap();

        let out = String::from_utf8(BomWriter::new().to_csv(&bom).unwrap()).unwrap();
        assert_eq!(out, "MasterCode,Note,Frame\nO-1-2,\"a, b\",91000-01\nX-9,,ERROR\n");
    }

    #[derive(Debug)]
    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_export_error() {
        let mut bom = BomParser::new().parse_csv("bom.csv", b"MasterCode\nA-1\n").unwrap();
        // larger than the writer's internal buffer so write_record itself hits the sink
        bom.set_column("Note", vec!["x".repeat(64 * 1024)]).unwrap();

        let err = BomWriter::new().write_to(&bom, BrokenSink).unwrap_err();
        assert_eq!(err.error_code(), "EXPORT_ERROR");
        assert_eq!(err.http_status_code(), 500);
    }

    #[test]
    fn test_custom_delimiter() {
        let bom = BomParser::new().parse_csv("bom.csv", b"MasterCode,Finish Kit\nO-1,FK\n").unwrap();
        let out = BomWriter::new().with_delimiter(b'\t').to_csv(&bom).unwrap();
        assert_eq!(out, b"MasterCode\tFinish Kit\nO-1\tFK\n");
    }
}
