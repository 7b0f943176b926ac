// src/io/mod.rs
pub mod load;
pub mod unload;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::{
    fs::File,
    io::{BufReader, Read, Write},
    path::Path,
};
use tracing::{debug, trace};

/// Data rows of one comma-delimited sheet.
#[derive(Debug, Default)]
pub struct RawTable {
    /// Every record after the skipped lines, one `Vec` of cells per row.
    pub rows: Vec<Vec<String>>,
    /// Records read from the source, skipped lines included.
    pub total_records: usize,
}

/// Parse comma-delimited text, dropping the first `skip_lines` records.
/// Rows may have differing cell counts.
pub fn read_rows<R: Read>(reader: R, skip_lines: usize) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut table = RawTable::default();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        table.total_records += 1;
        if idx < skip_lines {
            trace!(idx, "skipping header line");
            continue;
        }
        table
            .rows
            .push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(table)
}

#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_rows_from_path<P: AsRef<Path>>(path: P, skip_lines: usize) -> Result<RawTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open input file: {:?}", path.as_ref()))?;
    let table = read_rows(BufReader::new(file), skip_lines)
        .with_context(|| format!("Failed to read {:?}", path.as_ref()))?;
    debug!(rows = table.rows.len(), total = table.total_records, "read sheet");
    Ok(table)
}

/// Write `rows` as comma-delimited text, quoting cells where needed.
pub fn write_rows<W: Write>(writer: W, rows: &[Vec<String>]) -> Result<()> {
    let mut wtr = WriterBuilder::new().flexible(true).from_writer(writer);
    for row in rows {
        wtr.write_record(row).context("writing CSV record")?;
    }
    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}

#[tracing::instrument(level = "info", skip(path, rows), fields(path = %path.as_ref().display(), rows = rows.len()))]
pub fn write_rows_to_path<P: AsRef<Path>>(path: P, rows: &[Vec<String>]) -> Result<()> {
    let file = File::create(&path)
        .with_context(|| format!("Failed to create output file: {:?}", path.as_ref()))?;
    write_rows(file, rows).with_context(|| format!("Failed to write {:?}", path.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn skips_header_and_keeps_quoted_commas() -> Result<()> {
        let text = "Name,OS\nweb,\"Windows, 2012\"\n\nshort\n";
        let table = read_rows(text.as_bytes(), 1)?;
        assert_eq!(table.total_records, 3);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["web", "Windows, 2012"]);
        assert_eq!(table.rows[1], vec!["short"]);
        Ok(())
    }

    #[test]
    fn file_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.csv");
        let rows = vec![
            vec!["a".to_string(), "b,c".to_string()],
            vec!["1".to_string(), String::new()],
        ];
        write_rows_to_path(&path, &rows)?;
        let back = read_rows_from_path(&path, 0)?;
        assert_eq!(back.rows, rows);
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_rows_from_path("/definitely/not/here.csv", 1).is_err());
    }
}
