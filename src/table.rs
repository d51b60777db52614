//! Delimited table loading.
//!
//! CVM exports are `;`-separated and Latin-1 encoded. A table is read fully
//! into memory: row counts are in the low thousands per year.

use crate::error::{FundError, Result};
use crate::field_parsers::split_delimited_line;
use encoding_rs::mem::decode_latin1;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Header row plus data rows of one delimited file
#[derive(Debug, Clone)]
pub struct DelimitedTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DelimitedTable {
    /// Read and split a Latin-1 encoded file.
    pub fn read(path: &Path, delimiter: char) -> Result<Self> {
        let bytes = fs::read(path)?;
        // ISO-8859-1 proper: every byte maps to the code point of the same value
        let text = decode_latin1(&bytes);
        Self::parse(path, &text, delimiter)
    }

    /// Split already-decoded text. Empty lines are dropped and at least a
    /// header and one data line are required.
    pub fn parse(path: &Path, text: &str, delimiter: char) -> Result<Self> {
        let mut lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty());

        let header_line = lines.next().ok_or_else(|| FundError::EmptyTable {
            path: path.to_path_buf(),
        })?;
        let headers = split_delimited_line(header_line, delimiter);

        let rows: Vec<Vec<String>> = lines
            .map(|line| split_delimited_line(line, delimiter))
            .collect();
        if rows.is_empty() {
            return Err(FundError::EmptyTable {
                path: path.to_path_buf(),
            });
        }

        debug!(
            "Loaded {} rows x {} columns from {}",
            rows.len(),
            headers.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }
}

/// Field at `index`, or `None` when the row is shorter than the header
pub fn field(row: &[String], index: usize) -> Option<&str> {
    row.get(index).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_drops_empty_lines_and_crlf() {
        let text = "A;B\r\n1;2\r\n\r\n3;4\n";
        let table = DelimitedTable::parse(Path::new("t.csv"), text, ';').unwrap();
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn test_parse_requires_a_data_row() {
        for text in ["", "\n\n", "A;B\n"] {
            let err = DelimitedTable::parse(Path::new("t.csv"), text, ';').unwrap_err();
            assert!(matches!(err, FundError::EmptyTable { .. }), "{text:?}");
        }
    }

    #[test]
    fn test_read_decodes_latin1() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("latin1.csv");
        // "Patrimônio" with 0xF4 for ô
        let mut bytes = b"Nome;Patrim".to_vec();
        bytes.push(0xF4);
        bytes.extend_from_slice(b"nio\nFundo;1\n");
        fs::write(&path, bytes).unwrap();

        let table = DelimitedTable::read(&path, ';').unwrap();
        assert_eq!(table.headers, vec!["Nome", "Patrimônio"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_read_maps_c1_bytes_to_same_code_points() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("c1.csv");
        fs::write(&path, [b'A', b';', 0x80, b'\n', b'1', b';', 0x9F, b'\n']).unwrap();

        let table = DelimitedTable::read(&path, ';').unwrap();
        assert_eq!(table.headers, vec!["A", "\u{80}"]);
        assert_eq!(table.rows, vec![vec!["1".to_string(), "\u{9f}".to_string()]]);
    }

    #[test]
    fn test_field_out_of_range() {
        let row = vec!["a".to_string()];
        assert_eq!(field(&row, 0), Some("a"));
        assert_eq!(field(&row, 3), None);
    }
}
