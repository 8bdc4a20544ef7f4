//! Variant H (hyper-decomposed): whitespace-split positional columns,
//! each further hyper-tokenized by punctuation when the analyzer calls
//! for it.

use crate::codec::{self, compile_hyper_column};
use crate::column::ColumnGrid;
use crate::config::CompressionLevel;
use crate::dispatch::Variant;
use crate::entropy;
use crate::error::{Result, UlcError};

pub const MAGIC: &[u8; 4] = b"ULCH";

fn split_positional(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Compress `input` as Variant H.
pub fn compress(input: &str, level: CompressionLevel) -> Result<Vec<u8>> {
    let lines: Vec<Vec<String>> = input.lines().map(split_positional).collect();
    let grid = ColumnGrid::from_positional(&lines);
    let columns: Vec<_> = grid.columns.iter().map(compile_hyper_column).collect();
    let body = codec::write_body(grid.row_count, &columns);
    let compressed = entropy::compress(level, &body)?;

    let mut out = Vec::with_capacity(compressed.len() + MAGIC.len() + 1);
    out.extend_from_slice(MAGIC);
    out.push(input.ends_with('\n') as u8);
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Decompress a Variant H file. Lines are reconstructed by joining
/// non-empty adjacent columns with a single space — not necessarily
/// byte-identical to the original inter-field whitespace.
pub fn decompress(data: &[u8]) -> Result<String> {
    if data.len() < MAGIC.len() + 1 || &data[..MAGIC.len()] != MAGIC {
        return Err(UlcError::BadMagic);
    }
    let had_trailing_newline = data[MAGIC.len()] != 0;
    let body = entropy::decompress(&data[MAGIC.len() + 1..])?;
    let (row_count, columns) = codec::read_body(&body)?;
    let mut text = codec::reconstruct_lines(row_count, &columns).join("\n");
    if had_trailing_newline {
        text.push('\n');
    }
    Ok(text)
}

pub fn variant() -> Variant {
    Variant::H
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_h1_two_api_lines() {
        let input = "GET /api/users/1 200\nGET /api/users/2 200";
        let compressed = compress(input, CompressionLevel::Fast).unwrap();
        assert_eq!(&compressed[..4], MAGIC);
        let decompressed = decompress(&compressed).unwrap();
        assert!(decompressed.contains("/api/users/1"));
        assert!(decompressed.contains("/api/users/2"));
        assert!(decompressed.contains("GET"));
        assert!(decompressed.contains("200"));
    }

    #[test]
    fn ragged_line_lengths_pad_with_empty_columns() {
        let input = "GET /a 200\nGET /b";
        let compressed = compress(input, CompressionLevel::Fast).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        let lines: Vec<&str> = decompressed.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("200"));
        assert!(!lines[1].contains("200"));
    }

    #[test]
    fn single_line_round_trips() {
        let input = "only one line here";
        let compressed = compress(input, CompressionLevel::Fast).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, input);
    }

    #[test]
    fn round_trip_preserves_trailing_newline() {
        let input = "GET /api/users/1 200\nGET /api/users/2 200\n";
        let compressed = compress(input, CompressionLevel::Fast).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, input);
    }
}
