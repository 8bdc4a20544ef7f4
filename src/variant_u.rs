//! Variant U (ultra-columnar): Variant S's parsers, plus a format
//! consistency gate before compression and a trailing BWT primary-index
//! placeholder in the header.

use crate::codec::{self, compile_column};
use crate::column::ColumnGrid;
use crate::config::CompressionLevel;
use crate::dispatch::Variant;
use crate::entropy;
use crate::error::{Result, UlcError};
use crate::parser::{parse_line, Format, Row};
use std::collections::HashMap;

pub const MAGIC: &[u8; 4] = b"ULCU";

/// Variant U's BWT primary index is never computed: always written as 0
/// and ignored on read. Retained in the header for forward compatibility.
const BWT_INDEX_PLACEHOLDER: i32 = 0;

/// Validate format consistency over the first 100 lines: fewer than 100
/// lines, or the dominant format family covering less than 80% of the
/// sample, is fatal. A dominant family of `raw` is a non-fatal warning,
/// not an error.
fn check_format_consistency(rows: &[Row]) -> Result<()> {
    if rows.len() < 100 {
        return Err(UlcError::FormatConsistencyFailed);
    }
    let sample = &rows[..100];
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for row in sample {
        if let Some(fmt) = row.format {
            *counts.entry(fmt.name()).or_insert(0) += 1;
        }
    }
    let (dominant, count) = counts
        .iter()
        .max_by_key(|(_, &c)| c)
        .map(|(&name, &c)| (name, c))
        .unwrap_or(("raw", 0));

    if count as f64 / sample.len() as f64 < 0.8 {
        return Err(UlcError::FormatConsistencyFailed);
    }
    if dominant == Format::Raw.name() {
        log::warn!("variant U: dominant format family is raw; compression ratio may suffer");
    }
    Ok(())
}

/// Compress `input` as Variant U, validating format consistency first.
pub fn compress(input: &str, level: CompressionLevel) -> Result<Vec<u8>> {
    let rows: Vec<Row> = input.lines().map(parse_line).collect();
    check_format_consistency(&rows)?;

    let grid = ColumnGrid::from_rows(&rows);
    let columns: Vec<_> = grid.columns.iter().map(compile_column).collect();
    let body = codec::write_body(grid.row_count, &columns);
    let compressed = entropy::compress(level, &body)?;

    let mut out = Vec::with_capacity(compressed.len() + MAGIC.len() + 5);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&BWT_INDEX_PLACEHOLDER.to_le_bytes());
    out.push(input.ends_with('\n') as u8);
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Decompress a Variant U file; the BWT index is read and discarded.
pub fn decompress(data: &[u8]) -> Result<String> {
    let header_len = MAGIC.len() + 4 + 1;
    if data.len() < header_len || &data[..MAGIC.len()] != MAGIC {
        return Err(UlcError::BadMagic);
    }
    let had_trailing_newline = data[MAGIC.len() + 4] != 0;
    let body = entropy::decompress(&data[header_len..])?;
    let (row_count, columns) = codec::read_body(&body)?;
    let mut text = codec::reconstruct_lines(row_count, &columns).join("\n");
    if had_trailing_newline {
        text.push('\n');
    }
    Ok(text)
}

pub fn variant() -> Variant {
    Variant::U
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syslog_corpus(hosts: &[&str]) -> String {
        hosts
            .iter()
            .map(|h| format!("Nov 24 18:55:22 {h} sshd[42]: accepted"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn scenario_u1_mixed_hosts_constant_service() {
        let hosts: Vec<String> = (0..100).map(|i| format!("host{}", i % 5)).collect();
        let host_refs: Vec<&str> = hosts.iter().map(String::as_str).collect();
        let input = syslog_corpus(&host_refs);
        let compressed = compress(&input, CompressionLevel::Fast).unwrap();
        assert_eq!(&compressed[..4], MAGIC);
        let decompressed = decompress(&compressed).unwrap();
        for h in &hosts {
            assert!(decompressed.contains(h.as_str()));
        }
        assert!(decompressed.contains("sshd"));
    }

    #[test]
    fn fewer_than_100_lines_fails_consistency() {
        let input = syslog_corpus(&["a", "b", "c"]);
        assert!(matches!(compress(&input, CompressionLevel::Fast), Err(UlcError::FormatConsistencyFailed)));
    }

    #[test]
    fn mixed_incompatible_formats_fail_consistency() {
        let mut lines = Vec::new();
        for i in 0..100 {
            if i % 2 == 0 {
                lines.push("Nov 24 18:55:22 host1 sshd[42]: accepted".to_string());
            } else {
                lines.push(format!(
                    r#"127.0.0.1 - - [24/Nov/2025:18:55:22 +0000] "GET /p{i} HTTP/1.1" 200 100"#
                ));
            }
        }
        let input = lines.join("\n");
        assert!(matches!(compress(&input, CompressionLevel::Fast), Err(UlcError::FormatConsistencyFailed)));
    }

    #[test]
    fn bwt_index_is_always_zero() {
        let hosts: Vec<String> = (0..100).map(|_| "host1".to_string()).collect();
        let host_refs: Vec<&str> = hosts.iter().map(String::as_str).collect();
        let input = syslog_corpus(&host_refs);
        let compressed = compress(&input, CompressionLevel::Fast).unwrap();
        let index = i32::from_le_bytes(compressed[4..8].try_into().unwrap());
        assert_eq!(index, 0);
    }

    #[test]
    fn round_trip_preserves_trailing_newline() {
        let hosts: Vec<String> = (0..100).map(|i| format!("host{}", i % 5)).collect();
        let host_refs: Vec<&str> = hosts.iter().map(String::as_str).collect();
        let input = syslog_corpus(&host_refs) + "\n";
        let compressed = compress(&input, CompressionLevel::Fast).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, input);
    }
}
