//! Variant S (structured) compress/decompress entry points: line parsers
//! → column grid → per-column encoding → LZMA2, framed with the `ULC1`
//! magic. Decompress is a full symmetric path using the same column
//! format as compress.

use crate::codec::{self, compile_column};
use crate::column::ColumnGrid;
use crate::config::CompressionLevel;
use crate::dispatch::Variant;
use crate::entropy;
use crate::error::{Result, UlcError};
use crate::parser::parse_line;

pub const MAGIC: &[u8; 4] = b"ULC1";

/// Compress `input` (newline-delimited log text) into a Variant S file.
pub fn compress(input: &str, level: CompressionLevel) -> Result<Vec<u8>> {
    let rows: Vec<_> = input.lines().map(parse_line).collect();
    let grid = ColumnGrid::from_rows(&rows);
    let columns: Vec<_> = grid.columns.iter().map(compile_column).collect();
    let body = codec::write_body(grid.row_count, &columns);
    let compressed = entropy::compress(level, &body)?;

    let mut out = Vec::with_capacity(compressed.len() + MAGIC.len() + 1);
    out.extend_from_slice(MAGIC);
    out.push(input.ends_with('\n') as u8);
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Decompress a Variant S file back into newline-delimited text.
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
    Variant::S
}
