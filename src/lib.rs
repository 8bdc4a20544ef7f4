//! # ulc
//!
//! Columnar log compressor. Parses newline-delimited log text into typed
//! field columns, applies a per-column codec chosen from a small menu
//! (raw, dictionary, delta, IP-XOR, hyper-decomposed), then runs LZMA2
//! over the resulting byte stream. Three variants trade off how a line
//! decomposes into fields:
//!
//! - [`variant_s`] — structured: known log-family regex parsers (Apache,
//!   syslog, security, generic-bracketed) produce a named field list.
//! - [`variant_u`] — ultra-columnar: the same parsers, plus a format
//!   consistency gate before compression.
//! - [`variant_h`] — hyper-decomposed: whitespace-positional columns,
//!   each further tokenized by punctuation into sub-columns.
//!
//! [`dispatch::classify`] inspects a corpus and recommends a variant; it
//! does not compress anything itself.
//!
//! ## Known divergence
//!
//! Variant H's tokenizer suppresses empty literals between adjacent
//! delimiters (e.g. `//` or `""`). Decompression therefore does not
//! reproduce those runs byte-for-byte, even though the parsed field
//! *values* round-trip exactly — see [`tokenizer`].
//!
//! ## Example
//!
//! ```rust
//! use ulc::{config::CompressionLevel, variant_s};
//!
//! let log = "127.0.0.1 - - [24/Nov/2025:18:55:22 +0000] \"GET / HTTP/1.1\" 200 512";
//! let compressed = variant_s::compress(log, CompressionLevel::Fast).unwrap();
//! let decompressed = variant_s::decompress(&compressed).unwrap();
//! assert!(decompressed.contains("200"));
//! ```

#[cfg(not(target_env = "msvc"))]
use mimalloc::MiMalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub mod analyzer;
pub mod codec;
pub mod column;
pub mod config;
pub mod delta;
pub mod dictionary;
pub mod dispatch;
pub mod entropy;
pub mod error;
pub mod parser;
pub mod tokenizer;
pub mod varint;
pub mod variant_h;
pub mod variant_s;
pub mod variant_u;

pub use config::CompressionLevel;
pub use dispatch::Variant;
pub use error::{Result, UlcError};

/// Compress `input` with the variant and level given, selecting the entry
/// point by [`Variant`] (the dispatch decision itself is
/// [`dispatch::classify`]'s job, not this function's).
pub fn compress(variant: Variant, input: &str, level: CompressionLevel) -> Result<Vec<u8>> {
    match variant {
        Variant::S => variant_s::compress(input, level),
        Variant::U => variant_u::compress(input, level),
        Variant::H => variant_h::compress(input, level),
    }
}

/// Decompress `data`, dispatching on its magic bytes: the header
/// deterministically selects which variant's decoder handles it.
pub fn decompress(data: &[u8]) -> Result<String> {
    match dispatch::variant_from_magic(data) {
        Some(Variant::S) => variant_s::decompress(data),
        Some(Variant::U) => variant_u::decompress(data),
        Some(Variant::H) => variant_h::decompress(data),
        None => Err(UlcError::BadMagic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_decompress_round_trips_for_every_variant() {
        let apache_corpus: Vec<String> = (0..120)
            .map(|i| {
                format!(
                    r#"127.0.0.{} - - [24/Nov/2025:18:55:22 +0000] "GET /page{} HTTP/1.1" 200 512"#,
                    i % 255,
                    i
                )
            })
            .collect();
        let input = apache_corpus.join("\n");

        for variant in [Variant::S, Variant::U, Variant::H] {
            let compressed = compress(variant, &input, CompressionLevel::Fast).unwrap();
            assert_eq!(dispatch::variant_from_magic(&compressed), Some(variant));
            let decompressed = decompress(&compressed).unwrap();
            assert!(decompressed.contains("200"));
        }
    }

    #[test]
    fn decompress_unrecognized_magic_is_bad_magic() {
        assert!(matches!(decompress(b"not-a-ulc-file"), Err(UlcError::BadMagic)));
    }

    #[test]
    fn top_level_compress_picks_matching_entry_point() {
        let input = "this is a single raw line with no known structure";
        let compressed = compress(Variant::S, input, CompressionLevel::Fast).unwrap();
        assert_eq!(&compressed[..4], Variant::S.magic());
    }
}
