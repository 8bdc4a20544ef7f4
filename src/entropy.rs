//! LZMA2 framing and the entropy-coder driver trait.
//!
//! LZMA2 is treated as an opaque streaming transducer behind `push`/
//! `finish`; `EntropyCoder` is that trait. [`Lzma2Encoder`]/[`Lzma2Decoder`]
//! are the real `xz2`-backed implementation; [`FakeEntropyCoder`] is the
//! in-memory passthrough double used by `codec` module tests so they
//! don't pay for real compression.

use crate::config::CompressionLevel;
use crate::error::{Result, UlcError};
use std::io::Write;
use xz2::stream::{Check, Filters, LzmaOptions, Stream};
use xz2::write::{XzDecoder, XzEncoder};

/// 128 MiB dictionary for Variant U/H's "Best" tier.
const TUNED_DICT_SIZE: u32 = 128 * 1024 * 1024;
const TUNED_LC: u32 = 4;
const TUNED_LP: u32 = 0;
const TUNED_PB: u32 = 2;
const TUNED_DEPTH: u32 = 512;

/// `push`/`finish` over an entropy stream. Implementations own their own
/// internal buffering; `finish` consumes `self` since a stream can only be
/// finalized once.
pub trait EntropyCoder {
    fn push(&mut self, bytes: &[u8]) -> Result<()>;
    fn finish(self: Box<Self>) -> Result<Vec<u8>>;
}

/// Build an `xz2::stream::Stream` LZMA2 encoder. `Fast` uses preset 1
/// (no extreme pass) for the cheapest encode; `Balanced` uses preset 6
/// without extreme, `xz2`'s own default; `Best` starts from 9 + extreme
/// and additionally tunes the filter chain (128 MiB dictionary,
/// lc=4/lp=0/pb=2, BT4 match finder, depth 512).
fn build_encoder_stream(level: CompressionLevel) -> Result<Stream> {
    match level {
        CompressionLevel::Fast => Stream::new_easy_encoder(1, Check::Crc64)
            .map_err(|e| UlcError::CodecInitFailed(e.to_string())),
        CompressionLevel::Balanced => Stream::new_easy_encoder(6, Check::Crc64)
            .map_err(|e| UlcError::CodecInitFailed(e.to_string())),
        CompressionLevel::Best => {
            let mut opts = LzmaOptions::new_preset(9 | EXTREME_PRESET_FLAG)
                .map_err(|e| UlcError::CodecInitFailed(e.to_string()))?;
            opts.dict_size(TUNED_DICT_SIZE);
            opts.literal_context_bits(TUNED_LC);
            opts.literal_position_bits(TUNED_LP);
            opts.position_bits(TUNED_PB);
            opts.match_finder(xz2::stream::MatchFinder::BT4);
            opts.depth(TUNED_DEPTH);
            let mut filters = Filters::new();
            filters.lzma2(&opts);
            Stream::new_stream_encoder(&filters, Check::Crc64)
                .map_err(|e| UlcError::CodecInitFailed(e.to_string()))
        }
    }
}

/// xz2's `EXTREME` preset flag (`1 << 31`, per liblzma's `lzma/container.h`).
const EXTREME_PRESET_FLAG: u32 = 1 << 31;

/// Real LZMA2 encoder over `xz2::write::XzEncoder`.
pub struct Lzma2Encoder {
    inner: XzEncoder<Vec<u8>>,
}

impl Lzma2Encoder {
    pub fn new(level: CompressionLevel) -> Result<Self> {
        let stream = build_encoder_stream(level)?;
        Ok(Self { inner: XzEncoder::new_stream(Vec::new(), stream) })
    }
}

impl EntropyCoder for Lzma2Encoder {
    fn push(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner
            .write_all(bytes)
            .map_err(|e| UlcError::CodecStreamError(e.to_string()))
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        self.inner
            .finish()
            .map_err(|e| UlcError::CodecStreamError(e.to_string()))
    }
}

/// Real LZMA2 decoder over `xz2::write::XzDecoder`, with no memory limit
/// on the decoded dictionary.
pub struct Lzma2Decoder {
    inner: XzDecoder<Vec<u8>>,
}

impl Lzma2Decoder {
    pub fn new() -> Result<Self> {
        let stream = Stream::new_stream_decoder(u64::MAX, 0)
            .map_err(|e| UlcError::CodecInitFailed(e.to_string()))?;
        Ok(Self { inner: XzDecoder::new_stream(Vec::new(), stream) })
    }
}

impl EntropyCoder for Lzma2Decoder {
    fn push(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner
            .write_all(bytes)
            .map_err(|e| UlcError::CodecStreamError(e.to_string()))
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        self.inner
            .finish()
            .map_err(|e| UlcError::CodecStreamError(e.to_string()))
    }
}

/// In-memory passthrough double for tests: stores length-prefixed raw
/// pushes and concatenates them back on finish, so `codec` round-trip
/// tests don't pay for real LZMA2 compression.
#[derive(Default)]
pub struct FakeEntropyCoder {
    buf: Vec<u8>,
}

impl FakeEntropyCoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntropyCoder for FakeEntropyCoder {
    fn push(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        Ok(self.buf)
    }
}

/// One-shot compress helper used by the variant modules.
pub fn compress(level: CompressionLevel, body: &[u8]) -> Result<Vec<u8>> {
    let mut encoder: Box<dyn EntropyCoder> = Box::new(Lzma2Encoder::new(level)?);
    encoder.push(body)?;
    encoder.finish()
}

/// One-shot decompress helper used by the variant modules.
pub fn decompress(stream: &[u8]) -> Result<Vec<u8>> {
    let mut decoder: Box<dyn EntropyCoder> = Box::new(Lzma2Decoder::new()?);
    decoder.push(stream)?;
    decoder.finish()
}
