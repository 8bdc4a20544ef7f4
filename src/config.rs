//! Compression-level knob exposed by every variant's compress path and
//! the CLI's `--level` flag.

/// Tuning tier handed to [`crate::entropy::compress`]. `Fast` maps to
/// `xz2`'s easy preset 1, `Balanced` to preset 6, and `Best` to preset 9 +
/// extreme with an additional tuned filter chain — three genuinely
/// distinct cost/ratio points, not just a label on the same encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    Fast,
    #[default]
    Balanced,
    Best,
}

impl CompressionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            CompressionLevel::Fast => "fast",
            CompressionLevel::Balanced => "balanced",
            CompressionLevel::Best => "best",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fast" => Some(CompressionLevel::Fast),
            "balanced" => Some(CompressionLevel::Balanced),
            "best" => Some(CompressionLevel::Best),
            _ => None,
        }
    }
}
