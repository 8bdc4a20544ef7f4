//! Auto-dispatch: classify a corpus into a codec variant, without ever
//! spawning anything — classification only, independent of which binary
//! ends up doing the actual compression.

use std::collections::HashSet;

const PROFILE_LINES: usize = 1000;
const URL_TOKENS: [&str; 5] = ["http://", "https://", "/api/", "GET ", "POST "];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    S,
    U,
    H,
}

impl Variant {
    pub fn magic(self) -> &'static [u8; 4] {
        match self {
            Variant::S => b"ULC1",
            Variant::U => b"ULCU",
            Variant::H => b"ULCH",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Variant::S => "ulc",
            Variant::U => "ulcu",
            Variant::H => "ulch",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Profile {
    avg_len: f64,
    unique_ratio: f64,
    has_urls: bool,
    has_ip_like: bool,
    has_timestamp_like: bool,
}

fn digit_dot_digit_triple(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.windows(3).any(|w| w[0].is_ascii_digit() && w[1] == b'.' && w[2].is_ascii_digit())
}

fn looks_bracketed_or_year_prefixed(line: &str) -> bool {
    if line.starts_with('[') {
        return true;
    }
    let bytes = line.as_bytes();
    bytes.len() >= 4
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && (line.len() == 4 || line.as_bytes()[4] == b'-')
}

fn profile(lines: &[&str]) -> Profile {
    let sample: Vec<&str> = lines.iter().take(PROFILE_LINES).copied().collect();
    if sample.is_empty() {
        return Profile { avg_len: 0.0, unique_ratio: 0.0, has_urls: false, has_ip_like: false, has_timestamp_like: false };
    }
    let total_len: usize = sample.iter().map(|l| l.len()).sum();
    let avg_len = total_len as f64 / sample.len() as f64;

    let distinct: HashSet<&str> = sample.iter().copied().collect();
    let unique_ratio = distinct.len() as f64 / sample.len() as f64;

    let has_urls = sample.iter().any(|l| URL_TOKENS.iter().any(|tok| l.contains(tok)));
    let has_ip_like = sample.iter().any(|l| digit_dot_digit_triple(l));
    let has_timestamp_like = sample.iter().any(|l| looks_bracketed_or_year_prefixed(l));

    Profile { avg_len, unique_ratio, has_urls, has_ip_like, has_timestamp_like }
}

/// Classify `lines` into the variant best suited to this corpus's shape.
/// Classification only: the caller dispatches to `variant_s`/`variant_u`/
/// `variant_h` itself.
pub fn classify(lines: &[&str]) -> Variant {
    let p = profile(lines);

    if p.has_urls && p.avg_len > 150.0 {
        return Variant::H;
    }
    if p.avg_len > 200.0 && p.unique_ratio > 0.7 {
        return Variant::H;
    }
    if p.avg_len < 100.0 && p.has_timestamp_like && p.has_ip_like {
        return Variant::S;
    }
    if (100.0..=200.0).contains(&p.avg_len) {
        return Variant::U;
    }
    Variant::S
}

/// Identify the variant whose magic matches the start of `data`. `ULC`
/// alone (a 3-byte prefix) is also accepted as a Variant S match.
pub fn variant_from_magic(data: &[u8]) -> Option<Variant> {
    if data.starts_with(b"ULC1") {
        Some(Variant::S)
    } else if data.starts_with(b"ULCU") {
        Some(Variant::U)
    } else if data.starts_with(b"ULCH") {
        Some(Variant::H)
    } else if data.starts_with(b"ULC") {
        Some(Variant::S)
    } else {
        None
    }
}
