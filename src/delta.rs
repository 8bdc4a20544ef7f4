//! Delta and IP-XOR sequence codecs, and the IPv4/timestamp parsers that
//! feed them.
//!
//! Both codecs share the same shape: a running "prior" value starts at a
//! fixed implicit default, and each row stores only the difference (ZigZag
//! varint for delta, raw varint XOR for ip-xor) from the previous row.

use crate::varint::{read_varint, write_varint, zigzag_decode, zigzag_encode};
use crate::error::Result;
use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone};

/// Encode a signed integer sequence as successive ZigZag-mapped deltas.
///
/// The implicit prior before row 0 is `0`, so `decode(encode(xs))[0]`
/// equals `xs[0]`.
pub fn encode_delta(out: &mut Vec<u8>, values: &[i64]) {
    let mut prior = 0i64;
    for &v in values {
        write_varint(out, zigzag_encode(v.wrapping_sub(prior)));
        prior = v;
    }
}

/// Inverse of [`encode_delta`]: reconstruct `count` values starting at
/// `buf[*pos]`, advancing `*pos` past the encoded sequence.
pub fn decode_delta(buf: &[u8], pos: &mut usize, count: usize) -> Result<Vec<i64>> {
    let mut prior = 0i64;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let delta = zigzag_decode(read_varint(buf, pos)?);
        prior = prior.wrapping_add(delta);
        out.push(prior);
    }
    Ok(out)
}

/// Encode a sequence of IPv4 addresses (as `u32`) as successive XORs with
/// the previous address, with an implicit prior of `0` before row 0.
pub fn encode_ip_xor(out: &mut Vec<u8>, values: &[u32]) {
    let mut prior = 0u32;
    for &v in values {
        write_varint(out, (v ^ prior) as u64);
        prior = v;
    }
}

/// Inverse of [`encode_ip_xor`], advancing `*pos` past the encoded sequence.
pub fn decode_ip_xor(buf: &[u8], pos: &mut usize, count: usize) -> Result<Vec<u32>> {
    let mut prior = 0u32;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let xor = read_varint(buf, pos)? as u32;
        prior ^= xor;
        out.push(prior);
    }
    Ok(out)
}

/// Parse a dotted-quad IPv4 address into its big-endian `u32` packing.
///
/// Returns `None` on any malformed input; callers fall back to XOR-0
/// (equal to the prior address), which loses the malformed value.
pub fn parse_ipv4(s: &str) -> Option<u32> {
    let mut octets = [0u32; 4];
    let mut parts = s.split('.');
    for octet in octets.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse::<u32>().ok().filter(|&v| v <= 255)?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some((octets[0] << 24) | (octets[1] << 16) | (octets[2] << 8) | octets[3])
}

/// Format a packed IPv4 `u32` back to dotted-quad notation.
pub fn format_ipv4(ip: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        (ip >> 24) & 0xFF,
        (ip >> 16) & 0xFF,
        (ip >> 8) & 0xFF,
        ip & 0xFF,
    )
}

/// Parse one of three recognized timestamp forms into microseconds since
/// the Unix epoch. Unrecognized input yields `0`.
pub fn parse_timestamp_micros(s: &str) -> i64 {
    // (i) YYYY-MM-DDThh:mm:ss[.uuu]Z
    for fmt in ["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%SZ"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.and_utc().timestamp_micros();
        }
    }
    // (ii) YYYY-MM-DD hh:mm:ss -> seconds * 10^6
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return dt.and_utc().timestamp() * 1_000_000;
    }
    // (iii) hh:mm:ss -> today's date at that time * 10^6
    if let Ok(time) = NaiveTime::parse_from_str(s, "%H:%M:%S") {
        let today = Local::now().date_naive();
        if let Some(dt) = today.and_time(time).and_local_timezone(Local).single() {
            return dt.timestamp() * 1_000_000;
        }
        return NaiveDateTime::new(today, time).and_utc().timestamp() * 1_000_000;
    }
    0
}

/// True if `s` parses as one of the three recognized timestamp forms.
pub fn is_timestamp_like(s: &str) -> bool {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveTime::parse_from_str(s, "%H:%M:%S").is_ok()
}

/// Reformat a microsecond epoch timestamp back to `YYYY-MM-DDThh:mm:ss.uuuZ`
/// for display purposes (e.g. the CLI's `info` command).
pub fn format_timestamp_micros(micros: i64) -> String {
    let secs = micros.div_euclid(1_000_000);
    let rem_micros = micros.rem_euclid(1_000_000) as u32;
    match DateTime::from_timestamp(secs, rem_micros * 1_000) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        None => micros.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_idempotence() {
        let xs = vec![10i64, 11, 11, 9, 1000, -50, -50, 0];
        let mut buf = Vec::new();
        encode_delta(&mut buf, &xs);
        let mut pos = 0;
        assert_eq!(decode_delta(&buf, &mut pos, xs.len()).unwrap(), xs);
    }

    #[test]
    fn delta_ascending_sequence_is_all_ones() {
        // S3: seq=1..50 should delta-encode to constant deltas of 1.
        let xs: Vec<i64> = (1..=50).collect();
        let mut buf = Vec::new();
        encode_delta(&mut buf, &xs);
        let mut pos = 0;
        assert_eq!(decode_delta(&buf, &mut pos, xs.len()).unwrap(), xs);
        // Every delta byte after the first should be the 1-byte zigzag(1)=2.
        assert!(buf.len() <= 50 + 4);
    }

    #[test]
    fn ip_xor_idempotence() {
        let ips = vec![
            parse_ipv4("10.0.0.1").unwrap(),
            parse_ipv4("10.0.0.1").unwrap(),
            parse_ipv4("10.0.0.2").unwrap(),
            parse_ipv4("192.168.1.255").unwrap(),
        ];
        let mut buf = Vec::new();
        encode_ip_xor(&mut buf, &ips);
        let mut pos = 0;
        assert_eq!(decode_ip_xor(&buf, &mut pos, ips.len()).unwrap(), ips);
    }

    #[test]
    fn ipv4_parse_roundtrip() {
        assert_eq!(parse_ipv4("192.168.1.100"), Some(0xC0A80164));
        assert_eq!(format_ipv4(0xC0A80164), "192.168.1.100");
        assert_eq!(parse_ipv4("0.0.0.0"), Some(0));
        assert_eq!(parse_ipv4("255.255.255.255"), Some(u32::MAX));
    }

    #[test]
    fn ipv4_parse_rejects_malformed() {
        assert_eq!(parse_ipv4("256.1.1.1"), None);
        assert_eq!(parse_ipv4("1.1.1"), None);
        assert_eq!(parse_ipv4("1.1.1.1.1"), None);
        assert_eq!(parse_ipv4("not an ip"), None);
        assert_eq!(parse_ipv4(""), None);
    }

    #[test]
    fn timestamp_parses_iso_with_micros() {
        let micros = parse_timestamp_micros("2024-01-15T10:30:45.123Z");
        assert!(micros > 0);
        let micros2 = parse_timestamp_micros("2024-01-15T10:30:45Z");
        assert!(micros2 > 0);
        assert!((micros - micros2).abs() < 2_000_000);
    }

    #[test]
    fn timestamp_parses_space_separated() {
        let micros = parse_timestamp_micros("2024-01-15 10:30:45");
        assert!(micros > 0);
    }

    #[test]
    fn timestamp_unrecognized_is_zero() {
        assert_eq!(parse_timestamp_micros("not a timestamp"), 0);
    }
}
