//! Column statistical probes and the encoding selector.
//!
//! One pass per column gathers every probe the selection table needs —
//! `probe()` builds up several counters in a single scan rather than
//! looping per-statistic. Encoding choice is value-driven (what the
//! column's contents actually look like), not keyed off field names.

use crate::column::tokenize_column;
use crate::delta::{is_timestamp_like, parse_ipv4};
use std::collections::HashSet;

const PROBE_SAMPLE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Raw,
    Dict,
    Delta,
    IpXor,
    Hyper,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnStats {
    pub distinct: usize,
    pub numeric_candidate: bool,
    pub ip_candidate: bool,
    pub non_empty: usize,
    pub token_uniqueness: Option<f64>,
    pub avg_len: Option<f64>,
}

fn looks_numeric(s: &str) -> bool {
    !s.is_empty() && s.parse::<i64>().is_ok()
}

fn looks_ip(s: &str) -> bool {
    let dots = s.chars().filter(|&c| c == '.').count();
    let digits = s.chars().filter(|c| c.is_ascii_digit()).count();
    dots >= 3 && digits >= 4 && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Probe a top-level S/U/H column: distinct-value count over every row,
/// numeric/IP candidacy over every non-empty value among the first
/// [`PROBE_SAMPLE`] rows. A column with no non-empty value in that window
/// (including an entirely empty column) stays candidate by vacuous truth.
pub fn probe(values: &[String]) -> ColumnStats {
    let mut distinct_set = HashSet::new();
    let mut non_empty = 0usize;
    for v in values {
        distinct_set.insert(v.as_str());
        if !v.is_empty() {
            non_empty += 1;
        }
    }

    let mut numeric_candidate = true;
    let mut ip_candidate = true;
    for v in values.iter().take(PROBE_SAMPLE) {
        if v.is_empty() {
            continue;
        }
        if !looks_numeric(v) {
            numeric_candidate = false;
        }
        if !looks_ip(v) {
            ip_candidate = false;
        }
    }

    ColumnStats {
        distinct: distinct_set.len(),
        numeric_candidate,
        ip_candidate,
        non_empty,
        token_uniqueness: None,
        avg_len: None,
    }
}

/// Extend [`probe`] with Variant H's extra token-level statistics.
pub fn probe_hyper(values: &[String]) -> ColumnStats {
    let mut stats = probe(values);
    let tokenized = tokenize_column(values);
    let mut distinct_tokens = HashSet::new();
    let mut total_tokens = 0usize;
    let mut total_len = 0usize;
    for tokens in &tokenized {
        for t in tokens {
            distinct_tokens.insert(t.as_str());
            total_tokens += 1;
        }
    }
    for v in values {
        total_len += v.len();
    }
    stats.token_uniqueness = if total_tokens == 0 {
        Some(0.0)
    } else {
        Some(distinct_tokens.len() as f64 / total_tokens as f64)
    };
    stats.avg_len = Some(if values.is_empty() { 0.0 } else { total_len as f64 / values.len() as f64 });
    stats
}

/// Apply the selection table for Variant S/U top-level columns. For
/// `row_count ≤ 10` the numeric/IP rungs are suppressed regardless of
/// what the probe found, falling through to the dict/raw rungs.
pub fn select_encoding(stats: &ColumnStats, row_count: usize) -> Encoding {
    if !heuristics_suppressed(row_count) {
        if stats.numeric_candidate && row_count > 10 {
            return Encoding::Delta;
        }
        if stats.ip_candidate && row_count > 10 {
            return Encoding::IpXor;
        }
    }
    if dict_favored(stats, row_count) {
        return Encoding::Dict;
    }
    Encoding::Raw
}

/// Apply the selection table for Variant H top-level columns, with the
/// same N ≤ 10 suppression as [`select_encoding`].
pub fn select_encoding_hyper(stats: &ColumnStats, row_count: usize) -> Encoding {
    if !heuristics_suppressed(row_count) {
        if stats.numeric_candidate && stats.non_empty > 10 {
            return Encoding::Delta;
        }
        if stats.ip_candidate && stats.non_empty > 10 {
            return Encoding::IpXor;
        }
    }
    if dict_favored(stats, row_count) {
        return Encoding::Dict;
    }
    let uniqueness = stats.token_uniqueness.unwrap_or(1.0);
    let avg_len = stats.avg_len.unwrap_or(0.0);
    if uniqueness > 0.5 || avg_len < 15.0 {
        Encoding::Raw
    } else {
        Encoding::Hyper
    }
}

fn dict_favored(stats: &ColumnStats, row_count: usize) -> bool {
    if row_count == 0 {
        return false;
    }
    let ratio = stats.distinct as f64 / row_count as f64;
    ratio < 0.5 || stats.distinct < 256
}

/// True if `row_count` is small enough (≤ 10) that numeric/IP heuristics
/// should be suppressed regardless of what the probe found.
pub fn heuristics_suppressed(row_count: usize) -> bool {
    row_count <= 10
}

/// Cheap hint used by [`crate::dispatch`]: does `s` look like one of the
/// three recognized timestamp forms, or plausibly like an IPv4 address.
pub fn looks_like_ip(s: &str) -> bool {
    parse_ipv4(s).is_some()
}

pub fn looks_like_timestamp(s: &str) -> bool {
    is_timestamp_like(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_column_selects_delta_above_threshold() {
        let values: Vec<String> = (1..=50).map(|i| i.to_string()).collect();
        let stats = probe(&values);
        assert!(stats.numeric_candidate);
        assert_eq!(select_encoding(&stats, values.len()), Encoding::Delta);
    }

    #[test]
    fn small_numeric_column_does_not_force_delta_below_threshold() {
        let values: Vec<String> = vec!["1".into(), "2".into(), "3".into()];
        let stats = probe(&values);
        // N = 3 <= 10, so even though numeric_candidate is true the table's
        // N > 10 guard keeps this out of delta.
        assert_eq!(select_encoding(&stats, values.len()), Encoding::Dict);
    }

    #[test]
    fn ip_column_selects_ip_xor_above_threshold() {
        let values: Vec<String> = (0..20).map(|i| format!("10.0.0.{i}")).collect();
        let stats = probe(&values);
        assert!(stats.ip_candidate);
        assert_eq!(select_encoding(&stats, values.len()), Encoding::IpXor);
    }

    #[test]
    fn low_cardinality_column_selects_dict() {
        let values: Vec<String> = std::iter::repeat("sshd".to_string()).take(200).collect();
        let stats = probe(&values);
        assert_eq!(select_encoding(&stats, values.len()), Encoding::Dict);
    }

    #[test]
    fn high_cardinality_text_column_selects_raw() {
        let values: Vec<String> = (0..300).map(|i| format!("unique message body number {i}")).collect();
        let stats = probe(&values);
        assert_eq!(select_encoding(&stats, values.len()), Encoding::Raw);
    }

    #[test]
    fn hyper_low_uniqueness_selects_hyper() {
        // 300 distinct high-cardinality values sharing most tokens, so the
        // dict rule's distinct<256 shortcut does not pre-empt hyper.
        let values: Vec<String> = (1_000_001..1_000_301)
            .map(|id| format!("/api/v1/accounts/{id}/transactions"))
            .collect();
        let stats = probe_hyper(&values);
        assert!(stats.distinct >= 256);
        assert!(stats.avg_len.unwrap() >= 15.0);
        assert!(stats.token_uniqueness.unwrap() <= 0.5);
        assert_eq!(select_encoding_hyper(&stats, values.len()), Encoding::Hyper);
    }

    #[test]
    fn all_empty_column_stays_candidate_by_vacuous_truth() {
        let values: Vec<String> = std::iter::repeat(String::new()).take(20).collect();
        let stats = probe(&values);
        assert!(stats.numeric_candidate);
        assert!(stats.ip_candidate);
        assert_eq!(stats.non_empty, 0);
    }

    #[test]
    fn probe_window_is_bounded_to_first_100_rows() {
        // 150 leading empty rows push every non-empty value past row 100;
        // the probe window must still be the first 100 rows, not the
        // first 100 non-empty values found anywhere in the column.
        let mut values: Vec<String> = std::iter::repeat(String::new()).take(150).collect();
        values.extend((0..20).map(|i| i.to_string()));
        let stats = probe(&values);
        assert!(stats.numeric_candidate);
        assert_eq!(stats.non_empty, 20);
    }

    #[test]
    fn hyper_short_values_prefer_raw() {
        // High cardinality (skips the dict shortcut) but short average
        // length, which the table routes to raw instead of hyper.
        let values: Vec<String> = (0..300).map(|i| format!("v{i}")).collect();
        let stats = probe_hyper(&values);
        assert!(stats.distinct >= 256);
        assert!(stats.avg_len.unwrap() < 15.0);
        assert_eq!(select_encoding_hyper(&stats, values.len()), Encoding::Raw);
    }
}
