//! Column serializer/deserializer: the exact wire grammar, and its
//! inverse. `compile_column`/`compile_hyper_column` turn an
//! analyzed [`Column`] into a wire-ready [`ColumnEncoding`]; `write_body`/
//! `read_body` turn a set of those into (and out of) the `body` byte
//! stream that gets handed to the entropy coder.

use crate::analyzer::{self, Encoding};
use crate::column::{Column, ColumnEncoding, SubColumn};
use crate::delta::{decode_delta, decode_ip_xor, encode_delta, encode_ip_xor, parse_ipv4};
use crate::dictionary::Dictionary;
use crate::error::{Result, UlcError};
use crate::tokenizer::tokenize;
use crate::varint::{read_len_prefixed_string, read_varint, write_len_prefixed, write_varint};

/// Parse every value as `i64`, falling back to the running prior value
/// (making its delta 0) when a value the selector didn't sample fails to
/// parse — the same fall-back-to-prior lossiness used for malformed IPs,
/// applied symmetrically here.
fn ints_with_fallback(values: &[String]) -> Vec<i64> {
    let mut prior = 0i64;
    values
        .iter()
        .map(|v| {
            let value = v.parse::<i64>().unwrap_or(prior);
            prior = value;
            value
        })
        .collect()
}

/// Parse every value as an IPv4 address, falling back to the running
/// prior IP on a parse failure (emits XOR 0, so the decoded row repeats
/// the previous address).
fn ips_with_fallback(values: &[String]) -> Vec<u32> {
    let mut prior = 0u32;
    values
        .iter()
        .map(|v| {
            let ip = parse_ipv4(v).unwrap_or(prior);
            prior = ip;
            ip
        })
        .collect()
}

fn compile_dict(values: &[String]) -> ColumnEncoding {
    let mut table = Dictionary::new();
    let ids = values.iter().map(|v| table.get_or_add(v)).collect();
    ColumnEncoding::Dict { table, ids }
}

/// Compile a Variant S/U top-level column into its wire-ready encoding,
/// applying the analyzer's selection table (including its small-corpus
/// heuristic suppression).
pub fn compile_column(col: &Column) -> ColumnEncoding {
    let stats = analyzer::probe(&col.values);
    let row_count = col.row_count();
    let encoding = analyzer::select_encoding(&stats, row_count);
    match encoding {
        Encoding::Delta => ColumnEncoding::Delta(ints_with_fallback(&col.values)),
        Encoding::IpXor => ColumnEncoding::IpXor(ips_with_fallback(&col.values)),
        Encoding::Dict => compile_dict(&col.values),
        Encoding::Raw => ColumnEncoding::Raw(col.values.clone()),
        Encoding::Hyper => unreachable!("select_encoding never returns Hyper"),
    }
}

/// Compile a Variant H sub-column (the tokens at one positional slot,
/// ragged across rows) into tag 0 or 1 only.
fn compile_sub_column(values: &[String]) -> SubColumn {
    let mut distinct = std::collections::HashSet::new();
    for v in values {
        distinct.insert(v.as_str());
    }
    let ratio = if values.is_empty() { 1.0 } else { distinct.len() as f64 / values.len() as f64 };
    if ratio < 0.5 || distinct.len() < 256 {
        let mut table = Dictionary::new();
        let ids = values.iter().map(|v| table.get_or_add(v)).collect();
        SubColumn::Dict { table, ids }
    } else {
        SubColumn::Raw(values.to_vec())
    }
}

/// Compile a Variant H top-level column, choosing hyper-decomposition per
/// the analyzer's table, or falling back to raw/dict/delta/ip-xor like
/// S/U when the table says so.
pub fn compile_hyper_column(col: &Column) -> ColumnEncoding {
    let stats = analyzer::probe_hyper(&col.values);
    let row_count = col.row_count();
    let encoding = analyzer::select_encoding_hyper(&stats, row_count);
    match encoding {
        Encoding::Delta => ColumnEncoding::Delta(ints_with_fallback(&col.values)),
        Encoding::IpXor => ColumnEncoding::IpXor(ips_with_fallback(&col.values)),
        Encoding::Dict => compile_dict(&col.values),
        Encoding::Raw => ColumnEncoding::Raw(col.values.clone()),
        Encoding::Hyper => compile_hyper(&col.values),
    }
}

fn compile_hyper(values: &[String]) -> ColumnEncoding {
    let tokenized: Vec<Vec<String>> = values.iter().map(|v| tokenize(v)).collect();
    let token_counts: Vec<u32> = tokenized.iter().map(|t| t.len() as u32).collect();
    let max_tokens = token_counts.iter().copied().max().unwrap_or(0);
    let mut sub_columns = Vec::with_capacity(max_tokens as usize);
    for pos in 0..max_tokens as usize {
        let slot_values: Vec<String> = tokenized
            .iter()
            .filter_map(|t| t.get(pos).cloned())
            .collect();
        sub_columns.push(compile_sub_column(&slot_values));
    }
    ColumnEncoding::Hyper { max_tokens, token_counts, sub_columns }
}

fn write_dict_table(out: &mut Vec<u8>, table: &Dictionary) {
    write_varint(out, table.len() as u64);
    for key in table.iter() {
        write_len_prefixed(out, key.as_bytes());
    }
}

fn read_dict_table(buf: &[u8], pos: &mut usize) -> Result<Dictionary> {
    let d = read_varint(buf, pos)? as usize;
    let mut values = Vec::with_capacity(d);
    for _ in 0..d {
        values.push(read_len_prefixed_string(buf, pos)?);
    }
    Ok(Dictionary::from_values(values))
}

fn write_sub_column(out: &mut Vec<u8>, sub: &SubColumn) {
    match sub {
        SubColumn::Raw(values) => {
            out.push(0);
            for v in values {
                write_len_prefixed(out, v.as_bytes());
            }
        }
        SubColumn::Dict { table, ids } => {
            out.push(1);
            write_dict_table(out, table);
            for &id in ids {
                write_varint(out, id as u64);
            }
        }
    }
}

fn read_sub_column(buf: &[u8], pos: &mut usize, slot_rows: usize) -> Result<SubColumn> {
    let use_dict = *buf
        .get(*pos)
        .ok_or_else(|| UlcError::CodecStreamError("truncated sub-column tag".into()))?;
    *pos += 1;
    match use_dict {
        0 => {
            let mut values = Vec::with_capacity(slot_rows);
            for _ in 0..slot_rows {
                values.push(read_len_prefixed_string(buf, pos)?);
            }
            Ok(SubColumn::Raw(values))
        }
        1 => {
            let table = read_dict_table(buf, pos)?;
            let mut ids = Vec::with_capacity(slot_rows);
            for _ in 0..slot_rows {
                ids.push(read_varint(buf, pos)? as u32);
            }
            Ok(SubColumn::Dict { table, ids })
        }
        other => Err(UlcError::CodecStreamError(format!("bad sub-column tag {other}"))),
    }
}

fn write_column(out: &mut Vec<u8>, encoding: &ColumnEncoding) {
    out.push(encoding.tag());
    match encoding {
        ColumnEncoding::Raw(values) => {
            for v in values {
                write_len_prefixed(out, v.as_bytes());
            }
        }
        ColumnEncoding::Dict { table, ids } => {
            write_dict_table(out, table);
            for &id in ids {
                write_varint(out, id as u64);
            }
        }
        ColumnEncoding::Delta(values) => {
            encode_delta(out, values);
        }
        ColumnEncoding::IpXor(values) => {
            encode_ip_xor(out, values);
        }
        ColumnEncoding::Hyper { max_tokens, token_counts, sub_columns } => {
            write_varint(out, *max_tokens as u64);
            let common = token_counts.first().copied();
            let constant = common.is_some() && token_counts.iter().all(|&c| Some(c) == common);
            out.push(if constant { 1 } else { 0 });
            if constant {
                write_varint(out, common.unwrap_or(0) as u64);
            } else {
                for &c in token_counts {
                    write_varint(out, c as u64);
                }
            }
            debug_assert_eq!(sub_columns.len(), *max_tokens as usize);
            for sub in sub_columns {
                write_sub_column(out, sub);
            }
        }
    }
}

fn read_column(buf: &[u8], pos: &mut usize, row_count: usize) -> Result<ColumnEncoding> {
    let tag = *buf
        .get(*pos)
        .ok_or_else(|| UlcError::CodecStreamError("truncated column tag".into()))?;
    *pos += 1;
    match tag {
        0 => {
            let mut values = Vec::with_capacity(row_count);
            for _ in 0..row_count {
                values.push(read_len_prefixed_string(buf, pos)?);
            }
            Ok(ColumnEncoding::Raw(values))
        }
        1 => {
            let table = read_dict_table(buf, pos)?;
            let mut ids = Vec::with_capacity(row_count);
            for _ in 0..row_count {
                ids.push(read_varint(buf, pos)? as u32);
            }
            Ok(ColumnEncoding::Dict { table, ids })
        }
        2 => {
            let values = decode_delta(buf, pos, row_count)?;
            Ok(ColumnEncoding::Delta(values))
        }
        3 => {
            let values = decode_ip_xor(buf, pos, row_count)?;
            Ok(ColumnEncoding::IpXor(values))
        }
        4 => {
            let max_tokens = read_varint(buf, pos)?;
            let constant_flag = *buf
                .get(*pos)
                .ok_or_else(|| UlcError::CodecStreamError("truncated hyper flag".into()))?;
            *pos += 1;
            let token_counts = if constant_flag == 1 {
                let common = read_varint(buf, pos)? as u32;
                vec![common; row_count]
            } else {
                let mut counts = Vec::with_capacity(row_count);
                for _ in 0..row_count {
                    counts.push(read_varint(buf, pos)? as u32);
                }
                counts
            };
            let mut sub_columns = Vec::with_capacity(max_tokens as usize);
            for slot in 0..max_tokens as usize {
                let slot_rows = token_counts.iter().filter(|&&c| (slot as u32) < c).count();
                sub_columns.push(read_sub_column(buf, pos, slot_rows)?);
            }
            Ok(ColumnEncoding::Hyper { max_tokens: max_tokens as u32, token_counts, sub_columns })
        }
        other => Err(UlcError::CodecStreamError(format!("bad column tag {other}"))),
    }
}

/// Serialize compiled columns into the `body` stream:
/// `varint(row_count) || varint(column_count) || column*`.
pub fn write_body(row_count: usize, columns: &[ColumnEncoding]) -> Vec<u8> {
    let mut out = Vec::new();
    write_varint(&mut out, row_count as u64);
    write_varint(&mut out, columns.len() as u64);
    for col in columns {
        write_column(&mut out, col);
    }
    out
}

/// Inverse of [`write_body`].
pub fn read_body(buf: &[u8]) -> Result<(usize, Vec<ColumnEncoding>)> {
    let mut pos = 0;
    let row_count = read_varint(buf, &mut pos)? as usize;
    let column_count = read_varint(buf, &mut pos)? as usize;
    let mut columns = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        columns.push(read_column(buf, &mut pos, row_count)?);
    }
    Ok((row_count, columns))
}

/// Reconstruct a column's row values from its compiled encoding —
/// the inverse of `compile_column`/`compile_hyper_column`.
pub fn decode_column_values(encoding: &ColumnEncoding, row_count: usize) -> Vec<String> {
    match encoding {
        ColumnEncoding::Raw(values) => values.clone(),
        ColumnEncoding::Dict { table, ids } => ids
            .iter()
            .map(|&id| table.get(id).unwrap_or("").to_string())
            .collect(),
        ColumnEncoding::Delta(values) => values.iter().map(|v| v.to_string()).collect(),
        ColumnEncoding::IpXor(values) => values.iter().map(|&v| crate::delta::format_ipv4(v)).collect(),
        ColumnEncoding::Hyper { token_counts, sub_columns, .. } => {
            decode_hyper_values(row_count, token_counts, sub_columns)
        }
    }
}

/// Reconstruct the corpus' lines from every column's decoded values:
/// for each row, join that row's non-empty column values, in column
/// order, with a single ASCII space. Applied uniformly across all three
/// variants; inter-field whitespace is not preserved exactly.
pub fn reconstruct_lines(row_count: usize, columns: &[ColumnEncoding]) -> Vec<String> {
    let decoded: Vec<Vec<String>> = columns
        .iter()
        .map(|c| decode_column_values(c, row_count))
        .collect();
    (0..row_count)
        .map(|r| {
            decoded
                .iter()
                .filter_map(|col| col.get(r))
                .filter(|v| !v.is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn decode_hyper_values(row_count: usize, token_counts: &[u32], sub_columns: &[SubColumn]) -> Vec<String> {
    let mut rows: Vec<String> = vec![String::new(); row_count];
    // Per slot, walk only the rows whose token_count covers this slot, in
    // row order, matching the ragged write order in `write_sub_column`.
    for (slot, sub) in sub_columns.iter().enumerate() {
        let covered_rows: Vec<usize> = (0..row_count)
            .filter(|&r| (slot as u32) < token_counts.get(r).copied().unwrap_or(0))
            .collect();
        match sub {
            SubColumn::Raw(values) => {
                for (i, &r) in covered_rows.iter().enumerate() {
                    if let Some(v) = values.get(i) {
                        rows[r].push_str(v);
                    }
                }
            }
            SubColumn::Dict { table, ids } => {
                for (i, &r) in covered_rows.iter().enumerate() {
                    if let Some(&id) = ids.get(i) {
                        rows[r].push_str(table.get(id).unwrap_or(""));
                    }
                }
            }
        }
    }
    rows
}
