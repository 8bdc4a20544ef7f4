//! Shared row/column data model for all three variants.
//!
//! `ColumnGrid` is the transposed corpus: one [`Column`] per field (named
//! for S/U, positional for H), each holding every row's raw string value in
//! row order. `ColumnEncoding` is the tagged payload an analyzed column
//! compiles down to before serialization — the wire tag byte is the
//! discriminant.

use crate::dictionary::Dictionary;
use crate::parser::Row;
use crate::tokenizer::tokenize;

/// One field's values across every row of the corpus, in row order. A
/// missing value (row lacks this field/position) is the empty string:
/// nothing here distinguishes "absent" from "present but empty".
#[derive(Debug, Clone)]
pub struct Column {
    pub name: Option<String>,
    pub values: Vec<String>,
}

impl Column {
    pub fn row_count(&self) -> usize {
        self.values.len()
    }
}

/// The transposed corpus: `row_count` rows, one [`Column`] per field.
#[derive(Debug, Clone)]
pub struct ColumnGrid {
    pub row_count: usize,
    pub columns: Vec<Column>,
}

impl ColumnGrid {
    /// Transpose S/U parsed rows into named columns, ordered by first
    /// field-seen across the corpus.
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut order: Vec<String> = Vec::new();
        for row in rows {
            for (name, _) in &row.fields {
                if !order.contains(name) {
                    order.push(name.clone());
                }
            }
        }
        let columns = order
            .into_iter()
            .map(|name| {
                let values = rows
                    .iter()
                    .map(|row| row.get(&name).unwrap_or("").to_string())
                    .collect();
                Column { name: Some(name), values }
            })
            .collect();
        Self { row_count: rows.len(), columns }
    }

    /// Transpose whitespace-split positional fields into columns, padded
    /// to the widest row's field count.
    pub fn from_positional(lines: &[Vec<String>]) -> Self {
        let max_cols = lines.iter().map(Vec::len).max().unwrap_or(0);
        let columns = (0..max_cols)
            .map(|i| {
                let values = lines
                    .iter()
                    .map(|fields| fields.get(i).cloned().unwrap_or_default())
                    .collect();
                Column { name: None, values }
            })
            .collect();
        Self { row_count: lines.len(), columns }
    }
}

/// One ragged sub-column inside a [`ColumnEncoding::Hyper`] column:
/// recursively restricted to tag 0 or 1 only. Holds a value only for rows
/// whose token count covers this position.
#[derive(Debug, Clone)]
pub enum SubColumn {
    Raw(Vec<String>),
    Dict { table: Dictionary, ids: Vec<u32> },
}

/// A column compiled down to its wire-ready, tagged payload.
#[derive(Debug, Clone)]
pub enum ColumnEncoding {
    Raw(Vec<String>),
    Dict { table: Dictionary, ids: Vec<u32> },
    Delta(Vec<i64>),
    IpXor(Vec<u32>),
    Hyper {
        max_tokens: u32,
        token_counts: Vec<u32>,
        sub_columns: Vec<SubColumn>,
    },
}

impl ColumnEncoding {
    pub fn tag(&self) -> u8 {
        match self {
            ColumnEncoding::Raw(_) => 0,
            ColumnEncoding::Dict { .. } => 1,
            ColumnEncoding::Delta(_) => 2,
            ColumnEncoding::IpXor(_) => 3,
            ColumnEncoding::Hyper { .. } => 4,
        }
    }
}

/// Tokenize every value of a top-level Variant H column into its
/// per-row token sequence, used both by the analyzer's probes and by
/// the hyper encoder.
pub fn tokenize_column(values: &[String]) -> Vec<Vec<String>> {
    values.iter().map(|v| tokenize(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    #[test]
    fn from_rows_orders_columns_by_first_encounter() {
        let rows: Vec<Row> = vec![
            parse_line("Nov 24 18:55:22 host1 sshd[42]: accepted"),
            parse_line("2025-11-24 18:55:22 authd[99]: login failure"),
        ];
        let grid = ColumnGrid::from_rows(&rows);
        let names: Vec<_> = grid.columns.iter().map(|c| c.name.clone().unwrap()).collect();
        assert_eq!(names[0], "timestamp");
        assert_eq!(grid.row_count, 2);
        // second row has no "host" field -> empty string, not a missing column
        let host_col = grid.columns.iter().find(|c| c.name.as_deref() == Some("host")).unwrap();
        assert_eq!(host_col.values, vec!["host1".to_string(), String::new()]);
    }

    #[test]
    fn from_positional_pads_short_rows() {
        let lines = vec![
            vec!["GET".to_string(), "/a".to_string(), "200".to_string()],
            vec!["GET".to_string(), "/b".to_string()],
        ];
        let grid = ColumnGrid::from_positional(&lines);
        assert_eq!(grid.columns.len(), 3);
        assert_eq!(grid.columns[2].values, vec!["200".to_string(), String::new()]);
    }
}
