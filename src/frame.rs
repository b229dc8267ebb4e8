//! Column-oriented view of a table, used by the hygiene post-pass and for
//! export. Rows whose records lack a column (Site B detail labels vary
//! per page) hold `Value::Missing` there.

use crate::data::{Record, Table, Value};
use crate::CrawlerError;
use itertools::Itertools;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Builds a frame from named cells per row; columns are the union of
    /// names in first-seen order.
    pub fn from_cells<I: IntoIterator<Item = Vec<(String, Value)>>>(rows: I) -> Self {
        let rows: Vec<Vec<(String, Value)>> = rows.into_iter().collect();
        let columns: Vec<String> = rows
            .iter()
            .flat_map(|r| r.iter().map(|(name, _)| name.clone()))
            .unique()
            .collect();
        let position: HashMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let rows = rows
            .into_iter()
            .map(|cells| {
                let mut row = vec![Value::Missing; columns.len()];
                for (name, value) in cells {
                    row[position[name.as_str()]] = value;
                }
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn from_table<R: Record>(table: &Table<R>) -> Self {
        Self::from_cells(table.iter().map(Record::cells))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let i = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[i]))
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let i = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[i])
    }

    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.iter().any(|n| n.as_ref() == c))
            .collect();
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.retain(|_| *flags.next().unwrap_or(&true));
        }
        let mut flags = keep.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));
    }

    /// Adds (or replaces) `target` computed cell-by-cell from `source`.
    pub fn derive_column<F>(&mut self, target: &str, source: &str, f: F) -> Result<(), CrawlerError>
    where
        F: Fn(&Value) -> Value,
    {
        let src = self
            .column_index(source)
            .ok_or_else(|| CrawlerError::UnknownField {
                field: source.to_string(),
                expected: &[],
            })?;
        let derived: Vec<Value> = self.rows.iter().map(|r| f(&r[src])).collect();
        match self.column_index(target) {
            Some(dst) => {
                for (row, value) in self.rows.iter_mut().zip(derived) {
                    row[dst] = value;
                }
            }
            None => {
                self.columns.push(target.to_string());
                for (row, value) in self.rows.iter_mut().zip(derived) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Missing-value count per column, only columns with at least one
    /// missing cell, ascending by count.
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), self.rows.iter().filter(|r| r[i].is_missing()).count()))
            .filter(|(_, n)| *n > 0)
            .sorted_by_key(|(_, n)| *n)
            .collect()
    }

    /// The column(s) tied for the most missing values.
    pub fn most_missing(&self) -> Vec<(String, usize)> {
        let counts = self.missing_counts();
        let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
        counts.into_iter().filter(|(_, n)| *n == max).collect()
    }
}

struct RowView<'a> {
    columns: &'a [String],
    row: &'a [Value],
}

impl<'a> Serialize for RowView<'a> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (c, v) in self.columns.iter().zip(self.row) {
            map.serialize_entry(c, v)?;
        }
        map.end()
    }
}

impl Serialize for Frame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowView {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}
