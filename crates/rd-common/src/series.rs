//! Multiply-indexed series and the dense matrices they unstack into.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One keyed value of a [`LabeledSeries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    pub key: Vec<String>,
    pub value: T,
}

/// Ordered list of `(key tuple, value)` pairs over named index levels.
///
/// Every key has exactly one component per level. Order of entries is
/// significant and preserved by every transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSeries<T> {
    levels: Vec<String>,
    entries: Vec<Entry<T>>,
}

impl<T> LabeledSeries<T> {
    pub fn new(levels: Vec<String>) -> Self {
        Self {
            levels,
            entries: Vec::new(),
        }
    }

    /// Build a series from `(key, value)` pairs, checking key arity.
    pub fn from_entries(
        levels: Vec<String>,
        entries: impl IntoIterator<Item = (Vec<String>, T)>,
    ) -> Result<Self> {
        let mut series = Self::new(levels);
        for (key, value) in entries {
            series.push(key, value)?;
        }
        Ok(series)
    }

    pub fn push(&mut self, key: Vec<String>, value: T) -> Result<()> {
        if key.len() != self.levels.len() {
            return Err(Error::Data(format!(
                "key {:?} has {} components, series has levels {:?}",
                key,
                key.len(),
                self.levels
            )));
        }
        self.entries.push(Entry { key, value });
        Ok(())
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[String], &T)> {
        self.entries.iter().map(|e| (e.key.as_slice(), &e.value))
    }

    pub fn level_index(&self, name: &str) -> Option<usize> {
        self.levels.iter().position(|l| l == name)
    }

    /// Position of `name`, or a data error listing the available levels.
    pub fn require_level(&self, name: &str) -> Result<usize> {
        self.level_index(name).ok_or_else(|| Error::MissingLevel {
            level: name.to_string(),
            available: self.levels.clone(),
        })
    }

    /// Distinct values of one level, in first-seen order.
    pub fn level_values(&self, name: &str) -> Result<Vec<String>> {
        let idx = self.require_level(name)?;
        let mut seen: Vec<String> = Vec::new();
        for entry in &self.entries {
            let v = &entry.key[idx];
            if !seen.contains(v) {
                seen.push(v.clone());
            }
        }
        Ok(seen)
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &[String]) -> Option<&T> {
        self.entries
            .iter()
            .find(|e| e.key.as_slice() == key)
            .map(|e| &e.value)
    }

    pub fn map_values<U>(&self, mut f: impl FnMut(&[String], &T) -> U) -> LabeledSeries<U> {
        LabeledSeries {
            levels: self.levels.clone(),
            entries: self
                .entries
                .iter()
                .map(|e| Entry {
                    key: e.key.clone(),
                    value: f(&e.key, &e.value),
                })
                .collect(),
        }
    }

    /// Fallible `map_values`.
    pub fn try_map_values<U>(
        &self,
        mut f: impl FnMut(&[String], &T) -> Result<U>,
    ) -> Result<LabeledSeries<U>> {
        let mut entries = Vec::with_capacity(self.entries.len());
        for e in &self.entries {
            entries.push(Entry {
                key: e.key.clone(),
                value: f(&e.key, &e.value)?,
            });
        }
        Ok(LabeledSeries {
            levels: self.levels.clone(),
            entries,
        })
    }

    /// Apply `f` to every key component of the level at `idx`.
    pub fn map_level(&self, idx: usize, mut f: impl FnMut(&str) -> String) -> Self
    where
        T: Clone,
    {
        let entries = self
            .entries
            .iter()
            .map(|e| {
                let mut key = e.key.clone();
                key[idx] = f(&key[idx]);
                Entry {
                    key,
                    value: e.value.clone(),
                }
            })
            .collect();
        Self {
            levels: self.levels.clone(),
            entries,
        }
    }

    pub fn filter(&self, mut keep: impl FnMut(&[String], &T) -> bool) -> Self
    where
        T: Clone,
    {
        Self {
            levels: self.levels.clone(),
            entries: self
                .entries
                .iter()
                .filter(|e| keep(&e.key, &e.value))
                .cloned()
                .collect(),
        }
    }

    /// Replace the level names and keys wholesale.
    pub fn with_structure(levels: Vec<String>, entries: Vec<Entry<T>>) -> Result<Self> {
        let mut series = Self::new(levels);
        for e in entries {
            series.push(e.key, e.value)?;
        }
        Ok(series)
    }

    pub fn into_entries(self) -> Vec<Entry<T>> {
        self.entries
    }
}

/// Dense 2-D view of a series: rows keyed by the remaining levels,
/// columns by one unstacked level. `None` marks a cell with no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapMatrix<T> {
    row_levels: Vec<String>,
    rows: Vec<Vec<String>>,
    column_level: String,
    columns: Vec<String>,
    cells: Vec<Option<T>>,
}

impl<T> HeatmapMatrix<T> {
    /// Empty matrix with every cell set to `None`.
    pub fn new(
        row_levels: Vec<String>,
        rows: Vec<Vec<String>>,
        column_level: String,
        columns: Vec<String>,
    ) -> Self {
        let mut cells = Vec::with_capacity(rows.len() * columns.len());
        cells.resize_with(rows.len() * columns.len(), || None);
        Self {
            row_levels,
            rows,
            column_level,
            columns,
            cells,
        }
    }

    pub fn row_levels(&self) -> &[String] {
        &self.row_levels
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_level(&self) -> &str {
        &self.column_level
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Row key joined for display, `a-b` for multi-level rows.
    pub fn row_label(&self, row: usize) -> String {
        self.rows[row].join("-")
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.cells[row * self.columns.len() + col].as_ref()
    }

    /// Fill an empty cell. Filling a cell twice is a data error.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let idx = row * self.columns.len() + col;
        if self.cells[idx].is_some() {
            return Err(Error::DuplicateLabel {
                row: self.rows[row].clone(),
                column: self.columns[col].clone(),
            });
        }
        self.cells[idx] = Some(value);
        Ok(())
    }

    pub fn row_index(&self, key: &[String]) -> Option<usize> {
        self.rows.iter().position(|r| r.as_slice() == key)
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Look up a cell by labels rather than positions.
    pub fn lookup(&self, row: &[String], column: &str) -> Option<&T> {
        let r = self.row_index(row)?;
        let c = self.column_index(column)?;
        self.get(r, c)
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> HeatmapMatrix<U> {
        HeatmapMatrix {
            row_levels: self.row_levels.clone(),
            rows: self.rows.clone(),
            column_level: self.column_level.clone(),
            columns: self.columns.clone(),
            cells: self.cells.iter().map(|c| c.as_ref().map(&mut f)).collect(),
        }
    }

    /// Whether `other` has identical rows and columns.
    pub fn same_shape<U>(&self, other: &HeatmapMatrix<U>) -> bool {
        self.rows == other.rows && self.columns == other.columns
    }

    pub fn cells(&self) -> &[Option<T>] {
        &self.cells
    }
}
