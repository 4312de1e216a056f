//! Worksheet loading and row access
//!
//! Workbooks are read with calamine (xlsx, xlsm, xlsb, xls, ods) and turned
//! into plain [`CellValue`] grids so the import pipelines never touch the
//! reader's types.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::errors::ImportError;
use crate::types::CellValue;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// The first worksheet of a workbook, as raw rows
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Read the first worksheet of the workbook at `path`
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let mut workbook = open_workbook_auto(path).map_err(|source| ImportError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ImportError::NoWorksheet(path.to_path_buf()))?
            .map_err(|source| ImportError::Workbook {
                path: path.to_path_buf(),
                source,
            })?;

        let rows: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();

        debug!("Loaded {} rows from {}", rows.len(), path.display());
        Ok(Self { rows })
    }

    #[cfg(test)]
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Split the sheet at `header_index`: that row becomes the column labels,
    /// rows above it are dropped.
    pub fn into_table(mut self, header_index: usize) -> Result<Table, ImportError> {
        if header_index >= self.rows.len() {
            return Err(ImportError::EmptySheet);
        }
        let data = self.rows.split_off(header_index + 1);
        let header = self.rows.swap_remove(header_index);
        let columns = header
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        Ok(Table {
            columns,
            rows: data,
        })
    }
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => CellValue::DateTime(datetime),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Rows below a header row, addressed by column label
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Relabel columns; `rename` returns the new label or `None` to keep it
    pub fn rename_columns<F>(&mut self, rename: F)
    where
        F: Fn(&str) -> Option<&'static str>,
    {
        for column in &mut self.columns {
            if let Some(canonical) = rename(column) {
                *column = canonical.to_string();
            }
        }
    }

    /// Data rows with their 0-based index. Fully blank rows are skipped but
    /// still count towards the index, so row numbers match the sheet.
    pub fn records(&self) -> impl Iterator<Item = (usize, RawRow<'_>)> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| !cells.iter().all(CellValue::is_blank))
            .map(move |(index, cells)| {
                (
                    index,
                    RawRow {
                        columns: &self.columns,
                        cells,
                    },
                )
            })
    }
}

/// One data row of a [`Table`]
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    columns: &'a [String],
    cells: &'a [CellValue],
}

impl<'a> RawRow<'a> {
    /// Cell under the first column labelled `field`, empty if there is none
    pub fn get(&self, field: &str) -> &'a CellValue {
        self.columns
            .iter()
            .position(|c| c == field)
            .and_then(|idx| self.cells.get(idx))
            .unwrap_or(&EMPTY_CELL)
    }
}
