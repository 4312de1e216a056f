//! Spreadsheet import request and result types

use serde::{Deserialize, Serialize};

/// Request to import an uploaded spreadsheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFileRequest {
    pub file_url: String,
}

/// Row a skip entry refers to: a spreadsheet row number or the whole file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RowRefRepr", try_from = "RowRefRepr")]
pub enum RowRef {
    Line(usize),
    All,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RowRefRepr {
    Line(usize),
    Label(String),
}

impl From<RowRef> for RowRefRepr {
    fn from(row: RowRef) -> Self {
        match row {
            RowRef::Line(n) => RowRefRepr::Line(n),
            RowRef::All => RowRefRepr::Label("All".to_string()),
        }
    }
}

impl TryFrom<RowRefRepr> for RowRef {
    type Error = String;

    fn try_from(repr: RowRefRepr) -> Result<Self, Self::Error> {
        match repr {
            RowRefRepr::Line(n) => Ok(RowRef::Line(n)),
            RowRefRepr::Label(s) if s == "All" => Ok(RowRef::All),
            RowRefRepr::Label(s) => Err(format!("unknown row reference '{}'", s)),
        }
    }
}

impl RowRef {
    /// Display row for a 0-based data index: one for the header, one for 1-based numbering
    pub fn from_index(index: usize) -> Self {
        RowRef::Line(index + 2)
    }
}

/// One row that was not imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row: RowRef,
    pub reason: String,
}

/// Outcome of one import batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub inserted: Vec<String>,
    pub skipped: Vec<SkippedRow>,
}

impl BatchResult {
    /// Result of a batch that failed as a whole
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            inserted: Vec::new(),
            skipped: vec![SkippedRow {
                row: RowRef::All,
                reason: reason.into(),
            }],
        }
    }

    pub fn record_inserted(&mut self, id: String) {
        self.inserted.push(id);
    }

    pub fn record_skipped(&mut self, row: RowRef, reason: impl Into<String>) {
        self.skipped.push(SkippedRow {
            row,
            reason: reason.into(),
        });
    }
}
