//! GOSI subscriber export import
//!
//! The export starts with a few metadata rows; the header is the first row
//! carrying both the subscriber-name and identity-number labels.

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::errors::{ImportError, RowError};
use crate::services::error_log::{GOSI_CRITICAL_ERROR, GOSI_ROW_ERROR};
use crate::services::spreadsheet::{RawRow, Sheet, Table};
use crate::types::{EntityKind, GosiWorkerRecord, ImportRecord};

use super::date::normalize_date;
use super::header::{find_header_row, normalize_headers, GOSI_ANCHORS, GOSI_HEADER_MAP};
use super::sanitize::sanitize;
use super::Pipeline;

pub struct GosiPipeline;

impl Pipeline for GosiPipeline {
    const KIND: EntityKind = EntityKind::GosiWorkerData;
    const ROW_ERROR: &'static str = GOSI_ROW_ERROR;
    const CRITICAL_ERROR: &'static str = GOSI_CRITICAL_ERROR;

    fn load_table(sheet: Sheet) -> Result<Table, ImportError> {
        let header_index = find_header_row(&sheet, &GOSI_ANCHORS)?;
        let mut table = sheet.into_table(header_index)?;
        normalize_headers(&mut table, &GOSI_HEADER_MAP);
        Ok(table)
    }

    fn build_record(row: &RawRow<'_>, identity_number: String) -> Result<ImportRecord, RowError> {
        let record = GosiWorkerRecord {
            identity_number,
            subscriber_name: sanitize(row.get("subscriber_name")),
            nationality: sanitize(row.get("nationality")),
            gender: sanitize(row.get("gender")),
            date_of_birth: normalize_date(row.get("date_of_birth")),
            basic_salary: amount(row, "basic_salary")?,
            housing: amount(row, "housing")?,
            commissions: amount(row, "commissions")?,
            other_allowances: amount(row, "other_allowances")?,
            total_salary: amount(row, "total_salary")?,
            contributable_salary: amount(row, "contributable_salary")?,
            occupation: sanitize(row.get("occupation")),
            joining_date: normalize_date(row.get("joining_date")),
        };
        Ok(record.into())
    }
}

/// Monetary column: absent when blank, an error when present but not a number
fn amount(row: &RawRow<'_>, field: &'static str) -> Result<Option<BigDecimal>, RowError> {
    let Some(raw) = sanitize(row.get(field)) else {
        return Ok(None);
    };
    parse_amount(&raw)
        .map(Some)
        .ok_or(RowError::InvalidAmount { field, value: raw })
}

/// Parse an amount written with optional thousands separators, Arabic
/// decimal/thousands marks or Arabic-Indic digits
fn parse_amount(raw: &str) -> Option<BigDecimal> {
    let normalized: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '\u{066C}' | ' '))
        .map(|c| match c {
            '\u{066B}' => '.',
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            other => other,
        })
        .collect();
    if normalized.is_empty() {
        return None;
    }
    BigDecimal::from_str(&normalized).ok()
}
