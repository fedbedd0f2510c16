use crate::net::http_client;
use crate::types::{ContactInfo, Row};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::time::Duration;
use tracing::{debug, info};

/// Column order of the published sheet.
pub const COLUMNS: [&str; 14] = [
    "S.No",
    "districtName",
    "lsg",
    "wardNo",
    "medicalOfficerName",
    "medicalOfficerContact",
    "ashaWorkerName",
    "ashaWorkerContact",
    "lsgdWardMemberName",
    "lsgdWardMemberContact",
    "kudumbaShreeName",
    "kudumbaShreeContact",
    "anganawadiTeacherName",
    "anganawadiTeacherContact",
];

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_records: usize,
    pub skipped_leading: usize,
    pub short_rows: usize,
}

pub fn sheet_url(sheet_id: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/e/{}/pub?gid=0&single=true&output=csv",
        sheet_id
    )
}

pub fn fetch_csv(url: &str, timeout: Option<Duration>) -> Result<String> {
    info!("fetching csv file from {}", url);
    let client = http_client(timeout).context("build http client")?;
    let body = client
        .get(url)
        .send()
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url} returned error status"))?
        .text()
        .with_context(|| format!("read body of {url}"))?;
    Ok(body)
}

fn field(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or("").to_string()
}

fn contact(record: &StringRecord, name_idx: usize) -> ContactInfo {
    ContactInfo { name: field(record, name_idx), contact: field(record, name_idx + 1) }
}

impl Row {
    /// Map a record by position; missing trailing cells read as empty.
    pub fn from_record(record: &StringRecord) -> Self {
        Self {
            serial_no: field(record, 0),
            district_name: field(record, 1),
            lsg: field(record, 2),
            ward_no: field(record, 3),
            medical_officer: contact(record, 4),
            asha_worker: contact(record, 6),
            lsgd_ward_member: contact(record, 8),
            kudumba_shree: contact(record, 10),
            anganawadi_teacher: contact(record, 12),
        }
    }
}

/// Parse CSV text into rows, skipping the first `skip_rows` records (the
/// header and any title rows above it).
pub fn parse_rows(text: &str, skip_rows: usize) -> Result<(Vec<Row>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut total_records = 0usize;
    let mut short_rows = 0usize;
    let mut rows = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("parse csv record {}", idx + 1))?;
        total_records += 1;
        if idx < skip_rows {
            continue;
        }
        if record.len() < COLUMNS.len() {
            short_rows += 1;
            debug!("record {} has {} of {} columns", idx + 1, record.len(), COLUMNS.len());
        }
        rows.push(Row::from_record(&record));
    }

    let report = LoadReport {
        total_records,
        skipped_leading: skip_rows.min(total_records),
        short_rows,
    };
    Ok((rows, report))
}

pub fn read_csv_file(path: &str) -> Result<String> {
    info!("reading csv file from {}", path);
    std::fs::read_to_string(path).with_context(|| format!("read {path}"))
}
