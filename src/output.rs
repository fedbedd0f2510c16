use crate::types::{Lsgd, LsgdPreviewRow};
use anyhow::{Context, Result};
use serde::Serialize;
use tabled::{settings::Style, Table};

pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let s = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(s)
}

pub fn write_json<T: Serialize + ?Sized>(path: &str, value: &T, pretty: bool) -> Result<()> {
    let s = to_json(value, pretty).context("serialize output")?;
    std::fs::write(path, s).with_context(|| format!("write {path}"))?;
    Ok(())
}

pub fn preview_table(data: &[Lsgd], max_rows: usize) -> String {
    let slice: Vec<LsgdPreviewRow> = data.iter().take(max_rows).map(LsgdPreviewRow::from).collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}
