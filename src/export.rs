//! Excel export of trend tables.

use crate::analyzer::TrendTable;
use crate::model::{ExportError, Indicator};

use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tracing::info;

pub const EXTENSION: &str = "xlsx";

pub fn default_file_name(indicator: Indicator) -> String {
    format!("{}_财务数据.{}", indicator.name(), EXTENSION)
}

/// File name for the user's answer: blank means the default name, a bare
/// name gets `.xlsx`, an explicit `.xlsx`/`.xls` is kept.
pub fn resolve_file_name(answer: &str, indicator: Indicator) -> String {
    let answer = answer.trim();
    if answer.is_empty() {
        return default_file_name(indicator);
    }

    let lower = answer.to_lowercase();
    if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        answer.to_string()
    } else {
        format!("{}.{}", answer, EXTENSION)
    }
}

/// Relative names land in `directory`; absolute paths are used as given.
pub fn resolve_export_path(directory: &Path, answer: &str, indicator: Indicator) -> PathBuf {
    let name = PathBuf::from(resolve_file_name(answer, indicator));
    if name.is_absolute() {
        name
    } else {
        directory.join(name)
    }
}

/// Writes a `年份` column plus one column per company, aligned by year.
pub fn write_workbook(table: &TrendTable, path: &Path) -> Result<PathBuf, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    sheet.write_string_with_format(0, 0, "年份", &header)?;
    for (col, row) in table.rows.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16 + 1, row.company.as_str(), &header)?;
    }

    for (i, year) in table.years.iter().enumerate() {
        let line = i as u32 + 1;
        sheet.write_string(line, 0, year.as_str())?;
        for (col, row) in table.rows.iter().enumerate() {
            if let Some(value) = row.values.get(i).copied().flatten() {
                sheet.write_number(line, col as u16 + 1, value)?;
            }
        }
    }

    workbook.save(path)?;
    let written = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    info!("Exported {} rows to {}", table.years.len(), written.display());
    Ok(written)
}
