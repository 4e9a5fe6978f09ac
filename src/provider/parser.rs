// Provider JSON payloads -> domain tables
use crate::model::{Company, ProviderError, RawCell, RawRow, RawTable};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct UniverseResponse {
    data: Option<UniverseData>,
}

#[derive(Debug, Deserialize)]
struct UniverseData {
    total: usize,
    diff: Vec<UniverseItem>,
}

#[derive(Debug, Deserialize)]
struct UniverseItem {
    f12: String,
    f14: String,
}

/// One page of the listing endpoint: `(companies, total)`.
/// A `null` data block means the page is past the end.
pub fn parse_universe_page(body: &str) -> Result<(Vec<Company>, usize), ProviderError> {
    let response: UniverseResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("universe: {}", e)))?;

    let Some(data) = response.data else {
        return Ok((Vec::new(), 0));
    };

    let companies = data
        .diff
        .into_iter()
        .map(|item| Company::new(item.f14.trim(), item.f12.trim()))
        .collect();
    Ok((companies, data.total))
}

#[derive(Debug, Deserialize)]
struct AbstractResponse {
    result: AbstractResult,
}

#[derive(Debug, Deserialize)]
struct AbstractResult {
    data: Option<AbstractData>,
}

#[derive(Debug, Deserialize)]
struct AbstractData {
    #[serde(default)]
    report_list: BTreeMap<String, Report>,
}

#[derive(Debug, Deserialize)]
struct Report {
    #[serde(default)]
    data: Vec<ReportItem>,
}

#[derive(Debug, Deserialize)]
struct ReportItem {
    item_title: String,
    #[serde(default)]
    item_value: Value,
}

fn to_cell(value: Value) -> RawCell {
    match value {
        Value::Number(n) => n.as_f64().map_or(RawCell::Missing, RawCell::Number),
        Value::String(s) => RawCell::Text(s),
        _ => RawCell::Missing,
    }
}

/// Pivots the per-period report list into an indicator × period table.
/// Row order follows first appearance in the newest report.
pub fn parse_abstract(body: &str) -> Result<RawTable, ProviderError> {
    let response: AbstractResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("abstract: {}", e)))?;

    let report_list = response
        .result
        .data
        .map(|d| d.report_list)
        .unwrap_or_default();

    let mut periods: Vec<String> = report_list.keys().cloned().collect();
    periods.sort_by(|a, b| b.cmp(a));

    let mut rows: Vec<RawRow> = Vec::new();
    for period in &periods {
        let Some(report) = report_list.get(period) else {
            continue;
        };
        for item in &report.data {
            let label = item.item_title.trim();
            let cell = to_cell(item.item_value.clone());
            match rows.iter_mut().find(|r| r.label == label) {
                Some(row) => {
                    row.cells.insert(period.clone(), cell);
                }
                None => {
                    let mut cells = BTreeMap::new();
                    cells.insert(period.clone(), cell);
                    rows.push(RawRow {
                        label: label.to_string(),
                        cells,
                    });
                }
            }
        }
    }

    Ok(RawTable { periods, rows })
}
