use crate::model::{CompanyRecord, DataPoint, Indicator, IndicatorSeries, RawCell, RawTable};
use std::collections::BTreeMap;

/// Number of annual periods kept per company.
pub const MAX_PERIODS: usize = 5;

/// Picks the fiscal year-end columns, newest first.
/// Falls back to any `20xx` column when no year-end column exists.
pub fn select_periods(periods: &[String]) -> Vec<String> {
    let mut selected: Vec<String> = periods
        .iter()
        .filter(|p| p.contains("12-31") || p.contains("1231"))
        .cloned()
        .collect();

    if selected.is_empty() {
        selected = periods
            .iter()
            .filter(|p| p.starts_with("20"))
            .cloned()
            .collect();
    }

    selected.sort_by(|a, b| b.cmp(a));
    selected.truncate(MAX_PERIODS);
    selected
}

/// Year label of a period column: its first four characters.
pub fn year_label(period: &str) -> String {
    period.chars().take(4).collect()
}

/// Absent for missing cells, blanks, `--` and anything non-numeric.
pub fn parse_cell(cell: Option<&RawCell>) -> Option<f64> {
    match cell? {
        RawCell::Number(v) if v.is_finite() => Some(*v),
        RawCell::Number(_) | RawCell::Missing => None,
        RawCell::Text(text) => {
            let text = text.trim();
            if text.is_empty() || text == "--" {
                return None;
            }
            text.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
        }
    }
}

/// Builds the canonical record. `None` when no revenue period has a value.
pub fn normalize(raw: &RawTable, name: &str, code: &str) -> Option<CompanyRecord> {
    let periods = select_periods(&raw.periods);

    let mut series = BTreeMap::new();
    for indicator in Indicator::ALL {
        let row = raw.row(indicator.raw_label());
        let points = periods
            .iter()
            .map(|period| DataPoint {
                year: year_label(period),
                value: row.and_then(|r| parse_cell(r.cells.get(period))),
            })
            .collect();
        series.insert(indicator, IndicatorSeries { points });
    }

    let record = CompanyRecord {
        name: name.to_string(),
        code: code.to_string(),
        series,
    };

    if record.has_data(Indicator::Revenue) {
        Some(record)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawRow;
    use rstest::rstest;

    fn row(label: &str, cells: &[(&str, RawCell)]) -> RawRow {
        RawRow {
            label: label.to_string(),
            cells: cells
                .iter()
                .map(|(p, c)| (p.to_string(), c.clone()))
                .collect(),
        }
    }

    fn periods(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(None)]
    #[case(Some(RawCell::Missing))]
    #[case(Some(RawCell::Text(String::new())))]
    #[case(Some(RawCell::Text("--".into())))]
    #[case(Some(RawCell::Text("  ".into())))]
    #[case(Some(RawCell::Text("n/a".into())))]
    fn placeholder_cells_are_absent(#[case] cell: Option<RawCell>) {
        assert_eq!(parse_cell(cell.as_ref()), None);
    }

    #[rstest]
    #[case(RawCell::Number(12.5), 12.5)]
    #[case(RawCell::Text("3.25".into()), 3.25)]
    #[case(RawCell::Text("-0.5".into()), -0.5)]
    #[case(RawCell::Text("1,234.5".into()), 1234.5)]
    fn numeric_cells_parse(#[case] cell: RawCell, #[case] expected: f64) {
        assert_eq!(parse_cell(Some(&cell)), Some(expected));
    }

    #[test]
    fn year_end_columns_win_and_are_capped() {
        let selected = select_periods(&periods(&[
            "20190630", "20191231", "20201231", "20211231", "20220930", "20221231",
            "20231231", "20181231", "20240331",
        ]));
        assert_eq!(
            selected,
            periods(&["20231231", "20221231", "20211231", "20201231", "20191231"])
        );
    }

    #[test]
    fn dashed_dates_are_year_ends_too() {
        let selected = select_periods(&periods(&["2022-12-31", "2023-06-30", "2023-12-31"]));
        assert_eq!(selected, periods(&["2023-12-31", "2022-12-31"]));
    }

    #[test]
    fn falls_back_to_any_twenty_first_century_column() {
        let selected = select_periods(&periods(&["选项", "指标", "20230630", "20220630"]));
        assert_eq!(selected, periods(&["20230630", "20220630"]));
    }

    #[test]
    fn normalize_keeps_absent_values_explicit() {
        let raw = RawTable {
            periods: periods(&["20231231", "20221231"]),
            rows: vec![
                row(
                    "营业总收入",
                    &[
                        ("20231231", RawCell::Number(1000.0)),
                        ("20221231", RawCell::Text("--".into())),
                    ],
                ),
                row(" 流动比率 ", &[("20231231", RawCell::Text("1.5".into()))]),
            ],
        };

        let record = normalize(&raw, "贵州茅台", "600519").unwrap();
        let revenue = record.series(Indicator::Revenue).unwrap();
        assert_eq!(revenue.points.len(), 2);
        assert_eq!(revenue.points[0].year, "2023");
        assert_eq!(revenue.points[0].value, Some(1000.0));
        assert_eq!(revenue.points[1].value, None);

        let current = record.series(Indicator::CurrentRatio).unwrap();
        assert_eq!(current.value_at("2023"), Some(1.5));

        let missing_row = record.series(Indicator::Roe).unwrap();
        assert_eq!(missing_row.points.len(), 2);
        assert!(!missing_row.has_data());
        assert_eq!(record.years(), vec!["2023".to_string(), "2022".to_string()]);
    }

    #[test]
    fn company_without_revenue_is_rejected() {
        let raw = RawTable {
            periods: periods(&["20231231"]),
            rows: vec![
                row("营业总收入", &[("20231231", RawCell::Text(String::new()))]),
                row("流动比率", &[("20231231", RawCell::Number(2.0))]),
            ],
        };
        assert!(normalize(&raw, "空壳", "000000").is_none());
    }
}
