// Core structs: Company, Indicator, IndicatorSeries, CompanyRecord, RawTable
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A listed company as it appears in the provider universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub code: String,
}

impl Company {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// Menu grouping of the indicator catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Profitability,
    Liquidity,
    Solvency,
    Efficiency,
    CashFlow,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Profitability,
        Category::Liquidity,
        Category::Solvency,
        Category::Efficiency,
        Category::CashFlow,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Profitability => "盈利能力",
            Category::Liquidity => "流动性",
            Category::Solvency => "偿债能力",
            Category::Efficiency => "运营效率",
            Category::CashFlow => "现金流",
        }
    }
}

/// The fixed indicator catalogue. Declaration order is menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Indicator {
    Revenue,
    NetProfit,
    GrossMargin,
    NetMargin,
    Roe,
    CurrentRatio,
    QuickRatio,
    CashRatio,
    DebtRatio,
    EquityMultiplier,
    DebtToEquity,
    AssetTurnover,
    InventoryTurnover,
    CurrentAssetTurnover,
    OperatingCashFlow,
    FreeCashFlowPerShare,
    CashToRevenue,
}

impl Indicator {
    pub const ALL: [Indicator; 17] = [
        Indicator::Revenue,
        Indicator::NetProfit,
        Indicator::GrossMargin,
        Indicator::NetMargin,
        Indicator::Roe,
        Indicator::CurrentRatio,
        Indicator::QuickRatio,
        Indicator::CashRatio,
        Indicator::DebtRatio,
        Indicator::EquityMultiplier,
        Indicator::DebtToEquity,
        Indicator::AssetTurnover,
        Indicator::InventoryTurnover,
        Indicator::CurrentAssetTurnover,
        Indicator::OperatingCashFlow,
        Indicator::FreeCashFlowPerShare,
        Indicator::CashToRevenue,
    ];

    /// Display name shown in menus, tables and file names.
    pub fn name(&self) -> &'static str {
        match self {
            Indicator::Revenue => "营业收入",
            Indicator::NetProfit => "净利润",
            Indicator::GrossMargin => "毛利率",
            Indicator::NetMargin => "净利率",
            Indicator::Roe => "净资产收益率",
            Indicator::CurrentRatio => "流动比率",
            Indicator::QuickRatio => "速动比率",
            Indicator::CashRatio => "现金比率",
            Indicator::DebtRatio => "资产负债率",
            Indicator::EquityMultiplier => "权益乘数",
            Indicator::DebtToEquity => "产权比率",
            Indicator::AssetTurnover => "总资产周转率",
            Indicator::InventoryTurnover => "存货周转率",
            Indicator::CurrentAssetTurnover => "流动资产周转率",
            Indicator::OperatingCashFlow => "经营活动现金流",
            Indicator::FreeCashFlowPerShare => "每股自由现金流",
            Indicator::CashToRevenue => "现金流营收比",
        }
    }

    /// Row label used by the provider's financial abstract.
    pub fn raw_label(&self) -> &'static str {
        match self {
            Indicator::Revenue => "营业总收入",
            Indicator::NetProfit => "归母净利润",
            Indicator::GrossMargin => "毛利率",
            Indicator::NetMargin => "销售净利率",
            Indicator::Roe => "净资产收益率(ROE)",
            Indicator::CurrentRatio => "流动比率",
            Indicator::QuickRatio => "速动比率",
            Indicator::CashRatio => "现金比率",
            Indicator::DebtRatio => "资产负债率",
            Indicator::EquityMultiplier => "权益乘数",
            Indicator::DebtToEquity => "产权比率",
            Indicator::AssetTurnover => "总资产周转率",
            Indicator::InventoryTurnover => "存货周转率",
            Indicator::CurrentAssetTurnover => "流动资产周转率",
            Indicator::OperatingCashFlow => "经营现金流量净额",
            Indicator::FreeCashFlowPerShare => "每股企业自由现金流量",
            Indicator::CashToRevenue => "经营性现金净流量/营业总收入",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Indicator::Revenue
            | Indicator::NetProfit
            | Indicator::GrossMargin
            | Indicator::NetMargin
            | Indicator::Roe => Category::Profitability,
            Indicator::CurrentRatio | Indicator::QuickRatio | Indicator::CashRatio => {
                Category::Liquidity
            }
            Indicator::DebtRatio | Indicator::EquityMultiplier | Indicator::DebtToEquity => {
                Category::Solvency
            }
            Indicator::AssetTurnover
            | Indicator::InventoryTurnover
            | Indicator::CurrentAssetTurnover => Category::Efficiency,
            Indicator::OperatingCashFlow
            | Indicator::FreeCashFlowPerShare
            | Indicator::CashToRevenue => Category::CashFlow,
        }
    }

    /// Rates and ratios print as percentages; turnovers never do.
    pub fn is_percentage(&self) -> bool {
        let name = self.name();
        (name.contains('率') || name.contains('比')) && !name.contains("周转")
    }
}

/// One (year, value) observation. `None` means the provider had no value.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub year: String,
    pub value: Option<f64>,
}

/// Up to five annual observations, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    pub points: Vec<DataPoint>,
}

impl IndicatorSeries {
    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|p| p.year.as_str())
    }

    /// Value at a year label; `None` both for unknown years and absent values.
    pub fn value_at(&self, year: &str) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.year == year)
            .and_then(|p| p.value)
    }

    pub fn has_data(&self) -> bool {
        self.points.iter().any(|p| p.value.is_some())
    }

    /// Oldest-first present points, for plotting.
    pub fn chronological(&self) -> Vec<(String, f64)> {
        self.points
            .iter()
            .rev()
            .filter_map(|p| p.value.map(|v| (p.year.clone(), v)))
            .collect()
    }
}

/// Normalized financial history of one company.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRecord {
    pub name: String,
    pub code: String,
    pub series: BTreeMap<Indicator, IndicatorSeries>,
}

impl CompanyRecord {
    pub fn series(&self, indicator: Indicator) -> Option<&IndicatorSeries> {
        self.series.get(&indicator)
    }

    pub fn has_data(&self, indicator: Indicator) -> bool {
        self.series(indicator).is_some_and(IndicatorSeries::has_data)
    }

    /// Year labels of the record, newest first.
    pub fn years(&self) -> Vec<String> {
        self.series(Indicator::Revenue)
            .map(|s| s.years().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Companies that passed data screening, in input order.
pub type WorkingSet = Vec<CompanyRecord>;

/// A provider cell before parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Missing,
}

/// One labeled row of the raw abstract; cells keyed by period label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub label: String,
    pub cells: BTreeMap<String, RawCell>,
}

/// Indicator × period table as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub periods: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn row(&self, label: &str) -> Option<&RawRow> {
        self.rows.iter().find(|r| r.label.trim() == label)
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("unknown exchange for code {0}")]
    UnknownExchange(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to draw")]
    Empty,
    #[error("drawing failed: {0}")]
    Drawing(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("interrupted")]
    Interrupted,
    #[error("console error: {0}")]
    Console(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn series(points: &[(&str, Option<f64>)]) -> IndicatorSeries {
        IndicatorSeries {
            points: points
                .iter()
                .map(|(y, v)| DataPoint {
                    year: y.to_string(),
                    value: *v,
                })
                .collect(),
        }
    }

    #[rstest]
    #[case(Indicator::GrossMargin, true)]
    #[case(Indicator::CurrentRatio, true)]
    #[case(Indicator::CashToRevenue, true)]
    #[case(Indicator::AssetTurnover, false)]
    #[case(Indicator::InventoryTurnover, false)]
    #[case(Indicator::Revenue, false)]
    #[case(Indicator::EquityMultiplier, false)]
    fn percentage_formatting_follows_name(#[case] indicator: Indicator, #[case] expected: bool) {
        assert_eq!(indicator.is_percentage(), expected);
    }

    #[test]
    fn catalogue_is_grouped_in_menu_order() {
        let mut last = 0;
        for indicator in Indicator::ALL {
            let pos = Category::ALL
                .iter()
                .position(|c| *c == indicator.category())
                .unwrap();
            assert!(pos >= last);
            last = pos;
        }
        assert_eq!(Indicator::ALL.len(), 17);
    }

    #[test]
    fn chronological_drops_absent_points() {
        let s = series(&[("2023", Some(10.0)), ("2022", None), ("2021", Some(8.0))]);
        assert_eq!(
            s.chronological(),
            vec![("2021".to_string(), 8.0), ("2023".to_string(), 10.0)]
        );
        assert!(s.has_data());
        assert_eq!(s.value_at("2022"), None);
        assert_eq!(s.value_at("1999"), None);
    }

    #[test]
    fn raw_cells_deserialize_untagged() {
        let cells: Vec<RawCell> = serde_json::from_str(r#"[1.5, "--", null]"#).unwrap();
        assert_eq!(
            cells,
            vec![
                RawCell::Number(1.5),
                RawCell::Text("--".into()),
                RawCell::Missing
            ]
        );
    }
}
