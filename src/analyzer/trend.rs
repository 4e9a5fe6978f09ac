use crate::model::{CompanyRecord, Indicator};
use crate::utils::format_value;

/// Companies preselected when the user takes the default.
pub const DEFAULT_SUBSET: usize = 3;

/// Which of the available companies go into a trend.
#[derive(Debug, Clone, PartialEq)]
pub enum SubsetChoice {
    All,
    Default,
    /// 1-based positions as typed.
    Picks(Vec<usize>),
}

/// Number of companies with at least one value for `indicator`.
pub fn coverage(companies: &[CompanyRecord], indicator: Indicator) -> usize {
    companies.iter().filter(|c| c.has_data(indicator)).count()
}

pub fn available_companies(
    companies: &[CompanyRecord],
    indicator: Indicator,
) -> Vec<&CompanyRecord> {
    companies.iter().filter(|c| c.has_data(indicator)).collect()
}

/// Applies a subset choice; out-of-range picks are dropped and an empty
/// result falls back to the default subset.
pub fn select_subset<'a>(
    available: &[&'a CompanyRecord],
    choice: &SubsetChoice,
) -> Vec<&'a CompanyRecord> {
    let default = || -> Vec<&'a CompanyRecord> {
        available.iter().take(DEFAULT_SUBSET).copied().collect()
    };

    match choice {
        SubsetChoice::All => available.to_vec(),
        SubsetChoice::Default => default(),
        SubsetChoice::Picks(picks) => {
            let mut seen = Vec::new();
            for &pick in picks {
                if (1..=available.len()).contains(&pick) && !seen.contains(&pick) {
                    seen.push(pick);
                }
            }
            if seen.is_empty() {
                default()
            } else {
                seen.into_iter().map(|p| available[p - 1]).collect()
            }
        }
    }
}

/// One plotted company: oldest-first present points.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub company: String,
    pub points: Vec<(String, f64)>,
}

/// One table/export row: values aligned with [`TrendTable::years`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrendRow {
    pub company: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendTable {
    pub indicator: Indicator,
    /// Year labels of the first contributing company, newest first.
    pub years: Vec<String>,
    pub lines: Vec<TrendLine>,
    pub rows: Vec<TrendRow>,
}

/// Builds lines and aligned rows; `None` when no selected company has a point.
pub fn build_trend(selected: &[&CompanyRecord], indicator: Indicator) -> Option<TrendTable> {
    let mut years: Vec<String> = Vec::new();
    let mut contributing = Vec::new();
    let mut lines = Vec::new();

    for record in selected {
        let Some(series) = record.series(indicator) else {
            continue;
        };
        let points = series.chronological();
        if points.is_empty() {
            continue;
        }
        if years.is_empty() {
            years = series.years().map(str::to_string).collect();
        }
        lines.push(TrendLine {
            company: record.name.clone(),
            points,
        });
        contributing.push(series);
    }

    if lines.is_empty() {
        return None;
    }

    let rows = lines
        .iter()
        .zip(contributing)
        .map(|(line, series)| TrendRow {
            company: line.company.clone(),
            values: years.iter().map(|y| series.value_at(y)).collect(),
        })
        .collect();

    Some(TrendTable {
        indicator,
        years,
        lines,
        rows,
    })
}

impl TrendTable {
    /// Every plotted year, oldest first.
    pub fn x_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .lines
            .iter()
            .flat_map(|l| l.points.iter().map(|(y, _)| y.clone()))
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }

    /// Console rendering: header, rule, one line per company.
    pub fn render_lines(&self) -> Vec<String> {
        let header = format!(
            "{:<10}{}",
            "公司",
            self.years
                .iter()
                .map(|y| format!("|{:^10}", y))
                .collect::<String>()
        );
        let rule = "-".repeat(header.chars().count());

        let mut out = vec![header, rule];
        for row in &self.rows {
            let cells: String = row
                .values
                .iter()
                .map(|v| format!("|{:^10}", format_value(*v, self.indicator)))
                .collect();
            out.push(format!("{:<10}{}", row.company, cells));
        }
        out
    }
}
