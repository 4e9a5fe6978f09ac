use crate::model::{CompanyRecord, Indicator};

/// Health categories on the radar, each backed by one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadarDimension {
    Profitability,
    Liquidity,
    Solvency,
    Operating,
    Cash,
}

impl RadarDimension {
    pub const ALL: [RadarDimension; 5] = [
        RadarDimension::Profitability,
        RadarDimension::Liquidity,
        RadarDimension::Solvency,
        RadarDimension::Operating,
        RadarDimension::Cash,
    ];

    pub fn indicator(&self) -> Indicator {
        match self {
            RadarDimension::Profitability => Indicator::Roe,
            RadarDimension::Liquidity => Indicator::CurrentRatio,
            RadarDimension::Solvency => Indicator::DebtRatio,
            RadarDimension::Operating => Indicator::AssetTurnover,
            RadarDimension::Cash => Indicator::CashToRevenue,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RadarDimension::Profitability => "盈利(ROE)",
            RadarDimension::Liquidity => "流动(流动比)",
            RadarDimension::Solvency => "偿债(负债率)",
            RadarDimension::Operating => "运营(周转率)",
            RadarDimension::Cash => "现金(营收比)",
        }
    }
}

/// Which years feed the radar.
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodSelection {
    Year(String),
    Average { years: Vec<String>, label: String },
}

impl PeriodSelection {
    pub fn years(&self) -> &[String] {
        match self {
            PeriodSelection::Year(year) => std::slice::from_ref(year),
            PeriodSelection::Average { years, .. } => years,
        }
    }

    /// Human label used in titles and file names.
    pub fn label(&self) -> &str {
        match self {
            PeriodSelection::Year(year) => year,
            PeriodSelection::Average { label, .. } => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarProfile {
    pub company: String,
    pub raw: [f64; 5],
    pub normalized: [f64; 5],
}

impl RadarProfile {
    /// Normalized values with the first repeated at the end.
    pub fn closed_polygon(&self) -> Vec<f64> {
        let mut values = self.normalized.to_vec();
        values.push(self.normalized[0]);
        values
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarChart {
    pub period: PeriodSelection,
    pub profiles: Vec<RadarProfile>,
}

impl RadarChart {
    pub fn title(&self) -> String {
        format!("财务健康度 ({})", self.period.label())
    }
}

/// Mean of the values present at the selected years; 0 when none are.
pub fn dimension_value(record: &CompanyRecord, dimension: RadarDimension, years: &[String]) -> f64 {
    let Some(series) = record.series(dimension.indicator()) else {
        return 0.0;
    };

    let values: Vec<f64> = years.iter().filter_map(|y| series.value_at(y)).collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Raw dimension values for every company, scaled per dimension by the
/// largest absolute value so each axis peaks at 1.
pub fn aggregate(companies: &[CompanyRecord], period: PeriodSelection) -> RadarChart {
    let raws: Vec<[f64; 5]> = companies
        .iter()
        .map(|record| {
            let mut raw = [0.0; 5];
            for (slot, dimension) in raw.iter_mut().zip(RadarDimension::ALL) {
                *slot = dimension_value(record, dimension, period.years());
            }
            raw
        })
        .collect();

    let mut scale = [1.0; 5];
    for (i, slot) in scale.iter_mut().enumerate() {
        let max = raws.iter().map(|r| r[i].abs()).fold(0.0, f64::max);
        if max != 0.0 {
            *slot = max;
        }
    }

    let profiles = companies
        .iter()
        .zip(raws)
        .map(|(record, raw)| {
            let mut normalized = [0.0; 5];
            for (i, slot) in normalized.iter_mut().enumerate() {
                *slot = raw[i] / scale[i];
            }
            RadarProfile {
                company: record.name.clone(),
                raw,
                normalized,
            }
        })
        .collect();

    RadarChart { period, profiles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataPoint, IndicatorSeries};
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    const YEARS: [&str; 5] = ["2023", "2022", "2021", "2020", "2019"];

    fn record(name: &str, values: &[(Indicator, [Option<f64>; 5])]) -> CompanyRecord {
        let mut series = BTreeMap::new();
        for indicator in Indicator::ALL {
            let row = values
                .iter()
                .find(|(i, _)| *i == indicator)
                .map(|(_, v)| *v)
                .unwrap_or([None; 5]);
            let points = YEARS
                .iter()
                .zip(row)
                .map(|(y, v)| DataPoint {
                    year: y.to_string(),
                    value: v,
                })
                .collect();
            series.insert(indicator, IndicatorSeries { points });
        }
        CompanyRecord {
            name: name.to_string(),
            code: "000000".to_string(),
            series,
        }
    }

    fn years(n: usize) -> Vec<String> {
        YEARS.iter().take(n).map(|y| y.to_string()).collect()
    }

    #[test]
    fn single_year_uses_only_that_year() {
        let moutai = record(
            "贵州茅台",
            &[(Indicator::Roe, [Some(30.0), Some(20.0), Some(10.0), None, None])],
        );
        assert_relative_eq!(
            dimension_value(&moutai, RadarDimension::Profitability, &years(1)),
            30.0
        );
    }

    #[test]
    fn averages_skip_absent_years() {
        let moutai = record(
            "贵州茅台",
            &[(Indicator::Roe, [Some(30.0), None, Some(10.0), Some(100.0), None])],
        );
        assert_relative_eq!(
            dimension_value(&moutai, RadarDimension::Profitability, &years(3)),
            20.0
        );
        assert_relative_eq!(
            dimension_value(&moutai, RadarDimension::Profitability, &years(5)),
            140.0 / 3.0
        );
        assert_relative_eq!(
            dimension_value(&moutai, RadarDimension::Liquidity, &years(5)),
            0.0
        );
    }

    #[test]
    fn unknown_year_labels_contribute_nothing() {
        let moutai = record(
            "贵州茅台",
            &[(Indicator::Roe, [Some(30.0), None, None, None, None])],
        );
        let selection = vec!["2023".to_string(), "2030".to_string()];
        assert_relative_eq!(
            dimension_value(&moutai, RadarDimension::Profitability, &selection),
            30.0
        );
    }

    #[test]
    fn each_axis_peaks_at_one() {
        let a = record(
            "A",
            &[
                (Indicator::Roe, [Some(30.0), None, None, None, None]),
                (Indicator::DebtRatio, [Some(-50.0), None, None, None, None]),
                (Indicator::CurrentRatio, [Some(1.0), None, None, None, None]),
            ],
        );
        let b = record(
            "B",
            &[
                (Indicator::Roe, [Some(15.0), None, None, None, None]),
                (Indicator::DebtRatio, [Some(25.0), None, None, None, None]),
                (Indicator::CurrentRatio, [Some(4.0), None, None, None, None]),
            ],
        );

        let chart = aggregate(&[a, b], PeriodSelection::Year("2023".into()));
        assert_eq!(chart.title(), "财务健康度 (2023)");

        for i in 0..5 {
            let max = chart
                .profiles
                .iter()
                .map(|p| p.normalized[i].abs())
                .fold(0.0, f64::max);
            let all_zero = chart.profiles.iter().all(|p| p.raw[i] == 0.0);
            if all_zero {
                assert!(chart.profiles.iter().all(|p| p.normalized[i] == 0.0));
            } else {
                assert_relative_eq!(max, 1.0);
            }
        }

        let a = &chart.profiles[0];
        assert_relative_eq!(a.normalized[0], 1.0);
        assert_relative_eq!(a.normalized[1], 0.25);
        assert_relative_eq!(a.normalized[2], -1.0);
        assert_relative_eq!(chart.profiles[1].normalized[2], 0.5);
    }

    #[test]
    fn polygon_is_closed() {
        let profile = RadarProfile {
            company: "A".into(),
            raw: [1.0, 2.0, 3.0, 4.0, 5.0],
            normalized: [0.2, 0.4, 0.6, 0.8, 1.0],
        };
        let closed = profile.closed_polygon();
        assert_eq!(closed.len(), 6);
        assert_eq!(closed[5], closed[0]);
    }

    #[test]
    fn average_label() {
        let selection = PeriodSelection::Average {
            years: years(3),
            label: "3年平均".into(),
        };
        assert_eq!(selection.label(), "3年平均");
        assert_eq!(selection.years().len(), 3);
    }
}
