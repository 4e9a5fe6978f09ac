//! Menu states and the parsers that turn raw answers into transitions.
//! Nothing here touches the console; every parser has a defined fallback.

use crate::analyzer::radar::PeriodSelection;
use crate::analyzer::trend::{SubsetChoice, TrendTable};
use crate::model::Indicator;

#[derive(Debug, Clone, PartialEq)]
pub enum MenuState {
    CollectCompanies,
    RadarPeriodChoice,
    RadarRepeatChoice,
    IndicatorMenu,
    CompanySubsetChoice(Indicator),
    PostTrendAction(TrendTable),
    Exit,
}

/// Radar statistics window. Anything but `2`/`3` means the latest year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadarPeriod {
    Latest,
    ThreeYear,
    FiveYear,
}

impl RadarPeriod {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "2" => RadarPeriod::ThreeYear,
            "3" => RadarPeriod::FiveYear,
            _ => RadarPeriod::Latest,
        }
    }

    /// Years to aggregate, taken from a newest-first year list.
    pub fn selection(&self, years: &[String]) -> Option<PeriodSelection> {
        let first = years.first()?;
        Some(match self {
            RadarPeriod::Latest => PeriodSelection::Year(first.clone()),
            RadarPeriod::ThreeYear => PeriodSelection::Average {
                years: years.iter().take(3).cloned().collect(),
                label: "3年平均".to_string(),
            },
            RadarPeriod::FiveYear => PeriodSelection::Average {
                years: years.to_vec(),
                label: "5年平均".to_string(),
            },
        })
    }
}

/// Only `2` redraws the radar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadarRepeat {
    Continue,
    Redo,
}

impl RadarRepeat {
    pub fn parse(input: &str) -> Self {
        if input.trim() == "2" {
            RadarRepeat::Redo
        } else {
            RadarRepeat::Continue
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorChoice {
    Quit,
    Pick(Indicator),
    Invalid,
}

impl IndicatorChoice {
    /// `q` quits; a 1-based catalogue number picks; anything else is invalid.
    pub fn parse(input: &str) -> Self {
        let input = input.trim().to_lowercase();
        if input == "q" {
            return IndicatorChoice::Quit;
        }
        input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| Indicator::ALL.get(i).copied())
            .map_or(IndicatorChoice::Invalid, IndicatorChoice::Pick)
    }
}

/// `a` = all, blank or `d` = default, otherwise comma-separated numbers.
/// Unparseable input falls back to the default.
pub fn parse_subset(input: &str) -> SubsetChoice {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "a" => SubsetChoice::All,
        "" | "d" => SubsetChoice::Default,
        _ => {
            let picks: Result<Vec<usize>, _> = input
                .split([',', '，'])
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::parse::<usize>)
                .collect();
            match picks {
                Ok(picks) if !picks.is_empty() => SubsetChoice::Picks(picks),
                _ => SubsetChoice::Default,
            }
        }
    }
}

/// `1` exports, `3` exits, anything else continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostTrendChoice {
    Export,
    Continue,
    Exit,
}

impl PostTrendChoice {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "1" => PostTrendChoice::Export,
            "3" => PostTrendChoice::Exit,
            _ => PostTrendChoice::Continue,
        }
    }

    pub fn next_state(&self) -> MenuState {
        match self {
            PostTrendChoice::Export | PostTrendChoice::Continue => MenuState::IndicatorMenu,
            PostTrendChoice::Exit => MenuState::Exit,
        }
    }
}
