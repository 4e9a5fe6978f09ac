// Utility functions
use crate::model::Indicator;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Formats a value the way tables show it: percentages for rates and ratios,
/// grouped thousands otherwise.
pub fn format_value(value: Option<f64>, indicator: Indicator) -> String {
    match value {
        None => "N/A".to_string(),
        Some(v) if indicator.is_percentage() => format!("{:.2}%", v),
        Some(v) => group_thousands(v),
    }
}

/// `1234567.891` -> `1,234,567.89`.
pub fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, frac_part)
}

/// Hands a file to the platform viewer. Failures are only logged.
pub fn open_with_system_viewer(path: &Path) {
    let result = if cfg!(target_os = "windows") {
        Command::new("cmd").arg("/C").arg("start").arg("").arg(path).spawn()
    } else if cfg!(target_os = "macos") {
        Command::new("open").arg(path).spawn()
    } else {
        Command::new("xdg-open").arg(path).spawn()
    };

    if let Err(e) = result {
        debug!("Could not open {}: {}", path.display(), e);
    }
}

/// Makes a string safe to use as a file name component.
pub fn file_stem_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "0.00")]
    #[case(999.5, "999.50")]
    #[case(1000.0, "1,000.00")]
    #[case(1234567.891, "1,234,567.89")]
    #[case(-98765.4321, "-98,765.43")]
    #[case(-0.001, "0.00")]
    fn thousands_grouping(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(group_thousands(value), expected);
    }

    #[test]
    fn format_depends_on_indicator() {
        assert_eq!(format_value(None, Indicator::Roe), "N/A");
        assert_eq!(format_value(Some(30.256), Indicator::Roe), "30.26%");
        assert_eq!(format_value(Some(0.5), Indicator::AssetTurnover), "0.50");
        assert_eq!(format_value(Some(150560000.0), Indicator::Revenue), "150,560,000.00");
    }

    #[test]
    fn unsafe_file_name_chars_are_replaced() {
        assert_eq!(file_stem_safe("经营性/营业 收入"), "经营性_营业_收入");
    }
}
