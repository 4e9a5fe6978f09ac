//! Free-text to ticker resolution against the provider universe.

use crate::model::Company;

/// Candidates shown when a name matches several companies.
pub const MAX_CANDIDATES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(Company),
    NotFound,
    /// Several names contain the input; at most [`MAX_CANDIDATES`], provider order.
    Ambiguous(Vec<Company>),
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn is_ticker_code(token: &str) -> bool {
    token.len() == 6 && token.bytes().all(|b| b.is_ascii_digit())
}

/// Resolves one user token without any console interaction.
pub fn resolve(token: &str, universe: &[Company]) -> Resolution {
    let token = token.trim();

    if is_ticker_code(token) {
        if let Some(company) = universe.iter().find(|c| c.code == token) {
            return Resolution::Found(company.clone());
        }
    }

    let needle = strip_whitespace(token);
    if needle.is_empty() {
        return Resolution::NotFound;
    }

    let candidates: Vec<(&Company, String)> = universe
        .iter()
        .map(|c| (c, strip_whitespace(&c.name)))
        .filter(|(_, name)| name.contains(&needle))
        .collect();

    if let Some((exact, _)) = candidates.iter().find(|(_, name)| *name == needle) {
        return Resolution::Found((*exact).clone());
    }

    match candidates.len() {
        0 => Resolution::NotFound,
        1 => Resolution::Found(candidates[0].0.clone()),
        _ => Resolution::Ambiguous(
            candidates
                .into_iter()
                .take(MAX_CANDIDATES)
                .map(|(c, _)| c.clone())
                .collect(),
        ),
    }
}

/// Index picked from a disambiguation answer. Anything but a valid
/// 1-based number falls back to the first candidate.
pub fn pick_candidate(answer: &str, count: usize) -> usize {
    answer
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=count).contains(n))
        .map_or(0, |n| n - 1)
}

/// Splits the company prompt on ASCII and full-width commas.
pub fn split_tokens(input: &str) -> Vec<String> {
    input
        .split([',', '，'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn universe() -> Vec<Company> {
        vec![
            Company::new("平安银行", "000001"),
            Company::new("中国平安", "601318"),
            Company::new("平安电工", "001359"),
            Company::new("贵州茅台", "600519"),
            Company::new("泸州老窖", "000568"),
            Company::new("万 科Ａ", "000002"),
            Company::new("平安", "999999"),
            Company::new("平安一号", "900001"),
            Company::new("平安二号", "900002"),
            Company::new("平安三号", "900003"),
        ]
    }

    #[test]
    fn six_digit_code_resolves_directly() {
        assert_eq!(
            resolve("600519", &universe()),
            Resolution::Found(Company::new("贵州茅台", "600519"))
        );
    }

    #[test]
    fn unknown_code_falls_through_to_names() {
        assert_eq!(resolve("123456", &universe()), Resolution::NotFound);
    }

    #[test]
    fn exact_name_beats_substring_matches() {
        assert_eq!(
            resolve(" 平 安 ", &universe()),
            Resolution::Found(Company::new("平安", "999999"))
        );
    }

    #[test]
    fn names_with_spaces_match_stripped_input() {
        assert_eq!(
            resolve("万科Ａ", &universe()),
            Resolution::Found(Company::new("万 科Ａ", "000002"))
        );
    }

    #[test]
    fn single_substring_match_resolves() {
        assert_eq!(
            resolve("茅台", &universe()),
            Resolution::Found(Company::new("贵州茅台", "600519"))
        );
    }

    #[test]
    fn ambiguity_lists_first_five_in_provider_order() {
        match resolve("平安银", &universe()) {
            Resolution::Found(c) => assert_eq!(c.code, "000001"),
            other => panic!("unexpected {other:?}"),
        }

        let universe: Vec<Company> = universe().into_iter().filter(|c| c.name != "平安").collect();
        match resolve("平安", &universe) {
            Resolution::Ambiguous(list) => {
                let codes: Vec<&str> = list.iter().map(|c| c.code.as_str()).collect();
                assert_eq!(codes, vec!["000001", "601318", "001359", "900001", "900002"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nothing_matches() {
        assert_eq!(resolve("不存在", &universe()), Resolution::NotFound);
        assert_eq!(resolve("　", &universe()), Resolution::NotFound);
    }

    #[rstest]
    #[case("", 0)]
    #[case("1", 0)]
    #[case("3", 2)]
    #[case(" 5 ", 4)]
    #[case("6", 0)]
    #[case("0", 0)]
    #[case("abc", 0)]
    #[case("-2", 0)]
    fn disambiguation_answer(#[case] answer: &str, #[case] expected: usize) {
        assert_eq!(pick_candidate(answer, 5), expected);
    }

    #[test]
    fn tokens_split_on_both_commas() {
        assert_eq!(
            split_tokens("贵州茅台， 泸州老窖,,600519 ,"),
            vec!["贵州茅台", "泸州老窖", "600519"]
        );
        assert!(split_tokens(" , ， ").is_empty());
    }
}
