use crate::config::ProviderConfig;
use crate::model::{Company, ProviderError, RawTable};
use crate::provider::parser::{parse_abstract, parse_universe_page};
use crate::provider::traits::FinancialProvider;

use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Listing filter covering the Shanghai, Shenzhen and Beijing A-share boards.
const A_SHARE_FILTER: &str = "m:0 t:6,m:0 t:80,m:1 t:2,m:1 t:23,m:0 t:81 s:2048";

/// Upper bound on listing pages, in case the endpoint keeps answering.
const MAX_UNIVERSE_PAGES: usize = 200;

pub struct HttpProvider {
    client: Client,
    config: ProviderConfig,
}

impl HttpProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, ProviderError> {
        let response = self.client.get(url).query(query).send()?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text()?)
    }
}

/// Exchange-qualified symbol the abstract endpoint expects.
pub fn paper_code(code: &str) -> Result<String, ProviderError> {
    let prefix = match code.chars().next() {
        Some('6') | Some('9') => "sh",
        Some('0') | Some('2') | Some('3') => "sz",
        Some('4') | Some('8') => "bj",
        _ => return Err(ProviderError::UnknownExchange(code.to_string())),
    };
    Ok(format!("{}{}", prefix, code))
}

impl FinancialProvider for HttpProvider {
    fn universe(&self) -> Result<Vec<Company>, ProviderError> {
        let page_size = self.config.universe_page_size.max(1);
        let mut companies = Vec::new();

        for page in 1..=MAX_UNIVERSE_PAGES {
            let query = [
                ("pn", page.to_string()),
                ("pz", page_size.to_string()),
                ("po", "0".to_string()),
                ("np", "1".to_string()),
                ("fltt", "2".to_string()),
                ("invt", "2".to_string()),
                ("fid", "f12".to_string()),
                ("fs", A_SHARE_FILTER.to_string()),
                ("fields", "f12,f14".to_string()),
            ];
            let body = self.get_text(&self.config.universe_url, &query)?;
            let (batch, total) = parse_universe_page(&body)?;
            debug!("Universe page {}: {} rows (total {})", page, batch.len(), total);

            if batch.is_empty() {
                break;
            }
            companies.extend(batch);
            if companies.len() >= total {
                break;
            }
        }

        if companies.is_empty() {
            return Err(ProviderError::InvalidResponse("empty universe".into()));
        }

        info!("Loaded universe of {} companies", companies.len());
        Ok(companies)
    }

    fn financial_abstract(&self, code: &str) -> Result<RawTable, ProviderError> {
        let query = [
            ("paperCode", paper_code(code)?),
            ("source", "gjzb".to_string()),
            ("type", "0".to_string()),
            ("page", "1".to_string()),
            ("num", "100".to_string()),
        ];
        let body = self.get_text(&self.config.abstract_url, &query)?;
        let table = parse_abstract(&body)?;
        debug!(
            "Abstract for {}: {} periods, {} rows",
            code,
            table.periods.len(),
            table.rows.len()
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("600519", "sh600519")]
    #[case("900901", "sh900901")]
    #[case("000001", "sz000001")]
    #[case("300750", "sz300750")]
    #[case("830799", "bj830799")]
    #[case("430047", "bj430047")]
    fn exchange_prefix(#[case] code: &str, #[case] expected: &str) {
        assert_eq!(paper_code(code).unwrap(), expected);
    }

    #[test]
    fn unknown_exchange() {
        assert!(matches!(
            paper_code("700001"),
            Err(ProviderError::UnknownExchange(_))
        ));
    }
}
