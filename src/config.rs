use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub universe_url: String,
    pub abstract_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub universe_page_size: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            universe_url: "https://82.push2.eastmoney.com/api/qt/clist/get".into(),
            abstract_url:
                "https://quotes.sina.cn/cn/api/openapi.php/CompanyFinanceService.getFinanceReport2022"
                    .into(),
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) FinCompare/0.1".into(),
            universe_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub ttl_hours: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("fincompare.db"),
            ttl_hours: 24,
        }
    }
}

/// Rendering settings; replaces any process-wide font setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub output_dir: PathBuf,
    pub font_candidates: Vec<String>,
    pub palette: Vec<String>,
    pub open_after_render: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("charts"),
            font_candidates: [
                "Arial Unicode MS",
                "PingFang HK",
                "SimHei",
                "Heiti TC",
                "Microsoft YaHei",
                "Noto Sans CJK SC",
                "sans-serif",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            palette: ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd"]
                .into_iter()
                .map(String::from)
                .collect(),
            open_after_render: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: PathBuf,
    pub open_after_export: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            open_after_export: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub cache: CacheConfig,
    pub chart: ChartConfig,
    pub export: ExportConfig,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            cache: CacheConfig::default(),
            chart: ChartConfig::default(),
            export: ExportConfig::default(),
            log_level: "warn".into(),
        }
    }
}

/// Reads the JSON config; a missing file yields defaults.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No config at {}, using defaults", path);
            return Ok(AppConfig::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
