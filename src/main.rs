mod analyzer;
mod chart;
mod config;
mod console;
mod export;
mod menu;
mod model;
mod normalizer;
mod provider;
mod resolver;
mod session;
mod storage;
mod utils;

use chart::PlottersRenderer;
use clap::Parser;
use config::{AppConfig, load_config};
use console::StdConsole;
use model::SessionError;
use provider::{CachedProvider, FinancialProvider, HttpProvider};
use session::Session;
use std::path::PathBuf;
use storage::SqliteCache;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Compare A-share companies by their financial indicators.
#[derive(Parser, Debug)]
#[command(name = "fincompare", version, about)]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, default_value = "config.json")]
    config: String,

    /// Always fetch from the network, bypassing the local cache
    #[arg(long)]
    no_cache: bool,

    /// Directory charts are written to
    #[arg(long)]
    chart_dir: Option<PathBuf>,

    /// Write charts and workbooks without opening them
    #[arg(long)]
    no_open: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ 配置文件错误: {}", e);
            return;
        }
    };

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic: {}", panic_info);
        eprintln!("\n💥 程序发生未预期的错误，已退出");
    }));

    let config = apply_overrides(config, &cli);
    let use_cache = config.cache.enabled && !cli.no_cache;

    // The blocking HTTP client must live entirely outside the async context.
    let session = tokio::task::spawn_blocking(move || run_session(config, use_cache));

    tokio::select! {
        joined = session => match joined {
            Ok(Ok(())) => info!("Bye"),
            Ok(Err(SessionError::Interrupted)) => println!("\n\n👋 程序已退出"),
            Ok(Err(e)) => println!("\n💥 未预期的错误: {}", e),
            Err(e) => error!("Session task failed: {}", e),
        },
        _ = tokio::signal::ctrl_c() => {
            println!("\n\n👋 程序已退出");
            // The session thread is parked on stdin and would block runtime shutdown.
            std::process::exit(0);
        }
    }
}

fn apply_overrides(mut config: AppConfig, cli: &Cli) -> AppConfig {
    if let Some(dir) = &cli.chart_dir {
        config.chart.output_dir = dir.clone();
    }
    if cli.no_open {
        config.chart.open_after_render = false;
        config.export.open_after_export = false;
    }
    config
}

fn run_session(config: AppConfig, use_cache: bool) -> Result<(), SessionError> {
    let http = match HttpProvider::new(config.provider.clone()) {
        Ok(http) => http,
        Err(e) => {
            error!("HTTP client setup failed: {}", e);
            println!("❌ 网络错误");
            return Ok(());
        }
    };

    let provider: Box<dyn FinancialProvider> = if use_cache {
        match SqliteCache::open(&config.cache.path, config.cache.ttl_hours) {
            Ok(cache) => Box::new(CachedProvider::new(http, cache)),
            Err(e) => {
                warn!("Cache unavailable at {}: {}", config.cache.path.display(), e);
                Box::new(http)
            }
        }
    } else {
        Box::new(http)
    };

    let renderer = PlottersRenderer::new(&config.chart);
    let mut session = Session::new(StdConsole, provider, renderer, config.export);
    session.run()
}
