// Provider module: where the raw financial data comes from.

pub mod cached;
pub mod fetcher;
pub mod parser;
pub mod traits;

pub use cached::CachedProvider;
pub use fetcher::HttpProvider;
pub use traits::FinancialProvider;
