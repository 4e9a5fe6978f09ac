use crate::model::{Company, ProviderError, RawTable};
use crate::provider::traits::FinancialProvider;
use crate::storage::SqliteCache;

use std::cell::RefCell;
use tracing::{debug, warn};

/// Serves fresh cache entries locally and stores whatever the inner provider fetches.
/// Cache failures are logged and otherwise ignored.
pub struct CachedProvider<P> {
    inner: P,
    cache: RefCell<SqliteCache>,
}

impl<P: FinancialProvider> CachedProvider<P> {
    pub fn new(inner: P, cache: SqliteCache) -> Self {
        Self {
            inner,
            cache: RefCell::new(cache),
        }
    }
}

impl<P: FinancialProvider> FinancialProvider for CachedProvider<P> {
    fn universe(&self) -> Result<Vec<Company>, ProviderError> {
        match self.cache.borrow().load_universe() {
            Ok(Some(companies)) => {
                debug!("Universe served from cache ({} companies)", companies.len());
                return Ok(companies);
            }
            Ok(None) => debug!("Universe cache miss"),
            Err(e) => warn!("Universe cache read failed: {:?}", e),
        }

        let companies = self.inner.universe()?;
        if let Err(e) = self.cache.borrow_mut().store_universe(&companies) {
            warn!("Universe cache write failed: {:?}", e);
        }
        Ok(companies)
    }

    fn financial_abstract(&self, code: &str) -> Result<RawTable, ProviderError> {
        match self.cache.borrow().load_abstract(code) {
            Ok(Some(table)) => {
                debug!("Abstract for {} served from cache", code);
                return Ok(table);
            }
            Ok(None) => debug!("Abstract cache miss for {}", code),
            Err(e) => warn!("Abstract cache read failed for {}: {:?}", code, e),
        }

        let table = self.inner.financial_abstract(code)?;
        if table.rows.is_empty() {
            return Ok(table);
        }
        if let Err(e) = self.cache.borrow().store_abstract(code, &table) {
            warn!("Abstract cache write failed for {}: {:?}", code, e);
        }
        Ok(table)
    }
}
