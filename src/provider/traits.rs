use crate::model::{Company, ProviderError, RawTable};

pub trait FinancialProvider {
    /// All listed (code, name) pairs, in provider order.
    fn universe(&self) -> Result<Vec<Company>, ProviderError>;

    /// Raw indicator × period abstract for one ticker.
    fn financial_abstract(&self, code: &str) -> Result<RawTable, ProviderError>;
}

impl<P: FinancialProvider + ?Sized> FinancialProvider for Box<P> {
    fn universe(&self) -> Result<Vec<Company>, ProviderError> {
        (**self).universe()
    }

    fn financial_abstract(&self, code: &str) -> Result<RawTable, ProviderError> {
        (**self).financial_abstract(code)
    }
}
