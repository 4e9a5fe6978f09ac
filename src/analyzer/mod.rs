// Analyzer module: radar aggregation and trend tables over the working set.

pub mod radar;
pub mod trend;

pub use radar::RadarChart;
pub use trend::TrendTable;
