pub mod builder;
pub mod comparison;

pub use builder::{build_multi_market_series, build_single_market_series, MultiMarketSeries, Series};
pub use comparison::{build_yoy_comparison, ComparisonSet};
