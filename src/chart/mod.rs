pub mod comparison;
pub mod figure;
pub mod market;

pub use comparison::comparison_figure;
pub use figure::Figure;
pub use market::{market_figure, multi_market_figure};
