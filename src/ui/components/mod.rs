pub mod arrow_refresh;

pub use arrow_refresh::ArrowIndicator;
