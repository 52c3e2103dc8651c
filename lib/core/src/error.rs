//! Error handling foundation for line-bridge.
//!
//! Only the `Result` type alias lives here. Crates define their own
//! domain error enums in their own error modules and return them wrapped
//! in rootcause's `Report`, adding context as errors cross layers.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
