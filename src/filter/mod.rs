//! Record filters
//!
//! Turns loosely typed caller parameters into a validated `FilterSpec`.
//! Invalid input is rejected here, at the boundary, never during query
//! compilation.

mod errors;
mod filter_spec;
mod params;

pub use errors::{FilterError, FilterErrorCode, FilterResult};
pub use filter_spec::{
    FilterLimits, FilterSpec, Paging, TextFilter, DEFAULT_PAGE_LENGTH, MAX_PAGE_LENGTH,
};
pub use params::{ParamValue, RawFilterParams};
