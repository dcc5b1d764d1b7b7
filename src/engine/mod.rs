//! The pure data-table pipeline: sort, then filter, then paginate.
//!
//! Every function here takes its inputs by reference and returns fresh
//! vectors. State and page clamping live in
//! [`TableController`](crate::controller::TableController).

pub mod audit;
pub mod filter;
pub mod paginate;
pub mod sort;

pub use audit::find_malformed;
pub use filter::filter;
pub use paginate::{paginate, total_pages};
pub use sort::sort;
