//! Predicate evaluation: `where` filtering and `orderBy` sorting.
//!
//! Both are pure functions over a row collection. The record engine
//! applies the filter first, then the sort.

mod compare;
mod filter;
mod order;

pub use compare::{loose_cmp, loose_eq, sort_cmp};
pub use filter::{Comparison, WhereStatement};
pub use order::{Direction, OrderByStatement};
