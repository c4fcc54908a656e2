//! Consumers of parsed sift queries.
//!
//! - [`RecordFilter`] evaluates a query against JSON records and sorts the
//!   matches by any `asc:field` / `desc:field` markers.
//! - [`compile`] folds a query into a backend filter through a caller-supplied
//!   [`QueryBuilder`], reporting the conditions it could not express.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use sift_filter::{FilterOptions, RecordFilter};
//! use sift_query::parse;
//!
//! let filter = RecordFilter::new(&parse("author:tolkien price<20"), FilterOptions::default())?;
//! assert!(filter.matches(&json!({"author": "J.R.R. Tolkien", "price": 12.5})));
//! # Ok::<(), sift_filter::FilterError>(())
//! ```

#![warn(missing_docs)]

mod adapter;
mod error;
mod record;
mod sort;
mod value;

pub use adapter::{CompiledQuery, QueryBuilder, compile};
pub use error::FilterError;
pub use record::{FilterOptions, RecordFilter};
pub use sort::{ASC, DESC, SortDirection, SortKey, is_sort_marker, sort_keys, sort_records};
