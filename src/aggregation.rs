//! Aggregation pipelines: requests, reducers, cursors and replies.
//!
//! An [`AggregateRequest`] is an ordered list of pipeline stages (group,
//! apply, filter, sort) over the documents matched by a query string:
//!
//! ```
//! use redisearch::aggregation::{desc, reducers, AggregateRequest, Alias};
//!
//! let request = AggregateRequest::new("*")
//!     .group_by(["@customer"], [reducers::sum("@paid").alias(Alias::FromField).unwrap()])
//!     .unwrap()
//!     .sort_by_max([desc("@paid")], 10);
//!
//! assert_eq!(
//!     request.build_args().unwrap(),
//!     vec![
//!         "*", "GROUPBY", "1", "@customer", "REDUCE", "SUM", "1", "@paid", "AS", "paid",
//!         "SORTBY", "2", "@paid", "DESC", "MAX", "10",
//!     ]
//! );
//! ```

pub mod reducers;
pub mod request;
pub mod result;

use crate::query::SortDirection;

pub use reducers::{Alias, Reducer, ReducerFunction};
pub use request::{AggregateRequest, Group, Limit};
pub use result::{AggregateResult, AggregateRow, Cursor, parse_aggregate_reply};

/// A field reference with an optional sort direction.
///
/// A bare field sorts in the server's default (ascending) order and sends no
/// direction token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Field reference, usually `@name`.
    pub field: String,
    /// Explicit direction, if any.
    pub direction: Option<SortDirection>,
}

impl SortKey {
    /// A key with no explicit direction.
    pub fn new<S: Into<String>>(field: S) -> Self {
        SortKey {
            field: field.into(),
            direction: None,
        }
    }

    /// Wire tokens: the field, then the direction if one was given.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.field.clone()];
        if let Some(direction) = self.direction {
            args.push(direction.as_str().to_string());
        }
        args
    }
}

impl From<&str> for SortKey {
    fn from(field: &str) -> Self {
        SortKey::new(field)
    }
}

impl From<String> for SortKey {
    fn from(field: String) -> Self {
        SortKey::new(field)
    }
}

/// Sort by `field` ascending.
pub fn asc<S: Into<String>>(field: S) -> SortKey {
    SortKey {
        field: field.into(),
        direction: Some(SortDirection::Asc),
    }
}

/// Sort by `field` descending.
pub fn desc<S: Into<String>>(field: S) -> SortKey {
    SortKey {
        field: field.into(),
        direction: Some(SortDirection::Desc),
    }
}
