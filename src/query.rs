//! Search request building: query strings, filters and the query object.

pub mod filter;
#[allow(clippy::module_inception)]
pub mod query;
pub mod querystring;

use serde::{Deserialize, Serialize};

pub use filter::{Filter, GeoFilter, GeoUnit, NumericFilter};
pub use query::{Highlight, Query, Summarize};

/// Sort order for sortable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The direction token sent on the wire.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}
