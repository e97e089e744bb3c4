//! # redisearch
//!
//! A synchronous client for the RediSearch module.
//!
//! ## Features
//!
//! - Query-string predicate builder with escaping
//! - Search queries with filters, paging, summaries and highlighting
//! - Aggregation pipelines with reducers and cursors
//! - Table-driven reply decoding that fails loudly on malformed replies
//! - Index schemas, document indexing and pipelined batch indexing
//! - Autocomplete dictionaries and spellchecking

pub mod aggregation;
pub mod cli;
pub mod client;
pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod query;
pub mod reply;
pub mod result;
pub mod schema;
pub mod spellcheck;
pub mod suggestion;

pub mod prelude {
    pub use crate::aggregation::{AggregateRequest, AggregateResult, Alias, Cursor, asc, desc, reducers};
    pub use crate::client::{BatchIndexer, Client};
    pub use crate::command::{Command, Transport};
    pub use crate::config::ClientConfig;
    pub use crate::document::{AddDocument, AddDocumentHash};
    pub use crate::error::{RediSearchError, Result};
    pub use crate::query::querystring;
    pub use crate::query::{Filter, GeoFilter, GeoUnit, Highlight, NumericFilter, Query, SortDirection, Summarize};
    pub use crate::result::{Document, SearchResult};
    pub use crate::schema::{GeoField, IndexDefinition, IndexOptions, NumericField, Schema, TagField, TextField};
    pub use crate::suggestion::{AutoCompleter, SuggestOptions, Suggestion};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
