//! Search results and the search-reply decoder.
//!
//! A search reply is `[total, record, record, ...]` where each record is a
//! fixed number of consecutive elements. Which elements a record contains
//! depends only on the flags the request was sent with:
//!
//! | content | payloads | scores | record layout                   |
//! |---------|----------|--------|---------------------------------|
//! | no      | no       | no     | `id`                            |
//! | no      | no       | yes    | `id score`                      |
//! | no      | yes      | no     | `id payload`                    |
//! | no      | yes      | yes    | `id score payload`              |
//! | yes     | no       | no     | `id fields`                     |
//! | yes     | no       | yes    | `id score fields`               |
//! | yes     | yes      | no     | `id payload fields`             |
//! | yes     | yes      | yes    | `id score payload fields`       |
//!
//! The table lives in [`LAYOUTS`] and is the only place offsets are defined.

use std::time::Duration;

use indexmap::IndexMap;
use redis::Value;
use serde::{Deserialize, Serialize};

use crate::error::{RediSearchError, Result};
use crate::reply::{as_array, pairs_to_map, value_to_f64, value_to_i64, value_to_opt_string, value_to_string};

/// The optional reply channels a search request asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyFlags {
    /// Document fields are included (no `NOCONTENT`).
    pub content: bool,
    /// `WITHPAYLOADS` was sent.
    pub payloads: bool,
    /// `WITHSCORES` was sent.
    pub scores: bool,
}

impl ReplyFlags {
    /// All eight flag combinations, in table order.
    pub const ALL: [ReplyFlags; 8] = [
        ReplyFlags::new(false, false, false),
        ReplyFlags::new(false, false, true),
        ReplyFlags::new(false, true, false),
        ReplyFlags::new(false, true, true),
        ReplyFlags::new(true, false, false),
        ReplyFlags::new(true, false, true),
        ReplyFlags::new(true, true, false),
        ReplyFlags::new(true, true, true),
    ];

    /// Build a flag set.
    pub const fn new(content: bool, payloads: bool, scores: bool) -> Self {
        ReplyFlags {
            content,
            payloads,
            scores,
        }
    }

    fn index(self) -> usize {
        (usize::from(self.content) << 2) | (usize::from(self.payloads) << 1) | usize::from(self.scores)
    }

    /// The record layout for this flag combination.
    pub fn layout(self) -> ReplyLayout {
        LAYOUTS[self.index()]
    }
}

/// Where each channel sits inside one record, relative to the record's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyLayout {
    /// Number of elements per record.
    pub stride: usize,
    /// Offset of the score, if present.
    pub score: Option<usize>,
    /// Offset of the payload, if present.
    pub payload: Option<usize>,
    /// Offset of the key/value field array, if present.
    pub fields: Option<usize>,
}

const fn layout(stride: usize, score: Option<usize>, payload: Option<usize>, fields: Option<usize>) -> ReplyLayout {
    ReplyLayout {
        stride,
        score,
        payload,
        fields,
    }
}

/// Record layouts indexed by `content << 2 | payloads << 1 | scores`.
pub const LAYOUTS: [ReplyLayout; 8] = [
    layout(1, None, None, None),
    layout(2, Some(1), None, None),
    layout(2, None, Some(1), None),
    layout(3, Some(1), Some(2), None),
    layout(2, None, None, Some(1)),
    layout(3, Some(1), None, Some(2)),
    layout(3, None, Some(1), Some(2)),
    layout(4, Some(1), Some(2), Some(3)),
];

/// A single document in a result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The document id.
    pub id: String,
    /// Relative score, when requested with `WITHSCORES`.
    pub score: Option<f64>,
    /// Payload, when requested with `WITHPAYLOADS`.
    pub payload: Option<String>,
    /// Stored fields in reply order. Never contains an `id` key.
    pub fields: IndexMap<String, String>,
}

impl Document {
    /// Create a document with no fields.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Document {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Build a document from decoded fields, dropping any `id` field.
    pub fn with_fields<S: Into<String>>(id: S, mut fields: IndexMap<String, String>) -> Self {
        fields.shift_remove("id");
        Document {
            id: id.into(),
            fields,
            ..Default::default()
        }
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Shorten a field to roughly `size` characters, cutting at the next
    /// space, and wrap each of `bold_tokens` in `<b>` tags.
    pub fn snippetize(&mut self, field: &str, size: usize, bold_tokens: &[&str]) {
        let Some(text) = self.fields.get_mut(field) else {
            return;
        };
        let mut txt = text.clone();
        for token in bold_tokens {
            txt = txt.replace(token, &format!("<b>{token}</b>"));
        }

        let mut cut = size;
        while cut < txt.len() && (!txt.is_char_boundary(cut) || txt.as_bytes()[cut] != b' ') {
            cut += 1;
        }
        *text = if cut < txt.len() {
            format!("{}...", &txt[..cut])
        } else {
            txt
        };
    }
}

/// The decoded reply of a search command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Total number of matching documents (not just this page).
    pub total: u64,
    /// Round-trip time of the command.
    pub duration: Duration,
    /// Documents in this page, in reply order.
    pub docs: Vec<Document>,
}

/// Decode a search reply according to the flags the request was sent with.
pub fn parse_search_reply(reply: &Value, flags: ReplyFlags, duration: Duration) -> Result<SearchResult> {
    let items = as_array(reply)?;
    let (first, records) = items
        .split_first()
        .ok_or_else(|| RediSearchError::decode("search reply is empty"))?;

    let total = u64::try_from(value_to_i64(first)?)
        .map_err(|_| RediSearchError::decode("search reply has a negative total"))?;

    let layout = flags.layout();
    if records.len() % layout.stride != 0 {
        return Err(RediSearchError::decode(format!(
            "search reply has {} record elements, not a multiple of the stride {}",
            records.len(),
            layout.stride
        )));
    }

    let docs = records
        .chunks_exact(layout.stride)
        .map(|record| decode_record(record, &layout))
        .collect::<Result<Vec<_>>>()?;

    Ok(SearchResult {
        total,
        duration,
        docs,
    })
}

fn decode_record(record: &[Value], layout: &ReplyLayout) -> Result<Document> {
    let id = value_to_string(&record[0])?;
    let score = layout.score.map(|i| value_to_f64(&record[i])).transpose()?;
    let payload = layout
        .payload
        .map(|i| value_to_opt_string(&record[i]))
        .transpose()?
        .flatten();
    let fields = match layout.fields {
        Some(i) => pairs_to_map(&record[i])?,
        None => IndexMap::new(),
    };

    let mut doc = Document::with_fields(id, fields);
    doc.score = score;
    doc.payload = payload;
    Ok(doc)
}
