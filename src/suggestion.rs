//! Autocomplete dictionaries (`FT.SUG*`).
//!
//! An `FT.SUGGET` reply is a flat list of records, each one, two or three
//! elements long depending on `WITHSCORES` and `WITHPAYLOADS`. As with
//! search replies, the offsets come from a single table.

use log::debug;
use redis::Value;
use serde::{Deserialize, Serialize};

use crate::command::{Command, SUGADD_CMD, SUGDEL_CMD, SUGGET_CMD, SUGLEN_CMD, Transport};
use crate::error::{RediSearchError, Result};
use crate::reply::{as_array, value_to_f64, value_to_i64, value_to_opt_string, value_to_string};

/// An autocomplete entry, sent or returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub string: String,
    /// Defaults to 1.0, and is 1.0 in replies that carry no scores.
    pub score: f64,
    pub payload: Option<String>,
}

impl Suggestion {
    pub fn new<S: Into<String>>(string: S) -> Self {
        Suggestion {
            string: string.into(),
            score: 1.0,
            payload: None,
        }
    }

    pub fn score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn payload<S: Into<String>>(mut self, payload: S) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// Options for [`AutoCompleter::get_suggestions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestOptions {
    /// Match prefixes within a Levenshtein distance of one.
    pub fuzzy: bool,
    /// Maximum number of suggestions.
    pub num: usize,
    pub with_scores: bool,
    pub with_payloads: bool,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        SuggestOptions {
            fuzzy: false,
            num: 10,
            with_scores: false,
            with_payloads: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SuggestionLayout {
    stride: usize,
    score: Option<usize>,
    payload: Option<usize>,
}

// Indexed by `scores << 1 | payloads`.
const SUGGESTION_LAYOUTS: [SuggestionLayout; 4] = [
    SuggestionLayout { stride: 1, score: None, payload: None },
    SuggestionLayout { stride: 2, score: None, payload: Some(1) },
    SuggestionLayout { stride: 2, score: Some(1), payload: None },
    SuggestionLayout { stride: 3, score: Some(1), payload: Some(2) },
];

/// Decode an `FT.SUGGET` reply sent with the given score/payload flags.
pub fn parse_suggestions(
    reply: &Value,
    with_scores: bool,
    with_payloads: bool,
) -> Result<Vec<Suggestion>> {
    if matches!(reply, Value::Nil) {
        return Ok(Vec::new());
    }
    let items = as_array(reply)?;
    let layout = SUGGESTION_LAYOUTS[(usize::from(with_scores) << 1) | usize::from(with_payloads)];
    if items.len() % layout.stride != 0 {
        return Err(RediSearchError::decode(format!(
            "suggestion reply of length {} is not a multiple of {}",
            items.len(),
            layout.stride
        )));
    }

    items
        .chunks_exact(layout.stride)
        .map(|record| {
            let score = match layout.score {
                Some(offset) => value_to_f64(&record[offset])?,
                None => 1.0,
            };
            let payload = match layout.payload {
                Some(offset) => value_to_opt_string(&record[offset])?,
                None => None,
            };
            Ok(Suggestion {
                string: value_to_string(&record[0])?,
                score,
                payload,
            })
        })
        .collect()
}

/// A client for one autocomplete dictionary key.
#[derive(Debug)]
pub struct AutoCompleter<T: Transport> {
    key: String,
    transport: T,
}

impl<T: Transport> AutoCompleter<T> {
    pub fn new<S: Into<String>>(key: S, transport: T) -> Self {
        AutoCompleter {
            key: key.into(),
            transport,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Add suggestions in one pipeline and return the dictionary size
    /// reported for the last one. With `increment`, existing entries have
    /// their scores increased instead of replaced.
    pub fn add_suggestions(&mut self, suggestions: &[Suggestion], increment: bool) -> Result<i64> {
        if suggestions.is_empty() {
            return Err(RediSearchError::invalid_argument("no suggestions to add"));
        }
        let commands: Vec<Command> = suggestions
            .iter()
            .map(|suggestion| {
                let mut command = Command::new(SUGADD_CMD)
                    .arg(self.key.as_str())
                    .arg(suggestion.string.as_str())
                    .arg(suggestion.score.to_string());
                if increment {
                    command = command.arg("INCR");
                }
                if let Some(payload) = &suggestion.payload {
                    command = command.arg("PAYLOAD").arg(payload.as_str());
                }
                command
            })
            .collect();

        debug!("adding {} suggestions to '{}'", commands.len(), self.key);
        let replies = self.transport.execute_pipeline(&commands)?;
        match replies.last() {
            Some(reply) => value_to_i64(reply),
            None => Err(RediSearchError::decode("empty pipeline reply")),
        }
    }

    /// Number of entries in the dictionary.
    pub fn len(&mut self) -> Result<i64> {
        let reply = self
            .transport
            .execute(&Command::new(SUGLEN_CMD).arg(self.key.as_str()))?;
        value_to_i64(&reply)
    }

    /// Remove an entry; returns whether it existed.
    pub fn delete(&mut self, string: &str) -> Result<bool> {
        let reply = self
            .transport
            .execute(&Command::new(SUGDEL_CMD).arg(self.key.as_str()).arg(string))?;
        Ok(value_to_i64(&reply)? == 1)
    }

    /// Suggestions for `prefix`. Scores are 1.0 unless requested.
    pub fn get_suggestions(&mut self, prefix: &str, options: &SuggestOptions) -> Result<Vec<Suggestion>> {
        let mut command = Command::new(SUGGET_CMD)
            .arg(self.key.as_str())
            .arg(prefix)
            .arg("MAX")
            .arg(options.num.to_string());
        if options.fuzzy {
            command = command.arg("FUZZY");
        }
        if options.with_scores {
            command = command.arg("WITHSCORES");
        }
        if options.with_payloads {
            command = command.arg("WITHPAYLOADS");
        }

        let reply = self.transport.execute(&command)?;
        parse_suggestions(&reply, options.with_scores, options.with_payloads)
    }
}
