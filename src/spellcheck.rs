//! Spelling correction through `FT.SPELLCHECK`.

use indexmap::IndexMap;
use redis::Value;
use serde::{Deserialize, Serialize};

use crate::error::{RediSearchError, Result};
use crate::reply::{as_array, value_to_f64, value_to_string};

/// Options for a spellcheck request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellcheckOptions {
    /// Maximum Levenshtein distance for suggestions (server default 1, max 4).
    pub distance: Option<u32>,
    /// Custom dictionary whose terms are also suggested.
    pub include: Option<String>,
    /// Custom dictionary whose terms are never reported as misspelled.
    pub exclude: Option<String>,
}

impl SpellcheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance(mut self, distance: u32) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn include<S: Into<String>>(mut self, dictionary: S) -> Self {
        self.include = Some(dictionary.into());
        self
    }

    pub fn exclude<S: Into<String>>(mut self, dictionary: S) -> Self {
        self.exclude = Some(dictionary.into());
        self
    }

    /// Tokens following the query string.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(distance) = self.distance {
            args.push("DISTANCE".to_string());
            args.push(distance.to_string());
        }
        if let Some(include) = &self.include {
            args.extend(["TERMS".to_string(), "INCLUDE".to_string(), include.clone()]);
        }
        if let Some(exclude) = &self.exclude {
            args.extend(["TERMS".to_string(), "EXCLUDE".to_string(), exclude.clone()]);
        }
        args
    }
}

/// One suggested correction for a misspelled term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellcheckSuggestion {
    pub score: f64,
    pub suggestion: String,
}

/// Corrections keyed by the misspelled term, in reply order.
pub type Corrections = IndexMap<String, Vec<SpellcheckSuggestion>>;

/// Decode an `FT.SPELLCHECK` reply.
///
/// Each entry is `["TERM", term, [[score, suggestion], ...]]`. Entries of
/// any other shape, or with no suggestions, are skipped; a bare `0` reply
/// means nothing was misspelled.
pub fn parse_spellcheck_reply(reply: &Value) -> Result<Corrections> {
    let mut corrections = Corrections::new();
    let entries = match reply {
        Value::Int(0) | Value::Nil => return Ok(corrections),
        other => as_array(other)?,
    };

    for entry in entries {
        let parts = match entry {
            Value::Array(parts) if parts.len() == 3 => parts,
            _ => continue,
        };
        let items = match &parts[2] {
            Value::Array(items) if !items.is_empty() => items,
            _ => continue,
        };
        if matches!(&items[0], Value::Array(first) if first.is_empty()) {
            continue;
        }

        let term = value_to_string(&parts[1])?;
        let suggestions = items
            .iter()
            .map(|item| {
                let pair = as_array(item)?;
                if pair.len() != 2 {
                    return Err(RediSearchError::decode(format!(
                        "spellcheck suggestion for '{term}' has {} elements",
                        pair.len()
                    )));
                }
                Ok(SpellcheckSuggestion {
                    score: value_to_f64(&pair[0])?,
                    suggestion: value_to_string(&pair[1])?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        corrections.insert(term, suggestions);
    }

    Ok(corrections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulk(s: &str) -> Value {
        Value::BulkString(s.as_bytes().to_vec())
    }

    fn entry(term: &str, suggestions: &[(&str, &str)]) -> Value {
        Value::Array(vec![
            bulk("TERM"),
            bulk(term),
            Value::Array(
                suggestions
                    .iter()
                    .map(|(score, s)| Value::Array(vec![bulk(score), bulk(s)]))
                    .collect(),
            ),
        ])
    }

    #[test]
    fn test_options_args() {
        let options = SpellcheckOptions::new().distance(2).include("dict").exclude("stop");
        assert_eq!(
            options.build_args(),
            vec!["DISTANCE", "2", "TERMS", "INCLUDE", "dict", "TERMS", "EXCLUDE", "stop"]
        );
        assert!(SpellcheckOptions::new().build_args().is_empty());
    }

    #[test]
    fn test_parse_corrections() {
        let reply = Value::Array(vec![
            entry("impornant", &[("0.5", "important"), ("0.1", "importance")]),
            entry("lanaguage", &[]),
            Value::Int(0),
            Value::Array(vec![bulk("TERM")]),
        ]);
        let corrections = parse_spellcheck_reply(&reply).unwrap();
        assert_eq!(corrections.len(), 1);
        let suggestions = &corrections["impornant"];
        assert_eq!(suggestions[0].suggestion, "important");
        assert_eq!(suggestions[0].score, 0.5);
        assert_eq!(suggestions[1].suggestion, "importance");
    }

    #[test]
    fn test_zero_reply() {
        assert!(parse_spellcheck_reply(&Value::Int(0)).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_suggestion() {
        let reply = Value::Array(vec![Value::Array(vec![
            bulk("TERM"),
            bulk("x"),
            Value::Array(vec![Value::Array(vec![bulk("0.1")])]),
        ])]);
        assert!(matches!(parse_spellcheck_reply(&reply), Err(RediSearchError::Decode(_))));
    }
}
