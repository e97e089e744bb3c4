//! Documents sent to the index.
//!
//! [`AddDocument`] describes one `FT.ADD` call and [`AddDocumentHash`] one
//! `FT.ADDHASH` call. Both are plain builders; the client and the batch
//! indexer turn them into commands.
//!
//! # Examples
//!
//! ```
//! use redisearch::document::AddDocument;
//!
//! let doc = AddDocument::new("doc1")
//!     .add_text("title", "Rust Programming Guide")
//!     .add_integer("year", 2024)
//!     .add_geo("location", -0.441, 51.458)
//!     .replace();
//!
//! assert_eq!(
//!     doc.build_args(),
//!     vec![
//!         "doc1", "1", "REPLACE", "FIELDS", "title", "Rust Programming Guide", "year", "2024",
//!         "location", "-0.441,51.458",
//!     ]
//! );
//! ```

use serde::{Deserialize, Serialize};

/// A document to add with `FT.ADD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddDocument {
    id: String,
    fields: Vec<(String, String)>,
    score: f64,
    no_save: bool,
    payload: Option<String>,
    replace: bool,
    partial: bool,
    no_create: bool,
    language: Option<String>,
}

impl AddDocument {
    /// Create a document with score 1.0 and no fields.
    pub fn new<S: Into<String>>(id: S) -> Self {
        AddDocument {
            id: id.into(),
            fields: Vec::new(),
            score: 1.0,
            no_save: false,
            payload: None,
            replace: false,
            partial: false,
            no_create: false,
            language: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fields in the order they were added.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Add a field value as-is.
    pub fn add_field<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn add_text<N: Into<String>, V: Into<String>>(self, name: N, value: V) -> Self {
        self.add_field(name, value)
    }

    pub fn add_integer<N: Into<String>>(self, name: N, value: i64) -> Self {
        self.add_field(name, value.to_string())
    }

    pub fn add_float<N: Into<String>>(self, name: N, value: f64) -> Self {
        self.add_field(name, value.to_string())
    }

    /// Add a geo point, encoded as `"lon,lat"`.
    pub fn add_geo<N: Into<String>>(self, name: N, lon: f64, lat: f64) -> Self {
        self.add_field(name, format!("{lon},{lat}"))
    }

    /// Document ranking between 0.0 and 1.0.
    pub fn score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Index the document without storing its content.
    pub fn no_save(mut self) -> Self {
        self.no_save = true;
        self
    }

    pub fn payload<S: Into<String>>(mut self, payload: S) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Update and reindex the document if it already exists.
    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }

    /// Only update the given fields. Implies [`replace`](Self::replace).
    pub fn partial(mut self) -> Self {
        self.partial = true;
        self
    }

    /// Fail instead of creating the document. Implies
    /// [`replace`](Self::replace).
    pub fn no_create(mut self) -> Self {
        self.no_create = true;
        self
    }

    /// Language used for stemming.
    pub fn language<S: Into<String>>(mut self, language: S) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Arguments following the index name.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![self.id.clone(), self.score.to_string()];
        if self.no_save {
            args.push("NOSAVE".to_string());
        }
        if let Some(payload) = &self.payload {
            args.push("PAYLOAD".to_string());
            args.push(payload.clone());
        }
        if self.replace || self.partial || self.no_create {
            args.push("REPLACE".to_string());
            if self.partial {
                args.push("PARTIAL".to_string());
            }
            if self.no_create {
                args.push("NOCREATE".to_string());
            }
        }
        if let Some(language) = &self.language {
            args.push("LANGUAGE".to_string());
            args.push(language.clone());
        }
        args.push("FIELDS".to_string());
        for (name, value) in &self.fields {
            args.push(name.clone());
            args.push(value.clone());
        }
        args
    }
}

/// An existing hash to index with `FT.ADDHASH`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddDocumentHash {
    id: String,
    score: f64,
    replace: bool,
    language: Option<String>,
}

impl AddDocumentHash {
    /// `id` must name an existing hash key.
    pub fn new<S: Into<String>>(id: S) -> Self {
        AddDocumentHash {
            id: id.into(),
            score: 1.0,
            replace: false,
            language: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }

    pub fn language<S: Into<String>>(mut self, language: S) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![self.id.clone(), self.score.to_string()];
        if self.replace {
            args.push("REPLACE".to_string());
        }
        if let Some(language) = &self.language {
            args.push("LANGUAGE".to_string());
            args.push(language.clone());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_add() {
        let doc = AddDocument::new("doc1").add_text("title", "hello");
        assert_eq!(doc.build_args(), vec!["doc1", "1", "FIELDS", "title", "hello"]);
    }

    #[test]
    fn test_all_options() {
        let doc = AddDocument::new("doc2")
            .score(0.5)
            .no_save()
            .payload("extra")
            .partial()
            .no_create()
            .language("german")
            .add_float("price", 9.5);
        assert_eq!(
            doc.build_args(),
            vec![
                "doc2", "0.5", "NOSAVE", "PAYLOAD", "extra", "REPLACE", "PARTIAL", "NOCREATE",
                "LANGUAGE", "german", "FIELDS", "price", "9.5",
            ]
        );
    }

    #[test]
    fn test_partial_implies_replace() {
        let args = AddDocument::new("d").partial().build_args();
        assert_eq!(args, vec!["d", "1", "REPLACE", "PARTIAL", "FIELDS"]);
    }

    #[test]
    fn test_fields_keep_insertion_order() {
        let doc = AddDocument::new("d")
            .add_text("b", "2")
            .add_text("a", "1");
        let names: Vec<&str> = doc.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_add_hash() {
        assert_eq!(AddDocumentHash::new("h1").build_args(), vec!["h1", "1"]);
        assert_eq!(
            AddDocumentHash::new("h1").score(0.2).replace().language("english").build_args(),
            vec!["h1", "0.2", "REPLACE", "LANGUAGE", "english"]
        );
    }
}
