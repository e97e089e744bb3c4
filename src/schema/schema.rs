//! Index schema and index creation options.

use indexmap::IndexMap;

use crate::error::{RediSearchError, Result};
use crate::schema::field::FieldType;

/// The ordered list of fields an index is created with.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, Box<dyn FieldType>>,
}

impl Schema {
    /// Create a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to the schema.
    ///
    /// Fails on an empty or duplicate name, and on `NOINDEX` fields of a
    /// sortable type that are not marked `SORTABLE`.
    pub fn add_field<S: Into<String>>(
        &mut self,
        name: S,
        field_type: Box<dyn FieldType>,
    ) -> Result<()> {
        let name = name.into();

        if name.is_empty() {
            return Err(RediSearchError::validation("Field name cannot be empty"));
        }
        if self.fields.contains_key(&name) {
            return Err(RediSearchError::validation(format!(
                "Field '{name}' already exists"
            )));
        }
        if !field_type.is_indexed() && field_type.supports_sorting() && !field_type.is_sortable() {
            return Err(RediSearchError::validation(format!(
                "Field '{name}' is neither indexed nor sortable"
            )));
        }

        self.fields.insert(name, field_type);
        Ok(())
    }

    /// Get a field type by name.
    pub fn get_field(&self, name: &str) -> Option<&dyn FieldType> {
        self.fields.get(name).map(|field| field.as_ref())
    }

    /// Check if a field exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get all field names in the order they were added.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of fields usable with `SORTBY`.
    pub fn sortable_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, field)| field.is_sortable())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// `name type-args...` for every field, in order.
    pub fn redis_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (name, field) in &self.fields {
            args.push(name.clone());
            args.extend(field.redis_args());
        }
        args
    }

    /// Create a builder for constructing schemas.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }
}

/// A builder for constructing schemas in a fluent manner.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to the schema being built.
    pub fn add_field<S: Into<String>>(
        mut self,
        name: S,
        field_type: Box<dyn FieldType>,
    ) -> Result<Self> {
        self.schema.add_field(name, field_type)?;
        Ok(self)
    }

    /// Build the final schema; it must have at least one field.
    pub fn build(self) -> Result<Schema> {
        if self.schema.is_empty() {
            return Err(RediSearchError::validation(
                "Schema must have at least one field",
            ));
        }
        Ok(self.schema)
    }
}

/// Rules for indexing existing hashes automatically (`ON HASH ...`).
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    prefixes: Vec<String>,
    filter: Option<String>,
    language_field: Option<String>,
    language: Option<String>,
    score_field: Option<String>,
    score: Option<f64>,
    payload_field: Option<String>,
}

impl Default for IndexDefinition {
    fn default() -> Self {
        IndexDefinition {
            prefixes: Vec::new(),
            filter: None,
            language_field: None,
            language: None,
            score_field: None,
            score: Some(1.0),
            payload_field: None,
        }
    }
}

impl IndexDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only index hashes whose keys start with one of these prefixes.
    pub fn prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Only index hashes for which this expression holds.
    pub fn filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn language_field<S: Into<String>>(mut self, field: S) -> Self {
        self.language_field = Some(field.into());
        self
    }

    pub fn language<S: Into<String>>(mut self, language: S) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn score_field<S: Into<String>>(mut self, field: S) -> Self {
        self.score_field = Some(field.into());
        self
    }

    /// Default document score; `None` omits `SCORE`.
    pub fn score(mut self, score: Option<f64>) -> Self {
        self.score = score;
        self
    }

    pub fn payload_field<S: Into<String>>(mut self, field: S) -> Self {
        self.payload_field = Some(field.into());
        self
    }

    pub fn redis_args(&self) -> Vec<String> {
        let mut args = vec!["ON".to_string(), "HASH".to_string()];
        if !self.prefixes.is_empty() {
            args.push("PREFIX".to_string());
            args.push(self.prefixes.len().to_string());
            args.extend(self.prefixes.iter().cloned());
        }
        let options = [
            ("FILTER", self.filter.clone()),
            ("LANGUAGE_FIELD", self.language_field.clone()),
            ("LANGUAGE", self.language.clone()),
            ("SCORE_FIELD", self.score_field.clone()),
            ("SCORE", self.score.map(|score| score.to_string())),
            ("PAYLOAD_FIELD", self.payload_field.clone()),
        ];
        for (keyword, value) in options {
            if let Some(value) = value {
                args.push(keyword.to_string());
                args.push(value);
            }
        }
        args
    }
}

/// Options for `FT.CREATE` besides the schema itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexOptions {
    definition: Option<IndexDefinition>,
    no_term_offsets: bool,
    no_field_flags: bool,
    stopwords: Option<Vec<String>>,
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn definition(mut self, definition: IndexDefinition) -> Self {
        self.definition = Some(definition);
        self
    }

    /// Do not store term offsets (disables exact phrase search).
    pub fn no_term_offsets(mut self) -> Self {
        self.no_term_offsets = true;
        self
    }

    /// Do not store per-field flags (disables field-restricted search).
    pub fn no_field_flags(mut self) -> Self {
        self.no_field_flags = true;
        self
    }

    /// Use a custom stopword list; an empty list disables stopwords.
    pub fn stopwords<I, S>(mut self, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords = Some(stopwords.into_iter().map(Into::into).collect());
        self
    }

    /// Tokens between the index name and `SCHEMA`.
    pub fn redis_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(definition) = &self.definition {
            args.extend(definition.redis_args());
        }
        if self.no_term_offsets {
            args.push("NOOFFSETS".to_string());
        }
        if self.no_field_flags {
            args.push("NOFIELDS".to_string());
        }
        if let Some(stopwords) = &self.stopwords {
            args.push("STOPWORDS".to_string());
            args.push(stopwords.len().to_string());
            args.extend(stopwords.iter().cloned());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::{GeoField, NumericField, TagField, TextField};

    #[test]
    fn test_schema_keeps_order() {
        let schema = Schema::builder()
            .add_field("title", Box::new(TextField::new().weight(5.0)))
            .unwrap()
            .add_field("price", Box::new(NumericField::new().sortable(true)))
            .unwrap()
            .add_field("location", Box::new(GeoField::new()))
            .unwrap()
            .add_field("tags", Box::new(TagField::new()))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            schema.redis_args(),
            vec![
                "title", "TEXT", "WEIGHT", "5", "price", "NUMERIC", "SORTABLE", "location", "GEO",
                "tags", "TAG", "SEPARATOR", ",",
            ]
        );
        assert_eq!(schema.sortable_fields(), vec!["price"]);
        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["title", "price", "location", "tags"]);
    }

    #[test]
    fn test_schema_rejects_invalid_fields() {
        let mut schema = Schema::new();
        schema.add_field("title", Box::new(TextField::new())).unwrap();

        let err = schema.add_field("title", Box::new(TextField::new())).unwrap_err();
        assert!(matches!(err, RediSearchError::Validation(_)));

        let err = schema
            .add_field("hidden", Box::new(NumericField::new().no_index(true)))
            .unwrap_err();
        assert!(matches!(err, RediSearchError::Validation(_)));

        schema
            .add_field("sort_only", Box::new(NumericField::new().no_index(true).sortable(true)))
            .unwrap();
        assert!(schema.add_field("", Box::new(GeoField::new())).is_err());
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn test_schema_accepts_unindexed_tag() {
        let mut schema = Schema::new();
        schema
            .add_field("labels", Box::new(TagField::new().no_index(true)))
            .unwrap();
        assert!(!schema.get_field("labels").unwrap().is_indexed());
        assert_eq!(
            schema.redis_args(),
            vec!["labels", "TAG", "SEPARATOR", ",", "NOINDEX"]
        );
    }

    #[test]
    fn test_empty_schema_build_fails() {
        assert!(Schema::builder().build().is_err());
    }

    #[test]
    fn test_index_definition_args() {
        assert_eq!(IndexDefinition::new().redis_args(), vec!["ON", "HASH", "SCORE", "1"]);

        let definition = IndexDefinition::new()
            .prefixes(["blog:", "post:"])
            .filter("@views > 10")
            .language_field("lang")
            .language("english")
            .score_field("rank")
            .score(Some(0.5))
            .payload_field("extra");
        assert_eq!(
            definition.redis_args(),
            vec![
                "ON", "HASH", "PREFIX", "2", "blog:", "post:", "FILTER", "@views > 10",
                "LANGUAGE_FIELD", "lang", "LANGUAGE", "english", "SCORE_FIELD", "rank", "SCORE",
                "0.5", "PAYLOAD_FIELD", "extra",
            ]
        );
    }

    #[test]
    fn test_index_options_args() {
        let options = IndexOptions::new()
            .definition(IndexDefinition::new().score(None))
            .no_term_offsets()
            .no_field_flags()
            .stopwords(Vec::<String>::new());
        assert_eq!(
            options.redis_args(),
            vec!["ON", "HASH", "NOOFFSETS", "NOFIELDS", "STOPWORDS", "0"]
        );
    }
}
