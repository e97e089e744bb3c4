//! Field types for index schema definition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RediSearchError;

/// Trait for field types that can appear in an index schema.
pub trait FieldType: Send + Sync + fmt::Debug {
    /// The schema keyword for this type, e.g. `TEXT`.
    fn type_name(&self) -> &'static str;

    /// Check if this field is indexed (searchable).
    fn is_indexed(&self) -> bool {
        true
    }

    /// Check if this field can be used for sorting.
    fn is_sortable(&self) -> bool {
        false
    }

    /// Whether this field type accepts `SORTABLE` at all. Types that don't
    /// may be declared `NOINDEX` on their own.
    fn supports_sorting(&self) -> bool {
        true
    }

    /// Schema tokens following the field name.
    fn redis_args(&self) -> Vec<String>;

    /// Clone this field type.
    fn clone_box(&self) -> Box<dyn FieldType>;
}

impl Clone for Box<dyn FieldType> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

fn push_flags(args: &mut Vec<String>, sortable: bool, no_index: bool) {
    if sortable {
        args.push("SORTABLE".to_string());
    }
    if no_index {
        args.push("NOINDEX".to_string());
    }
}

/// Phonetic matchers supported by text fields (double metaphone).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhoneticMatcher {
    #[serde(rename = "dm:en")]
    English,
    #[serde(rename = "dm:fr")]
    French,
    #[serde(rename = "dm:pt")]
    Portuguese,
    #[serde(rename = "dm:es")]
    Spanish,
}

impl PhoneticMatcher {
    pub const fn as_str(self) -> &'static str {
        match self {
            PhoneticMatcher::English => "dm:en",
            PhoneticMatcher::French => "dm:fr",
            PhoneticMatcher::Portuguese => "dm:pt",
            PhoneticMatcher::Spanish => "dm:es",
        }
    }
}

impl FromStr for PhoneticMatcher {
    type Err = RediSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dm:en" => Ok(PhoneticMatcher::English),
            "dm:fr" => Ok(PhoneticMatcher::French),
            "dm:pt" => Ok(PhoneticMatcher::Portuguese),
            "dm:es" => Ok(PhoneticMatcher::Spanish),
            other => Err(RediSearchError::invalid_argument(format!(
                "unknown phonetic matcher '{other}'"
            ))),
        }
    }
}

/// A full-text field.
#[derive(Debug, Clone, PartialEq)]
pub struct TextField {
    weight: f64,
    sortable: bool,
    no_stem: bool,
    no_index: bool,
    phonetic: Option<PhoneticMatcher>,
}

impl TextField {
    /// Create a new text field with weight 1.0.
    pub fn new() -> Self {
        TextField {
            weight: 1.0,
            sortable: false,
            no_stem: false,
            no_index: false,
            phonetic: None,
        }
    }

    /// Set the importance of this field when scoring.
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Disable stemming when indexing this field.
    pub fn no_stem(mut self, no_stem: bool) -> Self {
        self.no_stem = no_stem;
        self
    }

    /// Store the field for sorting without indexing it.
    pub fn no_index(mut self, no_index: bool) -> Self {
        self.no_index = no_index;
        self
    }

    pub fn phonetic(mut self, matcher: PhoneticMatcher) -> Self {
        self.phonetic = Some(matcher);
        self
    }
}

impl Default for TextField {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldType for TextField {
    fn type_name(&self) -> &'static str {
        "TEXT"
    }

    fn is_indexed(&self) -> bool {
        !self.no_index
    }

    fn is_sortable(&self) -> bool {
        self.sortable
    }

    fn redis_args(&self) -> Vec<String> {
        let mut args = vec![
            self.type_name().to_string(),
            "WEIGHT".to_string(),
            self.weight.to_string(),
        ];
        if self.no_stem {
            args.push("NOSTEM".to_string());
        }
        push_flags(&mut args, self.sortable, self.no_index);
        if let Some(matcher) = self.phonetic {
            args.push("PHONETIC".to_string());
            args.push(matcher.as_str().to_string());
        }
        args
    }

    fn clone_box(&self) -> Box<dyn FieldType> {
        Box::new(self.clone())
    }
}

/// A numeric field supporting range filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericField {
    sortable: bool,
    no_index: bool,
}

impl NumericField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn no_index(mut self, no_index: bool) -> Self {
        self.no_index = no_index;
        self
    }
}

impl FieldType for NumericField {
    fn type_name(&self) -> &'static str {
        "NUMERIC"
    }

    fn is_indexed(&self) -> bool {
        !self.no_index
    }

    fn is_sortable(&self) -> bool {
        self.sortable
    }

    fn redis_args(&self) -> Vec<String> {
        let mut args = vec![self.type_name().to_string()];
        push_flags(&mut args, self.sortable, self.no_index);
        args
    }

    fn clone_box(&self) -> Box<dyn FieldType> {
        Box::new(self.clone())
    }
}

/// A geo field holding `"lon,lat"` points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoField;

impl GeoField {
    pub fn new() -> Self {
        GeoField
    }
}

impl FieldType for GeoField {
    fn type_name(&self) -> &'static str {
        "GEO"
    }

    fn supports_sorting(&self) -> bool {
        false
    }

    fn redis_args(&self) -> Vec<String> {
        vec![self.type_name().to_string()]
    }

    fn clone_box(&self) -> Box<dyn FieldType> {
        Box::new(self.clone())
    }
}

/// A tag field: exact-match values split on a separator character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagField {
    separator: String,
    no_index: bool,
}

impl TagField {
    /// Create a tag field with the default `,` separator.
    pub fn new() -> Self {
        TagField {
            separator: ",".to_string(),
            no_index: false,
        }
    }

    pub fn separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn no_index(mut self, no_index: bool) -> Self {
        self.no_index = no_index;
        self
    }
}

impl Default for TagField {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldType for TagField {
    fn type_name(&self) -> &'static str {
        "TAG"
    }

    fn is_indexed(&self) -> bool {
        !self.no_index
    }

    fn supports_sorting(&self) -> bool {
        false
    }

    fn redis_args(&self) -> Vec<String> {
        let mut args = vec![
            self.type_name().to_string(),
            "SEPARATOR".to_string(),
            self.separator.clone(),
        ];
        if self.no_index {
            args.push("NOINDEX".to_string());
        }
        args
    }

    fn clone_box(&self) -> Box<dyn FieldType> {
        Box::new(self.clone())
    }
}
