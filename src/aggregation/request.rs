//! Aggregation request builder.

use std::time::Duration;

use crate::aggregation::SortKey;
use crate::aggregation::reducers::Reducer;
use crate::error::{RediSearchError, Result};

/// An `offset, count` window. A zero count sends nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limit {
    pub offset: usize,
    pub count: usize,
}

impl Limit {
    pub fn new(offset: usize, count: usize) -> Self {
        Limit { offset, count }
    }

    pub fn build_args(&self) -> Vec<String> {
        if self.count > 0 {
            vec![
                "LIMIT".to_string(),
                self.offset.to_string(),
                self.count.to_string(),
            ]
        } else {
            Vec::new()
        }
    }
}

/// A `GROUPBY` stage: grouping fields plus the reducers run on each group.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    fields: Vec<String>,
    reducers: Vec<Reducer>,
    limit: Limit,
}

impl Group {
    /// Create a group; both `fields` and `reducers` must be non-empty.
    pub fn new<I, S, R>(fields: I, reducers: R) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = Reducer>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let reducers: Vec<Reducer> = reducers.into_iter().collect();
        if fields.is_empty() {
            return Err(RediSearchError::validation("group requires at least one field"));
        }
        if reducers.is_empty() {
            return Err(RediSearchError::validation(
                "group requires at least one reducer",
            ));
        }
        Ok(Group {
            fields,
            reducers,
            limit: Limit::default(),
        })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn reducers(&self) -> &[Reducer] {
        &self.reducers
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["GROUPBY".to_string(), self.fields.len().to_string()];
        args.extend(self.fields.iter().cloned());
        for reducer in &self.reducers {
            args.extend(reducer.build_args());
        }
        args.extend(self.limit.build_args());
        args
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Stage {
    Group(Group),
    Apply { expression: String, alias: String },
    Filter(String),
    SortBy { keys: Vec<SortKey>, max: Option<usize> },
}

impl Stage {
    fn build_args(&self) -> Vec<String> {
        match self {
            Stage::Group(group) => group.build_args(),
            Stage::Apply { expression, alias } => vec![
                "APPLY".to_string(),
                expression.clone(),
                "AS".to_string(),
                alias.clone(),
            ],
            Stage::Filter(expression) => vec!["FILTER".to_string(), expression.clone()],
            Stage::SortBy { keys, max } => {
                let tokens: Vec<String> = keys.iter().flat_map(SortKey::args).collect();
                let mut args = vec!["SORTBY".to_string(), tokens.len().to_string()];
                args.extend(tokens);
                if let Some(max) = max {
                    args.push("MAX".to_string());
                    args.push(max.to_string());
                }
                args
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Load {
    Nothing,
    Fields(Vec<String>),
    All,
}

/// Cursor settings requested with `WITHCURSOR`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorOptions {
    pub count: Option<usize>,
    pub max_idle: Option<Duration>,
}

impl CursorOptions {
    fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(count) = self.count {
            args.push("COUNT".to_string());
            args.push(count.to_string());
        }
        if let Some(max_idle) = self.max_idle {
            args.push("MAXIDLE".to_string());
            args.push(max_idle.as_millis().to_string());
        }
        args
    }
}

/// An `FT.AGGREGATE` request.
///
/// Stages are serialized in the order they were added; the final `LIMIT`
/// always comes last.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRequest {
    query: String,
    load: Load,
    stages: Vec<Stage>,
    limit: Limit,
    with_schema: bool,
    verbatim: bool,
    cursor: Option<CursorOptions>,
}

impl Default for AggregateRequest {
    fn default() -> Self {
        AggregateRequest::new("*")
    }
}

impl AggregateRequest {
    /// Aggregate over the documents matching `query`; use `"*"` for all.
    pub fn new<S: Into<String>>(query: S) -> Self {
        AggregateRequest {
            query: query.into(),
            load: Load::Nothing,
            stages: Vec::new(),
            limit: Limit::default(),
            with_schema: false,
            verbatim: false,
            cursor: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Load these document fields into the pipeline.
    pub fn load<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.load = Load::Fields(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Load every document field.
    pub fn load_all(mut self) -> Self {
        self.load = Load::All;
        self
    }

    /// Append a group stage.
    pub fn group_by<I, S, R>(self, fields: I, reducers: R) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = Reducer>,
    {
        Ok(self.group(Group::new(fields, reducers)?))
    }

    /// Append an already-built group stage.
    pub fn group(mut self, group: Group) -> Self {
        self.stages.push(Stage::Group(group));
        self
    }

    /// Append one `APPLY expression AS alias` stage per pair.
    pub fn apply<I, A, E>(mut self, projections: I) -> Self
    where
        I: IntoIterator<Item = (A, E)>,
        A: Into<String>,
        E: Into<String>,
    {
        for (alias, expression) in projections {
            self.stages.push(Stage::Apply {
                expression: expression.into(),
                alias: alias.into(),
            });
        }
        self
    }

    /// Append one `FILTER` stage per expression.
    pub fn filter<I, S>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for expression in expressions {
            self.stages.push(Stage::Filter(expression.into()));
        }
        self
    }

    /// Append a sort stage.
    pub fn sort_by<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<SortKey>,
    {
        self.stages.push(Stage::SortBy {
            keys: keys.into_iter().map(Into::into).collect(),
            max: None,
        });
        self
    }

    /// Append a sort stage keeping only the top `max` rows.
    pub fn sort_by_max<I, K>(mut self, keys: I, max: usize) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<SortKey>,
    {
        self.stages.push(Stage::SortBy {
            keys: keys.into_iter().map(Into::into).collect(),
            max: Some(max),
        });
        self
    }

    /// Limit the most recently added group, or the whole result when there
    /// are no groups yet.
    pub fn limit(mut self, offset: usize, count: usize) -> Self {
        let limit = Limit::new(offset, count);
        let last_group = self.stages.iter_mut().rev().find_map(|stage| match stage {
            Stage::Group(group) => Some(group),
            _ => None,
        });
        match last_group {
            Some(group) => group.limit = limit,
            None => self.limit = limit,
        }
        self
    }

    /// Prefix the reply with the result schema.
    pub fn with_schema(mut self) -> Self {
        self.with_schema = true;
        self
    }

    /// Disable stemming of the query string.
    pub fn verbatim(mut self) -> Self {
        self.verbatim = true;
        self
    }

    /// Return results through a cursor, `count` rows per read.
    pub fn cursor(mut self, count: Option<usize>, max_idle: Option<Duration>) -> Self {
        self.cursor = Some(CursorOptions { count, max_idle });
        self
    }

    pub fn has_schema(&self) -> bool {
        self.with_schema
    }

    pub fn cursor_options(&self) -> Option<CursorOptions> {
        self.cursor
    }

    /// Serialize to the argument list following the index name.
    ///
    /// Fails when no group stage was added.
    pub fn build_args(&self) -> Result<Vec<String>> {
        if !self.stages.iter().any(|stage| matches!(stage, Stage::Group(_))) {
            return Err(RediSearchError::validation(
                "aggregate request requires at least one group",
            ));
        }

        let mut args = vec![self.query.clone()];
        if self.with_schema {
            args.push("WITHSCHEMA".to_string());
        }
        if self.verbatim {
            args.push("VERBATIM".to_string());
        }
        if let Some(cursor) = &self.cursor {
            args.push("WITHCURSOR".to_string());
            args.extend(cursor.build_args());
        }
        match &self.load {
            Load::Nothing => {}
            Load::All => {
                args.push("LOAD".to_string());
                args.push("*".to_string());
            }
            Load::Fields(fields) => {
                args.push("LOAD".to_string());
                args.push(fields.len().to_string());
                args.extend(fields.iter().cloned());
            }
        }
        for stage in &self.stages {
            args.extend(stage.build_args());
        }
        args.extend(self.limit.build_args());
        Ok(args)
    }
}
