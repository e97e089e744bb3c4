//! Search request builder.

use crate::query::SortDirection;
use crate::query::filter::Filter;
use crate::result::ReplyFlags;

/// Options for the `SUMMARIZE` post-processing step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summarize {
    fields: Vec<String>,
    context_len: Option<usize>,
    num_frags: Option<usize>,
    separator: Option<String>,
}

impl Summarize {
    /// Summarize every returned field with server defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only summarize these fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Number of words of context around each match.
    pub fn context_len(mut self, len: usize) -> Self {
        self.context_len = Some(len);
        self
    }

    /// Number of fragments to return.
    pub fn num_frags(mut self, frags: usize) -> Self {
        self.num_frags = Some(frags);
        self
    }

    /// String used to join fragments.
    pub fn separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.separator = Some(separator.into());
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["SUMMARIZE".to_string()];
        push_field_list(&mut args, &self.fields);
        if let Some(frags) = self.num_frags {
            args.push("FRAGS".to_string());
            args.push(frags.to_string());
        }
        if let Some(len) = self.context_len {
            args.push("LEN".to_string());
            args.push(len.to_string());
        }
        if let Some(separator) = &self.separator {
            args.push("SEPARATOR".to_string());
            args.push(separator.clone());
        }
        args
    }
}

/// Options for the `HIGHLIGHT` post-processing step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlight {
    fields: Vec<String>,
    tags: Option<(String, String)>,
}

impl Highlight {
    /// Highlight every returned field with the server's default tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only highlight these fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Opening and closing tags wrapped around each match.
    pub fn tags<O: Into<String>, C: Into<String>>(mut self, open: O, close: C) -> Self {
        self.tags = Some((open.into(), close.into()));
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["HIGHLIGHT".to_string()];
        push_field_list(&mut args, &self.fields);
        if let Some((open, close)) = &self.tags {
            args.push("TAGS".to_string());
            args.push(open.clone());
            args.push(close.clone());
        }
        args
    }
}

fn push_field_list(args: &mut Vec<String>, fields: &[String]) {
    if !fields.is_empty() {
        args.push("FIELDS".to_string());
        args.push(fields.len().to_string());
        args.extend(fields.iter().cloned());
    }
}

fn push_counted(args: &mut Vec<String>, keyword: &str, items: &[String]) {
    args.push(keyword.to_string());
    args.push(items.len().to_string());
    args.extend(items.iter().cloned());
}

/// A search query with paging, filters and reply-shaping options.
///
/// Setters consume and return the query so calls can be chained:
///
/// ```
/// use redisearch::query::Query;
///
/// let query = Query::new("hello world").verbatim().paging(0, 5);
/// assert_eq!(
///     query.get_args(),
///     vec!["hello world", "VERBATIM", "LIMIT", "0", "5"]
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    query_string: String,
    offset: usize,
    num: usize,
    no_content: bool,
    no_stopwords: bool,
    fields: Vec<String>,
    verbatim: bool,
    with_payloads: bool,
    with_scores: bool,
    filters: Vec<Filter>,
    ids: Vec<String>,
    slop: Option<u32>,
    in_order: bool,
    return_fields: Vec<String>,
    sort_by: Option<(String, SortDirection)>,
    summarize: Option<Summarize>,
    highlight: Option<Highlight>,
}

impl Query {
    /// Create a query for the given query string with default paging (0, 10).
    pub fn new<S: Into<String>>(query_string: S) -> Self {
        Query {
            query_string: query_string.into(),
            offset: 0,
            num: 10,
            no_content: false,
            no_stopwords: false,
            fields: Vec::new(),
            verbatim: false,
            with_payloads: false,
            with_scores: false,
            filters: Vec::new(),
            ids: Vec::new(),
            slop: None,
            in_order: false,
            return_fields: Vec::new(),
            sort_by: None,
            summarize: None,
            highlight: None,
        }
    }

    /// The query string only.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Set the result window.
    pub fn paging(mut self, offset: usize, num: usize) -> Self {
        self.offset = offset;
        self.num = num;
        self
    }

    /// Only match terms in these text fields.
    pub fn limit_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Disable stemming and query expansion.
    pub fn verbatim(mut self) -> Self {
        self.verbatim = true;
        self
    }

    /// Return ids only, without document content.
    pub fn no_content(mut self) -> Self {
        self.no_content = true;
        self
    }

    /// Do not filter stopwords out of the query.
    pub fn no_stopwords(mut self) -> Self {
        self.no_stopwords = true;
        self
    }

    /// Return document payloads.
    pub fn with_payloads(mut self) -> Self {
        self.with_payloads = true;
        self
    }

    /// Return the relative internal score of each document.
    pub fn with_scores(mut self) -> Self {
        self.with_scores = true;
        self
    }

    /// Only consider documents with these ids.
    pub fn limit_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Allow at most `slop` intervening terms between phrase terms; 0 means
    /// an exact phrase.
    pub fn slop(mut self, slop: u32) -> Self {
        self.slop = Some(slop);
        self
    }

    /// Require query terms to appear in document order.
    pub fn in_order(mut self) -> Self {
        self.in_order = true;
        self
    }

    /// Only return these stored fields.
    pub fn return_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.return_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Attach summarization options.
    pub fn summarize(mut self, summarize: Summarize) -> Self {
        self.summarize = Some(summarize);
        self
    }

    /// Attach highlighting options.
    pub fn highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = Some(highlight);
        self
    }

    /// Add a numeric or geo filter. The server honors at most one of each
    /// kind per field.
    pub fn add_filter<F: Into<Filter>>(mut self, filter: F) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Sort results by a sortable field.
    pub fn sort_by<S: Into<String>>(mut self, field: S, direction: SortDirection) -> Self {
        self.sort_by = Some((field.into(), direction));
        self
    }

    /// Which optional channels the reply will carry.
    pub fn reply_flags(&self) -> ReplyFlags {
        ReplyFlags {
            content: !self.no_content,
            payloads: self.with_payloads,
            scores: self.with_scores,
        }
    }

    /// Serialize to the argument list following the index name.
    pub fn get_args(&self) -> Vec<String> {
        let mut args = vec![self.query_string.clone()];

        if self.no_content {
            args.push("NOCONTENT".to_string());
        }
        if !self.fields.is_empty() {
            push_counted(&mut args, "INFIELDS", &self.fields);
        }
        if self.verbatim {
            args.push("VERBATIM".to_string());
        }
        if self.no_stopwords {
            args.push("NOSTOPWORDS".to_string());
        }
        for filter in &self.filters {
            args.extend(filter.args());
        }
        if self.with_scores {
            args.push("WITHSCORES".to_string());
        }
        if self.with_payloads {
            args.push("WITHPAYLOADS".to_string());
        }
        if !self.ids.is_empty() {
            push_counted(&mut args, "INKEYS", &self.ids);
        }
        if let Some(slop) = self.slop {
            args.push("SLOP".to_string());
            args.push(slop.to_string());
        }
        if self.in_order {
            args.push("INORDER".to_string());
        }
        if !self.return_fields.is_empty() {
            push_counted(&mut args, "RETURN", &self.return_fields);
        }
        if let Some((field, direction)) = &self.sort_by {
            args.push("SORTBY".to_string());
            args.push(field.clone());
            args.push(direction.as_str().to_string());
        }
        if let Some(summarize) = &self.summarize {
            args.extend(summarize.args());
        }
        if let Some(highlight) = &self.highlight {
            args.extend(highlight.args());
        }

        args.push("LIMIT".to_string());
        args.push(self.offset.to_string());
        args.push(self.num.to_string());
        args
    }
}

impl From<&str> for Query {
    fn from(query_string: &str) -> Self {
        Query::new(query_string)
    }
}

impl From<String> for Query {
    fn from(query_string: String) -> Self {
        Query::new(query_string)
    }
}
