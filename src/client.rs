//! The client facade.
//!
//! A [`Client`] owns one [`Transport`] and one index name. Every operation
//! builds a single [`Command`], sends it, and either returns the raw reply
//! (administrative commands) or decodes it with the matching parser.
//!
//! ```no_run
//! use redisearch::client::Client;
//! use redisearch::config::ClientConfig;
//! use redisearch::query::Query;
//!
//! let mut client = Client::connect(&ClientConfig::new("products"))?;
//! let result = client.search(Query::new("wireless headphones").paging(0, 5))?;
//! for doc in &result.docs {
//!     println!("{} {:?}", doc.id, doc.get("title"));
//! }
//! # Ok::<(), redisearch::error::RediSearchError>(())
//! ```

pub mod batch;

use std::time::Instant;

use indexmap::IndexMap;
use log::{debug, trace};
use redis::Value;

use crate::aggregation::{AggregateRequest, AggregateResult, Cursor, parse_aggregate_reply};
use crate::command::{
    ADD_CMD, ADDHASH_CMD, AGGREGATE_CMD, ALIAS_ADD_CMD, ALIAS_DEL_CMD, ALIAS_UPDATE_CMD, ALTER_CMD,
    CONFIG_CMD, CREATE_CMD, CURSOR_CMD, Command, DEL_CMD, DICT_ADD_CMD, DICT_DEL_CMD, DICT_DUMP_CMD,
    DROP_CMD, EXPLAIN_CMD, GET_CMD, HGETALL_CMD, INFO_CMD, MGET_CMD, SEARCH_CMD, SPELLCHECK_CMD,
    TAGVALS_CMD, Transport,
};
use crate::config::ClientConfig;
use crate::document::{AddDocument, AddDocumentHash};
use crate::error::{RediSearchError, Result};
use crate::query::Query;
use crate::reply::{as_array, pairs_to_map, value_to_i64, value_to_opt_string, value_to_string, value_to_string_list};
use crate::result::{Document, SearchResult, parse_search_reply};
use crate::schema::{IndexOptions, Schema};
use crate::spellcheck::{Corrections, SpellcheckOptions, parse_spellcheck_reply};

pub use batch::BatchIndexer;

/// A client bound to one search index.
#[derive(Debug)]
pub struct Client<T: Transport> {
    index_name: String,
    transport: T,
    batch_chunk_size: usize,
}

impl Client<redis::Connection> {
    /// Open a connection to the server named in `config`.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        debug!("connecting to {} for index '{}'", config.redis_url, config.index_name);
        let connection = redis::Client::open(config.redis_url.as_str())?.get_connection()?;
        Ok(Client::new(config.index_name.clone(), connection).with_batch_chunk_size(config.batch_chunk_size))
    }
}

impl<T: Transport> Client<T> {
    /// Wrap an existing transport.
    pub fn new<S: Into<String>>(index_name: S, transport: T) -> Self {
        Client {
            index_name: index_name.into(),
            transport,
            batch_chunk_size: 100,
        }
    }

    /// Default chunk size for [`batch_indexer`](Self::batch_indexer).
    pub fn with_batch_chunk_size(mut self, size: usize) -> Self {
        self.batch_chunk_size = size.max(1);
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Borrow the transport, e.g. to share it with an
    /// [`AutoCompleter`](crate::suggestion::AutoCompleter).
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    fn index_command(&self, name: &str) -> Command {
        Command::new(name).arg(self.index_name.as_str())
    }

    fn execute(&mut self, command: Command) -> Result<Value> {
        debug!("{} on '{}'", command.name(), self.index_name);
        trace!("sending: {command}");
        let reply = self.transport.execute(&command)?;
        trace!("reply: {reply:?}");
        Ok(reply)
    }

    /// Create the index. It must not already exist.
    pub fn create_index(&mut self, schema: &Schema, options: &IndexOptions) -> Result<Value> {
        let command = self
            .index_command(CREATE_CMD)
            .args(options.redis_args())
            .arg("SCHEMA")
            .args(schema.redis_args());
        self.execute(command)
    }

    /// Add the fields of `fields` to an existing index.
    pub fn alter_schema_add(&mut self, fields: &Schema) -> Result<Value> {
        let command = self
            .index_command(ALTER_CMD)
            .args(["SCHEMA", "ADD"])
            .args(fields.redis_args());
        self.execute(command)
    }

    pub fn drop_index(&mut self) -> Result<Value> {
        let command = self.index_command(DROP_CMD);
        self.execute(command)
    }

    pub(crate) fn add_document_command(&self, doc: &AddDocument) -> Command {
        self.index_command(ADD_CMD).args(doc.build_args())
    }

    pub(crate) fn add_document_hash_command(&self, doc: &AddDocumentHash) -> Command {
        self.index_command(ADDHASH_CMD).args(doc.build_args())
    }

    pub fn add_document(&mut self, doc: &AddDocument) -> Result<Value> {
        let command = self.add_document_command(doc);
        self.execute(command)
    }

    /// Index an existing hash.
    pub fn add_document_hash(&mut self, doc: &AddDocumentHash) -> Result<Value> {
        let command = self.add_document_hash_command(doc);
        self.execute(command)
    }

    /// Remove a document from the index; with `delete_actual_document` the
    /// stored hash is deleted too. Returns whether the document existed.
    pub fn delete_document(&mut self, id: &str, delete_actual_document: bool) -> Result<bool> {
        let mut command = self.index_command(DEL_CMD).arg(id);
        if delete_actual_document {
            command = command.arg("DD");
        }
        Ok(value_to_i64(&self.execute(command)?)? == 1)
    }

    /// Stored fields of one document, or `None` if it does not exist.
    pub fn get(&mut self, id: &str) -> Result<Option<IndexMap<String, String>>> {
        let command = self.index_command(GET_CMD).arg(id);
        match self.execute(command)? {
            Value::Nil => Ok(None),
            reply => pairs_to_map(&reply).map(Some),
        }
    }

    /// Stored fields of several documents, in the order of `ids`.
    pub fn mget<I, S>(&mut self, ids: I) -> Result<Vec<Option<IndexMap<String, String>>>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let command = self.index_command(MGET_CMD).args(ids);
        let reply = self.execute(command)?;
        as_array(&reply)?
            .iter()
            .map(|item| match item {
                Value::Nil => Ok(None),
                fields => pairs_to_map(fields).map(Some),
            })
            .collect()
    }

    /// Read a document straight from its hash.
    pub fn load_document(&mut self, id: &str) -> Result<Document> {
        let reply = self.execute(Command::new(HGETALL_CMD).arg(id))?;
        Ok(Document::with_fields(id, pairs_to_map(&reply)?))
    }

    /// Index statistics and definition, in reply order.
    pub fn info(&mut self) -> Result<IndexMap<String, Value>> {
        let command = self.index_command(INFO_CMD);
        let reply = self.execute(command)?;
        let items = as_array(&reply)?;
        if items.len() % 2 != 0 {
            return Err(RediSearchError::decode(format!(
                "info reply has odd length {}",
                items.len()
            )));
        }
        items
            .chunks_exact(2)
            .map(|pair| Ok((value_to_string(&pair[0])?, pair[1].clone())))
            .collect()
    }

    /// The execution plan for a query string.
    pub fn explain<Q: Into<Query>>(&mut self, query: Q) -> Result<String> {
        let query = query.into();
        let command = self.index_command(EXPLAIN_CMD).arg(query.query_string());
        value_to_string(&self.execute(command)?)
    }

    /// Run a search and decode the reply with the query's flags.
    pub fn search<Q: Into<Query>>(&mut self, query: Q) -> Result<SearchResult> {
        let query = query.into();
        let command = self.index_command(SEARCH_CMD).args(query.get_args());

        let start = Instant::now();
        let reply = self.execute(command)?;
        let duration = start.elapsed();

        let result = parse_search_reply(&reply, query.reply_flags(), duration)?;
        debug!(
            "search matched {} documents in {:?}",
            result.total, result.duration
        );
        Ok(result)
    }

    /// Run an aggregation. When the request asked for a cursor, the result
    /// carries it for [`cursor_read`](Self::cursor_read).
    pub fn aggregate(&mut self, request: &AggregateRequest) -> Result<AggregateResult> {
        let command = self.index_command(AGGREGATE_CMD).args(request.build_args()?);
        let template = request.cursor_options().map(|options| Cursor {
            cid: 0,
            count: options.count,
            max_idle: options.max_idle,
        });
        let reply = self.execute(command)?;
        parse_aggregate_reply(&reply, request.has_schema(), template)
    }

    /// Read the next batch from a cursor and update its id in place.
    ///
    /// Fails without a round trip once the cursor is exhausted.
    pub fn cursor_read(&mut self, cursor: &mut Cursor) -> Result<AggregateResult> {
        if cursor.is_exhausted() {
            return Err(RediSearchError::validation("cursor is exhausted"));
        }
        let command = Command::new(CURSOR_CMD)
            .arg("READ")
            .arg(self.index_name.as_str())
            .args(cursor.build_args());
        let reply = self.execute(command)?;
        let result = parse_aggregate_reply(&reply, false, Some(*cursor))?;
        if let Some(next) = result.cursor {
            cursor.cid = next.cid;
        }
        Ok(result)
    }

    /// Release a cursor before it is exhausted.
    pub fn cursor_delete(&mut self, cursor: &Cursor) -> Result<Value> {
        let command = Command::new(CURSOR_CMD)
            .arg("DEL")
            .arg(self.index_name.as_str())
            .arg(cursor.cid.to_string());
        self.execute(command)
    }

    pub fn spellcheck(&mut self, query: &str, options: &SpellcheckOptions) -> Result<Corrections> {
        let command = self
            .index_command(SPELLCHECK_CMD)
            .arg(query)
            .args(options.build_args());
        parse_spellcheck_reply(&self.execute(command)?)
    }

    /// Add terms to a custom dictionary; returns how many were new.
    pub fn dict_add<I, S>(&mut self, name: &str, terms: I) -> Result<i64>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let command = Command::new(DICT_ADD_CMD).arg(name).args(terms);
        value_to_i64(&self.execute(command)?)
    }

    /// Remove terms from a custom dictionary; returns how many existed.
    pub fn dict_del<I, S>(&mut self, name: &str, terms: I) -> Result<i64>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let command = Command::new(DICT_DEL_CMD).arg(name).args(terms);
        value_to_i64(&self.execute(command)?)
    }

    pub fn dict_dump(&mut self, name: &str) -> Result<Vec<String>> {
        let command = Command::new(DICT_DUMP_CMD).arg(name);
        value_to_string_list(&self.execute(command)?)
    }

    /// Set a module option; true when the server answered `OK`.
    pub fn config_set(&mut self, option: &str, value: &str) -> Result<bool> {
        let command = Command::new(CONFIG_CMD).args(["SET", option, value]);
        Ok(value_to_string(&self.execute(command)?)? == "OK")
    }

    /// Get module options; `option` may be `*`.
    pub fn config_get(&mut self, option: &str) -> Result<IndexMap<String, Option<String>>> {
        let command = Command::new(CONFIG_CMD).args(["GET", option]);
        let reply = self.execute(command)?;
        let mut options = IndexMap::new();
        if matches!(reply, Value::Nil) {
            return Ok(options);
        }
        for entry in as_array(&reply)? {
            let pair = as_array(entry)?;
            let (Some(name), Some(value)) = (pair.first(), pair.get(1)) else {
                return Err(RediSearchError::decode("config entry is not a pair"));
            };
            options.insert(value_to_string(name)?, value_to_opt_string(value)?);
        }
        Ok(options)
    }

    /// Distinct values of a tag field.
    pub fn tagvals(&mut self, field: &str) -> Result<Vec<String>> {
        let command = self.index_command(TAGVALS_CMD).arg(field);
        value_to_string_list(&self.execute(command)?)
    }

    /// Point a new alias at this index.
    pub fn alias_add(&mut self, alias: &str) -> Result<Value> {
        let command = Command::new(ALIAS_ADD_CMD).arg(alias).arg(self.index_name.as_str());
        self.execute(command)
    }

    /// Move an existing alias to this index.
    pub fn alias_update(&mut self, alias: &str) -> Result<Value> {
        let command = Command::new(ALIAS_UPDATE_CMD)
            .arg(alias)
            .arg(self.index_name.as_str());
        self.execute(command)
    }

    pub fn alias_del(&mut self, alias: &str) -> Result<Value> {
        self.execute(Command::new(ALIAS_DEL_CMD).arg(alias))
    }

    /// A batch indexer flushing every `batch_chunk_size` documents.
    pub fn batch_indexer(&mut self) -> BatchIndexer<'_, T> {
        let chunk_size = self.batch_chunk_size;
        BatchIndexer::new(self, chunk_size)
    }

    /// A batch indexer flushing every `chunk_size` documents.
    pub fn batch_indexer_with_chunk_size(&mut self, chunk_size: usize) -> BatchIndexer<'_, T> {
        BatchIndexer::new(self, chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::aggregation::reducers;
    use crate::schema::TextField;

    fn bulk(s: &str) -> Value {
        Value::BulkString(s.as_bytes().to_vec())
    }

    #[derive(Default)]
    struct Recorder {
        sent: Vec<String>,
        replies: VecDeque<Value>,
    }

    impl Transport for Recorder {
        fn execute(&mut self, command: &Command) -> Result<Value> {
            self.sent.push(command.to_string());
            Ok(self.replies.pop_front().unwrap_or(Value::Okay))
        }

        fn execute_pipeline(&mut self, commands: &[Command]) -> Result<Vec<Value>> {
            commands.iter().map(|c| self.execute(c)).collect()
        }
    }

    fn client(replies: Vec<Value>) -> Client<Recorder> {
        let recorder = Recorder {
            sent: Vec::new(),
            replies: replies.into(),
        };
        Client::new("idx", recorder)
    }

    #[test]
    fn test_create_index_command() {
        let mut client = client(vec![]);
        let mut schema = Schema::new();
        schema.add_field("title", Box::new(TextField::new())).unwrap();
        client
            .create_index(&schema, &IndexOptions::new().no_term_offsets())
            .unwrap();
        assert_eq!(
            client.transport_mut().sent,
            vec!["FT.CREATE idx NOOFFSETS SCHEMA title TEXT WEIGHT 1"]
        );
    }

    #[test]
    fn test_search_decodes_with_query_flags() {
        let reply = Value::Array(vec![
            Value::Int(1),
            bulk("doc1"),
            bulk("0.5"),
            Value::Array(vec![bulk("title"), bulk("hello")]),
        ]);
        let mut client = client(vec![reply]);
        let result = client.search(Query::new("hello").with_scores()).unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.docs[0].id, "doc1");
        assert_eq!(result.docs[0].score, Some(0.5));
        assert_eq!(result.docs[0].get("title"), Some("hello"));
        assert_eq!(
            client.transport_mut().sent,
            vec!["FT.SEARCH idx hello WITHSCORES LIMIT 0 10"]
        );
    }

    #[test]
    fn test_cursor_read_updates_id_and_stops_at_zero() {
        let first = Value::Array(vec![Value::Array(vec![Value::Int(1)]), Value::Int(9)]);
        let last = Value::Array(vec![Value::Array(vec![Value::Int(1)]), Value::Int(0)]);
        let mut client = client(vec![first, last]);

        let request = AggregateRequest::new("*")
            .group_by(["@a"], [reducers::count()])
            .unwrap()
            .cursor(Some(1), None);
        let result = client.aggregate(&request).unwrap();
        let mut cursor = result.cursor.unwrap();
        assert_eq!(cursor.cid, 9);

        client.cursor_read(&mut cursor).unwrap();
        assert!(cursor.is_exhausted());
        assert!(matches!(
            client.cursor_read(&mut cursor),
            Err(RediSearchError::Validation(_))
        ));
        assert_eq!(client.transport_mut().sent[1], "FT.CURSOR READ idx 9 COUNT 1");
        assert_eq!(client.transport_mut().sent.len(), 2);
    }

    #[test]
    fn test_delete_get_and_load() {
        let mut client = client(vec![
            Value::Int(1),
            Value::Nil,
            Value::Array(vec![bulk("id"), bulk("x"), bulk("title"), bulk("t")]),
        ]);
        assert!(client.delete_document("doc1", true).unwrap());
        assert_eq!(client.get("missing").unwrap(), None);
        let doc = client.load_document("doc1").unwrap();
        assert_eq!(doc.id, "doc1");
        assert_eq!(doc.fields.len(), 1);
        assert_eq!(
            client.transport_mut().sent,
            vec!["FT.DEL idx doc1 DD", "FT.GET idx missing", "HGETALL doc1"]
        );
    }

    #[test]
    fn test_config_and_info() {
        let mut client = client(vec![
            Value::Okay,
            Value::Array(vec![Value::Array(vec![bulk("TIMEOUT"), bulk("500")])]),
            Value::Array(vec![bulk("index_name"), bulk("idx"), bulk("num_docs"), Value::Int(3)]),
        ]);
        assert!(client.config_set("TIMEOUT", "500").unwrap());
        let options = client.config_get("TIMEOUT").unwrap();
        assert_eq!(options["TIMEOUT"].as_deref(), Some("500"));
        let info = client.info().unwrap();
        assert_eq!(info["num_docs"], Value::Int(3));
    }

    #[test]
    fn test_alias_commands() {
        let mut client = client(vec![]);
        client.alias_add("a").unwrap();
        client.alias_update("a").unwrap();
        client.alias_del("a").unwrap();
        assert_eq!(
            client.transport_mut().sent,
            vec!["FT.ALIASADD a idx", "FT.ALIASUPDATE a idx", "FT.ALIASDEL a"]
        );
    }
}
