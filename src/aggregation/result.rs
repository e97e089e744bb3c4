//! Aggregation replies and cursors.
//!
//! A plain reply is `[total, row, row, ...]`. With `WITHSCHEMA` the schema
//! comes first: `[schema, total, row, ...]`. With `WITHCURSOR` the whole
//! payload is wrapped as `[payload, cursor_id]`, and a cursor id of zero
//! means the server has nothing more to return.

use std::time::Duration;

use redis::Value;

use crate::error::{RediSearchError, Result};
use crate::reply::{as_array, describe, value_to_i64, value_to_opt_string, value_to_string};

/// A server-side cursor over aggregation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Server cursor id; zero once exhausted.
    pub cid: u64,
    /// Rows per read.
    pub count: Option<usize>,
    /// Idle time after which the server drops the cursor.
    pub max_idle: Option<Duration>,
}

impl Cursor {
    pub fn new(cid: u64) -> Self {
        Cursor {
            cid,
            count: None,
            max_idle: None,
        }
    }

    /// True when the server reported no further results.
    pub fn is_exhausted(&self) -> bool {
        self.cid == 0
    }

    /// Arguments following `FT.CURSOR READ <index>`.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![self.cid.to_string()];
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

/// One aggregation result row: ordered `name, value` pairs.
///
/// Values are kept raw since reducers such as `TOLIST` produce arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    cells: Vec<(String, Value)>,
}

impl AggregateRow {
    fn decode(value: &Value) -> Result<Self> {
        let items = as_array(value)?;
        if items.len() % 2 != 0 {
            return Err(RediSearchError::decode(format!(
                "aggregate row has odd length {}",
                items.len()
            )));
        }
        let cells = items
            .chunks_exact(2)
            .map(|pair| Ok((value_to_string(&pair[0])?, pair[1].clone())))
            .collect::<Result<Vec<_>>>()?;
        Ok(AggregateRow { cells })
    }

    /// All cells in reply order.
    pub fn pairs(&self) -> &[(String, Value)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The raw value of the first cell called `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// The value of `name` as a string; `Ok(None)` when absent or nil.
    pub fn get_string(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            Some(value) => value_to_opt_string(value),
            None => Ok(None),
        }
    }
}

/// The decoded result of an aggregation or a cursor read.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    /// Total count reported by the server.
    pub total: u64,
    pub rows: Vec<AggregateRow>,
    /// Raw schema header when `WITHSCHEMA` was requested.
    pub schema: Option<Value>,
    /// The cursor to continue reading with, for cursor replies.
    pub cursor: Option<Cursor>,
}

/// Decode an aggregation reply.
///
/// `cursor` is the cursor template (count, idle time) when the request asked
/// for one; its id is replaced by the id in the reply.
pub fn parse_aggregate_reply(
    reply: &Value,
    with_schema: bool,
    cursor: Option<Cursor>,
) -> Result<AggregateResult> {
    let (payload, cursor) = match cursor {
        Some(template) => {
            let parts = as_array(reply)?;
            if parts.len() != 2 {
                return Err(RediSearchError::decode(format!(
                    "cursor reply must have 2 elements, got {}",
                    parts.len()
                )));
            }
            let cid = value_to_i64(&parts[1])?;
            let cid = u64::try_from(cid)
                .map_err(|_| RediSearchError::decode(format!("negative cursor id {cid}")))?;
            (&parts[0], Some(Cursor { cid, ..template }))
        }
        None => (reply, None),
    };

    let items = as_array(payload)?;
    let (schema, rest) = if with_schema {
        match items.split_first() {
            Some((schema, rest)) => (Some(schema.clone()), rest),
            None => return Err(RediSearchError::decode("aggregate reply is missing its schema")),
        }
    } else {
        (None, items)
    };

    let (total, rows) = match rest.split_first() {
        Some((total, rows)) => (total, rows),
        None => return Err(RediSearchError::decode("aggregate reply is missing its count")),
    };
    let total = match total {
        Value::Int(_) | Value::BulkString(_) | Value::SimpleString(_) => value_to_i64(total)?,
        other => {
            return Err(RediSearchError::decode(format!(
                "aggregate count must be an integer, got {}",
                describe(other)
            )));
        }
    };
    let total = u64::try_from(total)
        .map_err(|_| RediSearchError::decode(format!("negative aggregate count {total}")))?;

    let rows = rows
        .iter()
        .map(AggregateRow::decode)
        .collect::<Result<Vec<_>>>()?;

    Ok(AggregateResult {
        total,
        rows,
        schema,
        cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulk(s: &str) -> Value {
        Value::BulkString(s.as_bytes().to_vec())
    }

    fn row(cells: &[(&str, &str)]) -> Value {
        Value::Array(
            cells
                .iter()
                .flat_map(|(k, v)| [bulk(k), bulk(v)])
                .collect(),
        )
    }

    #[test]
    fn test_plain_reply() {
        let reply = Value::Array(vec![
            Value::Int(2),
            row(&[("category", "a"), ("count", "2")]),
            row(&[("category", "b"), ("count", "1")]),
        ]);
        let result = parse_aggregate_reply(&reply, false, None).unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].get_string("count").unwrap().as_deref(), Some("2"));
        assert_eq!(result.rows[1].get_string("category").unwrap().as_deref(), Some("b"));
        assert!(result.cursor.is_none());
        assert!(result.schema.is_none());
    }

    #[test]
    fn test_schema_reply() {
        let schema = Value::Array(vec![bulk("count"), bulk("number")]);
        let reply = Value::Array(vec![schema.clone(), Value::Int(1), row(&[("count", "5")])]);
        let result = parse_aggregate_reply(&reply, true, None).unwrap();
        assert_eq!(result.schema, Some(schema));
        assert_eq!(result.total, 1);
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn test_cursor_reply() {
        let payload = Value::Array(vec![Value::Int(1), row(&[("x", "1")])]);
        let reply = Value::Array(vec![payload, Value::Int(42)]);
        let template = Cursor {
            cid: 0,
            count: Some(10),
            max_idle: None,
        };
        let result = parse_aggregate_reply(&reply, false, Some(template)).unwrap();
        let cursor = result.cursor.unwrap();
        assert_eq!(cursor.cid, 42);
        assert_eq!(cursor.count, Some(10));
        assert!(!cursor.is_exhausted());
    }

    #[test]
    fn test_malformed_replies() {
        assert!(parse_aggregate_reply(&Value::Array(vec![]), false, None).is_err());
        assert!(parse_aggregate_reply(&bulk("nope"), false, None).is_err());

        let odd = Value::Array(vec![Value::Int(1), Value::Array(vec![bulk("x")])]);
        assert!(matches!(
            parse_aggregate_reply(&odd, false, None),
            Err(RediSearchError::Decode(_))
        ));

        let short_cursor = Value::Array(vec![Value::Array(vec![Value::Int(0)])]);
        assert!(parse_aggregate_reply(&short_cursor, false, Some(Cursor::new(0))).is_err());
    }

    #[test]
    fn test_list_values_stay_raw() {
        let reply = Value::Array(vec![
            Value::Int(1),
            Value::Array(vec![bulk("names"), Value::Array(vec![bulk("a"), bulk("b")])]),
        ]);
        let result = parse_aggregate_reply(&reply, false, None).unwrap();
        assert!(matches!(result.rows[0].get("names"), Some(Value::Array(v)) if v.len() == 2));
        assert!(result.rows[0].get_string("names").is_err());
        assert_eq!(result.rows[0].get_string("missing").unwrap(), None);
    }

    #[test]
    fn test_cursor_args() {
        let cursor = Cursor {
            cid: 7,
            count: Some(3),
            max_idle: Some(Duration::from_millis(500)),
        };
        assert_eq!(cursor.build_args(), vec!["7", "COUNT", "3", "MAXIDLE", "500"]);
        assert_eq!(Cursor::new(9).build_args(), vec!["9"]);
    }
}
