//! Wire commands and the transport seam.
//!
//! Every request builder in this crate serializes to a flat token list. The
//! client prefixes that list with a command name (and usually the index name)
//! to form a [`Command`], and hands it to a [`Transport`] which performs the
//! round trip. The transport is the only place that talks to a server.

use std::fmt;

use redis::Value;

use crate::error::Result;

pub const CREATE_CMD: &str = "FT.CREATE";
pub const ALTER_CMD: &str = "FT.ALTER";
pub const SEARCH_CMD: &str = "FT.SEARCH";
pub const ADD_CMD: &str = "FT.ADD";
pub const ADDHASH_CMD: &str = "FT.ADDHASH";
pub const DROP_CMD: &str = "FT.DROP";
pub const EXPLAIN_CMD: &str = "FT.EXPLAIN";
pub const DEL_CMD: &str = "FT.DEL";
pub const AGGREGATE_CMD: &str = "FT.AGGREGATE";
pub const CURSOR_CMD: &str = "FT.CURSOR";
pub const SPELLCHECK_CMD: &str = "FT.SPELLCHECK";
pub const DICT_ADD_CMD: &str = "FT.DICTADD";
pub const DICT_DEL_CMD: &str = "FT.DICTDEL";
pub const DICT_DUMP_CMD: &str = "FT.DICTDUMP";
pub const GET_CMD: &str = "FT.GET";
pub const MGET_CMD: &str = "FT.MGET";
pub const CONFIG_CMD: &str = "FT.CONFIG";
pub const TAGVALS_CMD: &str = "FT.TAGVALS";
pub const ALIAS_ADD_CMD: &str = "FT.ALIASADD";
pub const ALIAS_UPDATE_CMD: &str = "FT.ALIASUPDATE";
pub const ALIAS_DEL_CMD: &str = "FT.ALIASDEL";
pub const INFO_CMD: &str = "FT.INFO";
pub const SUGADD_CMD: &str = "FT.SUGADD";
pub const SUGDEL_CMD: &str = "FT.SUGDEL";
pub const SUGLEN_CMD: &str = "FT.SUGLEN";
pub const SUGGET_CMD: &str = "FT.SUGGET";
pub const HGETALL_CMD: &str = "HGETALL";

/// A single wire command: a name followed by positional string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<String>,
}

impl Command {
    /// Create a command with no arguments.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Command {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments, in order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The command name, e.g. `FT.SEARCH`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The arguments following the command name.
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Convert into a `redis::Cmd` ready to be sent.
    pub fn to_cmd(&self) -> redis::Cmd {
        let mut cmd = redis::cmd(&self.name);
        for arg in &self.args {
            cmd.arg(arg.as_str());
        }
        cmd
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Something that can send commands to a server and return its replies.
///
/// Implementations own retry, timeout and connection management; this crate
/// never retries a failed command.
pub trait Transport {
    /// Send one command and wait for its reply.
    fn execute(&mut self, command: &Command) -> Result<Value>;

    /// Send several commands in one non-transactional pipeline and wait for
    /// all replies, in order.
    fn execute_pipeline(&mut self, commands: &[Command]) -> Result<Vec<Value>>;
}

impl Transport for redis::Connection {
    fn execute(&mut self, command: &Command) -> Result<Value> {
        Ok(command.to_cmd().query::<Value>(self)?)
    }

    fn execute_pipeline(&mut self, commands: &[Command]) -> Result<Vec<Value>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }
        let mut pipe = redis::pipe();
        for command in commands {
            pipe.add_command(command.to_cmd());
        }
        Ok(pipe.query::<Vec<Value>>(self)?)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn execute(&mut self, command: &Command) -> Result<Value> {
        (**self).execute(command)
    }

    fn execute_pipeline(&mut self, commands: &[Command]) -> Result<Vec<Value>> {
        (**self).execute_pipeline(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_building() {
        let command = Command::new(SEARCH_CMD)
            .arg("idx")
            .args(["hello", "LIMIT", "0", "10"]);

        assert_eq!(command.name(), "FT.SEARCH");
        assert_eq!(command.arguments(), &["idx", "hello", "LIMIT", "0", "10"]);
        assert_eq!(command.to_string(), "FT.SEARCH idx hello LIMIT 0 10");
    }

    #[test]
    fn test_to_cmd_keeps_argument_order() {
        let command = Command::new(DEL_CMD).arg("idx").arg("doc1").arg("DD");
        let cmd = command.to_cmd();
        let args: Vec<Vec<u8>> = cmd
            .args_iter()
            .filter_map(|arg| match arg {
                redis::Arg::Simple(bytes) => Some(bytes.to_vec()),
                redis::Arg::Cursor => None,
            })
            .collect();

        assert_eq!(
            args,
            vec![b"FT.DEL".to_vec(), b"idx".to_vec(), b"doc1".to_vec(), b"DD".to_vec()]
        );
    }
}
