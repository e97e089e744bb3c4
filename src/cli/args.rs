//! Command line argument parsing for the redisearch CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// redisearch - query a RediSearch index from the command line
#[derive(Parser, Debug, Clone)]
#[command(name = "redisearch")]
#[command(about = "Search, aggregate and inspect RediSearch indexes")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct RediSearchArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Server URL (overrides the config file)
    #[arg(short, long, env = "REDIS_URL")]
    pub url: Option<String>,

    /// Index name (overrides the config file)
    #[arg(short, long)]
    pub index: Option<String>,

    /// Client configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl RediSearchArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search the index
    Search(SearchArgs),

    /// Run an aggregation
    Aggregate(AggregateArgs),

    /// Show index information
    Info,

    /// Show the execution plan of a query
    Explain(ExplainArgs),

    /// Suggest corrections for misspelled query terms
    Spellcheck(SpellcheckArgs),

    /// Query an autocomplete dictionary
    Suggest(SuggestArgs),
}

impl Command {
    /// Subcommand name, for messages.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Search(_) => "search",
            Command::Aggregate(_) => "aggregate",
            Command::Info => "info",
            Command::Explain(_) => "explain",
            Command::Spellcheck(_) => "spellcheck",
            Command::Suggest(_) => "suggest",
        }
    }
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of results to return
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Offset for pagination
    #[arg(short, long, default_value = "0")]
    pub offset: usize,

    /// Return ids only
    #[arg(long)]
    pub no_content: bool,

    /// Include relative scores
    #[arg(long)]
    pub with_scores: bool,

    /// Include payloads
    #[arg(long)]
    pub with_payloads: bool,

    /// Disable stemming
    #[arg(long)]
    pub verbatim: bool,

    /// Only return these fields (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Sort by this sortable field
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort_by")]
    pub desc: bool,
}

/// Arguments for aggregating
#[derive(Parser, Debug, Clone)]
pub struct AggregateArgs {
    /// Query string selecting the documents to aggregate
    #[arg(value_name = "QUERY", default_value = "*")]
    pub query: String,

    /// Fields to group by (comma-separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub group_by: Vec<String>,

    /// Reducers as NAME[:FIELD[:ARG]][=ALIAS], e.g. count=n or sum:@price=total
    #[arg(short, long = "reduce", default_value = "count")]
    pub reducers: Vec<String>,

    /// Sort by these fields; prefix with '-' for descending (comma-separated)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub sort_by: Vec<String>,

    /// Maximum number of rows to return
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for explaining a query
#[derive(Parser, Debug, Clone)]
pub struct ExplainArgs {
    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,
}

/// Arguments for spellchecking
#[derive(Parser, Debug, Clone)]
pub struct SpellcheckArgs {
    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum Levenshtein distance (1-4)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=4))]
    pub distance: Option<u32>,

    /// Dictionary of additional valid terms
    #[arg(long)]
    pub include: Option<String>,

    /// Dictionary of terms never reported
    #[arg(long)]
    pub exclude: Option<String>,
}

/// Arguments for autocomplete lookups
#[derive(Parser, Debug, Clone)]
pub struct SuggestArgs {
    /// Prefix to complete
    #[arg(value_name = "PREFIX")]
    pub prefix: String,

    /// Dictionary key (overrides the config file)
    #[arg(short, long)]
    pub key: Option<String>,

    /// Maximum number of suggestions
    #[arg(short, long, default_value = "10")]
    pub max: usize,

    /// Fuzzy prefix matching
    #[arg(long)]
    pub fuzzy: bool,

    /// Include scores
    #[arg(long)]
    pub with_scores: bool,

    /// Include payloads
    #[arg(long)]
    pub with_payloads: bool,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_command() {
        let args = RediSearchArgs::try_parse_from([
            "redisearch",
            "--index",
            "products",
            "search",
            "wireless headphones",
            "--limit",
            "5",
            "--fields",
            "title,price",
            "--sort-by",
            "price",
            "--desc",
        ])
        .unwrap();

        assert_eq!(args.index.as_deref(), Some("products"));
        if let Command::Search(search_args) = args.command {
            assert_eq!(search_args.query, "wireless headphones");
            assert_eq!(search_args.limit, 5);
            assert_eq!(search_args.offset, 0);
            assert_eq!(search_args.fields, vec!["title", "price"]);
            assert_eq!(search_args.sort_by.as_deref(), Some("price"));
            assert!(search_args.desc);
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_aggregate_command() {
        let args = RediSearchArgs::try_parse_from([
            "redisearch",
            "aggregate",
            "--group-by",
            "@category",
            "--reduce",
            "count=n",
            "--reduce",
            "avg:@price",
            "--sort-by",
            "-@n",
        ])
        .unwrap();

        if let Command::Aggregate(aggregate_args) = args.command {
            assert_eq!(aggregate_args.query, "*");
            assert_eq!(aggregate_args.group_by, vec!["@category"]);
            assert_eq!(aggregate_args.reducers, vec!["count=n", "avg:@price"]);
            assert_eq!(aggregate_args.sort_by, vec!["-@n"]);
        } else {
            panic!("Expected Aggregate command");
        }
    }

    #[test]
    fn test_aggregate_requires_group() {
        assert!(RediSearchArgs::try_parse_from(["redisearch", "aggregate"]).is_err());
    }

    #[test]
    fn test_spellcheck_distance_range() {
        assert!(
            RediSearchArgs::try_parse_from(["redisearch", "spellcheck", "helo", "-d", "5"]).is_err()
        );
        let args =
            RediSearchArgs::try_parse_from(["redisearch", "spellcheck", "helo", "-d", "2"]).unwrap();
        assert!(matches!(args.command, Command::Spellcheck(SpellcheckArgs { distance: Some(2), .. })));
    }

    #[test]
    fn test_verbosity_levels() {
        let args = RediSearchArgs::try_parse_from(["redisearch", "info"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = RediSearchArgs::try_parse_from(["redisearch", "-vv", "info"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args = RediSearchArgs::try_parse_from(["redisearch", "--quiet", "info"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            RediSearchArgs::try_parse_from(["redisearch", "--format", "json", "info"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }
}
