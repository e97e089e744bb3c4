//! Command implementations for the redisearch CLI.

use log::{debug, info};

use crate::aggregation::{AggregateRequest, Alias, Reducer, SortKey, asc, desc, reducers};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::{RediSearchError, Result};
use crate::query::{Query, SortDirection};
use crate::reply::value_to_json;
use crate::spellcheck::SpellcheckOptions;
use crate::suggestion::{AutoCompleter, SuggestOptions};

/// Execute a CLI command.
pub fn execute_command(args: RediSearchArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let mut client = Client::connect(&config)?;
    info!("connected to {} (index '{}')", config.redis_url, config.index_name);

    match &args.command {
        Command::Search(search_args) => search(&mut client, search_args, &args),
        Command::Aggregate(aggregate_args) => aggregate(&mut client, aggregate_args, &args),
        Command::Info => show_info(&mut client, &args),
        Command::Explain(explain_args) => explain(&mut client, explain_args, &args),
        Command::Spellcheck(spellcheck_args) => spellcheck(&mut client, spellcheck_args, &args),
        Command::Suggest(suggest_args) => suggest(&mut client, &config, suggest_args, &args),
    }
}

/// Merge the config file (if any) with command line overrides.
pub fn resolve_config(args: &RediSearchArgs) -> Result<ClientConfig> {
    let mut config = match (&args.config, &args.index) {
        (Some(path), _) => {
            debug!("loading config from {}", path.display());
            ClientConfig::from_file(path)?
        }
        (None, Some(index)) => ClientConfig::new(index.clone()),
        (None, None) => {
            return Err(RediSearchError::invalid_config(
                "either --index or --config is required",
            ));
        }
    };
    if let Some(index) = &args.index {
        config.index_name = index.clone();
    }
    if let Some(url) = &args.url {
        config.redis_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Parse `NAME[:FIELD[:ARG]][=ALIAS]` into a reducer.
pub fn parse_reducer(spec: &str) -> Result<Reducer> {
    let (body, alias) = match spec.split_once('=') {
        Some((body, alias)) => (body, Some(alias)),
        None => (spec, None),
    };
    let mut parts = body.split(':');
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let field = parts.next();
    let arg = parts.next();

    let need_field = || {
        field.ok_or_else(|| {
            RediSearchError::invalid_argument(format!("reducer '{name}' needs a field"))
        })
    };
    let need_arg = || {
        arg.ok_or_else(|| {
            RediSearchError::invalid_argument(format!("reducer '{name}' needs an argument"))
        })
    };

    let reducer = match name.as_str() {
        "count" => reducers::count(),
        "count_distinct" => reducers::count_distinct(need_field()?),
        "count_distinctish" => reducers::count_distinctish(need_field()?),
        "sum" => reducers::sum(need_field()?),
        "min" => reducers::min(need_field()?),
        "max" => reducers::max(need_field()?),
        "avg" => reducers::avg(need_field()?),
        "stddev" => reducers::stddev(need_field()?),
        "tolist" => reducers::tolist(need_field()?),
        "first_value" => reducers::first_value(need_field()?),
        "quantile" => {
            let pct = need_arg()?.parse::<f64>().map_err(|_| {
                RediSearchError::invalid_argument(format!("invalid quantile in '{spec}'"))
            })?;
            reducers::quantile(need_field()?, pct)
        }
        "random_sample" => {
            let size = need_arg()?.parse::<usize>().map_err(|_| {
                RediSearchError::invalid_argument(format!("invalid sample size in '{spec}'"))
            })?;
            reducers::random_sample(need_field()?, size)
        }
        other => {
            return Err(RediSearchError::invalid_argument(format!(
                "unknown reducer '{other}'"
            )));
        }
    };

    match alias {
        Some(alias) => reducer.alias(Alias::Explicit(alias.to_string())),
        None => Ok(reducer),
    }
}

/// Parse a sort key; a leading `-` sorts descending, `+` ascending.
pub fn parse_sort_key(spec: &str) -> SortKey {
    if let Some(field) = spec.strip_prefix('-') {
        desc(field)
    } else if let Some(field) = spec.strip_prefix('+') {
        asc(field)
    } else {
        SortKey::new(spec)
    }
}

/// Build the aggregate request described by the command line.
pub fn build_aggregate_request(args: &AggregateArgs) -> Result<AggregateRequest> {
    let reducers = args
        .reducers
        .iter()
        .map(|spec| parse_reducer(spec))
        .collect::<Result<Vec<_>>>()?;
    let mut request = AggregateRequest::new(args.query.clone()).group_by(&args.group_by, reducers)?;
    let keys: Vec<SortKey> = args.sort_by.iter().map(|spec| parse_sort_key(spec)).collect();
    request = match (keys.is_empty(), args.limit) {
        (false, Some(max)) => request.sort_by_max(keys, max),
        (false, None) => request.sort_by(keys),
        (true, Some(limit)) => request.limit(0, limit),
        (true, None) => request,
    };
    Ok(request)
}

/// Build the query described by the command line.
pub fn build_query(args: &SearchArgs) -> Query {
    let mut query = Query::new(args.query.clone()).paging(args.offset, args.limit);
    if args.no_content {
        query = query.no_content();
    }
    if args.with_scores {
        query = query.with_scores();
    }
    if args.with_payloads {
        query = query.with_payloads();
    }
    if args.verbatim {
        query = query.verbatim();
    }
    if !args.fields.is_empty() {
        query = query.return_fields(&args.fields);
    }
    if let Some(field) = &args.sort_by {
        let direction = if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        query = query.sort_by(field.clone(), direction);
    }
    query
}

fn search(
    client: &mut Client<redis::Connection>,
    args: &SearchArgs,
    cli_args: &RediSearchArgs,
) -> Result<()> {
    let result = client.search(build_query(args))?;
    output_result("Search results", &SearchResults::from(result), cli_args)
}

fn aggregate(
    client: &mut Client<redis::Connection>,
    args: &AggregateArgs,
    cli_args: &RediSearchArgs,
) -> Result<()> {
    let request = build_aggregate_request(args)?;
    let result = client.aggregate(&request)?;
    output_result("Aggregation results", &AggregateRows::from(&result), cli_args)
}

fn show_info(client: &mut Client<redis::Connection>, cli_args: &RediSearchArgs) -> Result<()> {
    let info: indexmap::IndexMap<String, serde_json::Value> = client
        .info()?
        .iter()
        .map(|(key, value)| (key.clone(), value_to_json(value)))
        .collect();
    output_result("Index information", &info, cli_args)
}

fn explain(
    client: &mut Client<redis::Connection>,
    args: &ExplainArgs,
    cli_args: &RediSearchArgs,
) -> Result<()> {
    let plan = client.explain(args.query.as_str())?;
    output_result("Execution plan", &plan, cli_args)
}

fn spellcheck(
    client: &mut Client<redis::Connection>,
    args: &SpellcheckArgs,
    cli_args: &RediSearchArgs,
) -> Result<()> {
    let mut options = SpellcheckOptions::new();
    options.distance = args.distance;
    options.include = args.include.clone();
    options.exclude = args.exclude.clone();
    let corrections = client.spellcheck(&args.query, &options)?;
    output_result("Spelling corrections", &corrections, cli_args)
}

fn suggest(
    client: &mut Client<redis::Connection>,
    config: &ClientConfig,
    args: &SuggestArgs,
    cli_args: &RediSearchArgs,
) -> Result<()> {
    let key = args
        .key
        .clone()
        .or_else(|| config.suggestion_key.clone())
        .ok_or_else(|| {
            RediSearchError::invalid_config("no suggestion key given and none configured")
        })?;
    let options = SuggestOptions {
        fuzzy: args.fuzzy,
        num: args.max,
        with_scores: args.with_scores,
        with_payloads: args.with_payloads,
    };
    let mut completer = AutoCompleter::new(key, client.transport_mut());
    let suggestions = completer.get_suggestions(&args.prefix, &options)?;
    output_result("Suggestions", &suggestions, cli_args)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_parse_reducer_specs() {
        assert_eq!(
            parse_reducer("count=n").unwrap().build_args(),
            vec!["REDUCE", "COUNT", "0", "AS", "n"]
        );
        assert_eq!(
            parse_reducer("quantile:@price:0.9").unwrap().build_args(),
            vec!["REDUCE", "QUANTILE", "2", "@price", "0.9"]
        );
        assert_eq!(
            parse_reducer("RANDOM_SAMPLE:@t:3=sample").unwrap().build_args(),
            vec!["REDUCE", "RANDOM_SAMPLE", "2", "@t", "3", "AS", "sample"]
        );
        assert!(parse_reducer("sum").is_err());
        assert!(parse_reducer("quantile:@price").is_err());
        assert!(parse_reducer("median:@price").is_err());
    }

    #[test]
    fn test_parse_sort_key() {
        assert_eq!(parse_sort_key("-@n"), desc("@n"));
        assert_eq!(parse_sort_key("+@n"), asc("@n"));
        assert_eq!(parse_sort_key("@n"), SortKey::new("@n"));
    }

    #[test]
    fn test_build_aggregate_request() {
        let args = RediSearchArgs::try_parse_from([
            "redisearch",
            "aggregate",
            "-g",
            "@category",
            "-r",
            "count=n",
            "--sort-by",
            "-@n",
            "-l",
            "5",
        ])
        .unwrap();
        let Command::Aggregate(aggregate_args) = args.command else {
            panic!("Expected Aggregate command");
        };
        let request = build_aggregate_request(&aggregate_args).unwrap();
        assert_eq!(
            request.build_args().unwrap(),
            vec![
                "*", "GROUPBY", "1", "@category", "REDUCE", "COUNT", "0", "AS", "n", "SORTBY",
                "2", "@n", "DESC", "MAX", "5",
            ]
        );
    }

    #[test]
    fn test_build_query() {
        let args = RediSearchArgs::try_parse_from([
            "redisearch",
            "search",
            "hello",
            "--with-scores",
            "--fields",
            "title",
        ])
        .unwrap();
        let Command::Search(search_args) = args.command else {
            panic!("Expected Search command");
        };
        assert_eq!(
            build_query(&search_args).get_args(),
            vec!["hello", "WITHSCORES", "RETURN", "1", "title", "LIMIT", "0", "10"]
        );
    }

    #[test]
    fn test_resolve_config() {
        let args = RediSearchArgs::try_parse_from([
            "redisearch",
            "--index",
            "idx",
            "--url",
            "redis://other:6379/",
            "info",
        ])
        .unwrap();
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.index_name, "idx");
        assert_eq!(config.redis_url, "redis://other:6379/");
    }

    #[test]
    fn test_resolve_config_requires_index() {
        let mut args = RediSearchArgs::try_parse_from(["redisearch", "info"]).unwrap();
        args.url = None;
        assert!(matches!(
            resolve_config(&args),
            Err(RediSearchError::InvalidConfig(_))
        ));
    }
}
