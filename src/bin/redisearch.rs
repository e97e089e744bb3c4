//! redisearch CLI binary.

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use redisearch::cli::args::RediSearchArgs;
use redisearch::cli::commands::execute_command;

fn main() -> anyhow::Result<()> {
    let args = RediSearchArgs::parse();

    let log_level = match args.verbosity() {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let name = args.command.name();
    execute_command(args).with_context(|| format!("{name} failed"))
}
