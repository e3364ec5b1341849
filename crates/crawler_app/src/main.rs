mod cli;
mod config;
mod report;

use std::process::ExitCode;

use clap::Parser;
use crawler_engine::Crawler;
use engine_logging::engine_error;

use crate::cli::Cli;
use crate::report::ConsoleSink;

fn main() -> ExitCode {
    let cli = Cli::parse();
    engine_logging::initialize(&cli.log_settings());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = config::load(cli.config.as_deref())?;
    config::apply_overrides(&mut config, cli);

    let crawler = Crawler::new(config);
    let sink = ConsoleSink::stdio(cli.output_format());
    let summary = crawler.crawl(&cli.seed, &sink)?;
    sink.finish(&summary);
    Ok(())
}
