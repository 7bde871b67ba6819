use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use colored::*;

use loadforge_burst::cli::Cli;
use loadforge_burst::executor::aggregate::summarize;
use loadforge_burst::executor::Dispatcher;
use loadforge_burst::report;
use loadforge_burst::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    let config = cli.into_config().context("loading configuration")?;
    let dispatcher = Dispatcher::new(&config).context("preparing dispatcher")?;
    dispatcher
        .preflight()
        .await
        .context("checking target host")?;

    if !json {
        println!(
            "{} {}",
            Local::now().format("%Y/%m/%d %H:%M:%S").to_string().bold(),
            format!(
                "Starting {} concurrent requests against {} (max {} in flight)...",
                config.total_requests,
                dispatcher.target().as_str(),
                config.concurrency
            )
            .bold()
        );
    }

    let dispatch = dispatcher.run().await;
    let summary = summarize(&dispatch.outcomes, dispatch.wall_time);

    if json {
        println!(
            "{}",
            report::render_json(&summary).context("serializing summary")?
        );
    } else {
        print!("{}", report::render(&summary));
    }

    Ok(())
}
