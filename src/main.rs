use std::{io::Write, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use patent_fetcher::{
    configuration::get_configuration,
    domain::Target,
    startup::{run, OutputMode},
};

/// Fetch JSON-encoded information about a patent.
#[derive(Parser, Debug)]
#[command(name = "patent-fetcher", version)]
struct Cli {
    /// Google Patents ID (e.g. US6360693B1). A full URL is fetched as is,
    /// which is handy for file:// fixtures.
    id_or_url: String,

    /// Also fetch every translation the patent page offers
    #[arg(long, conflicts_with = "microdata")]
    all_languages: bool,

    /// Dump the page's raw itemprop tree instead of the patent record
    #[arg(long)]
    microdata: bool,

    /// YAML/TOML/JSON file layered over the built-in configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        match (self.all_languages, self.microdata) {
            (true, _) => OutputMode::AllLanguages,
            (_, true) => OutputMode::Microdata,
            _ => OutputMode::Record,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let configuration =
        get_configuration(cli.config.as_deref()).context("Failed to read configuration.")?;
    let target = Target::parse(&cli.id_or_url)?;

    let json = run(&configuration, &target, cli.output_mode()).await?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    Ok(())
}
