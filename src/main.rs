use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use wishlist_to_library::cli::Cli;
use wishlist_to_library::config::Config;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    wishlist_to_library::logging::init().context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    let config = Config::from_env().context("load configuration")?;
    let feed = wishlist_to_library::run(&config)?;
    let xml = feed.to_xml()?;
    wishlist_to_library::write_feed(&xml, cli.output.as_deref())
}
