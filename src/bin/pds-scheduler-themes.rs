//! Stand-alone entry point for release theme creation.

use clap::Parser;
use pds_issues::commands::themes::{self, ThemesArgs};
use pds_issues::shared::logging;

/// Create release theme issues for a build from a CSV schedule
#[derive(Parser)]
#[command(name = "pds-scheduler-themes", version, about)]
struct Cli {
    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(flatten)]
    args: ThemesArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);
    themes::run(&cli.args).await
}
