use clap::Parser;
use pds_issues::cli::Cli;
use pds_issues::shared::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);
    cli.run().await
}
