use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::commands::config::ConfigCommands;
use crate::commands::label_bugs::LabelBugsArgs;
use crate::commands::report::ReportArgs;
use crate::commands::themes::ThemesArgs;

#[derive(Parser)]
#[command(
    name = "pds-issues",
    version,
    about,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create release theme issues for a build from a CSV schedule
    SchedulerThemes(ThemesArgs),

    /// Generate an issue report (Markdown or reStructuredText)
    Report(ReportArgs),

    /// Add a version label to every open bug of a repository
    LabelOpenBugs(LabelBugsArgs),

    /// Configuration file tools
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::SchedulerThemes(args) => crate::commands::themes::run(&args).await,
            Commands::Report(args) => crate::commands::report::run(&args).await,
            Commands::LabelOpenBugs(args) => crate::commands::label_bugs::run(&args).await,
            Commands::Config(cmd) => cmd.run(),
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn generate_completions(shell: Shell) {
    use clap::CommandFactory;
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
