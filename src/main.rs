use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use goldfolio::cli::summary::ViewMode;
use goldfolio::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for goldfolio::AppCommand {
    fn from(cmd: Commands) -> goldfolio::AppCommand {
        match cmd {
            Commands::Prices => goldfolio::AppCommand::Prices,
            Commands::Summary { view } => goldfolio::AppCommand::Summary { view },
            Commands::Watch { view } => goldfolio::AppCommand::Watch { view },
            Commands::ResetBaseline => goldfolio::AppCommand::ResetBaseline,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display current gold and bitcoin prices
    Prices,
    /// Display portfolio valuation and allocation
    Summary {
        #[arg(long, value_enum, default_value_t = ViewMode::All)]
        view: ViewMode,
    },
    /// Refresh the portfolio summary on every polling interval
    Watch {
        #[arg(long, value_enum, default_value_t = ViewMode::All)]
        view: ViewMode,
    },
    /// Forget stored gold prices so changes are measured from the next fetch
    ResetBaseline,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => goldfolio::cli::setup::setup_at_path(path),
            None => goldfolio::cli::setup::setup(),
        },
        Some(cmd) => goldfolio::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
