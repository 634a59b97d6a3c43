use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reimburse_cli::cli::{handle_run_command, handle_state_command, RunArgs, StateCommands};
use reimburse_cli::config::{ReimbursePaths, Settings};

#[derive(Parser)]
#[command(
    name = "reimburse",
    author = "Kaylee Beyene",
    version,
    about = "Match peer reimbursements to the expenses they pay back",
    long_about = "reimburse finds uncleared reimbursement transfers in your Lunch Money \
                  ledger, asks a language model which expenses they pay back, splits off \
                  the share you kept and groups each expense with its reimbursements."
)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass
    Run(RunArgs),

    /// Inspect or clear the state kept between runs
    #[command(subcommand)]
    State(StateCommands),

    /// Write a settings file with the defaults
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let paths = ReimbursePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Run(args)) => {
            let report = handle_run_command(&paths, &settings, &args)?;
            if report.has_failures() {
                anyhow::bail!("{} group(s) could not be committed", report.failed.len());
            }
        }
        Some(Commands::State(cmd)) => {
            handle_state_command(&paths, cmd)?;
        }
        Some(Commands::Init) => {
            if paths.is_initialized() {
                println!("Settings already exist at {}", paths.settings_file().display());
            } else {
                settings.save(&paths)?;
                println!("Wrote default settings to {}", paths.settings_file().display());
            }
        }
        Some(Commands::Config) => {
            println!("reimburse configuration");
            println!("=======================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("State file:     {}", paths.state_file().display());
            println!();
            println!("Settings:");
            println!("  Reimbursement category: {}", settings.reimbursement_category);
            println!("  Reimbursed category:    {}", settings.reimbursed_category);
            println!("  Pending tag:            {}", settings.pending_tag);
            println!("  Lookback days:          {}", settings.lookback_days);
            println!("  OpenAI model:           {}", settings.openai_model);
            println!("  Ledger API:             {}", settings.ledger_api_base);
            println!("  OpenAI API:             {}", settings.openai_api_base);
        }
        None => {
            println!("reimburse - match peer reimbursements to expenses");
            println!();
            println!("Run 'reimburse --help' for usage information.");
            println!("Run 'reimburse run' to reconcile.");
        }
    }

    Ok(())
}
