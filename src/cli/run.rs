//! `run` command
//!
//! Wires the real collaborators together and performs one reconciliation run.

use std::path::PathBuf;

use chrono::Local;
use clap::Args;

use crate::config::{ReimbursePaths, Settings};
use crate::display::format_run_report;
use crate::error::ReimburseResult;
use crate::ledger::LunchMoneyClient;
use crate::notify::{Notifier, TelegramNotifier};
use crate::oracle::OpenAiOracle;
use crate::services::{LedgerNames, Reconciler, RunOptions, RunReport};

/// Arguments for a reconciliation run
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Report what would be grouped without changing the ledger or the state file
    #[arg(long)]
    pub dry_run: bool,

    /// Lunch Money access token
    #[arg(long, env = "LUNCHMONEY_TOKEN", hide_env_values = true)]
    pub lunchmoney_token: String,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_TOKEN", hide_env_values = true)]
    pub openai_token: String,

    /// Chat model used for matching
    #[arg(long)]
    pub openai_model: Option<String>,

    /// Category holding incoming reimbursements
    #[arg(long)]
    pub reimbursement_category: Option<String>,

    /// Category for committed groups
    #[arg(long)]
    pub reimbursed_category: Option<String>,

    /// Tag on expenses waiting to be paid back
    #[arg(long)]
    pub pending_tag: Option<String>,

    /// Days of uncleared transactions to consider
    #[arg(long)]
    pub lookback_days: Option<u32>,

    /// Where to keep the unprocessed set between runs
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Telegram bot token for notifications
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Telegram chat to notify
    #[arg(long, env = "TELEGRAM_CHANNEL")]
    pub telegram_channel: Option<String>,
}

impl RunArgs {
    /// Configured names with command-line overrides applied
    pub fn names(&self, settings: &Settings) -> LedgerNames {
        LedgerNames {
            reimbursement_category: self
                .reimbursement_category
                .clone()
                .unwrap_or_else(|| settings.reimbursement_category.clone()),
            reimbursed_category: self
                .reimbursed_category
                .clone()
                .unwrap_or_else(|| settings.reimbursed_category.clone()),
            pending_tag: self
                .pending_tag
                .clone()
                .unwrap_or_else(|| settings.pending_tag.clone()),
        }
    }

    pub fn options(&self, paths: &ReimbursePaths, settings: &Settings) -> RunOptions {
        RunOptions {
            names: self.names(settings),
            lookback_days: self.lookback_days.unwrap_or(settings.lookback_days),
            today: Local::now().date_naive(),
            dry_run: self.dry_run,
            state_file: self
                .state_file
                .clone()
                .unwrap_or_else(|| paths.state_file()),
        }
    }

    fn notifier(&self) -> ReimburseResult<Option<TelegramNotifier>> {
        match (&self.telegram_token, &self.telegram_channel) {
            (Some(token), Some(channel)) => Ok(Some(TelegramNotifier::new(token, channel)?)),
            (None, None) => Ok(None),
            _ => {
                tracing::warn!(
                    "both --telegram-token and --telegram-channel are needed for notifications"
                );
                Ok(None)
            }
        }
    }
}

/// Handle the `run` command
pub fn handle_run_command(
    paths: &ReimbursePaths,
    settings: &Settings,
    args: &RunArgs,
) -> ReimburseResult<RunReport> {
    let ledger = LunchMoneyClient::new(&args.lunchmoney_token, &settings.ledger_api_base)?;
    let model = args
        .openai_model
        .as_deref()
        .unwrap_or(&settings.openai_model);
    let oracle = OpenAiOracle::new(&args.openai_token, model, &settings.openai_api_base)?;
    let notifier = args.notifier()?;

    let options = args.options(paths, settings);
    let start = options.start_date()?;
    tracing::info!(
        start = %start,
        end = %options.today,
        dry_run = options.dry_run,
        "starting reconciliation"
    );

    let mut reconciler = Reconciler::new(&ledger, &oracle);
    if let Some(notifier) = &notifier {
        reconciler = reconciler.with_notifier(notifier as &dyn Notifier);
    }

    let report = reconciler.run(&options)?;
    print!("{}", format_run_report(&report));
    Ok(report)
}
