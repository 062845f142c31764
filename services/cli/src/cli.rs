use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use concierge::workflows::application::PaymentMode;

#[derive(Parser, Debug)]
#[command(
    name = "concierge",
    about = "Browse government services, manage the wallet, and submit applications from the command line",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the service catalog, optionally filtered
    Services(ServicesArgs),
    /// Show the home feed (slider and featured services)
    Home,
    /// Show the wallet balance
    Wallet,
    /// List submitted applications and their statuses
    Applications,
    /// Apply for a service: validate, pay, submit
    Apply(ApplyArgs),
    /// Manage the stored login session
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },
}

#[derive(Args, Debug)]
pub struct ServicesArgs {
    /// Filter by name or description
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Catalog id of the service to apply for
    #[arg(long)]
    pub service_id: u64,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// 10-digit mobile number
    #[arg(long)]
    pub mobile: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub state: String,
    #[arg(long)]
    pub city: String,
    /// 6-digit pincode
    #[arg(long)]
    pub pincode: String,
    #[arg(long)]
    pub gender: String,
    /// Date of birth (YYYY-MM-DD); only sent when the service collects it
    #[arg(long, value_parser = parse_date)]
    pub dob: Option<NaiveDate>,
    /// Document source as label=path, repeatable (e.g. --doc "PAN=./pan.pdf")
    #[arg(long = "doc", value_parser = parse_doc_source)]
    pub docs: Vec<DocSource>,
    /// Pay the full fee or half of it up front
    #[arg(long, value_enum, default_value_t = PaymentModeArg::Partial)]
    pub payment: PaymentModeArg,
    /// Offset the fee with the wallet balance (applied server-side)
    #[arg(long)]
    pub use_wallet: bool,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Store a login session for subsequent commands
    Set {
        #[arg(long)]
        token: String,
        #[arg(long)]
        user_id: Option<String>,
    },
    /// Show the stored session, if any
    Show,
    /// Forget the stored session
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaymentModeArg {
    Partial,
    Full,
}

impl From<PaymentModeArg> for PaymentMode {
    fn from(value: PaymentModeArg) -> Self {
        match value {
            PaymentModeArg::Partial => PaymentMode::Partial,
            PaymentModeArg::Full => PaymentMode::Full,
        }
    }
}

/// One `label=path` document mapping from the command line.
#[derive(Debug, Clone)]
pub struct DocSource {
    pub label: String,
    pub path: PathBuf,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn parse_doc_source(raw: &str) -> Result<DocSource, String> {
    let (label, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected label=path, got '{raw}'"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("document label is empty in '{raw}'"));
    }
    Ok(DocSource {
        label: label.to_string(),
        path: PathBuf::from(path.trim()),
    })
}
