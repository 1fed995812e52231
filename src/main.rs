//! Command-line tool matching payments to invoices or bills in a ledger file

use clap::Parser;
use std::path::PathBuf;

use payment_matcher::{
    JsonLedger, MatchConstraints, MatchEngine, MatchResult, Mode, StdinConfirmer,
};

#[derive(Parser)]
#[command(
    name = "payment-matcher",
    about = "Automatically match payments to invoices or bills in a ledger file",
    version
)]
struct Cli {
    /// Path to the ledger snapshot file
    #[arg(long)]
    ledger_file: PathBuf,

    /// Full path of the payment account (e.g. 'Assets:Current Assets:Checking Account')
    #[arg(long)]
    payment_account: String,

    /// Processing mode: 'ar' for invoices/receivables or 'ap' for bills/payables
    #[arg(long)]
    mode: Mode,

    /// Full path of the Accounts Receivable or Accounts Payable account
    #[arg(long)]
    ar_ap_account: String,

    /// Number of days the document date can be after the payment date.
    /// For date filtering, both --days-before and --days-after must be specified
    #[arg(long)]
    days_before: Option<i64>,

    /// Number of days the document date can be before the payment date.
    /// For date filtering, both --days-before and --days-after must be specified
    #[arg(long)]
    days_after: Option<i64>,

    /// Only match payments whose description contains the document id
    #[arg(long)]
    match_id: bool,

    /// Only match payments whose description contains the document billing id
    #[arg(long)]
    match_billing_id: bool,

    /// Perform a dry run without saving any changes
    #[arg(long)]
    dry_run: bool,

    /// Confirm each match manually
    #[arg(long)]
    confirm: bool,
}

async fn run(cli: Cli) -> MatchResult<()> {
    let constraints = MatchConstraints::from_options(
        cli.mode,
        cli.days_before,
        cli.days_after,
        cli.match_id,
        cli.match_billing_id,
    )?;

    let ledger = JsonLedger::open(&cli.ledger_file)?;
    ledger.resolve_account(&cli.payment_account)?;
    ledger.resolve_account(&cli.ar_ap_account)?;

    let mut engine = MatchEngine::new(ledger, constraints, cli.payment_account, cli.ar_ap_account)
        .dry_run(cli.dry_run);
    if cli.confirm {
        engine = engine.with_confirmer(Box::new(StdinConfirmer));
    }

    let report = engine.run().await?;
    println!("{}", report.found_line());
    for outcome in &report.outcomes {
        println!("{}", outcome);
    }
    println!("{}", report.summary());
    println!("Done.");
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
