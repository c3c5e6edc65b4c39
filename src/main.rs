use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use billing_report::api::BillingClient;
use billing_report::chart::render_report_charts;
use billing_report::config::{config_dir, load_config, resolve_output_dir, CONFIG_TEMPLATE};
use billing_report::error::{ReportError, Result};
use billing_report::invoice::{resolve_reference_time, summarize, TotalsSummary};
use billing_report::mail::{build_message, deliver, smtp_transport, Envelope};
use billing_report::report::{account_table, format_report, totals_table};
use billing_report::{logging, Config, MalformedPolicy};

#[derive(Parser)]
#[command(name = "billing-report")]
#[command(version, about = "Cloud billing report: invoice totals, charts and email", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.billing-report or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Show the account summary
    Account,

    /// Show invoice totals for last month, this month and year to date
    Totals {
        /// Reference instant in UTC (YYYY-MM-DD means end of that day, or YYYY-MM-DDTHH:MM:SS; default: now)
        #[arg(long)]
        now: Option<String>,

        /// Print totals and windows as JSON
        #[arg(long)]
        json: bool,

        /// Skip invoices with an unparseable date or total instead of failing
        #[arg(long)]
        skip_malformed: bool,
    },

    /// Build the full report, render charts and email it
    Report {
        /// Reference instant in UTC (YYYY-MM-DD means end of that day, or YYYY-MM-DDTHH:MM:SS; default: now)
        #[arg(long)]
        now: Option<String>,

        /// Print the email instead of sending it
        #[arg(long)]
        dry_run: bool,

        /// Do not render or attach charts
        #[arg(long)]
        no_charts: bool,

        /// Skip invoices with an unparseable date or total instead of failing
        #[arg(long)]
        skip_malformed: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Account => cmd_account(&cfg_dir),
        Commands::Totals {
            now,
            json,
            skip_malformed,
        } => cmd_totals(&cfg_dir, now, json, skip_malformed),
        Commands::Report {
            now,
            dry_run,
            no_charts,
            skip_malformed,
        } => cmd_report(&cfg_dir, now, dry_run, no_charts, skip_malformed),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(ReportError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized billing report config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit SMTP and email settings:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Export your API token:         export LINODE_API_TOKEN=...");
    println!("  3. Export your SMTP password:     export SMTP_PASSWORD=...");
    println!();
    println!("Then preview a report:");
    println!("  billing-report report --dry-run");

    Ok(())
}

fn resolve_now(now: Option<String>) -> Result<NaiveDateTime> {
    resolve_reference_time(now.as_deref())
}

fn malformed_policy(config: &Config, skip_flag: bool) -> MalformedPolicy {
    if skip_flag {
        MalformedPolicy::Skip
    } else {
        config.report.on_malformed
    }
}

/// Fetch every invoice and reduce them to the three period totals
fn fetch_totals(
    client: &BillingClient,
    now: NaiveDateTime,
    policy: MalformedPolicy,
) -> Result<TotalsSummary> {
    let records = client.fetch_all_invoices()?;
    tracing::info!(records = records.len(), "fetched invoices");

    let summary = summarize(&records, now, policy)?;
    if summary.skipped > 0 {
        eprintln!(
            "Skipped {} malformed invoice record(s); totals exclude them.",
            summary.skipped
        );
    }
    Ok(summary)
}

/// Show the account summary
fn cmd_account(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let client = BillingClient::from_config(&config)?;

    let account = client.account()?;
    println!("{}", account_table(&account));

    Ok(())
}

/// Show invoice totals
fn cmd_totals(
    cfg_dir: &Path,
    now: Option<String>,
    json: bool,
    skip_malformed: bool,
) -> Result<()> {
    let now = resolve_now(now)?;
    let config = load_config(cfg_dir)?;
    let client = BillingClient::from_config(&config)?;

    let summary = fetch_totals(&client, now, malformed_policy(&config, skip_malformed))?;

    if json {
        let out = serde_json::to_string_pretty(&summary).map_err(|e| {
            ReportError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            ))
        })?;
        println!("{out}");
    } else {
        println!("{}", totals_table(&summary));
        println!();
        println!("Invoices: {}", summary.invoice_count);
    }

    Ok(())
}

/// Fetch, aggregate, render charts and deliver the report
fn cmd_report(
    cfg_dir: &Path,
    now: Option<String>,
    dry_run: bool,
    no_charts: bool,
    skip_malformed: bool,
) -> Result<()> {
    let now = resolve_now(now)?;
    let config = load_config(cfg_dir)?;
    let client = BillingClient::from_config(&config)?;

    // Check mail settings before touching the network
    let delivery = if dry_run {
        None
    } else {
        Some((Envelope::from_config(&config)?, smtp_transport(&config)?))
    };

    // Any fetch failure aborts the run; no partial report goes out
    let account = client.account()?;
    let summary = fetch_totals(&client, now, malformed_policy(&config, skip_malformed))?;

    println!("{}", account_table(&account));
    println!("{}", totals_table(&summary));

    let body = format_report(&account, &summary.totals);

    let attachments = if no_charts {
        Vec::new()
    } else {
        let output_dir = resolve_output_dir(&config.output.dir, cfg_dir);
        render_report_charts(&account, &output_dir, now.date())?
    };

    let Some((envelope, transport)) = delivery else {
        println!();
        println!("Subject: {}", config.email.subject);
        println!();
        print!("{body}");
        for path in attachments.iter().filter(|p| p.exists()) {
            println!("Attachment: {}", path.display());
        }
        println!("Dry run: email not sent.");
        return Ok(());
    };

    let message = build_message(&envelope, &body, &attachments)?;
    deliver(&transport, &message)?;

    println!("Report sent to {}", envelope.to.join(", "));
    Ok(())
}
