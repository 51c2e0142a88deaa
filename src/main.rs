//! Leasing Engine CLI
//!
//! Command-line interface for schedules, lease KPIs and investor returns

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use leasing_engine::investors::{allocate_pool, load_contributions, validate_pool, PoolSummary};
use leasing_engine::report::{write_cash_flows_csv, write_investor_returns_csv, write_schedule_csv, LeaseSummary};
use leasing_engine::schedule::{AmortizationEngine, LoanParameters, ScheduleSummary};
use leasing_engine::{AllocationBasis, EngineConfig, Frequency, LeasingParameters};
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "leasing-engine", version, about = "Amortization, leasing KPIs and investor returns")]
struct Cli {
    /// JSON engine configuration (defaults plus LEASING_* environment overrides otherwise)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct LoanArgs {
    #[arg(long)]
    principal: f64,

    /// Annual nominal rate in percent
    #[arg(long)]
    rate: f64,

    /// Term in months
    #[arg(long)]
    term: u32,

    /// First period starts on this date (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// monthly, quarterly, semi-annual or annual
    #[arg(long, default_value = "monthly")]
    frequency: String,
}

impl LoanArgs {
    fn loan(&self) -> LoanParameters {
        LoanParameters::new(
            self.principal,
            self.rate,
            self.term,
            Frequency::parse(&self.frequency),
            self.start,
        )
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print an amortization schedule
    Schedule {
        #[command(flatten)]
        loan: LoanArgs,

        /// Target ending balance instead of zero
        #[arg(long)]
        residual: Option<f64>,

        /// Write the full schedule to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Compute lease cash flows and KPIs from a JSON parameter file
    Lease {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        start: NaiveDate,

        /// Report timestamp (YYYY-MM-DDTHH:MM:SS); the current local time when omitted
        #[arg(long)]
        as_of: Option<NaiveDateTime>,

        /// Write the full results as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the cash-flow ledger as CSV
        #[arg(long)]
        ledger_csv: Option<PathBuf>,
    },

    /// Allocate loan returns across contributors listed in a CSV file
    Investors {
        #[command(flatten)]
        loan: LoanArgs,

        /// CSV with InvestorId,Name,Amount
        #[arg(long)]
        contributions: PathBuf,

        /// Write per-investor totals as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::from_json_path(p)
            .with_context(|| format!("reading config {}", p.display())),
        None => EngineConfig::from_env().context("reading LEASING_* environment"),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Schedule { loan, residual, csv } => run_schedule(&loan, residual, csv),
        Command::Lease {
            input,
            start,
            as_of,
            json,
            ledger_csv,
        } => run_lease(&config, input, start, as_of, json, ledger_csv),
        Command::Investors {
            loan,
            contributions,
            csv,
        } => run_investors(&config, &loan, contributions, csv),
    }
}

fn run_schedule(args: &LoanArgs, residual: Option<f64>, csv: Option<PathBuf>) -> Result<()> {
    let loan = args.loan();
    match residual {
        Some(r) => loan.validate_residual(r)?,
        None => loan.validate()?,
    }

    let engine = match residual {
        Some(r) => AmortizationEngine::with_residual(loan, r),
        None => AmortizationEngine::new(loan),
    };
    let (schedule, summary) = engine.schedule_with_summary();

    println!(
        "Amortization Schedule ({} {} payments of {:.2}, ending at {:.2})",
        schedule.len(),
        engine.loan().frequency,
        engine.payment(),
        engine.target_balance()
    );
    println!("{:>6} {:>12} {:>14} {:>14} {:>14} {:>16}", "Period", "Date", "Payment", "Principal", "Interest", "Balance");
    println!("{}", "-".repeat(82));

    for entry in schedule.iter().take(24) {
        println!(
            "{:>6} {:>12} {:>14.2} {:>14.2} {:>14.2} {:>16.2}",
            entry.period, entry.date, entry.payment, entry.principal, entry.interest, entry.balance
        );
    }
    if schedule.len() > 24 {
        println!("... ({} more periods)", schedule.len() - 24);
    }

    print_schedule_summary(&summary);

    if let Some(path) = csv {
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        write_schedule_csv(BufWriter::new(file), &schedule)?;
        println!("\nFull schedule written to: {}", path.display());
    }

    Ok(())
}

fn print_schedule_summary(summary: &ScheduleSummary) {
    println!("\nSummary:");
    println!("  Periods:         {}", summary.total_periods);
    println!("  Total Payments:  {:.2}", summary.total_payments);
    println!("  Total Principal: {:.2}", summary.total_principal);
    println!("  Total Interest:  {:.2}", summary.total_interest);
    println!("  Final Balance:   {:.2}", summary.final_balance);
}

fn run_lease(
    config: &EngineConfig,
    input: PathBuf,
    start: NaiveDate,
    as_of: Option<NaiveDateTime>,
    json: Option<PathBuf>,
    ledger_csv: Option<PathBuf>,
) -> Result<()> {
    let file = File::open(&input).with_context(|| format!("opening {}", input.display()))?;
    let params: LeasingParameters = serde_json::from_reader(file)
        .with_context(|| format!("parsing leasing parameters in {}", input.display()))?;

    let engine = config.leasing_engine();
    let results = engine.compute_checked(&params, start)?;
    let as_of = as_of.unwrap_or_else(|| chrono::Local::now().naive_local());
    let summary = LeaseSummary::new(&params, &results, start, as_of);

    info!("lease computed: {} periods", results.cash_flows.len());

    println!("Lease Results (as of {})", summary.as_of);
    println!("{}", "=".repeat(40));
    println!("  Monthly Rent:      {:.2}", summary.monthly_rent);
    println!("  Loan Payment:      {:.2}", summary.loan_payment);
    println!("  Residual Value:    {:.2}", summary.residual_value);
    println!("  Security Deposit:  {:.2}", summary.security_deposit);
    println!("  NPV:               {:.2}", summary.net_present_value);
    println!("  IRR (annual):      {:.4}%", summary.irr * 100.0);
    match summary.payback_period {
        Some(months) => println!("  Payback (months):  {:.2}", months),
        None => println!("  Payback (months):  never"),
    }
    println!("  Total Profit:      {:.2}", summary.total_profit);

    println!("\n{:>6} {:>12} {:>14} {:>14} {:>14} {:>16} {:>16}", "Period", "Date", "Inflow", "Outflow", "Net", "Cumulative", "Cum NPV");
    for e in &results.cash_flows {
        println!(
            "{:>6} {:>12} {:>14.2} {:>14.2} {:>14.2} {:>16.2} {:>16.2}",
            e.period, e.date, e.inflow, e.outflow, e.net_cash_flow, e.cumulative_cash_flow, e.cumulative_npv
        );
    }

    if let Some(path) = json {
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(
            BufWriter::new(file),
            &serde_json::json!({ "summary": summary, "results": results }),
        )?;
        println!("\nResults written to: {}", path.display());
    }

    if let Some(path) = ledger_csv {
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        write_cash_flows_csv(BufWriter::new(file), &results.cash_flows)?;
        println!("Ledger written to: {}", path.display());
    }

    Ok(())
}

fn run_investors(config: &EngineConfig, args: &LoanArgs, contributions: PathBuf, csv: Option<PathBuf>) -> Result<()> {
    let loan = args.loan();
    loan.validate()?;

    let pool = load_contributions(&contributions)
        .with_context(|| format!("loading contributions from {}", contributions.display()))?;
    validate_pool(&pool, loan.principal, 0.01)?;

    let schedule = AmortizationEngine::new(loan).schedule();
    let returns = allocate_pool(&pool, &schedule, config.allocation_basis);
    let totals = PoolSummary::from_returns(&returns);

    let basis = match config.allocation_basis {
        AllocationBasis::Interest => "interest",
        AllocationBasis::Payment => "payment",
    };
    println!("Investor Returns ({} basis, {} periods)", basis, schedule.len());
    println!("{:<12} {:<24} {:>14} {:>8} {:>14} {:>14} {:>8}", "Id", "Name", "Contribution", "Share", "Total Return", "Interest", "ROI");
    println!("{}", "-".repeat(100));
    for r in &returns {
        println!(
            "{:<12} {:<24} {:>14.2} {:>7.2}% {:>14.2} {:>14.2} {:>7.2}%",
            r.investor_id,
            r.name,
            r.contribution,
            r.share * 100.0,
            r.total_return,
            r.total_interest,
            r.roi * 100.0
        );
    }
    println!("{}", "-".repeat(100));
    println!(
        "{:<37} {:>14.2} {:>7.2}% {:>14.2} {:>14.2}",
        "Total", totals.total_contribution, totals.share_sum * 100.0, totals.total_return, totals.total_interest
    );

    if let Some(path) = csv {
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        write_investor_returns_csv(BufWriter::new(file), &returns)?;
        println!("\nInvestor returns written to: {}", path.display());
    }

    Ok(())
}
