use clap::{Parser, Subcommand};
use loanbook::application::service::LoanService;
use loanbook::config::ServerConfig;
use loanbook::domain::aggregate::{monthly_payments, payment_totals};
use loanbook::domain::amortization::{LoanTerms, amortization_schedule};
use loanbook::infrastructure::open_stores;
use loanbook::interfaces::csv::loan_reader::LoanReader;
use loanbook::interfaces::csv::report_writer::ReportWriter;
use loanbook::interfaces::http::Server;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides the configuration file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the configuration file)
        #[arg(long)]
        port: Option<u16>,

        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
    /// Print the amortization schedule of one loan as CSV
    Schedule {
        /// Principal amount
        #[arg(long)]
        amount: Decimal,

        /// Annual interest rate in percent
        #[arg(long)]
        rate: Decimal,

        /// Term in months
        #[arg(long)]
        term: u32,
    },
    /// Aggregate the loans of a CSV file (amount,annual_interest_rate,loan_term)
    Aggregate {
        /// Input loans CSV file
        input: PathBuf,

        /// Print lifetime totals instead of the per-month breakdown
        #[arg(long)]
        totals: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            db_path,
        } => {
            let mut server_config = match config {
                Some(path) => {
                    info!("Loading configuration from {}", path.display());
                    ServerConfig::from_file(&path).into_diagnostic()?
                }
                None => ServerConfig::default(),
            };
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }
            if db_path.is_some() {
                server_config.db_path = db_path;
            }

            let (users, loans) = open_stores(server_config.db_path.as_deref()).into_diagnostic()?;
            let service = Arc::new(LoanService::new(users, loans));

            info!("loanbook v{}", env!("CARGO_PKG_VERSION"));
            Server::new(server_config, service)
                .start()
                .await
                .into_diagnostic()?;
        }
        Command::Schedule { amount, rate, term } => {
            let terms = LoanTerms::new(amount, rate, term).into_diagnostic()?;
            let schedule = amortization_schedule(&terms).into_diagnostic()?;

            let stdout = io::stdout();
            let mut writer = ReportWriter::new(stdout.lock());
            writer.write_schedule(&schedule).into_diagnostic()?;
        }
        Command::Aggregate { input, totals } => {
            let file = File::open(input).into_diagnostic()?;
            let reader = LoanReader::new(file);

            let mut loans = Vec::new();
            for loan in reader.loans() {
                match loan {
                    Ok(terms) => loans.push(terms),
                    Err(e) => warn!("Error reading loan: {}", e),
                }
            }

            let stdout = io::stdout();
            let mut writer = ReportWriter::new(stdout.lock());
            if totals {
                let totals = payment_totals(&loans).into_diagnostic()?;
                writer.write_totals(&totals).into_diagnostic()?;
            } else {
                let aggregates = monthly_payments(&loans).into_diagnostic()?;
                writer.write_monthly(&aggregates).into_diagnostic()?;
            }
        }
    }

    Ok(())
}
