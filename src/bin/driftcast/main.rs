//! Drift forecast command-line tool.
//!
//! Subcommands cover the full workflow:
//! - `fetch`: download forecast currents for a release schedule
//! - `simulate`: advect particles through a downloaded forecast
//! - `arrivals`: summarize endpoints against a target polygon
//! - `demo`: self-contained constant-field runs, no data needed

mod commands;

use clap::{Parser, Subcommand};

/// Surface drift forecasting from ocean-current forecasts.
#[derive(Parser)]
#[command(name = "driftcast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Surface drift forecasting from ocean-current forecasts", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download forecast currents for a release schedule
    Fetch(commands::fetch::FetchArgs),
    /// Advect particles through a downloaded forecast
    Simulate(commands::simulate::SimulateArgs),
    /// Summarize endpoints against a target polygon
    Arrivals(commands::arrivals::ArrivalsArgs),
    /// Run a self-contained demo simulation
    Demo(commands::demo::DemoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&cli.log_level),
    )
    .init();

    match cli.command {
        Commands::Fetch(args) => commands::fetch::execute(args),
        Commands::Simulate(args) => commands::simulate::execute(args),
        Commands::Arrivals(args) => commands::arrivals::execute(args),
        Commands::Demo(args) => commands::demo::execute(args),
    }
}
