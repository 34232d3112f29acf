use clap::{Parser, Subcommand};
use colored::Colorize;

#[macro_use]
pub mod utils;
pub mod commands;
pub mod config;
pub mod meta;
pub mod timings;

/// Bubble sort swap benchmark driver
#[derive(Parser)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Run(commands::run::RunArgs),
    Report(commands::report::ReportArgs),
    Plot(commands::plot::PlotArgs),
}

/// Parse the command line. Also accepts the extra `swapsort` argument cargo passes to subcommands.
pub fn parse_args(args: impl IntoIterator<Item = String>) -> Cli {
    let mut args = args.into_iter().collect::<Vec<_>>();
    if args.len() > 1 && args[1] == "swapsort" {
        args = args[1..].to_vec();
    }
    Cli::parse_from(args)
}

pub fn entry(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Run(cmd) => cmd.run(),
        Commands::Report(cmd) => cmd.run(),
        Commands::Plot(cmd) => cmd.run(),
    }
}

#[doc(hidden)]
pub fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    env_logger::init();
    let cli = parse_args(std::env::args());
    if let Err(err) = entry(&cli) {
        eprintln!("❌ {}: {}", "ERROR".red().bold(), err.to_string().red());
        std::process::exit(1);
    }
    Ok(())
}
