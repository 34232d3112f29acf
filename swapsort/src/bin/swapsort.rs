use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use swapsort::{BenchArgs, BenchError};

fn fail(err: BenchError) -> ! {
    log::debug!("{:?}", err);
    eprintln!("❌ {}: {}", "ERROR".red().bold(), err.to_string().red());
    std::process::exit(err.exit_code());
}

fn main() {
    // stdout is reserved for the timing line
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = match BenchArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => fail(e.into()),
    };
    let stdout = std::io::stdout();
    if let Err(err) = swapsort::run_with_args(&args, &mut stdout.lock()) {
        fail(err);
    }
}
