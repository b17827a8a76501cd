use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

mod cli;
use cli::{CliMode, help_text, parse_cli_mode, run_action};

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = match parse_cli_mode() {
        Ok(CliMode::Run(args)) => args,
        Ok(CliMode::Help) => {
            println!("{}", help_text());
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!("{}", cli::USAGE);
            return ExitCode::from(2);
        }
    };

    match run_action(args).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging() {
    let log_dir = dirs::config_dir()
        .map(|d| d.join("gcal-integration"))
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "gcal-integration.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("gcal-integration started");
}
