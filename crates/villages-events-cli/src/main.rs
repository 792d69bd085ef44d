//! villages-events: print today's town-square entertainment.

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::util::SubscriberInitExt;

use villages_events_cli::app::{self, EXIT_SUCCESS, EXIT_USAGE};
use villages_events_cli::cli::{Cli, Commands};
use villages_events_cli::config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS });
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    app::log_subscriber(filter, std::io::stderr().is_terminal(), std::io::stderr).init();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "villages-events", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    let path = config::resolve_config_path(cli.config.as_deref());
    let settings = config::resolve(&cli, config::load_file(&path));

    let mut stdout = std::io::stdout().lock();
    match app::execute(&settings, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(app::report(&e)),
    }
}
