//! Command-line arguments.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use villages_events::OutputFormat;

/// Accepted `--log-level` values.
pub const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Parser, Debug)]
#[command(
    name = "villages-events",
    about = "Fetch and format entertainment events from The Villages API",
    version
)]
pub struct Cli {
    /// Output format (default: legacy).
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Text printed before the event data.
    #[arg(short, long)]
    pub preamble: Option<String>,

    /// Path to a TOML config file.
    /// Also reads VILLAGES_EVENTS_CONFIG.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Log level. RUST_LOG takes precedence.
    #[arg(long, default_value = "warn", value_parser = LOG_LEVELS)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    /// `venue,title#` records, for Meshtastic-style displays.
    Legacy,
    Json,
    Csv,
    Plain,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Legacy => OutputFormat::Legacy,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Plain => OutputFormat::Plain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["villages-events"]).unwrap();
        assert!(cli.format.is_none());
        assert!(cli.preamble.is_none());
        assert_eq!(cli.log_level, "warn");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_format_and_preamble() {
        let cli =
            Cli::try_parse_from(["villages-events", "--format", "csv", "-p", "Header: "]).unwrap();
        assert_eq!(cli.format, Some(FormatArg::Csv));
        assert_eq!(cli.preamble.as_deref(), Some("Header: "));
    }

    #[test]
    fn test_empty_preamble_accepted() {
        let cli = Cli::try_parse_from(["villages-events", "--preamble", ""]).unwrap();
        assert_eq!(cli.preamble.as_deref(), Some(""));
    }

    #[test]
    fn test_invalid_format_is_usage_error() {
        let err = Cli::try_parse_from(["villages-events", "--format", "xml"]).unwrap_err();
        assert!(err.use_stderr());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_known_log_levels_accepted() {
        for level in LOG_LEVELS {
            let cli = Cli::try_parse_from(["villages-events", "--log-level", level]).unwrap();
            assert_eq!(cli.log_level, level);
        }
    }

    #[test]
    fn test_misspelled_log_level_is_usage_error() {
        for level in ["warning", "verbose", "WARN "] {
            let err = Cli::try_parse_from(["villages-events", "--log-level", level]).unwrap_err();
            assert!(err.use_stderr());
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Cli::try_parse_from(["villages-events", "--timeout", "0"]).is_err());
    }

    #[test]
    fn test_help_is_not_an_error_exit() {
        let err = Cli::try_parse_from(["villages-events", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
