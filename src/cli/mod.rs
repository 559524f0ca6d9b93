pub mod frame;
pub mod output;
pub mod replay;
pub mod util;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Live terminal status line for agent sessions
#[derive(Parser)]
#[command(name = "agentline", version, about, long_about = None)]
pub struct Cli {
    /// Logging verbosity: off, error, warn, info, debug. Logging is off unless set.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Drive the live status display from a JSONL event stream
    Replay(replay::Args),

    /// Print the status lines for an event stream once, without cursor control
    Frame(frame::Args),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_flag_has_lower_bound() {
        for width in ["0", "9"] {
            assert!(
                Cli::try_parse_from(["agentline", "frame", "--width", width]).is_err(),
                "--width {} accepted",
                width
            );
        }
        assert!(Cli::try_parse_from(["agentline", "frame", "--width", "10"]).is_ok());
        assert!(Cli::try_parse_from(["agentline", "replay", "--width", "120"]).is_ok());
    }

    #[test]
    fn test_log_options_are_global() {
        let cli = Cli::try_parse_from(["agentline", "replay", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
