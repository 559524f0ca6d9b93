use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;

use crate::cli::util::{self, DisplayArgs};
use crate::display::{compose, DisplayState};

/// Arguments for the `agentline frame` subcommand.
#[derive(ClapArgs)]
pub struct Args {
    /// JSONL event file; reads stdin when omitted or `-`
    pub file: Option<PathBuf>,

    /// Elapsed time shown in the stats line, in seconds
    #[arg(long, default_value_t = 0)]
    pub elapsed: u64,

    #[command(flatten)]
    pub display: DisplayArgs,
}

/// Run the `agentline frame` subcommand.
///
/// Folds every event into one display state and prints the activity and
/// stats lines to stdout. No cursor movement, so the output can be captured.
pub fn run(args: Args) -> Result<()> {
    let settings = args.display.settings()?;
    util::apply_color(settings.color, util::stdout_is_terminal());

    let reader = open_input(args.file.as_deref())?;
    let mut state = DisplayState::new(settings.model.clone(), dirs::home_dir());

    for (i, line) in reader.lines().enumerate() {
        let line = line.context("failed to read event stream")?;
        if let Some(event) = util::parse_line(&line, i + 1) {
            if let Some(next) = state.reduce(&event) {
                state = next;
            }
        }
    }

    let frame = compose(
        &state,
        Duration::from_secs(args.elapsed),
        settings.columns.resolve(),
    );
    println!("{}", frame.activity);
    println!("{}", frame.stats);
    Ok(())
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(p) if p != Path::new("-") => {
            let file =
                File::open(p).with_context(|| format!("failed to open {}", p.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin().lock()))),
    }
}
