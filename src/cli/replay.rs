use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::cli::output;
use crate::cli::util::{self, DisplayArgs, Settings};
use crate::display::{FrameRenderer, StatusDisplay};
use crate::event::{AgentEvent, Message};

/// Exit status after Ctrl-C, as a shell reports SIGINT.
const INTERRUPTED_EXIT: i32 = 130;

/// Arguments for the `agentline replay` subcommand.
#[derive(ClapArgs)]
pub struct Args {
    /// JSONL event file; reads stdin when omitted or `-`
    pub file: Option<PathBuf>,

    /// Pause between events in milliseconds
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,

    #[command(flatten)]
    pub display: DisplayArgs,
}

/// How a replay ended.
#[derive(Debug)]
enum Outcome {
    Finished {
        last: Option<Message>,
        skipped: usize,
    },
    Interrupted,
}

/// Run the `agentline replay` subcommand.
///
/// The live display owns stderr until the stream ends; only then is the
/// final assistant text written to stdout.
pub fn run(args: Args) -> Result<()> {
    let settings = args.display.settings()?;
    util::apply_color(settings.color, util::stderr_is_terminal());

    let delay = Duration::from_millis(args.delay_ms);
    let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    let outcome = rt.block_on(replay(args.file.as_deref(), delay, &settings));
    // A pending stdin read must not hold up shutdown after Ctrl-C.
    rt.shutdown_background();

    match outcome? {
        Outcome::Interrupted => {
            output::error("interrupted");
            std::process::exit(INTERRUPTED_EXIT);
        }
        Outcome::Finished { last, skipped } => {
            if skipped > 0 {
                output::warning(&format!("skipped {} malformed event line(s)", skipped));
            }
            report(last.as_ref())
        }
    }
}

fn report(last: Option<&Message>) -> Result<()> {
    let Some(message) = last else {
        return Ok(());
    };

    if message.is_failed() {
        let reason = message.stop_reason.as_deref().unwrap_or("error");
        let detail = message
            .error_message
            .clone()
            .unwrap_or_else(|| format!("request ended with stop reason '{}'", reason));
        output::error(&detail);
        std::process::exit(1);
    }

    let text = message.text();
    if !text.is_empty() {
        println!("{}", text);
    }
    Ok(())
}

async fn replay(input: Option<&Path>, delay: Duration, settings: &Settings) -> Result<Outcome> {
    let mut lines = open_input(input).await?.lines();

    let mut display = StatusDisplay::new(FrameRenderer::stderr(settings.columns), settings.tick);
    display.start(settings.model.model.clone(), settings.model.thinking);

    let mut last = None;
    let mut skipped = 0;
    let mut line_no = 0;

    let interrupted = loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break true,
            line = lines.next_line() => line.context("failed to read event stream")?,
        };
        let Some(line) = line else {
            break false;
        };

        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let Some(event) = util::parse_line(&line, line_no) else {
            skipped += 1;
            continue;
        };

        display.handle_event(&event);
        if let AgentEvent::MessageEnd { message } = &event {
            if message.is_assistant() {
                last = Some(message.clone());
            }
        }

        if !delay.is_zero() {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break true,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    };

    display.stop();
    let usage = display.snapshot().usage;
    tracing::debug!(
        lines = line_no,
        skipped,
        interrupted,
        cost = usage.totals().map_or(0.0, |t| t.cost),
        "replay finished"
    );

    if interrupted {
        Ok(Outcome::Interrupted)
    } else {
        Ok(Outcome::Finished { last, skipped })
    }
}

async fn open_input(path: Option<&Path>) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    match path {
        Some(p) if p != Path::new("-") => {
            let file = tokio::fs::File::open(p)
                .await
                .with_context(|| format!("failed to open {}", p.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}
