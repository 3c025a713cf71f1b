//! Interactive session: a countdown per block, driven by a tokio interval.
//!
//! Events are written to stdout as JSON lines; the live countdown goes to
//! stderr. Commands are read from stdin, one per line.

use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use dayplanner_core::storage::Database;
use dayplanner_core::{
    AlertPattern, CadenceToken, Config, Event, Notifier, NullNotifier, SessionRunner, SessionState,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use crate::common::{current_workspace, load_schedule, CliResult};

const HELP: &str = "commands: p(ause) r(esume) c(omplete) s(kip) status q(uit)";

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run the last generated schedule
    Run {
        /// Block to start at (default: first block not yet completed)
        #[arg(long)]
        from: Option<usize>,
    },
}

/// Rings the terminal bell on the runtime, `spacing` apart.
struct TerminalBell;

impl Notifier for TerminalBell {
    fn alert(&self, pattern: &AlertPattern) {
        let pattern = *pattern;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    for pulse in 0..pattern.pulses {
                        if pulse > 0 {
                            tokio::time::sleep(pattern.spacing).await;
                        }
                        ring();
                    }
                });
            }
            Err(_) => ring(),
        }
    }
}

fn ring() {
    let mut stderr = std::io::stderr();
    // Best-effort; a closed terminal must not end the session.
    let _ = stderr.write_all(b"\x07").and_then(|()| stderr.flush());
}

fn emit(event: &Event) -> CliResult {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn show_countdown(runner: &SessionRunner) {
    let Some(block) = runner.current_index().and_then(|i| runner.schedule().get(i)) else {
        return;
    };
    let secs = runner.remaining_secs();
    eprint!("\r{} {:02}:{:02} ", block.name, secs / 60, secs % 60);
}

pub fn run(action: SessionAction) -> CliResult {
    let SessionAction::Run { from } = action;

    let config = Config::load_or_default();
    let state = Database::open()?;
    let workspace = current_workspace(&state, &config)?;
    let schedule = load_schedule(&state, &workspace)?;

    let Some(first) = from.or_else(|| schedule.first_pending()) else {
        return Err("every block is already completed".into());
    };
    if first >= schedule.len() {
        return Err(format!("no block at position {first} ({} blocks)", schedule.len()).into());
    }

    let runner = SessionRunner::new(schedule).with_alert(config.alert_pattern());
    let runner = if config.session.alert_enabled {
        runner.with_notifier(TerminalBell)
    } else {
        runner.with_notifier(NullNotifier)
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let finished = runtime.block_on(drive(runner, first, config.tick_interval()));
    // The stdin reader thread cannot be cancelled; do not wait for it.
    runtime.shutdown_background();

    state.save_schedule(&workspace, &finished?)?;
    Ok(())
}

async fn drive(
    mut runner: SessionRunner,
    first: usize,
    period: Duration,
) -> CliResult<dayplanner_core::Schedule> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut driving: Option<CadenceToken> = None;

    eprintln!("{HELP}");
    if let Some(event) = runner.start(first) {
        emit(&event)?;
    }

    loop {
        // A new cadence supersedes whatever the interval was timing.
        let cadence = runner.cadence();
        if cadence != driving {
            interval.reset();
            driving = cadence;
        }

        tokio::select! {
            _ = interval.tick(), if driving.is_some() => {
                let event = runner.tick();
                show_countdown(&runner);
                if let Some(event) = event {
                    eprintln!();
                    emit(&event)?;
                    eprintln!("time is up: c to complete, s to skip");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("stdin closed; ending session");
                    break;
                };
                let events = match line.trim() {
                    "" => Vec::new(),
                    "p" | "pause" => runner.pause().into_iter().collect(),
                    "r" | "resume" => runner.resume().into_iter().collect(),
                    "c" | "complete" => runner.complete(),
                    "s" | "skip" => runner.skip(),
                    "status" => vec![runner.snapshot()],
                    "q" | "quit" => break,
                    other => {
                        eprintln!("unknown command '{other}'; {HELP}");
                        Vec::new()
                    }
                };
                for event in &events {
                    emit(event)?;
                }
            }
        }

        if runner.state() == SessionState::Idle {
            break;
        }
    }

    Ok(runner.into_schedule())
}
