use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "dayplanner", version, about = "Day planner CLI")]
struct Cli {
    /// Log debug output to stderr (overridden by DAYPLANNER_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Generate, reorder and export the day's schedule
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Run through the schedule with a countdown per block
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Select the workspace by passcode
    Workspace {
        #[command(subcommand)]
        action: commands::workspace::WorkspaceAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("DAYPLANNER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // stdout carries JSON; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Session { action } => commands::session::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Workspace { action } => commands::workspace::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "dayplanner", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
