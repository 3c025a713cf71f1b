use clap::Subcommand;
use dayplanner_core::storage::Database;
use dayplanner_core::{Config, WorkspaceGate};
use serde_json::json;

use crate::common::{current_workspace, print_json, CliResult};

#[derive(Subcommand)]
pub enum WorkspaceAction {
    /// Switch to the workspace a passcode maps to
    Resolve {
        passcode: String,
    },
    /// Print the current workspace
    Show,
    /// Forget the unlocked workspace
    Lock,
}

pub fn run(action: WorkspaceAction) -> CliResult {
    let config = Config::load_or_default();
    let state = Database::open()?;

    match action {
        WorkspaceAction::Resolve { passcode } => {
            let gate = WorkspaceGate::from_config(&config.workspace);
            let workspace = gate.resolve(&passcode).ok_or("passcode not recognized")?;
            state.set_active_workspace(workspace)?;
            print_json(&json!({ "workspace": workspace }))?;
        }
        WorkspaceAction::Show => {
            let workspace = current_workspace(&state, &config)?;
            print_json(&json!({ "workspace": workspace }))?;
        }
        WorkspaceAction::Lock => {
            state.clear_active_workspace()?;
            println!("workspace locked");
        }
    }
    Ok(())
}
