//! Passcode gate selecting which workspace's tasks are visible.
//!
//! This is a lookup, not authentication: the table lives in plain text in
//! `config.toml`.

use std::collections::BTreeMap;

use crate::storage::WorkspaceConfig;

#[derive(Debug, Clone, Default)]
pub struct WorkspaceGate {
    table: BTreeMap<String, String>,
}

impl WorkspaceGate {
    pub fn new(table: BTreeMap<String, String>) -> Self {
        Self { table }
    }

    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self::new(config.passcodes.clone())
    }

    /// Workspace id for `passcode`, ignoring surrounding whitespace.
    /// Unknown or blank passcodes resolve to nothing.
    pub fn resolve(&self, passcode: &str) -> Option<&str> {
        let passcode = passcode.trim();
        if passcode.is_empty() {
            return None;
        }
        let workspace = self.table.get(passcode).map(String::as_str);
        if workspace.is_none() {
            tracing::debug!("passcode did not match any workspace");
        }
        workspace
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> WorkspaceGate {
        let mut config = WorkspaceConfig::default();
        config.passcodes.insert("4711".into(), "home".into());
        config.passcodes.insert("0815".into(), "office".into());
        WorkspaceGate::from_config(&config)
    }

    #[test]
    fn known_passcode_resolves() {
        assert_eq!(gate().resolve("4711"), Some("home"));
        assert_eq!(gate().resolve(" 0815\n"), Some("office"));
    }

    #[test]
    fn unknown_or_blank_passcode_is_none() {
        let gate = gate();
        assert_eq!(gate.resolve("1234"), None);
        assert_eq!(gate.resolve("   "), None);
        assert_eq!(gate.len(), 2);
    }

    #[test]
    fn empty_gate_resolves_nothing() {
        let gate = WorkspaceGate::default();
        assert!(gate.is_empty());
        assert_eq!(gate.resolve("4711"), None);
    }
}
