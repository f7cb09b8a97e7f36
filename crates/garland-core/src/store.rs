//! Persistent unlock ledger and admin flag.
//!
//! State lives in one small JSON file scoped to the user, mirroring the
//! browser-profile persistence the calendar originally relied on. A missing
//! or corrupt file degrades to defaults (admin off, empty ledger) without
//! surfacing anything to the user; writes go through a temp file and rename
//! so the state file is never left half-written.

use crate::error::GarlandResult;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// On-disk shape of the persisted state.
///
/// Field names match the persistence keys the calendar has always used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedState {
    #[serde(rename = "adminMode", default)]
    admin_mode: bool,

    #[serde(rename = "openedOrnaments", default)]
    opened: BTreeSet<usize>,
}

/// Handle over the state file with the current state cached in memory.
///
/// Mutations persist immediately; callers rerun a full classification pass
/// after every mutation so displayed state never lags persisted state.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    state: PersistedState,
}

impl StateStore {
    /// Open the store at `path`, recovering to defaults when the file is
    /// missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = read_state(&path);
        Self { path, state }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the ornament at `index` has been opened by the user.
    pub fn is_opened(&self, index: usize) -> bool {
        self.state.opened.contains(&index)
    }

    /// Record a successful unlock. Idempotent; persists only on change.
    pub fn mark_opened(&mut self, index: usize) -> GarlandResult<()> {
        if !self.state.opened.insert(index) {
            return Ok(());
        }
        self.persist()
    }

    /// Ornament indices the user has opened so far.
    pub fn opened(&self) -> &BTreeSet<usize> {
        &self.state.opened
    }

    pub fn is_admin(&self) -> bool {
        self.state.admin_mode
    }

    /// Persist the admin flag.
    pub fn set_admin(&mut self, value: bool) -> GarlandResult<()> {
        if self.state.admin_mode == value {
            return Ok(());
        }
        self.state.admin_mode = value;
        self.persist()
    }

    fn persist(&self) -> GarlandResult<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let payload = serde_json::to_vec_pretty(&self.state).map_err(std::io::Error::from)?;

        let mut temp = NamedTempFile::new_in(parent)?;
        temp.as_file_mut().write_all(&payload)?;
        temp.as_file_mut().flush()?;
        temp.persist(&self.path)
            .map_err(|err| crate::error::GarlandError::Io(err.error))?;
        Ok(())
    }
}

fn read_state(path: &Path) -> PersistedState {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            debug!("state file {} unreadable: {err}", path.display());
            return PersistedState::default();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(state) => state,
        Err(err) => {
            debug!(
                "state file {} corrupt, starting fresh: {err}",
                path.display()
            );
            PersistedState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_defaults_to_empty() {
        let dir = tempdir().unwrap();
        let store = StateStore::open(dir.path().join("state.json"));
        assert!(!store.is_admin());
        assert!(store.opened().is_empty());
    }

    #[test]
    fn corrupt_file_defaults_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "][ definitely not json").unwrap();
        let store = StateStore::open(&path);
        assert!(!store.is_admin());
        assert!(store.opened().is_empty());
    }

    #[test]
    fn mark_opened_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut store = StateStore::open(dir.path().join("state.json"));
        store.mark_opened(3).unwrap();
        store.mark_opened(3).unwrap();
        assert_eq!(store.opened().len(), 1);
        assert!(store.is_opened(3));

        let reloaded = StateStore::open(store.path().to_path_buf());
        assert_eq!(reloaded.opened().len(), 1);
    }

    #[test]
    fn ledger_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = StateStore::open(&path);
        store.mark_opened(0).unwrap();
        store.mark_opened(4).unwrap();
        store.mark_opened(2).unwrap();
        store.set_admin(true).unwrap();

        let reloaded = StateStore::open(&path);
        assert_eq!(reloaded.opened(), store.opened());
        assert!(reloaded.is_admin());
    }

    #[test]
    fn persisted_keys_match_the_original_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut store = StateStore::open(&path);
        store.mark_opened(1).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get("adminMode").is_some());
        assert_eq!(raw["openedOrnaments"], serde_json::json!([1]));
    }

    #[test]
    fn admin_flag_persists_across_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = StateStore::open(&path);
        store.set_admin(true).unwrap();
        assert!(StateStore::open(&path).is_admin());

        store.set_admin(false).unwrap();
        assert!(!StateStore::open(&path).is_admin());
    }

    #[test]
    fn legacy_state_without_opened_list_parses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"adminMode": true}"#).unwrap();
        let store = StateStore::open(&path);
        assert!(store.is_admin());
        assert!(store.opened().is_empty());
    }
}
