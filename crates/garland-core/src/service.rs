//! Service facade tying the catalog, gate engine, and state store together.
//!
//! The service owns the single mutable application state (catalog, ledger,
//! admin flag) and threads it through the pure gate functions, so nothing
//! here relies on ambient globals. Classifications are never cached: callers
//! rerun `render_pass` after every mutation.

use crate::catalog::{self, Catalog, Media, Ornament};
use crate::config::GarlandConfig;
use crate::error::{GarlandError, GarlandResult};
use crate::gate::{self, GateState, UnlockOutcome};
use crate::store::StateStore;
use chrono::NaiveDate;
use log::info;
use std::sync::Arc;

/// What the presentation layer should render for one ornament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderIntent {
    /// Date has not arrived; show when it will.
    Locked { unlock_date: NaiveDate },
    /// Date arrived but the gate is still closed; show passphrase entry.
    Gate {
        year: String,
        hint: Option<String>,
    },
    /// Fully revealed content.
    Content(ContentView),
}

/// Rendered view of an opened ornament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentView {
    pub date: NaiveDate,
    pub year: String,
    title: Option<String>,
    body: Option<String>,
    pub media: Option<Media>,
}

impl ContentView {
    fn from_ornament(ornament: &Ornament) -> Self {
        Self {
            date: ornament.date,
            year: ornament.year.clone(),
            title: ornament.title.clone(),
            body: ornament.body.clone(),
            media: ornament.media.clone(),
        }
    }

    /// Title, falling back to the calendar's stock phrasing.
    pub fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("A memory from {}", self.year))
    }

    /// Body text, falling back to the placeholder paragraph.
    pub fn body(&self) -> String {
        self.body.clone().unwrap_or_else(|| {
            "Placeholder: a short, tender paragraph about this year will live here. \
             It should feel warm, honest, and intimate."
                .to_string()
        })
    }
}

/// One ornament's derived state for a single render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrnamentView {
    pub index: usize,
    pub state: GateState,
    pub intent: RenderIntent,
}

/// Outcome of a passphrase attempt routed through the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockReport {
    pub outcome: UnlockOutcome,
    /// Set when the mutation can change other ornaments' visual state, so
    /// the caller must re-render everything.
    pub refresh_all: bool,
}

/// Result of offering input to the admin prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminPromptOutcome {
    /// Secret matched; admin mode is now on and persisted.
    Enabled,
    /// Non-empty input that did not match; report as a failure.
    Mismatch,
    /// Cancelled or empty input; nothing happened, nothing to report.
    NoAction,
}

pub struct GarlandService {
    config: Arc<GarlandConfig>,
    catalog: Catalog,
    store: StateStore,
}

impl GarlandService {
    pub fn new(config: Arc<GarlandConfig>, catalog: Catalog, store: StateStore) -> Self {
        Self {
            config,
            catalog,
            store,
        }
    }

    /// Load content and state as configured.
    ///
    /// The two sources load in order (catalog, then passphrases) and each
    /// degrades to empty on failure, so the calendar always comes up — with
    /// an empty catalog in the worst case.
    pub fn load(config: Arc<GarlandConfig>) -> Self {
        let ornaments = catalog::load_ornaments(&config.catalog_path());
        let passphrases = catalog::load_passphrases(&config.passphrase_path());
        let catalog = Catalog::assemble(ornaments, passphrases);
        info!(
            "loaded {} ornaments ({} with passphrases)",
            catalog.len(),
            (0..catalog.len())
                .filter(|&i| catalog.passphrase(i).is_some())
                .count()
        );

        let store = StateStore::open(config.state_path());
        Self::new(config, catalog, store)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Classify every ornament against one shared `today`.
    ///
    /// `today` is taken as a parameter rather than read from a clock here so
    /// a render pass cannot straddle a midnight boundary.
    pub fn render_pass(&self, today: NaiveDate) -> Vec<OrnamentView> {
        let admin = self.store.is_admin();
        let latest = gate::latest_unlocked_index(&self.catalog, today, admin);
        let ledger = self.store.opened();

        self.catalog
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let state = gate::classify(index, latest, ledger, admin);
                let intent = match state {
                    GateState::Locked => RenderIntent::Locked {
                        unlock_date: entry.ornament.date,
                    },
                    GateState::Gated => RenderIntent::Gate {
                        year: entry.ornament.year.clone(),
                        hint: entry.ornament.passphrase_hint.clone(),
                    },
                    GateState::Opened => {
                        RenderIntent::Content(ContentView::from_ornament(&entry.ornament))
                    }
                };
                OrnamentView {
                    index,
                    state,
                    intent,
                }
            })
            .collect()
    }

    /// Evaluate a passphrase attempt for `index` and record a success.
    ///
    /// Verification itself is pure; the ledger insert happens here, once, on
    /// `Success`. Admin mode is irrelevant on this path — it bypasses the
    /// gate display, never the check against a real attempt. Admin viewing
    /// also never writes the ledger.
    pub fn attempt_unlock(&mut self, index: usize, attempt: &str) -> GarlandResult<UnlockReport> {
        if index >= self.catalog.len() {
            return Err(GarlandError::OrnamentOutOfRange {
                index,
                len: self.catalog.len(),
            });
        }

        let outcome = gate::attempt_unlock(attempt, self.catalog.passphrase(index));
        if outcome == UnlockOutcome::Success {
            self.store.mark_opened(index)?;
            info!("ornament {index} opened");
        }

        Ok(UnlockReport {
            outcome,
            refresh_all: outcome == UnlockOutcome::Success,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.store.is_admin()
    }

    /// Persist the admin flag. Callers re-derive every ornament's state
    /// afterwards, since the toggle changes all of them at once.
    pub fn set_admin(&mut self, value: bool) -> GarlandResult<()> {
        self.store.set_admin(value)?;
        info!("admin mode {}", if value { "enabled" } else { "disabled" });
        Ok(())
    }

    /// Handle input from the admin secret prompt.
    ///
    /// `None` or empty input means the prompt was dismissed: no state change
    /// and no failure report. A non-empty mismatch is reported so the user
    /// knows the attempt failed. The comparison is exact and case-sensitive.
    pub fn try_enable_admin(&mut self, input: Option<&str>) -> GarlandResult<AdminPromptOutcome> {
        let Some(input) = input.filter(|value| !value.is_empty()) else {
            return Ok(AdminPromptOutcome::NoAction);
        };

        if input == self.config.admin.secret {
            self.set_admin(true)?;
            Ok(AdminPromptOutcome::Enabled)
        } else {
            Ok(AdminPromptOutcome::Mismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdminCfg, GarlandConfig, StorageCfg};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn sample_config(state_path: &Path) -> Arc<GarlandConfig> {
        Arc::new(GarlandConfig {
            admin: AdminCfg {
                secret: "tinsel".into(),
            },
            storage: StorageCfg {
                state_path: state_path.to_string_lossy().into_owned(),
            },
            ..GarlandConfig::default()
        })
    }

    fn ornament(date: &str, hint: Option<&str>) -> Ornament {
        Ornament {
            date: date.parse().unwrap(),
            year: "2024".into(),
            title: None,
            body: None,
            passphrase_hint: hint.map(str::to_string),
            media: None,
        }
    }

    fn sample_service(dir: &Path) -> GarlandService {
        let config = sample_config(&dir.join("state.json"));
        let catalog = Catalog::assemble(
            vec![
                ornament("2024-12-01", None),
                ornament("2024-12-10", Some("where we met")),
                ornament("2024-12-25", None),
            ],
            vec!["alpha".into(), "snowfall".into(), "".into()],
        );
        let store = StateStore::open(config.state_path());
        GarlandService::new(config, catalog, store)
    }

    fn day(date: &str) -> NaiveDate {
        date.parse().unwrap()
    }

    #[test]
    fn render_pass_classifies_every_ornament_once() {
        let dir = tempdir().unwrap();
        let mut service = sample_service(dir.path());
        service.attempt_unlock(0, "alpha").unwrap();

        let views = service.render_pass(day("2024-12-10"));
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].state, GateState::Opened);
        assert!(matches!(views[0].intent, RenderIntent::Content(_)));
        assert_eq!(views[1].state, GateState::Gated);
        assert_eq!(
            views[1].intent,
            RenderIntent::Gate {
                year: "2024".into(),
                hint: Some("where we met".into()),
            }
        );
        assert_eq!(views[2].state, GateState::Locked);
        assert_eq!(
            views[2].intent,
            RenderIntent::Locked {
                unlock_date: day("2024-12-25"),
            }
        );
    }

    #[test]
    fn successful_unlock_persists_and_requests_refresh() {
        let dir = tempdir().unwrap();
        let mut service = sample_service(dir.path());

        let report = service.attempt_unlock(1, "  Snowfall ").unwrap();
        assert_eq!(report.outcome, UnlockOutcome::Success);
        assert!(report.refresh_all);

        // Reopen the store: the ledger write must already be on disk.
        let reopened = StateStore::open(dir.path().join("state.json"));
        assert!(reopened.is_opened(1));
    }

    #[test]
    fn mismatch_and_unavailable_do_not_touch_the_ledger() {
        let dir = tempdir().unwrap();
        let mut service = sample_service(dir.path());

        let report = service.attempt_unlock(1, "wrong guess").unwrap();
        assert_eq!(report.outcome, UnlockOutcome::Mismatch);
        assert!(!report.refresh_all);

        let report = service.attempt_unlock(2, "anything").unwrap();
        assert_eq!(report.outcome, UnlockOutcome::Unavailable);

        let reopened = StateStore::open(dir.path().join("state.json"));
        assert!(reopened.opened().is_empty());
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let dir = tempdir().unwrap();
        let mut service = sample_service(dir.path());
        let err = service.attempt_unlock(7, "alpha").unwrap_err();
        assert!(matches!(
            err,
            GarlandError::OrnamentOutOfRange { index: 7, len: 3 }
        ));
    }

    #[test]
    fn admin_mode_opens_everything_without_ledger_writes() {
        let dir = tempdir().unwrap();
        let mut service = sample_service(dir.path());
        service.set_admin(true).unwrap();

        let views = service.render_pass(day("2024-01-01"));
        assert!(views.iter().all(|v| v.state == GateState::Opened));

        // Display bypass only: nothing was recorded as opened.
        let reopened = StateStore::open(dir.path().join("state.json"));
        assert!(reopened.opened().is_empty());
        assert!(reopened.is_admin());
    }

    #[test]
    fn passphrase_checks_run_even_in_admin_mode() {
        let dir = tempdir().unwrap();
        let mut service = sample_service(dir.path());
        service.set_admin(true).unwrap();

        let report = service.attempt_unlock(1, "snowfall").unwrap();
        assert_eq!(report.outcome, UnlockOutcome::Success);
        let report = service.attempt_unlock(1, "nope").unwrap();
        assert_eq!(report.outcome, UnlockOutcome::Mismatch);
    }

    #[test]
    fn admin_prompt_distinguishes_mismatch_from_dismissal() {
        let dir = tempdir().unwrap();
        let mut service = sample_service(dir.path());

        assert_eq!(
            service.try_enable_admin(None).unwrap(),
            AdminPromptOutcome::NoAction
        );
        assert_eq!(
            service.try_enable_admin(Some("")).unwrap(),
            AdminPromptOutcome::NoAction
        );
        assert!(!service.is_admin());

        assert_eq!(
            service.try_enable_admin(Some("TINSEL")).unwrap(),
            AdminPromptOutcome::Mismatch,
            "secret comparison is case-sensitive"
        );
        assert!(!service.is_admin());

        assert_eq!(
            service.try_enable_admin(Some("tinsel")).unwrap(),
            AdminPromptOutcome::Enabled
        );
        assert!(service.is_admin());
    }

    #[test]
    fn empty_catalog_renders_without_crashing() {
        let dir = tempdir().unwrap();
        let config = sample_config(&dir.path().join("state.json"));
        let store = StateStore::open(config.state_path());
        let service = GarlandService::new(config, Catalog::default(), store);

        assert!(service.render_pass(day("2024-12-25")).is_empty());
    }

    #[test]
    fn load_degrades_missing_sources_to_empty() {
        let dir = tempdir().unwrap();
        let mut config = GarlandConfig::default();
        config.calendar.catalog_path = dir
            .path()
            .join("missing.json")
            .to_string_lossy()
            .into_owned();
        config.calendar.passphrase_path = dir
            .path()
            .join("also-missing.json")
            .to_string_lossy()
            .into_owned();
        config.storage.state_path = dir.path().join("state.json").to_string_lossy().into_owned();

        let service = GarlandService::load(Arc::new(config));
        assert!(service.catalog().is_empty());
    }

    #[test]
    fn load_pairs_sources_by_index() {
        let dir = tempdir().unwrap();
        let catalog_path = dir.path().join("days.json");
        let passphrase_path = dir.path().join("passphrases.json");
        fs::write(
            &catalog_path,
            r#"[{"date": "2024-12-01", "year": "2018"},
                {"date": "2024-12-02", "year": "2019"}]"#,
        )
        .unwrap();
        fs::write(&passphrase_path, r#"["alpha"]"#).unwrap();

        let mut config = GarlandConfig::default();
        config.calendar.catalog_path = catalog_path.to_string_lossy().into_owned();
        config.calendar.passphrase_path = passphrase_path.to_string_lossy().into_owned();
        config.storage.state_path = dir.path().join("state.json").to_string_lossy().into_owned();

        let service = GarlandService::load(Arc::new(config));
        assert_eq!(service.catalog().len(), 2);
        assert_eq!(service.catalog().passphrase(0), Some("alpha"));
        assert_eq!(service.catalog().passphrase(1), None);
    }

    #[test]
    fn content_view_falls_back_to_stock_copy() {
        let view = ContentView::from_ornament(&ornament("2024-12-01", None));
        assert_eq!(view.title(), "A memory from 2024");
        assert!(view.body().starts_with("Placeholder:"));
    }
}
