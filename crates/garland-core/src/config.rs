//! Configuration model and helpers used by the Garland binaries.

use crate::error::{GarlandError, GarlandResult};
use chrono_tz::Tz;
use directories_next::ProjectDirs;
use log::{info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "garland.toml";
const STATE_PATH_ENV: &str = "GARLAND_STATE_PATH";
const BOOTSTRAP_FILE_NAME: &str = "garland.toml";
const APP_QUALIFIER: &str = "io";
const APP_ORGANIZATION: &str = "Garland";
const APP_NAME: &str = "garland";

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
}

fn default_time_zone() -> String {
    "America/Toronto".to_string()
}

fn default_catalog_path() -> String {
    "content/days.json".to_string()
}

fn default_passphrase_path() -> String {
    "content/passphrases.json".to_string()
}

fn default_admin_secret() -> String {
    "admin123".to_string()
}

fn default_state_path() -> String {
    project_dirs()
        .map(|dirs| {
            dirs.data_local_dir()
                .join("state.json")
                .to_string_lossy()
                .into_owned()
        })
        .unwrap_or_else(|| "garland-state.json".to_string())
}

/// Where the calendar content lives and which zone drives the schedule.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CalendarCfg {
    /// IANA time zone the unlock schedule is evaluated in. Every viewer sees
    /// the same schedule regardless of their local zone.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    #[serde(default = "default_passphrase_path")]
    pub passphrase_path: String,
}

impl Default for CalendarCfg {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            catalog_path: default_catalog_path(),
            passphrase_path: default_passphrase_path(),
        }
    }
}

/// Shared admin secret that flips the display bypass.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AdminCfg {
    /// Compared exactly (case-sensitive) against prompted input.
    #[serde(default = "default_admin_secret")]
    pub secret: String,
}

impl Default for AdminCfg {
    fn default() -> Self {
        Self {
            secret: default_admin_secret(),
        }
    }
}

/// Where the unlock ledger and admin flag persist.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StorageCfg {
    #[serde(default = "default_state_path")]
    pub state_path: String,
}

impl Default for StorageCfg {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
        }
    }
}

/// Top-level configuration snapshot loaded from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GarlandConfig {
    #[serde(default)]
    pub calendar: CalendarCfg,

    #[serde(default)]
    pub admin: AdminCfg,

    #[serde(default)]
    pub storage: StorageCfg,

    #[serde(skip)]
    pub path: PathBuf,

    #[serde(skip)]
    pub format: ConfigFormat,
}

/// Tracks whether we parsed TOML or YAML so writes preserve format.
#[derive(Debug, Clone, Copy, Default, JsonSchema)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Yaml,
}

impl GarlandConfig {
    /// Return the conventional configuration path next to the content files.
    pub fn default_path() -> &'static Path {
        Path::new(DEFAULT_CONFIG_PATH)
    }

    /// Resolve the per-user configuration path used for bootstrapping.
    pub fn user_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(BOOTSTRAP_FILE_NAME))
    }

    /// Load configuration from disk, creating a bootstrap copy when missing.
    ///
    /// If the requested path does not exist, a commented template is written
    /// there. When the caller requests the conventional default and the
    /// location is not writable, a per-user configuration is written to the
    /// platform config directory instead.
    pub fn load_or_bootstrap<P: AsRef<Path>>(path: P) -> GarlandResult<Self> {
        let target = path.as_ref();
        if target.exists() {
            return Self::load(target);
        }

        match ensure_bootstrap_file(target) {
            Ok(created) => {
                if created {
                    info!("garland config bootstrap created at {}", target.display());
                }
                Self::load(target)
            }
            Err(err) => {
                if target != Self::default_path() {
                    return Err(GarlandError::InvalidConfig(format!(
                        "failed to initialise configuration at {}: {err}",
                        target.display()
                    )));
                }

                let user_path = Self::user_config_path().ok_or_else(|| {
                    GarlandError::InvalidConfig(
                        "unable to determine user configuration directory; \
                        create garland.toml manually"
                            .to_string(),
                    )
                })?;

                let created_user = ensure_bootstrap_file(&user_path).map_err(|io_err| {
                    GarlandError::InvalidConfig(format!(
                        "failed to prepare bootstrap configuration at {}: {io_err}",
                        user_path.display()
                    ))
                })?;

                if created_user {
                    info!(
                        "garland config bootstrap created at {}",
                        user_path.display()
                    );
                }

                warn!(
                    "configuration missing at {}; using per-user bootstrap at {}",
                    target.display(),
                    user_path.display()
                );

                Self::load(&user_path)
            }
        }
    }

    /// Read a config file from disk, detect format, and validate basics.
    pub fn load<P: AsRef<Path>>(path: P) -> GarlandResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let is_toml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some(ext) if ext.eq_ignore_ascii_case("toml")
        );
        let mut cfg = if is_toml {
            toml::from_str::<Self>(&contents)?
        } else {
            serde_yaml::from_str::<Self>(&contents)?
        };

        cfg.path = path.to_path_buf();
        cfg.format = if is_toml {
            ConfigFormat::Toml
        } else {
            ConfigFormat::Yaml
        };

        cfg.zone()?;

        Ok(cfg)
    }

    /// Parse the configured time zone.
    pub fn zone(&self) -> GarlandResult<Tz> {
        self.calendar.time_zone.parse::<Tz>().map_err(|_| {
            GarlandError::InvalidConfig(format!(
                "calendar.time_zone is not a known IANA zone: {}",
                self.calendar.time_zone
            ))
        })
    }

    pub fn catalog_path(&self) -> PathBuf {
        PathBuf::from(&self.calendar.catalog_path)
    }

    pub fn passphrase_path(&self) -> PathBuf {
        PathBuf::from(&self.calendar.passphrase_path)
    }

    /// Resolve where the unlock ledger and admin flag live.
    pub fn state_path(&self) -> PathBuf {
        if let Ok(override_path) = env::var(STATE_PATH_ENV) {
            if !override_path.is_empty() {
                return PathBuf::from(override_path);
            }
        }
        PathBuf::from(&self.storage.state_path)
    }

    /// Perform a best-effort validation pass and return human-readable issues.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.calendar.time_zone.trim().is_empty() {
            issues.push("calendar.time_zone must not be empty".to_string());
        } else if self.calendar.time_zone.parse::<Tz>().is_err() {
            issues.push(format!(
                "calendar.time_zone is not a known IANA zone: {}",
                self.calendar.time_zone
            ));
        }

        if self.calendar.catalog_path.trim().is_empty() {
            issues.push("calendar.catalog_path must not be empty".to_string());
        }
        if self.calendar.passphrase_path.trim().is_empty() {
            issues.push("calendar.passphrase_path must not be empty".to_string());
        }

        if self.admin.secret.is_empty() {
            issues.push("admin.secret must not be empty".to_string());
        } else if self.admin.secret == default_admin_secret() {
            issues.push("admin.secret still uses the bootstrap default; replace it".to_string());
        }

        if self.storage.state_path.trim().is_empty() {
            issues.push("storage.state_path must not be empty".to_string());
        }

        issues
    }

    /// Persist the configuration back to its original on-disk format.
    pub fn save(&self) -> GarlandResult<()> {
        let payload = match self.format {
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
        };
        fs::write(&self.path, payload)?;
        Ok(())
    }
}

/// Render the commented bootstrap configuration template.
pub fn bootstrap_template() -> String {
    format!(
        "# Auto-generated Garland configuration bootstrap.\n\
         # Customize these values before sharing the calendar.\n\
         \n\
         [calendar]\n\
         # All unlock dates are evaluated in this zone so every viewer sees\n\
         # the same schedule.\n\
         time_zone = \"{}\"\n\
         catalog_path = \"{}\"\n\
         passphrase_path = \"{}\"\n\
         \n\
         [admin]\n\
         # Shared secret for the all-unlocked display bypass. Replace it.\n\
         secret = \"{}\"\n\
         \n\
         [storage]\n\
         # Unlock ledger and admin flag persist here.\n\
         state_path = \"{}\"\n",
        default_time_zone(),
        default_catalog_path(),
        default_passphrase_path(),
        default_admin_secret(),
        default_state_path(),
    )
}

fn ensure_bootstrap_file(path: &Path) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    match OpenOptions::new().create_new(true).write(true).open(path) {
        Ok(mut file) => {
            file.write_all(bootstrap_template().as_bytes())?;
            file.flush()?;
            Ok(true)
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(err),
    }
}
