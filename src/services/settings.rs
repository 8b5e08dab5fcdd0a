use crate::domain::models::SettingsFile;
use crate::services::fleet::{Auth, FleetConfig};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("Kibana host not set (use --kibana-host, FLEETDUMP_KIBANA_HOST or kibana_host in ~/.config/fleetdump/config.json)")]
    MissingHost,
    #[error("both an API key and a username are set; use one of them")]
    ConflictingAuth,
    #[error("password given without a username")]
    PasswordWithoutUsername,
    #[error("could not read settings file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Connection values given on the command line (or their env fallbacks).
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub kibana_host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub insecure: bool,
    pub timeout_secs: Option<u64>,
}

/// Settings file location; `None` when `HOME` is unset, meaning no file.
pub fn settings_path() -> Option<PathBuf> {
    settings_path_in(std::env::var_os("HOME").as_deref())
}

fn settings_path_in(home: Option<&OsStr>) -> Option<PathBuf> {
    home.filter(|h| !h.is_empty())
        .map(|h| PathBuf::from(h).join(".config/fleetdump/config.json"))
}

pub fn load_settings(path: &Path) -> Result<SettingsFile, SettingsError> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SettingsError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Merges flags over the settings file into a client configuration.
pub fn resolve(overrides: Overrides, file: SettingsFile) -> Result<FleetConfig, SettingsError> {
    let host = overrides
        .kibana_host
        .or(file.kibana_host)
        .filter(|h| !h.trim().is_empty())
        .ok_or(SettingsError::MissingHost)?;
    let username = overrides.username.or(file.username);
    let password = overrides.password.or(file.password);
    let api_key = overrides.api_key.or(file.api_key);

    let auth = match (api_key, username, password) {
        (Some(_), Some(_), _) => return Err(SettingsError::ConflictingAuth),
        (Some(key), None, _) => Auth::ApiKey(key),
        (None, Some(username), password) => Auth::Basic {
            username,
            password: password.unwrap_or_default(),
        },
        (None, None, Some(_)) => return Err(SettingsError::PasswordWithoutUsername),
        (None, None, None) => Auth::None,
    };

    Ok(FleetConfig {
        host,
        auth,
        insecure: overrides.insecure || file.insecure.unwrap_or(false),
        timeout: Duration::from_secs(
            overrides
                .timeout_secs
                .or(file.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        ),
    })
}
