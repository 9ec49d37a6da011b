use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// XDG prefix shared by config, state and data directories.
pub const APP_PREFIX: &str = "remotestash";

/// Global configuration loaded from `~/.config/remotestash/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StashConfig {
    /// Directory holding `contents.json` and content files. Defaults to the XDG data dir.
    #[serde(default)]
    pub stash_dir: Option<PathBuf>,
    /// Advertised service name; defaults to "<user> remote stash".
    #[serde(default)]
    pub service_name: Option<String>,
    /// Address the server binds to and advertises; defaults to the primary LAN address.
    #[serde(default)]
    pub address: Option<IpAddr>,
    /// Server port; None picks a free port.
    #[serde(default)]
    pub port: Option<u16>,
    /// PEM private key for HTTPS. Defaults to `homeweb.key` in the stash dir.
    #[serde(default)]
    pub tls_key: Option<PathBuf>,
    /// PEM certificate chain for HTTPS. Defaults to `homeweb.crt` in the stash dir.
    #[serde(default)]
    pub tls_cert: Option<PathBuf>,
    /// How long remote commands browse for a stash before giving up.
    pub discovery_timeout_ms: u64,
    /// Total timeout for one remote request, also the server's socket
    /// timeout. 0 disables it.
    pub request_timeout_secs: u64,
    /// Largest request body the server accepts.
    pub max_body_bytes: u64,
}

impl Default for StashConfig {
    fn default() -> Self {
        Self {
            stash_dir: None,
            service_name: None,
            address: None,
            port: None,
            tls_key: None,
            tls_cert: None,
            discovery_timeout_ms: 3000,
            request_timeout_secs: 30,
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

impl StashConfig {
    /// Stash directory: explicit override, then config, then `~/.local/share/remotestash`.
    pub fn resolve_stash_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.stash_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_PREFIX)?;
        Ok(xdg_dirs.get_data_home())
    }

    /// `request_timeout_secs` as a duration; None when set to 0.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Key and certificate paths for HTTPS, if both exist on disk.
    pub fn tls_paths(&self, stash_dir: &Path) -> Option<(PathBuf, PathBuf)> {
        let key = self
            .tls_key
            .clone()
            .unwrap_or_else(|| stash_dir.join("homeweb.key"));
        let cert = self
            .tls_cert
            .clone()
            .unwrap_or_else(|| stash_dir.join("homeweb.crt"));
        if key.is_file() && cert.is_file() {
            Some((key, cert))
        } else {
            None
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_PREFIX)?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<StashConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = StashConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: StashConfig = toml::from_str(&data)?;
    Ok(cfg)
}
