use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::PipelineError;

/// Environment variables that override the config file.
pub const URL_ENV: &str = "URL";
pub const DOWNLOAD_FOLDER_ENV: &str = "DOWNLOAD_FOLDER";
pub const OUTPUT_FOLDER_ENV: &str = "OUTPUT_FOLDER";
pub const LOG_FOLDER_ENV: &str = "LOG_FOLDER";
pub const DAILY_AT_ENV: &str = "DAILY_AT";

/// HTTP transport parameters (optional `[http]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout in seconds (archives can be large).
    pub timeout_secs: u64,
    /// Maximum number of redirects to follow.
    pub max_redirections: u32,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 3600,
            max_redirections: 10,
            user_agent: concat!("scanpull/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/scanpull/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanpullConfig {
    /// Root of the remote directory tree holding dated dataset folders.
    #[serde(default)]
    pub url: Option<String>,
    /// Where the `.xz` archive and the extracted `.csv` are kept.
    pub download_dir: PathBuf,
    /// Where the final address list is written.
    pub output_dir: PathBuf,
    /// Log directory; None = XDG state dir.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Local time of day (`HH:MM`) for `scanpull daily`.
    #[serde(default)]
    pub daily_at: Option<String>,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for ScanpullConfig {
    fn default() -> Self {
        Self {
            url: None,
            download_dir: PathBuf::from("downloads"),
            output_dir: PathBuf::from("output"),
            log_dir: None,
            daily_at: None,
            http: HttpConfig::default(),
        }
    }
}

impl ScanpullConfig {
    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(URL_ENV) {
            self.url = Some(url);
        }
        if let Some(dir) = get(DOWNLOAD_FOLDER_ENV) {
            self.download_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get(OUTPUT_FOLDER_ENV) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get(LOG_FOLDER_ENV) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(at) = get(DAILY_AT_ENV) {
            self.daily_at = Some(at);
        }
    }

    /// Root URL, or `ConfigMissing` when no layer provided one.
    pub fn root_url(&self) -> Result<&str, PipelineError> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(PipelineError::ConfigMissing("URL"))
    }

    /// Log directory: configured one, else `~/.local/state/scanpull/logs`.
    pub fn resolved_log_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.log_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("scanpull")?;
        Ok(xdg_dirs.get_state_home().join("logs"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("scanpull")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
/// Environment overrides are applied on top.
pub fn load_or_init() -> Result<ScanpullConfig> {
    let path = config_path()?;
    let mut cfg = if !path.exists() {
        let default_cfg = ScanpullConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        default_cfg
    } else {
        let data = fs::read_to_string(&path)?;
        toml::from_str(&data)?
    };
    cfg.apply_env();
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_values() {
        let cfg = ScanpullConfig::default();
        assert!(cfg.url.is_none());
        assert_eq!(cfg.download_dir, PathBuf::from("downloads"));
        assert_eq!(cfg.output_dir, PathBuf::from("output"));
        assert_eq!(cfg.http.connect_timeout_secs, 30);
        assert_eq!(cfg.http.max_redirections, 10);
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut cfg = ScanpullConfig::default();
        cfg.url = Some("https://scans.example.net/ipv6".to_string());
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ScanpullConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.url, cfg.url);
        assert_eq!(parsed.download_dir, cfg.download_dir);
        assert_eq!(parsed.http.timeout_secs, cfg.http.timeout_secs);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            url = "https://scans.example.net/ipv6"
            download_dir = "/var/lib/scanpull/dl"
            output_dir = "/var/lib/scanpull/out"
            daily_at = "04:30"

            [http]
            connect_timeout_secs = 5
            timeout_secs = 600
            max_redirections = 3
            user_agent = "scanpull-test"
        "#;
        let cfg: ScanpullConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.root_url().unwrap(), "https://scans.example.net/ipv6");
        assert_eq!(cfg.download_dir, PathBuf::from("/var/lib/scanpull/dl"));
        assert_eq!(cfg.daily_at.as_deref(), Some("04:30"));
        assert!(cfg.log_dir.is_none());
        assert_eq!(cfg.http.max_redirections, 3);
    }

    #[test]
    fn http_section_optional() {
        let toml = r#"
            download_dir = "dl"
            output_dir = "out"
        "#;
        let cfg: ScanpullConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.http.timeout_secs, 3600);
        assert!(cfg.url.is_none());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = ScanpullConfig::default();
        cfg.url = Some("https://old.example".to_string());
        let env: HashMap<&str, &str> = [
            (URL_ENV, "https://new.example"),
            (DOWNLOAD_FOLDER_ENV, "/tmp/dl"),
            (LOG_FOLDER_ENV, "/tmp/logs"),
            (OUTPUT_FOLDER_ENV, ""),
        ]
        .into_iter()
        .collect();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.url.as_deref(), Some("https://new.example"));
        assert_eq!(cfg.download_dir, PathBuf::from("/tmp/dl"));
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/tmp/logs")));
        // empty value leaves the default
        assert_eq!(cfg.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn missing_url_is_config_missing() {
        let mut cfg = ScanpullConfig::default();
        assert!(matches!(
            cfg.root_url(),
            Err(PipelineError::ConfigMissing("URL"))
        ));
        cfg.url = Some("   ".to_string());
        assert!(cfg.root_url().is_err());
    }
}
