use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[[:alpha:]]+$").unwrap());

// 10-127 printable characters from the usual password charset
static PASSWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[a-zA-Z0-9{}()\[\]\#:;^,.?!|\&_`\~@$%/\\=+\-*"' ]{10,127}$"#).unwrap()
});

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[[:xdigit:]]{64}$").unwrap());

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub digitalocean_token: String,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Header set by the reverse proxy with the caller's address.
    #[serde(default = "default_origin_ip_header")]
    pub origin_ip_header: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9096
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_origin_ip_header() -> String {
    "x-real-ip".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            origin_ip_header: default_origin_ip_header(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid username: must be alphabetic")]
    InvalidUsername,
    #[error("invalid password: 10-127 characters of letters, digits, space or common punctuation")]
    InvalidPassword,
    #[error("invalid digitalocean_token: must be 64 hex digits")]
    InvalidToken,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Loads the config file. If none exists a blank one is written and an
    /// error is returned.
    pub fn load_or_init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match fs::metadata(path) {
            Ok(_) => Self::load(path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Config::default()
                    .write(path)
                    .context("Failed to create blank config file")?;
                bail!(
                    "No config file exists. Blank config file created at {}",
                    path.display()
                );
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to stat config file: {}", path.display())),
        }
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let buf = serde_json::to_string_pretty(self)?;
        fs::write(path, buf)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !USERNAME_RE.is_match(&self.username) {
            return Err(ConfigError::InvalidUsername);
        }
        if !PASSWORD_RE.is_match(&self.password) {
            return Err(ConfigError::InvalidPassword);
        }
        if !TOKEN_RE.is_match(&self.digitalocean_token) {
            return Err(ConfigError::InvalidToken);
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("digitalocean_token", &"<REDACTED>")
            .field("server", &self.server)
            .finish()
    }
}
