use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("profile \"{0}\" is not defined in config.toml")]
    UnknownProfile(String),
    #[error("no Passwordstate URL configured; pass --url or set PWSTATE_URL")]
    MissingUrl,
    #[error("invalid Passwordstate URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("no API key configured; pass --api-key or set PWSTATE_API_KEY")]
    MissingApiKey,
    #[error("invalid value \"{value}\" for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Header the API key is sent in. Deployments disagree on the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeaderStyle {
    /// `api_key: <secret>`
    #[default]
    #[serde(rename = "api_key")]
    Snake,
    /// `APIKey: <secret>`
    #[serde(rename = "APIKey")]
    Pascal,
}

impl HeaderStyle {
    pub fn header_name(self) -> &'static str {
        match self {
            HeaderStyle::Snake => "api_key",
            HeaderStyle::Pascal => "APIKey",
        }
    }
}

impl FromStr for HeaderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "api_key" | "api-key" | "snake" => Ok(HeaderStyle::Snake),
            "APIKey" | "apikey" | "pascal" => Ok(HeaderStyle::Pascal),
            other => Err(format!("unknown header style \"{other}\" (expected api_key or APIKey)")),
        }
    }
}

impl fmt::Display for HeaderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_name())
    }
}

/// Where the password ID goes on update. It is always echoed in the body;
/// `Path` additionally keys the URL by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateRoute {
    /// `PUT /api/passwords/`
    #[default]
    Body,
    /// `PUT /api/passwords/{id}`
    Path,
}

impl FromStr for UpdateRoute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "body" => Ok(UpdateRoute::Body),
            "path" => Ok(UpdateRoute::Path),
            other => Err(format!("unknown update route \"{other}\" (expected body or path)")),
        }
    }
}

impl fmt::Display for UpdateRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateRoute::Body => f.write_str("body"),
            UpdateRoute::Path => f.write_str("path"),
        }
    }
}

/// On-disk `config.toml`. The API key is never read from it.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub url: Option<String>,
    pub header_style: Option<HeaderStyle>,
    pub update_route: Option<UpdateRoute>,
    pub timeout_secs: Option<u64>,

    pub default_profile: Option<String>,
    pub profiles: Option<HashMap<String, FileProfileConfig>>,
}

/// A named Passwordstate deployment.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FileProfileConfig {
    pub url: Option<String>,
    pub header_style: Option<HeaderStyle>,
    pub update_route: Option<UpdateRoute>,
}

/// Values supplied on the command line; each wins over env and file.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub api_key: Option<SecretString>,
    pub header_style: Option<HeaderStyle>,
    pub update_route: Option<UpdateRoute>,
    pub timeout_secs: Option<u64>,
    pub profile: Option<String>,
}

/// Connection settings for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub api_key: SecretString,
    pub header_style: HeaderStyle,
    pub update_route: UpdateRoute,
    pub timeout: Duration,
}

impl Config {
    /// Resolve settings with precedence CLI > env > profile > config file > default.
    pub fn create(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let file_cfg = load_file_config();
        Self::resolve(overrides, &file_cfg)
    }

    pub fn resolve(overrides: ConfigOverrides, file_cfg: &FileConfig) -> Result<Self, ConfigError> {
        let profile = select_profile(overrides.profile.as_deref(), file_cfg)?;

        let url = overrides
            .url
            .or_else(|| env::var("PWSTATE_URL").ok())
            .or_else(|| profile.as_ref().and_then(|p| p.url.clone()))
            .or_else(|| file_cfg.url.clone())
            .ok_or(ConfigError::MissingUrl)?;
        let url = normalize_url(&url)?;

        let api_key = overrides
            .api_key
            .or_else(|| env::var("PWSTATE_API_KEY").ok().map(SecretString::from))
            .ok_or(ConfigError::MissingApiKey)?;

        let header_style = match overrides.header_style {
            Some(h) => h,
            None => match env_parsed::<HeaderStyle>("PWSTATE_HEADER_STYLE")? {
                Some(h) => h,
                None => profile
                    .as_ref()
                    .and_then(|p| p.header_style)
                    .or(file_cfg.header_style)
                    .unwrap_or_default(),
            },
        };

        let update_route = match overrides.update_route {
            Some(r) => r,
            None => match env_parsed::<UpdateRoute>("PWSTATE_UPDATE_ROUTE")? {
                Some(r) => r,
                None => profile
                    .as_ref()
                    .and_then(|p| p.update_route)
                    .or(file_cfg.update_route)
                    .unwrap_or_default(),
            },
        };

        let timeout_secs = match overrides.timeout_secs {
            Some(t) => t,
            None => env_parsed::<u64>("PWSTATE_TIMEOUT_SECS")?
                .or(file_cfg.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Config {
            url,
            api_key,
            header_style,
            update_route,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn select_profile(
    cli_profile: Option<&str>,
    file_cfg: &FileConfig,
) -> Result<Option<FileProfileConfig>, ConfigError> {
    let lookup = |name: &str| {
        file_cfg
            .profiles
            .as_ref()
            .and_then(|profiles| profiles.get(name))
            .cloned()
    };

    if let Some(name) = cli_profile {
        return lookup(name)
            .map(Some)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()));
    }

    if let Ok(name) = env::var("PWSTATE_PROFILE") {
        return lookup(&name)
            .map(Some)
            .ok_or(ConfigError::UnknownProfile(name));
    }

    // A default_profile pointing at a missing profile is ignored.
    Ok(file_cfg.default_profile.as_deref().and_then(lookup))
}

fn env_parsed<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(None),
    }
}

/// Validate the base URL and strip trailing slashes so `/api/...` can be appended.
pub fn normalize_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

fn load_file_config() -> FileConfig {
    // PWSTATE_CONFIG_DIR overrides the platform config dir
    let cfg_dir = if let Ok(p) = env::var("PWSTATE_CONFIG_DIR") {
        PathBuf::from(p)
    } else {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
    };
    let path = cfg_dir.join("pwstate").join("config.toml");
    match std::fs::read_to_string(&path) {
        Ok(s) => match toml::from_str::<FileConfig>(&s) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                FileConfig::default()
            }
        },
        Err(_) => FileConfig::default(),
    }
}
