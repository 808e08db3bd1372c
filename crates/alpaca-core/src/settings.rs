//! Typed bootstrap settings read from the environment chain
//!
//! Settings are read lazily and in stages: the repository settings before
//! synchronization, the coordination-service settings after the synced file
//! layers have been installed, so those layers can supply them.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alpaca_git::TransportOptions;
use alpaca_namespace::ConnectSettings;

use crate::{Environment, Error, Result};

pub const APPLICATION_NAME_KEY: &str = "alpaca.application.name";

pub const CONFIG_URI_KEY: &str = "alpaca.config.uri";
pub const CONFIG_USERNAME_KEY: &str = "alpaca.config.username";
pub const CONFIG_PASSWORD_KEY: &str = "alpaca.config.password";
pub const CONFIG_LABEL_KEY: &str = "alpaca.config.label";
pub const CONFIG_BASEDIR_KEY: &str = "alpaca.config.basedir";
pub const CONFIG_TIMEOUT_KEY: &str = "alpaca.config.timeout-secs";
pub const HTTP_PROXY_KEY: &str = "alpaca.http-proxy";
/// Process environment variable consulted when [`HTTP_PROXY_KEY`] is unset.
pub const HTTP_PROXY_ENV: &str = "alpaca_http_proxy";

pub const ZK_CONNECT_STRING_KEY: &str = "alpaca.zookeeper.connect-string";
pub const ZK_BASE_SLEEP_KEY: &str = "alpaca.zookeeper.base-sleep-ms";
pub const ZK_MAX_RETRIES_KEY: &str = "alpaca.zookeeper.max-retries";
pub const ZK_MAX_SLEEP_KEY: &str = "alpaca.zookeeper.max-sleep-ms";
pub const ZK_CONNECT_WAIT_KEY: &str = "alpaca.zookeeper.connect-wait";
pub const ZK_CONNECT_WAIT_UNIT_KEY: &str = "alpaca.zookeeper.connect-wait-unit";

pub const DEFAULT_LABEL: &str = "master";

/// Where and how to synchronize the configuration repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySettings {
    pub uri: String,
    pub label: String,
    pub basedir: PathBuf,
    pub transport: TransportOptions,
}

impl RepositorySettings {
    /// Read repository settings, or `None` when no URI is configured.
    pub fn from_environment(environment: &Environment) -> Result<Option<Self>> {
        let Some(uri) = non_empty(environment, CONFIG_URI_KEY) else {
            return Ok(None);
        };

        let timeout_secs: u64 = parse_or(environment, CONFIG_TIMEOUT_KEY, 5)?;
        let proxy = non_empty(environment, HTTP_PROXY_KEY)
            .or_else(|| std::env::var(HTTP_PROXY_ENV).ok().filter(|v| !v.trim().is_empty()));

        Ok(Some(Self {
            uri,
            label: non_empty(environment, CONFIG_LABEL_KEY).unwrap_or_else(|| DEFAULT_LABEL.into()),
            basedir: non_empty(environment, CONFIG_BASEDIR_KEY)
                .map(PathBuf::from)
                .unwrap_or_else(default_basedir),
            transport: TransportOptions {
                username: environment
                    .get_property(CONFIG_USERNAME_KEY)
                    .unwrap_or_default()
                    .to_string(),
                password: environment
                    .get_property(CONFIG_PASSWORD_KEY)
                    .unwrap_or_default()
                    .to_string(),
                proxy,
                timeout: Duration::from_secs(timeout_secs),
            },
        }))
    }
}

/// Working copy location used when none is configured.
pub fn default_basedir() -> PathBuf {
    std::env::temp_dir().join("alpaca")
}

/// Unit for `alpaca.zookeeper.connect-wait`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUnit {
    Milliseconds,
    Seconds,
    Minutes,
}

impl WaitUnit {
    pub fn duration(self, amount: u64) -> Duration {
        match self {
            WaitUnit::Milliseconds => Duration::from_millis(amount),
            WaitUnit::Seconds => Duration::from_secs(amount),
            WaitUnit::Minutes => Duration::from_secs(amount.saturating_mul(60)),
        }
    }
}

impl FromStr for WaitUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ms" | "millis" | "milliseconds" => Ok(WaitUnit::Milliseconds),
            "s" | "secs" | "seconds" => Ok(WaitUnit::Seconds),
            "m" | "min" | "minutes" => Ok(WaitUnit::Minutes),
            other => Err(format!("unknown time unit '{other}'")),
        }
    }
}

/// Everything bootstrap reads from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapSettings {
    pub application_name: String,
    pub repository: Option<RepositorySettings>,
    pub connect: ConnectSettings,
}

impl BootstrapSettings {
    /// Read all settings at once from the current chain.
    pub fn from_environment(environment: &Environment) -> Result<Self> {
        Ok(Self {
            application_name: Self::application_name(environment)?,
            repository: RepositorySettings::from_environment(environment)?,
            connect: Self::connect_settings(environment)?,
        })
    }

    /// The required application name.
    pub fn application_name(environment: &Environment) -> Result<String> {
        non_empty(environment, APPLICATION_NAME_KEY).ok_or(Error::MissingApplicationName {
            key: APPLICATION_NAME_KEY,
        })
    }

    /// Coordination-service connection settings.
    pub fn connect_settings(environment: &Environment) -> Result<ConnectSettings> {
        let defaults = ConnectSettings::default();

        let wait: u64 = parse_or(environment, ZK_CONNECT_WAIT_KEY, 10)?;
        let unit: WaitUnit = parse_or(environment, ZK_CONNECT_WAIT_UNIT_KEY, WaitUnit::Seconds)?;

        Ok(ConnectSettings {
            connect_string: non_empty(environment, ZK_CONNECT_STRING_KEY)
                .unwrap_or(defaults.connect_string),
            base_sleep: Duration::from_millis(parse_or(environment, ZK_BASE_SLEEP_KEY, 50)?),
            max_retries: parse_or(environment, ZK_MAX_RETRIES_KEY, defaults.max_retries)?,
            max_sleep: Duration::from_millis(parse_or(environment, ZK_MAX_SLEEP_KEY, 500)?),
            connect_wait: unit.duration(wait),
        })
    }
}

fn non_empty(environment: &Environment, key: &str) -> Option<String> {
    environment
        .get_property(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn parse_or<T>(environment: &Environment, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: ToString,
{
    match non_empty(environment, key) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| Error::invalid_setting(key, &raw, e)),
        None => Ok(default),
    }
}
