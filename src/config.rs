//! Bot configuration.

use crate::error::ConfigError;
use crate::recipient::{Recipient, Recipients};
use crate::serialize::empty_string_is_none;
use crate::types::{AppId, ContextId};
use std::path::Path;
use serde::Deserialize;

/// The environment variable containing the path to the configuration file.
pub const CONFIG_PATH_VAR: &str = "BOTS_CONFIG";

const DEFAULT_APPID: AppId = 730;
const DEFAULT_CONTEXTID: ContextId = 2;

/// Where a bot sends its items. Either a single SteamID/trade offer URL or a list of them.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Target {
    One(String),
    Many(Vec<String>),
}

impl Target {
    /// Parses the target into recipients.
    pub fn recipients(&self) -> Result<Option<Recipients>, ConfigError> {
        let recipients = match self {
            Self::One(target) => vec![target.parse::<Recipient>()?],
            Self::Many(targets) => targets
                .iter()
                .map(|target| target.parse::<Recipient>())
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Recipients::new(recipients))
    }
}

/// The configuration for one managed account.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// The account name used to log in.
    pub username: String,
    /// The account password.
    pub password: String,
    /// The shared secret for generating login codes.
    pub shared_secret: String,
    /// The identity secret for mobile confirmations.
    pub identity_secret: String,
    /// Where items are sent.
    pub target: Target,
    /// An optional `host:port` HTTP proxy.
    #[serde(default, deserialize_with = "empty_string_is_none")]
    pub proxy: Option<String>,
    /// The app of the inventory to forward.
    #[serde(default = "default_appid")]
    pub appid: AppId,
    /// The context of the inventory to forward.
    #[serde(default = "default_contextid")]
    pub contextid: ContextId,
}

fn default_appid() -> AppId {
    DEFAULT_APPID
}

fn default_contextid() -> ContextId {
    DEFAULT_CONTEXTID
}

impl BotConfig {
    /// The tag prefixed to every log line for this account.
    pub fn tag(&self) -> String {
        format!("[{}]", self.username)
    }

    /// Parses the recipients for this account. Fails if there are none.
    pub fn recipients(&self) -> Result<Recipients, ConfigError> {
        self.target.recipients()?
            .ok_or_else(|| ConfigError::NoRecipients(self.username.clone()))
    }

    /// The proxy URL for requests, if a proxy is configured.
    pub fn proxy_url(&self) -> Option<String> {
        self.proxy
            .as_ref()
            .map(|proxy| format!("http://{proxy}"))
    }
}

/// Configuration for all bots.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// The bots, in the order they were configured.
    pub bots: Vec<BotConfig>,
    /// Accepted for compatibility with existing configuration files. Nothing is sent to it.
    pub notification_endpoint: Option<String>,
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawConfig {
            Bots(Vec<BotConfig>),
            Full {
                bots: Vec<BotConfig>,
                #[serde(default, deserialize_with = "empty_string_is_none")]
                notification_endpoint: Option<String>,
            },
        }

        Ok(match RawConfig::deserialize(deserializer)? {
            RawConfig::Bots(bots) => Config {
                bots,
                notification_endpoint: None,
            },
            RawConfig::Full { bots, notification_endpoint } => Config {
                bots,
                notification_endpoint,
            },
        })
    }
}

impl Config {
    /// Parses configuration from a JSON string. Every bot's recipients are validated.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        for bot in &config.bots {
            bot.recipients()?;
        }

        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let json = std::fs::read_to_string(path)?;

        Self::from_json(&json)
    }

    /// Loads configuration from the file at [`CONFIG_PATH_VAR`]. A `.env` file in the working
    /// directory is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_VAR)
            .map_err(|_| ConfigError::MissingVariable(CONFIG_PATH_VAR))?;

        Self::load(path)
    }
}
