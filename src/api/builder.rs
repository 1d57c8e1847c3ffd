use super::{SteamTradeOfferAPI, DEFAULT_GET_INVENTORY_PAGE_SIZE};
use crate::config::BotConfig;
use crate::error::Error;
use crate::helpers::{get_default_client, USER_AGENT_STRING};
use crate::mobile_api::MobileAPI;
use std::sync::{Arc, RwLock};
use reqwest::cookie::Jar;

/// Builder for constructing a [`SteamTradeOfferAPI`].
#[derive(Debug, Clone)]
pub struct SteamTradeOfferAPIBuilder {
    /// The language for item descriptions.
    pub(crate) language: String,
    /// The number of items to fetch per page when getting inventories. Defaults to 2000.
    pub(crate) get_inventory_page_size: u32,
    /// The identity secret for mobile confirmations.
    pub(crate) identity_secret: Option<String>,
    /// How many seconds your computer is behind Steam's servers. Used in mobile confirmations.
    pub(crate) time_offset: Option<i64>,
    /// The proxy to send every request through, e.g. `http://127.0.0.1:8080`.
    pub(crate) proxy: Option<String>,
    /// User agent for requests.
    pub(crate) user_agent: &'static str,
}

impl Default for SteamTradeOfferAPIBuilder {
    fn default() -> Self {
        Self {
            language: String::from("english"),
            get_inventory_page_size: DEFAULT_GET_INVENTORY_PAGE_SIZE,
            identity_secret: None,
            time_offset: None,
            proxy: None,
            user_agent: USER_AGENT_STRING,
        }
    }
}

impl SteamTradeOfferAPIBuilder {
    /// Creates a new [`SteamTradeOfferAPIBuilder`].
    pub fn new() -> Self {
        Self::default()
    }
    
    /// A builder carrying the identity secret and proxy of `config`.
    pub fn for_bot(config: &BotConfig) -> Self {
        Self::new()
            .identity_secret(config.identity_secret.clone())
            .proxy(config.proxy_url())
    }
    
    /// The language for item descriptions.
    pub fn language(mut self, language: String) -> Self {
        self.language = language;
        self
    }
    
    /// The number of items to fetch per page when getting inventories. Defaults to 2000.
    pub fn get_inventory_page_size(mut self, page_size: u32) -> Self {
        self.get_inventory_page_size = page_size;
        self
    }
    
    /// The identity secret for the account. Required for mobile confirmations.
    pub fn identity_secret(mut self, identity_secret: String) -> Self {
        self.identity_secret = Some(identity_secret);
        self
    }
    
    /// How many seconds your computer is behind Steam's servers.
    pub fn time_offset(mut self, time_offset: i64) -> Self {
        self.time_offset = Some(time_offset);
        self
    }
    
    /// Sends every request through this proxy.
    pub fn proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }
    
    /// Builds the [`SteamTradeOfferAPI`]. Fails if the HTTP client cannot be constructed, e.g.
    /// when the proxy URL is invalid.
    pub fn build(self) -> Result<SteamTradeOfferAPI, Error> {
        let cookies = Arc::new(Jar::default());
        let client = get_default_client(
            Arc::clone(&cookies),
            self.user_agent,
            self.proxy.as_deref(),
        )?;
        let session = Arc::new(RwLock::new(None));
        let mobile_api = MobileAPI {
            client: client.clone(),
            session: Arc::clone(&session),
            identity_secret: self.identity_secret,
            time_offset: self.time_offset,
        };
        
        Ok(SteamTradeOfferAPI {
            client,
            cookies,
            session,
            mobile_api,
            language: self.language,
            get_inventory_page_size: self.get_inventory_page_size,
        })
    }
}
