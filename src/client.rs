//! Seams for the collaborators a bot drives: the login services, the trade offer client and the
//! one-time code generator. Bots hold these as trait objects so any implementation (or a
//! scripted one in tests) can be plugged in.

use crate::error::{Error, LoginError};
use crate::item::Item;
use crate::request::NewTradeOffer;
use crate::response::{AcceptedOffer, Confirmation, ExchangeDetails, SentOffer, TradeOffer};
use crate::types::{AppId, ContextId, TradeId, TradeOfferId};
use std::net::IpAddr;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Credentials for a login attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginDetails<'a> {
    pub account_name: &'a str,
    pub password: &'a str,
    /// A freshly generated one-time code.
    pub two_factor_code: String,
}

/// The result of logging the client on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoggedOn {
    /// The public IP Steam sees the client connecting from.
    pub public_ip: Option<IpAddr>,
}

/// Events emitted by the web session.
#[derive(Debug, Clone, PartialEq)]
pub enum CommunityEvent {
    /// The web session is no longer valid and must be logged into again.
    SessionExpired,
    /// A diagnostic message.
    Debug(String),
}

/// Produces one-time login codes from a shared secret.
pub trait AuthCodeProvider: Send + Sync {
    /// Generates the code for the current time. Fails if the secret is malformed.
    fn generate(&self, shared_secret: &str) -> Result<String, Error>;
}

/// The low-level client session.
#[async_trait]
pub trait SteamClient: Send + Sync {
    /// Logs the client on.
    async fn log_on(&self, details: &LoginDetails<'_>) -> Result<LoggedOn, LoginError>;
}

/// The web session.
#[async_trait]
pub trait CommunityClient: Send + Sync {
    /// Logs in, returning the session cookies.
    async fn login(&self, details: &LoginDetails<'_>) -> Result<Vec<String>, LoginError>;
    
    /// Subscribes to events from the web session.
    fn subscribe(&self) -> broadcast::Receiver<CommunityEvent>;
}

/// Everything the bot needs for trade offers, inventories and confirmations.
#[async_trait]
pub trait TradeClient: Send + Sync {
    /// Installs session cookies. Every other method requires cookies to be set.
    fn set_cookies(&self, cookies: Vec<String>) -> Result<(), Error>;
    
    /// Sends an offer.
    async fn send_offer(&self, offer: &NewTradeOffer) -> Result<SentOffer, Error>;
    
    /// Accepts an offer we received.
    async fn accept_offer(&self, offer: &TradeOffer) -> Result<AcceptedOffer, Error>;
    
    /// Declines an offer we received.
    async fn decline_offer(&self, offer: &TradeOffer) -> Result<(), Error>;
    
    /// Cancels an offer we sent.
    async fn cancel_offer(&self, tradeofferid: TradeOfferId) -> Result<(), Error>;
    
    /// Gets the offers we sent that are still outstanding.
    async fn get_active_sent_offers(&self) -> Result<Vec<TradeOffer>, Error>;
    
    /// Gets the offers we received that are still active.
    async fn get_active_received_offers(&self) -> Result<Vec<TradeOffer>, Error>;
    
    /// Gets the finalized details of an accepted trade.
    async fn get_exchange_details(&self, tradeid: TradeId) -> Result<ExchangeDetails, Error>;
    
    /// Gets our inventory for an app and context.
    async fn get_inventory(
        &self,
        appid: AppId,
        contextid: ContextId,
        tradable_only: bool,
    ) -> Result<Vec<Item>, Error>;
    
    /// Gets pending mobile confirmations.
    async fn get_trade_confirmations(&self) -> Result<Vec<Confirmation>, Error>;
    
    /// Accepts a mobile confirmation.
    async fn accept_confirmation(&self, confirmation: &Confirmation) -> Result<(), Error>;
}
