//! Forwards Steam inventory items from managed accounts to recipient accounts.
//!
//! Each configured account runs as a [`Bot`]. A bot keeps its web session alive, accepts offers
//! that only give it items, forwards whatever it receives in batches of offers, and sweeps its
//! inventory whenever forwarding may have left items behind.
//!
//! Bots drive their collaborators through the traits in [`client`]. [`SteamTradeOfferAPI`]
//! implements [`TradeClient`] over Steam's web endpoints; [`SteamTradeOfferAPI::from_config`]
//! builds one with a bot's identity secret and proxy.

mod helpers;
mod mobile_api;
mod serialize;
mod session;
mod time;

pub mod api;
pub mod bot;
pub mod client;
pub mod config;
pub mod enums;
pub mod error;
pub mod item;
pub mod recipient;
pub mod request;
pub mod response;
pub mod totp;
pub mod types;

#[cfg(test)]
mod test_support;

pub use api::{SteamTradeOfferAPI, SteamTradeOfferAPIBuilder};
pub use bot::{Bot, BotClients, BotOptions, BotTasks, RecoveryFlag};
pub use client::{AuthCodeProvider, CommunityClient, CommunityEvent, SteamClient, TradeClient};
pub use config::{BotConfig, Config};
pub use error::{ConfigError, Error, LoginError};
pub use item::Item;
pub use recipient::{Recipient, Recipients};
pub use totp::SteamTotp;
pub use steamid_ng::SteamID;
