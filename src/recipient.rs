//! Where forwarded items go.

use crate::error::ConfigError;
use std::borrow::Cow;
use std::str::FromStr;
use rand::seq::IndexedRandom;
use steamid_ng::SteamID;

/// An account items are forwarded to. Parsed from either a 64-bit SteamID or a trade offer URL.
/// A trade offer URL carries an access token, which allows sending offers to accounts that are
/// not friends with the bot.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    /// The [`SteamID`] of the recipient.
    pub partner: SteamID,
    /// The access token from the trade offer URL.
    pub token: Option<String>,
}

impl FromStr for Recipient {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(steamid) = s.parse::<u64>() {
            return Ok(Self {
                partner: SteamID::from(steamid),
                token: None,
            });
        }

        parse_trade_offer_url(s)
            .ok_or_else(|| ConfigError::InvalidRecipient(s.into()))
    }
}

/// Parses the partner and token from a URL such as
/// `https://steamcommunity.com/tradeoffer/new/?partner=0&token=TkA5KFkh`.
fn parse_trade_offer_url(trade_offer_url: &str) -> Option<Recipient> {
    let url = url::Url::parse(trade_offer_url).ok()?;

    if url.host_str() != Some("steamcommunity.com") {
        return None;
    }

    let mut partner = None;
    let mut token = None;

    for (key, value) in url.query_pairs() {
        if key == Cow::Borrowed("partner") {
            partner = value.parse::<u32>().ok();
        } else if key == Cow::Borrowed("token") && value.len() == 8 {
            token = Some(value.to_string());
        }
    }

    Some(Recipient {
        partner: SteamID::new(
            partner?,
            steamid_ng::Instance::Desktop,
            steamid_ng::AccountType::Individual,
            steamid_ng::Universe::Public,
        ),
        token,
    })
}

/// The recipients configured for a bot. A recipient is picked uniformly at random for every
/// offer, so the batches of one dispatch can land on different accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipients(Vec<Recipient>);

impl Recipients {
    /// Fails if `recipients` is empty.
    pub fn new(recipients: Vec<Recipient>) -> Option<Self> {
        if recipients.is_empty() {
            return None;
        }

        Some(Self(recipients))
    }

    /// Picks a recipient.
    pub fn choose(&self) -> &Recipient {
        // the vec is never empty
        self.0.choose(&mut rand::rng()).unwrap_or(&self.0[0])
    }

    /// All recipients.
    pub fn as_slice(&self) -> &[Recipient] {
        &self.0
    }
}

impl From<Recipient> for Recipients {
    fn from(recipient: Recipient) -> Self {
        Self(vec![recipient])
    }
}
