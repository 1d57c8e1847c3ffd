use crate::enums::TradeOfferState;
use crate::item::Item;
use crate::types::{ServerTime, TradeOfferId, TradeId};
use std::fmt;
use steamid_ng::SteamID;

/// A trade offer.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeOffer {
    /// The ID for this offer.
    pub tradeofferid: TradeOfferId,
    /// The trade ID for this offer. Present once the offer has been accepted.
    pub tradeid: Option<TradeId>,
    /// The [`SteamID`] of our partner.
    pub partner: SteamID,
    /// The message included in the offer.
    pub message: Option<String>,
    /// The items we're receiving in this offer.
    pub items_to_receive: Vec<Item>,
    /// The items we're giving in this offer.
    pub items_to_give: Vec<Item>,
    /// Whether this offer was created by us or not.
    pub is_our_offer: bool,
    /// The time this offer last had an action.
    pub time_updated: ServerTime,
    /// The state of this offer.
    pub trade_offer_state: TradeOfferState,
}

impl TradeOffer {
    /// Whether the offer asks for any of our items.
    pub fn takes_items(&self) -> bool {
        !self.items_to_give.is_empty()
    }
}

impl fmt::Display for TradeOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} from {}", self.tradeofferid, u64::from(self.partner))
    }
}
