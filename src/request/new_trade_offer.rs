use crate::item::Item;
use crate::recipient::Recipient;
use steamid_ng::SteamID;

/// Represents a trade offer not yet sent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTradeOffer {
    /// The partner's [`SteamID`] for this offer.
    pub partner: SteamID,
    /// The items to give in this offer.
    pub items_to_give: Vec<Item>,
    /// The items to receive in this offer.
    pub items_to_receive: Vec<Item>,
    /// The message to send in this offer.
    pub message: Option<String>,
    /// The access token for sending an offer if you are not friends with the partner.
    pub token: Option<String>,
}

impl NewTradeOffer {
    /// Builder for constructing a [`NewTradeOffer`].
    pub fn builder(partner: SteamID) -> NewTradeOfferBuilder {
        NewTradeOfferBuilder::new(partner)
    }
    
    /// Checks if any items are included in the offer.
    pub fn is_empty(&self) -> bool {
        self.items_to_give.is_empty() &&
        self.items_to_receive.is_empty()
    }
}

/// Builder for constructing new trade offers.
#[derive(Debug, Clone)]
pub struct NewTradeOfferBuilder {
    partner: SteamID,
    items_to_give: Vec<Item>,
    items_to_receive: Vec<Item>,
    message: Option<String>,
    token: Option<String>,
}

impl NewTradeOfferBuilder {
    /// Creates a new [`NewTradeOfferBuilder`] with the given partner.
    pub fn new(partner: SteamID) -> Self {
        Self {
            partner,
            items_to_give: Vec::new(),
            items_to_receive: Vec::new(),
            message: None,
            token: None,
        }
    }
    
    /// Creates a builder addressed to `recipient`, including its access token.
    pub fn to_recipient(recipient: &Recipient) -> Self {
        let mut builder = Self::new(recipient.partner);
        
        builder.token = recipient.token.clone();
        builder
    }
    
    /// The items to give in this offer.
    pub fn items_to_give<T>(mut self, items: T) -> Self
    where
        T: IntoIterator<Item = Item>,
    {
        self.items_to_give = items.into_iter().collect();
        self
    }
    
    /// The items to receive in this offer.
    pub fn items_to_receive<T>(mut self, items: T) -> Self
    where
        T: IntoIterator<Item = Item>,
    {
        self.items_to_receive = items.into_iter().collect();
        self
    }
    
    /// Builds into [`NewTradeOffer`].
    pub fn build(self) -> NewTradeOffer {
        NewTradeOffer {
            partner: self.partner,
            items_to_give: self.items_to_give,
            items_to_receive: self.items_to_receive,
            message: self.message,
            token: self.token,
        }
    }
}
