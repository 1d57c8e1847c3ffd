use serde::{Serialize, Deserialize};
use crate::{types::TradeId, serialize::option_string};

/// The result returned after accepting a trade offer.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct AcceptedOffer {
    /// The ID of the trade. Used to look up the new asset IDs of received items. Not present when
    /// the acceptance still needs confirmation.
    #[serde(default, with = "option_string")]
    pub tradeid: Option<TradeId>,
    #[serde(default)]
    pub needs_mobile_confirmation: bool,
    #[serde(default)]
    pub needs_email_confirmation: bool,
}

impl AcceptedOffer {
    /// Whether the acceptance needs confirmation before the trade goes through.
    pub fn needs_confirmation(&self) -> bool {
        self.needs_mobile_confirmation || self.needs_email_confirmation
    }
}
