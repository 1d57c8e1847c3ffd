use serde::{Serialize, Deserialize};
use crate::enums::TradeStatus;
use crate::item::Item;
use crate::serialize::{string, option_string};
use crate::types::{AppId, ContextId, AssetId, Amount, TradeId};

/// The finalized record of an accepted offer. Steam assigns received items new asset IDs, so
/// these are needed to do anything further with the items.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExchangeDetails {
    /// The trade ID.
    #[serde(with = "string")]
    pub tradeid: TradeId,
    /// The current status of the trade.
    pub status: TradeStatus,
    /// Assets received.
    #[serde(default)]
    pub assets_received: Vec<ExchangeAsset>,
}

impl ExchangeDetails {
    /// The received items under their new identities. Assets Steam has not yet assigned new IDs
    /// to are left out.
    pub fn received_items(&self) -> Vec<Item> {
        self.assets_received
            .iter()
            .filter_map(ExchangeAsset::new_item)
            .collect()
    }
}

/// An asset belonging to a trade.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExchangeAsset {
    pub appid: AppId,
    #[serde(with = "string")]
    pub contextid: ContextId,
    #[serde(with = "string")]
    pub assetid: AssetId,
    #[serde(with = "string")]
    pub amount: Amount,
    /// The context ID of the item received.
    #[serde(default, with = "option_string")]
    pub new_contextid: Option<ContextId>,
    /// The asset ID of the item received.
    #[serde(default, with = "option_string")]
    pub new_assetid: Option<AssetId>,
}

impl ExchangeAsset {
    /// The item as it now exists in our inventory.
    pub fn new_item(&self) -> Option<Item> {
        Some(Item {
            appid: self.appid,
            contextid: self.new_contextid?,
            assetid: self.new_assetid?,
            amount: self.amount,
        })
    }
}
