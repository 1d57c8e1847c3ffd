use crate::types::{AppId, ContextId, AssetId, Amount};
use crate::serialize;
use serde::{Serialize, Deserialize};

/// An item in an inventory or trade. Items are identified only by their app, context and asset
/// IDs; asset IDs change when an item changes hands.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Item {
    /// The app ID e.g. `730` for Counter-Strike 2.
    pub appid: AppId,
    /// The context ID.
    #[serde(with = "serialize::string")]
    pub contextid: ContextId,
    /// The unique asset ID. This value is unique to the item's `appid` and `contextid`.
    #[serde(with = "serialize::string")]
    pub assetid: AssetId,
    /// The amount. If this item is not stackable the amount will be `1`.
    pub amount: Amount,
}

impl Item {
    /// Creates a non-stackable item.
    pub fn new(appid: AppId, contextid: ContextId, assetid: AssetId) -> Self {
        Self {
            appid,
            contextid,
            assetid,
            amount: 1,
        }
    }
}
