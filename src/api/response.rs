//! Raw response bodies from Steam.

use crate::enums::TradeOfferState;
use crate::item::Item;
use crate::response::{ExchangeDetails, TradeOffer};
use crate::serialize::{string, option_string, empty_string_is_none};
use crate::types::{AppId, ContextId, AssetId, Amount, TradeOfferId, TradeId, ServerTime};
use std::collections::HashSet;
use chrono::serde::ts_seconds;
use serde::{Deserialize, Deserializer};
use steamid_ng::SteamID;

/// Steam sends flags as `1`/`0` in some places and `true`/`false` in others.
fn bool_from_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(u8),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(value)) => value,
        Some(Flag::Int(value)) => value != 0,
        None => false,
    })
}

#[derive(Deserialize, Debug, Clone)]
pub struct RawAsset {
    pub appid: AppId,
    #[serde(with = "string")]
    pub contextid: ContextId,
    #[serde(with = "string")]
    pub assetid: AssetId,
    #[serde(with = "string")]
    pub amount: Amount,
}

impl From<RawAsset> for Item {
    fn from(asset: RawAsset) -> Self {
        Item {
            appid: asset.appid,
            contextid: asset.contextid,
            assetid: asset.assetid,
            amount: asset.amount,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct RawTradeOffer {
    #[serde(with = "string")]
    pub tradeofferid: TradeOfferId,
    #[serde(default, with = "option_string")]
    pub tradeid: Option<TradeId>,
    pub accountid_other: u32,
    #[serde(default, deserialize_with = "empty_string_is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub items_to_receive: Vec<RawAsset>,
    #[serde(default)]
    pub items_to_give: Vec<RawAsset>,
    #[serde(default)]
    pub is_our_offer: bool,
    #[serde(with = "ts_seconds")]
    pub time_updated: ServerTime,
    pub trade_offer_state: TradeOfferState,
}

impl From<RawTradeOffer> for TradeOffer {
    fn from(offer: RawTradeOffer) -> Self {
        TradeOffer {
            tradeofferid: offer.tradeofferid,
            tradeid: offer.tradeid,
            partner: SteamID::new(
                offer.accountid_other,
                steamid_ng::Instance::Desktop,
                steamid_ng::AccountType::Individual,
                steamid_ng::Universe::Public,
            ),
            message: offer.message,
            items_to_receive: offer.items_to_receive.into_iter().map(Item::from).collect(),
            items_to_give: offer.items_to_give.into_iter().map(Item::from).collect(),
            is_our_offer: offer.is_our_offer,
            time_updated: offer.time_updated,
            trade_offer_state: offer.trade_offer_state,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct GetTradeOffersResponseBody {
    #[serde(default)]
    pub trade_offers_sent: Vec<RawTradeOffer>,
    #[serde(default)]
    pub trade_offers_received: Vec<RawTradeOffer>,
    pub next_cursor: Option<u32>,
}

#[derive(Deserialize, Debug)]
pub struct GetTradeOffersResponse {
    pub response: GetTradeOffersResponseBody,
}

#[derive(Deserialize, Debug)]
pub struct GetTradeStatusResponseBody {
    #[serde(default)]
    pub trades: Vec<ExchangeDetails>,
}

#[derive(Deserialize, Debug)]
pub struct GetTradeStatusResponse {
    pub response: GetTradeStatusResponseBody,
}

#[derive(Deserialize, Debug)]
pub struct RawInventoryAsset {
    pub appid: AppId,
    #[serde(with = "string")]
    pub contextid: ContextId,
    #[serde(with = "string")]
    pub assetid: AssetId,
    #[serde(with = "string")]
    pub classid: u64,
    #[serde(default, with = "option_string")]
    pub instanceid: Option<u64>,
    #[serde(with = "string")]
    pub amount: Amount,
}

#[derive(Deserialize, Debug)]
pub struct RawDescription {
    #[serde(with = "string")]
    pub classid: u64,
    #[serde(default, with = "option_string")]
    pub instanceid: Option<u64>,
    #[serde(default, deserialize_with = "bool_from_int")]
    pub tradable: bool,
}

#[derive(Deserialize, Debug)]
pub struct GetInventoryResponse {
    #[serde(default, deserialize_with = "bool_from_int")]
    pub success: bool,
    #[serde(default, rename = "Error")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "bool_from_int")]
    pub more_items: bool,
    #[serde(default, with = "option_string")]
    pub last_assetid: Option<AssetId>,
    #[serde(default)]
    pub assets: Vec<RawInventoryAsset>,
    #[serde(default)]
    pub descriptions: Vec<RawDescription>,
}

impl GetInventoryResponse {
    /// The items in this page. Untradable items are left out when `tradable_only` is set.
    pub fn into_items(self, tradable_only: bool) -> Vec<Item> {
        let tradable = self.descriptions
            .iter()
            .filter(|description| description.tradable)
            .map(|description| (description.classid, description.instanceid.unwrap_or(0)))
            .collect::<HashSet<_>>();

        self.assets
            .into_iter()
            .filter(|asset| {
                !tradable_only ||
                tradable.contains(&(asset.classid, asset.instanceid.unwrap_or(0)))
            })
            .map(|asset| Item {
                appid: asset.appid,
                contextid: asset.contextid,
                assetid: asset.assetid,
                amount: asset.amount,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_untradable_items() {
        let json = r#"{
            "assets": [
                {"appid":730,"contextid":"2","assetid":"1","classid":"10","instanceid":"0","amount":"1"},
                {"appid":730,"contextid":"2","assetid":"2","classid":"11","instanceid":"0","amount":"1"}
            ],
            "descriptions": [
                {"appid":730,"classid":"10","instanceid":"0","tradable":1},
                {"appid":730,"classid":"11","instanceid":"0","tradable":0}
            ],
            "total_inventory_count": 2,
            "success": 1,
            "rwgrsn": -2
        }"#;
        let response: GetInventoryResponse = serde_json::from_str(json).unwrap();

        assert!(response.success);
        assert!(!response.more_items);
        assert_eq!(response.into_items(true), vec![Item::new(730, 2, 1)]);
    }

    #[test]
    fn parses_empty_inventory() {
        let json = r#"{"total_inventory_count":0,"success":1,"rwgrsn":-2}"#;
        let response: GetInventoryResponse = serde_json::from_str(json).unwrap();

        assert!(response.into_items(true).is_empty());
    }

    #[test]
    fn converts_raw_trade_offer() {
        let json = r#"{
            "tradeofferid": "6281436220",
            "accountid_other": 119913840,
            "message": "",
            "expiration_time": 1689473635,
            "trade_offer_state": 2,
            "items_to_receive": [
                {"appid":730,"contextid":"2","assetid":"100","classid":"10","instanceid":"0","amount":"1","missing":false}
            ],
            "is_our_offer": false,
            "time_created": 1688264035,
            "time_updated": 1688264035,
            "from_real_time_trade": false,
            "escrow_end_date": 0,
            "confirmation_method": 0
        }"#;
        let raw: RawTradeOffer = serde_json::from_str(json).unwrap();
        let offer = TradeOffer::from(raw);

        assert_eq!(offer.tradeofferid, 6281436220);
        assert_eq!(offer.partner.account_id(), 119913840);
        assert_eq!(offer.message, None);
        assert_eq!(offer.trade_offer_state, TradeOfferState::Active);
        assert_eq!(offer.items_to_receive, vec![Item::new(730, 2, 100)]);
        assert!(!offer.takes_items());
    }
}
