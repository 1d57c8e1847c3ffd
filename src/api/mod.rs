//! The HTTP client for trade offers and inventories.

mod builder;
mod response;

pub use builder::SteamTradeOfferAPIBuilder;

use response::{GetInventoryResponse, GetTradeOffersResponse, GetTradeStatusResponse, RawTradeOffer};
use crate::client::TradeClient;
use crate::config::BotConfig;
use crate::enums::TradeOfferState;
use crate::error::Error;
use crate::helpers::{parses_response, COMMUNITY_HOSTNAME, WEB_API_HOSTNAME};
use crate::item::Item;
use crate::mobile_api::MobileAPI;
use crate::request::NewTradeOffer;
use crate::response::{AcceptedOffer, Confirmation, ExchangeDetails, SentOffer, TradeOffer};
use crate::serialize::string;
use crate::session::Session;
use crate::types::{AppId, ContextId, AssetId, HttpClient, TradeId, TradeOfferId};
use std::sync::{Arc, RwLock};
use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::REFERER;
use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_GET_INVENTORY_PAGE_SIZE: u32 = 2000;

/// Which offers to request from `GetTradeOffers`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum OfferDirection {
    Sent,
    Received,
}

/// Talks to steamcommunity.com and the Steam Web API using the cookies of a logged-in session.
#[derive(Debug, Clone)]
pub struct SteamTradeOfferAPI {
    client: HttpClient,
    cookies: Arc<Jar>,
    session: Arc<RwLock<Option<Session>>>,
    mobile_api: MobileAPI,
    language: String,
    get_inventory_page_size: u32,
}

impl SteamTradeOfferAPI {
    /// Builder for constructing a [`SteamTradeOfferAPI`].
    pub fn builder() -> SteamTradeOfferAPIBuilder {
        SteamTradeOfferAPIBuilder::new()
    }

    /// Builds the client for a bot, using its identity secret for confirmations and routing
    /// requests through its proxy.
    pub fn from_config(config: &BotConfig) -> Result<Self, Error> {
        SteamTradeOfferAPIBuilder::for_bot(config).build()
    }

    fn get_uri(pathname: &str) -> String {
        format!("https://{COMMUNITY_HOSTNAME}{pathname}")
    }

    fn get_api_url(interface: &str, method: &str, version: usize) -> String {
        format!("https://{WEB_API_HOSTNAME}/{interface}/{method}/v{version}")
    }

    fn session(&self) -> Result<Session, Error> {
        self.session
            .read()
            .map_err(|_| Error::NotLoggedIn)?
            .clone()
            .ok_or(Error::NotLoggedIn)
    }

    /// Sets cookies. Fails if they do not contain a login.
    pub fn set_session_cookies(&self, mut cookies: Vec<String>) -> Result<(), Error> {
        let session = Session::from_cookies(&mut cookies)?;
        // Should not fail since the URL is hardcoded.
        let url = format!("https://{COMMUNITY_HOSTNAME}")
            .parse::<Url>()
            .map_err(|_| Error::Parameter("Invalid community URL"))?;

        for cookie_str in &cookies {
            self.cookies.add_cookie_str(cookie_str, &url);
        }

        *self.session.write().map_err(|_| Error::NotLoggedIn)? = Some(session);

        Ok(())
    }

    /// Sends an offer, optionally as a counter to an existing offer.
    pub async fn send_offer(
        &self,
        offer: &NewTradeOffer,
        counter_tradeofferid: Option<TradeOfferId>,
    ) -> Result<SentOffer, Error> {
        #[derive(Serialize, Debug)]
        struct OfferFormUser<'b> {
            assets: &'b Vec<Item>,
            currency: Vec<Item>,
            ready: bool,
        }

        #[derive(Serialize, Debug)]
        struct OfferForm<'b> {
            newversion: bool,
            version: u32,
            me: OfferFormUser<'b>,
            them: OfferFormUser<'b>,
        }

        #[derive(Serialize, Debug)]
        struct TradeOfferCreateParams<'b> {
            #[serde(skip_serializing_if = "Option::is_none")]
            trade_offer_access_token: &'b Option<String>,
        }

        #[derive(Serialize, Debug)]
        struct SendOfferParams<'a, 'b> {
            sessionid: &'a str,
            serverid: u32,
            json_tradeoffer: String,
            tradeoffermessage: &'b str,
            captcha: &'static str,
            trade_offer_create_params: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            tradeofferid_countered: Option<TradeOfferId>,
            partner: String,
        }

        if offer.is_empty() {
            return Err(Error::Parameter("Cannot send an empty offer"));
        }

        let session = self.session()?;
        let num_items = offer.items_to_give.len() + offer.items_to_receive.len();
        let referer = {
            let pathname = match counter_tradeofferid {
                Some(id) => id.to_string(),
                None => String::from("new"),
            };
            let mut referer = format!(
                "/tradeoffer/{pathname}/?partner={}",
                offer.partner.account_id(),
            );

            if let Some(token) = &offer.token {
                referer.push_str(&format!("&token={token}"));
            }

            Self::get_uri(&referer)
        };
        let json_tradeoffer = serde_json::to_string(&OfferForm {
            newversion: true,
            version: num_items as u32 + 1,
            me: OfferFormUser {
                assets: &offer.items_to_give,
                currency: Vec::new(),
                ready: false,
            },
            them: OfferFormUser {
                assets: &offer.items_to_receive,
                currency: Vec::new(),
                ready: false,
            },
        })?;
        let trade_offer_create_params = serde_json::to_string(&TradeOfferCreateParams {
            trade_offer_access_token: &offer.token,
        })?;
        let params = SendOfferParams {
            sessionid: &session.sessionid,
            serverid: 1,
            json_tradeoffer,
            tradeoffermessage: offer.message.as_deref().unwrap_or_default(),
            captcha: "",
            trade_offer_create_params,
            tradeofferid_countered: counter_tradeofferid,
            partner: u64::from(offer.partner).to_string(),
        };
        let response = self.client.post(Self::get_uri("/tradeoffer/new/send"))
            .header(REFERER, referer)
            .form(&params)
            .send()
            .await?;

        parses_response(response).await
    }

    async fn act_on_offer(
        &self,
        tradeofferid: TradeOfferId,
        action: &'static str,
    ) -> Result<(), Error> {
        #[derive(Serialize, Debug)]
        struct ActionParams<'a> {
            sessionid: &'a str,
        }

        #[derive(Deserialize, Debug)]
        struct Response {
            #[allow(dead_code)]
            #[serde(with = "string")]
            tradeofferid: TradeOfferId,
        }

        let session = self.session()?;
        let referer = Self::get_uri(&format!("/tradeoffer/{tradeofferid}"));
        let uri = Self::get_uri(&format!("/tradeoffer/{tradeofferid}/{action}"));
        let response = self.client.post(&uri)
            .header(REFERER, referer)
            .form(&ActionParams {
                sessionid: &session.sessionid,
            })
            .send()
            .await?;
        let _body: Response = parses_response(response).await?;

        Ok(())
    }

    async fn get_active_offers(
        &self,
        direction: OfferDirection,
    ) -> Result<Vec<TradeOffer>, Error> {
        #[derive(Serialize, Debug)]
        struct Query<'a> {
            access_token: &'a str,
            language: &'a str,
            active_only: bool,
            get_sent_offers: bool,
            get_received_offers: bool,
            get_descriptions: bool,
            time_historical_cutoff: u32,
            #[serde(skip_serializing_if = "Option::is_none")]
            cursor: Option<u32>,
        }

        let session = self.session()?;
        let uri = Self::get_api_url("IEconService", "GetTradeOffers", 1);
        let mut cursor = None;
        let mut raw_offers: Vec<RawTradeOffer> = Vec::new();

        loop {
            let response = self.client.get(&uri)
                .query(&Query {
                    access_token: &session.access_token,
                    language: &self.language,
                    active_only: true,
                    get_sent_offers: direction == OfferDirection::Sent,
                    get_received_offers: direction == OfferDirection::Received,
                    get_descriptions: false,
                    // a very high date so every active offer is included
                    time_historical_cutoff: u32::MAX,
                    cursor,
                })
                .send()
                .await?;
            let body: GetTradeOffersResponse = parses_response(response).await?;
            let mut body = body.response;

            raw_offers.append(&mut body.trade_offers_sent);
            raw_offers.append(&mut body.trade_offers_received);

            match body.next_cursor {
                Some(next_cursor) if next_cursor > 0 && Some(next_cursor) != cursor => {
                    cursor = Some(next_cursor);
                },
                _ => break,
            }
        }

        // trim responses since these don't always return what we want
        Ok(raw_offers
            .into_iter()
            .map(TradeOffer::from)
            .filter(|offer| match direction {
                OfferDirection::Sent => offer.trade_offer_state.is_outstanding(),
                OfferDirection::Received => offer.trade_offer_state == TradeOfferState::Active,
            })
            .collect())
    }

    /// Gets the inventory of the logged-in user.
    pub async fn get_my_inventory(
        &self,
        appid: AppId,
        contextid: ContextId,
        tradable_only: bool,
    ) -> Result<Vec<Item>, Error> {
        #[derive(Serialize, Debug)]
        struct Query<'a> {
            l: &'a str,
            count: u32,
            #[serde(skip_serializing_if = "Option::is_none")]
            start_assetid: Option<AssetId>,
        }

        let steamid = self.session()?.steamid;
        let uri = Self::get_uri(&format!("/inventory/{steamid}/{appid}/{contextid}"));
        let referer = Self::get_uri(&format!("/profiles/{steamid}/inventory"));
        let mut start_assetid: Option<AssetId> = None;
        let mut inventory = Vec::new();

        loop {
            let response = self.client.get(&uri)
                .header(REFERER, &referer)
                .query(&Query {
                    l: &self.language,
                    count: self.get_inventory_page_size,
                    start_assetid,
                })
                .send()
                .await?;
            let body: GetInventoryResponse = parses_response(response).await?;

            if !body.success {
                return Err(Error::Response(
                    body.error.unwrap_or_else(|| "Failure".into())
                ));
            }

            let more_items = body.more_items;
            let last_assetid = body.last_assetid;

            inventory.extend(body.into_items(tradable_only));

            if !more_items {
                break;
            }

            // shouldn't occur, but we wouldn't want to call this endlessly if it does...
            if last_assetid.is_none() || last_assetid == start_assetid {
                return Err(Error::Response("Bad inventory pagination".into()));
            }

            start_assetid = last_assetid;
        }

        Ok(inventory)
    }
}

#[async_trait]
impl TradeClient for SteamTradeOfferAPI {
    fn set_cookies(&self, cookies: Vec<String>) -> Result<(), Error> {
        self.set_session_cookies(cookies)
    }

    async fn send_offer(&self, offer: &NewTradeOffer) -> Result<SentOffer, Error> {
        SteamTradeOfferAPI::send_offer(self, offer, None).await
    }

    async fn accept_offer(&self, offer: &TradeOffer) -> Result<AcceptedOffer, Error> {
        #[derive(Serialize, Debug)]
        struct AcceptOfferParams<'a> {
            sessionid: &'a str,
            serverid: u32,
            #[serde(with = "string")]
            tradeofferid: TradeOfferId,
            captcha: &'static str,
            partner: String,
        }

        if offer.is_our_offer {
            return Err(Error::Parameter("Cannot accept an offer that is ours"));
        }

        let session = self.session()?;
        let tradeofferid = offer.tradeofferid;
        let referer = Self::get_uri(&format!("/tradeoffer/{tradeofferid}/"));
        let uri = Self::get_uri(&format!("/tradeoffer/{tradeofferid}/accept"));
        let response = self.client.post(&uri)
            .header(REFERER, referer)
            .form(&AcceptOfferParams {
                sessionid: &session.sessionid,
                serverid: 1,
                tradeofferid,
                captcha: "",
                partner: u64::from(offer.partner).to_string(),
            })
            .send()
            .await?;

        parses_response(response).await
    }

    async fn decline_offer(&self, offer: &TradeOffer) -> Result<(), Error> {
        if offer.is_our_offer {
            return Err(Error::Parameter("Cannot decline an offer we created"));
        }

        self.act_on_offer(offer.tradeofferid, "decline").await
    }

    async fn cancel_offer(&self, tradeofferid: TradeOfferId) -> Result<(), Error> {
        self.act_on_offer(tradeofferid, "cancel").await
    }

    async fn get_active_sent_offers(&self) -> Result<Vec<TradeOffer>, Error> {
        self.get_active_offers(OfferDirection::Sent).await
    }

    async fn get_active_received_offers(&self) -> Result<Vec<TradeOffer>, Error> {
        self.get_active_offers(OfferDirection::Received).await
    }

    async fn get_exchange_details(&self, tradeid: TradeId) -> Result<ExchangeDetails, Error> {
        #[derive(Serialize, Debug)]
        struct Query<'a> {
            access_token: &'a str,
            #[serde(with = "string")]
            tradeid: TradeId,
            get_descriptions: bool,
            language: &'a str,
        }

        let session = self.session()?;
        let uri = Self::get_api_url("IEconService", "GetTradeStatus", 1);
        let response = self.client.get(&uri)
            .query(&Query {
                access_token: &session.access_token,
                tradeid,
                get_descriptions: false,
                language: &self.language,
            })
            .send()
            .await?;
        let body: GetTradeStatusResponse = parses_response(response).await?;

        body.response.trades
            .into_iter()
            .next()
            .ok_or_else(|| Error::Response(format!("No trade found for {tradeid}")))
    }

    async fn get_inventory(
        &self,
        appid: AppId,
        contextid: ContextId,
        tradable_only: bool,
    ) -> Result<Vec<Item>, Error> {
        self.get_my_inventory(appid, contextid, tradable_only).await
    }

    async fn get_trade_confirmations(&self) -> Result<Vec<Confirmation>, Error> {
        self.mobile_api.get_trade_confirmations().await
    }

    async fn accept_confirmation(&self, confirmation: &Confirmation) -> Result<(), Error> {
        self.mobile_api.accept_confirmation(confirmation).await
    }
}
