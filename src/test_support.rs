//! Scripted collaborators for driving bots without Steam. Every mock records its calls and
//! answers from a queue of results, falling back to a harmless default once the queue is empty.

use crate::client::{
    AuthCodeProvider,
    CommunityClient,
    CommunityEvent,
    LoggedOn,
    LoginDetails,
    SteamClient,
    TradeClient,
};
use crate::config::{BotConfig, Target};
use crate::enums::{ConfirmationType, TradeOfferState, TradeStatus};
use crate::error::{Error, LoginError};
use crate::item::Item;
use crate::recipient::Recipients;
use crate::request::NewTradeOffer;
use crate::response::{AcceptedOffer, Confirmation, ExchangeAsset, ExchangeDetails, SentOffer, TradeOffer};
use crate::types::{AppId, AssetId, ContextId, TradeId, TradeOfferId};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use steamid_ng::SteamID;
use tokio::sync::broadcast;
use tokio::time::Instant;

pub const PARTNER: u64 = 76561198080179568;

pub fn items(count: u64) -> Vec<Item> {
    (1..=count)
        .map(|assetid| Item::new(730, 2, assetid))
        .collect()
}

pub fn offer(
    tradeofferid: TradeOfferId,
    items_to_give: Vec<Item>,
    items_to_receive: Vec<Item>,
) -> TradeOffer {
    TradeOffer {
        tradeofferid,
        tradeid: None,
        partner: SteamID::from(PARTNER),
        message: None,
        items_to_receive,
        items_to_give,
        is_our_offer: false,
        time_updated: chrono::DateTime::from_timestamp(1_688_264_035, 0).unwrap(),
        trade_offer_state: TradeOfferState::Active,
    }
}

pub fn recipients(count: u64) -> Recipients {
    let recipients = (0..count)
        .map(|i| (PARTNER + 1 + i).to_string().parse().unwrap())
        .collect();

    Recipients::new(recipients).unwrap()
}

pub fn bot_config() -> BotConfig {
    BotConfig {
        username: "alpha".into(),
        password: "hunter2".into(),
        shared_secret: "cnOgv/KdpLoP6Nbh0GMkXkPXALQ=".into(),
        identity_secret: "aWRlbnRpdHk=".into(),
        target: Target::Many(vec![
            (PARTNER + 1).to_string(),
            (PARTNER + 2).to_string(),
        ]),
        proxy: None,
        appid: 730,
        contextid: 2,
    }
}

/// Exchange details where every received asset has been assigned `new_assetids`.
pub fn exchange_details(
    tradeid: TradeId,
    status: TradeStatus,
    new_assetids: &[AssetId],
) -> ExchangeDetails {
    ExchangeDetails {
        tradeid,
        status,
        assets_received: new_assetids
            .iter()
            .enumerate()
            .map(|(i, new_assetid)| ExchangeAsset {
                appid: 730,
                contextid: 2,
                assetid: i as AssetId + 1,
                amount: 1,
                new_contextid: Some(2),
                new_assetid: Some(*new_assetid),
            })
            .collect(),
    }
}

pub fn trade_confirmation(id: u64) -> Confirmation {
    Confirmation {
        id,
        creator_id: id * 10,
        nonce: id * 100,
        r#type: ConfirmationType::Trade,
        headline: "somebody".into(),
    }
}

fn pop<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    queue.lock().unwrap().pop_front()
}

#[derive(Debug, Default)]
pub struct MockTradeClient {
    pub cookies: Mutex<Option<Vec<String>>>,
    pub set_cookies_results: Mutex<VecDeque<Result<(), Error>>>,
    pub send_results: Mutex<VecDeque<Result<SentOffer, Error>>>,
    pub sent: Mutex<Vec<NewTradeOffer>>,
    pub accept_results: Mutex<VecDeque<Result<AcceptedOffer, Error>>>,
    pub accept_calls: Mutex<Vec<Instant>>,
    pub declined: Mutex<Vec<TradeOfferId>>,
    pub cancelled: Mutex<Vec<TradeOfferId>>,
    pub active_sent: Mutex<Vec<TradeOffer>>,
    pub received_results: Mutex<VecDeque<Result<Vec<TradeOffer>, Error>>>,
    pub exchange_results: Mutex<VecDeque<Result<ExchangeDetails, Error>>>,
    pub exchange_calls: Mutex<Vec<Instant>>,
    pub inventory_results: Mutex<VecDeque<Result<Vec<Item>, Error>>>,
    pub inventory_calls: Mutex<Vec<(AppId, ContextId, bool)>>,
    pub confirmations: Mutex<VecDeque<Result<Vec<Confirmation>, Error>>>,
    pub accepted_confirmations: Mutex<Vec<u64>>,
}

impl MockTradeClient {
    pub fn push_set_cookies(&self, result: Result<(), Error>) {
        self.set_cookies_results.lock().unwrap().push_back(result);
    }

    pub fn push_send(&self, result: Result<SentOffer, Error>) {
        self.send_results.lock().unwrap().push_back(result);
    }

    pub fn push_accept(&self, result: Result<AcceptedOffer, Error>) {
        self.accept_results.lock().unwrap().push_back(result);
    }

    pub fn push_exchange(&self, result: Result<ExchangeDetails, Error>) {
        self.exchange_results.lock().unwrap().push_back(result);
    }

    pub fn push_inventory(&self, result: Result<Vec<Item>, Error>) {
        self.inventory_results.lock().unwrap().push_back(result);
    }

    pub fn push_received(&self, result: Result<Vec<TradeOffer>, Error>) {
        self.received_results.lock().unwrap().push_back(result);
    }

    pub fn sent_offers(&self) -> Vec<NewTradeOffer> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_item_count(&self) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|offer| offer.items_to_give.len())
            .sum()
    }
}

#[async_trait]
impl TradeClient for MockTradeClient {
    fn set_cookies(&self, cookies: Vec<String>) -> Result<(), Error> {
        pop(&self.set_cookies_results).unwrap_or(Ok(()))?;
        *self.cookies.lock().unwrap() = Some(cookies);
        Ok(())
    }

    async fn send_offer(&self, offer: &NewTradeOffer) -> Result<SentOffer, Error> {
        let tradeofferid = {
            let mut sent = self.sent.lock().unwrap();

            sent.push(offer.clone());
            sent.len() as TradeOfferId
        };

        pop(&self.send_results).unwrap_or(Ok(SentOffer {
            tradeofferid,
            needs_mobile_confirmation: true,
            needs_email_confirmation: false,
        }))
    }

    async fn accept_offer(&self, _offer: &TradeOffer) -> Result<AcceptedOffer, Error> {
        self.accept_calls.lock().unwrap().push(Instant::now());
        pop(&self.accept_results).unwrap_or(Ok(AcceptedOffer {
            tradeid: Some(1),
            ..AcceptedOffer::default()
        }))
    }

    async fn decline_offer(&self, offer: &TradeOffer) -> Result<(), Error> {
        self.declined.lock().unwrap().push(offer.tradeofferid);
        Ok(())
    }

    async fn cancel_offer(&self, tradeofferid: TradeOfferId) -> Result<(), Error> {
        self.cancelled.lock().unwrap().push(tradeofferid);
        Ok(())
    }

    async fn get_active_sent_offers(&self) -> Result<Vec<TradeOffer>, Error> {
        Ok(self.active_sent.lock().unwrap().clone())
    }

    async fn get_active_received_offers(&self) -> Result<Vec<TradeOffer>, Error> {
        pop(&self.received_results).unwrap_or(Ok(Vec::new()))
    }

    async fn get_exchange_details(&self, _tradeid: TradeId) -> Result<ExchangeDetails, Error> {
        self.exchange_calls.lock().unwrap().push(Instant::now());
        pop(&self.exchange_results)
            .unwrap_or_else(|| Err(Error::Response("no exchange details scripted".into())))
    }

    async fn get_inventory(
        &self,
        appid: AppId,
        contextid: ContextId,
        tradable_only: bool,
    ) -> Result<Vec<Item>, Error> {
        self.inventory_calls.lock().unwrap().push((appid, contextid, tradable_only));
        pop(&self.inventory_results).unwrap_or(Ok(Vec::new()))
    }

    async fn get_trade_confirmations(&self) -> Result<Vec<Confirmation>, Error> {
        pop(&self.confirmations).unwrap_or(Ok(Vec::new()))
    }

    async fn accept_confirmation(&self, confirmation: &Confirmation) -> Result<(), Error> {
        self.accepted_confirmations.lock().unwrap().push(confirmation.id);
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockCommunityClient {
    pub login_results: Mutex<VecDeque<Result<Vec<String>, LoginError>>>,
    pub login_calls: Mutex<Vec<(Instant, String)>>,
    pub events: broadcast::Sender<CommunityEvent>,
}

impl Default for MockCommunityClient {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);

        Self {
            login_results: Mutex::new(VecDeque::new()),
            login_calls: Mutex::new(Vec::new()),
            events,
        }
    }
}

impl MockCommunityClient {
    pub fn push_login(&self, result: Result<Vec<String>, LoginError>) {
        self.login_results.lock().unwrap().push_back(result);
    }

    pub fn login_count(&self) -> usize {
        self.login_calls.lock().unwrap().len()
    }

    pub fn login_times(&self) -> Vec<Instant> {
        self.login_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(time, _code)| *time)
            .collect()
    }
}

#[async_trait]
impl CommunityClient for MockCommunityClient {
    async fn login(&self, details: &LoginDetails<'_>) -> Result<Vec<String>, LoginError> {
        self.login_calls.lock().unwrap().push((Instant::now(), details.two_factor_code.clone()));
        // Logins take a moment, which lets concurrent callers overlap.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        pop(&self.login_results).unwrap_or_else(|| Ok(vec!["steamLoginSecure=cookie".into()]))
    }

    fn subscribe(&self) -> broadcast::Receiver<CommunityEvent> {
        self.events.subscribe()
    }
}

#[derive(Debug, Default)]
pub struct MockSteamClient {
    pub log_on_results: Mutex<VecDeque<Result<LoggedOn, LoginError>>>,
    pub log_on_calls: Mutex<Vec<(Instant, String)>>,
}

impl MockSteamClient {
    pub fn push_log_on(&self, result: Result<LoggedOn, LoginError>) {
        self.log_on_results.lock().unwrap().push_back(result);
    }
}

#[async_trait]
impl SteamClient for MockSteamClient {
    async fn log_on(&self, details: &LoginDetails<'_>) -> Result<LoggedOn, LoginError> {
        self.log_on_calls.lock().unwrap().push((Instant::now(), details.two_factor_code.clone()));
        pop(&self.log_on_results).unwrap_or(Ok(LoggedOn::default()))
    }
}

/// Hands out "CODE1", "CODE2", and so on.
#[derive(Debug, Default)]
pub struct CountingAuthCodes {
    pub generated: AtomicUsize,
}

impl AuthCodeProvider for CountingAuthCodes {
    fn generate(&self, _shared_secret: &str) -> Result<String, Error> {
        let count = self.generated.fetch_add(1, Ordering::SeqCst) + 1;

        Ok(format!("CODE{count}"))
    }
}
