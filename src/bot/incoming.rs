use super::{OfferDispatcher, RecoveryFlag};
use crate::client::TradeClient;
use crate::error::Error;
use crate::response::{AcceptedOffer, ExchangeDetails, TradeOffer};
use crate::types::TradeId;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// How many times accepting an offer is attempted.
pub const MAX_ACCEPT_ATTEMPTS: u32 = 3;
/// The EResult Steam responds with when an accept collides with another trade in progress.
pub const ACCEPT_TIMEOUT_ERESULT: i32 = 16;
const ACCEPT_TIMEOUT_WAIT: Duration = Duration::from_secs(15 * 60);

const MAX_FETCH_RETRIES: u32 = 5;
const FETCH_RETRY_STEP: Duration = Duration::from_secs(20);
const MAX_PROCESSING_RETRIES: u32 = 3;
const PROCESSING_WAIT: Duration = Duration::from_secs(60);

/// How long to wait after failed accept attempt `attempt` (1-based).
pub fn accept_backoff(attempt: u32, error: &Error) -> Duration {
    if error.eresult() == Some(ACCEPT_TIMEOUT_ERESULT) {
        ACCEPT_TIMEOUT_WAIT
    } else {
        Duration::from_secs(60 * u64::from(attempt))
    }
}

/// How handling an offer ended.
#[derive(Debug, Clone, PartialEq)]
pub enum OfferOutcome {
    /// The offer asked for our items.
    Declined,
    /// Every accept attempt failed. The offer may have been accepted anyway.
    AcceptFailed,
    /// The offer was accepted but the received items could not be identified. The recovery
    /// flag is set so a sweep picks them up.
    Unresolved,
    /// The received items were dispatched.
    Forwarded {
        tradeid: TradeId,
        items: usize,
    },
}

/// Accepts gift offers and forwards what they bring in. Offers asking for any of our items
/// are declined.
#[derive(Clone)]
pub struct IncomingOfferHandler {
    client: Arc<dyn TradeClient>,
    dispatcher: OfferDispatcher,
    flag: RecoveryFlag,
    tag: Arc<str>,
}

impl IncomingOfferHandler {
    pub fn new(
        client: Arc<dyn TradeClient>,
        dispatcher: OfferDispatcher,
        flag: RecoveryFlag,
        tag: Arc<str>,
    ) -> Self {
        Self {
            client,
            dispatcher,
            flag,
            tag,
        }
    }

    /// Handles `offer` on its own task.
    pub fn spawn(&self, offer: TradeOffer) -> JoinHandle<OfferOutcome> {
        let handler = self.clone();

        tokio::spawn(async move {
            handler.handle_offer(offer).await
        })
    }

    pub async fn handle_offer(&self, offer: TradeOffer) -> OfferOutcome {
        if offer.takes_items() {
            log::info!("{} Declining offer {offer} because it asks for our items.", self.tag);

            if let Err(error) = self.client.decline_offer(&offer).await {
                log::warn!("{} Error declining offer {offer}: {error}", self.tag);
            }

            return OfferOutcome::Declined;
        }

        log::info!("{} Accepting offer {offer}...", self.tag);

        let Some(accepted) = self.accept_with_retry(&offer).await else {
            return OfferOutcome::AcceptFailed;
        };
        let Some(tradeid) = accepted.tradeid else {
            log::warn!("{} {}", self.tag, Error::MissingTradeId);
            self.flag.set();
            return OfferOutcome::Unresolved;
        };

        log::info!("{} Accepted offer {offer}. Trade ID: {tradeid}", self.tag);

        let details = match self.resolve_exchange_details(tradeid).await {
            Ok(details) => details,
            Err(error) => {
                log::warn!("{} Error getting exchange details for trade {tradeid}: {error}", self.tag);
                self.flag.set();
                return OfferOutcome::Unresolved;
            },
        };
        let items = details.received_items();
        let count = items.len();

        log::info!("{} Received {count} items in trade {tradeid}.", self.tag);

        if count < offer.items_to_receive.len() {
            log::warn!(
                "{} Only {count} of {} items in trade {tradeid} have new asset IDs.",
                self.tag,
                offer.items_to_receive.len(),
            );
            self.flag.set();
        }

        self.dispatcher.dispatch(items);

        OfferOutcome::Forwarded {
            tradeid,
            items: count,
        }
    }

    async fn accept_with_retry(&self, offer: &TradeOffer) -> Option<AcceptedOffer> {
        for attempt in 1..=MAX_ACCEPT_ATTEMPTS {
            let error = match self.client.accept_offer(offer).await {
                Ok(accepted) => return Some(accepted),
                Err(error) => error,
            };

            if attempt == MAX_ACCEPT_ATTEMPTS {
                log::warn!(
                    "{} Failed to accept offer {offer} after {MAX_ACCEPT_ATTEMPTS} tries (it may have been accepted already): {error}",
                    self.tag,
                );
                break;
            }

            let wait = accept_backoff(attempt, &error);

            log::warn!(
                "{} Error accepting offer {offer}: {error}. Trying again in {} minutes...",
                self.tag,
                wait.as_secs() / 60,
            );
            tokio::time::sleep(wait).await;
        }

        None
    }

    /// Fetches the exchange details for `tradeid`, waiting out Steam while it is still moving
    /// the items. Fetch errors and a still-processing trade are retried separately. Errors that
    /// would repeat on every fetch are returned at once.
    pub async fn resolve_exchange_details(&self, tradeid: TradeId) -> Result<ExchangeDetails, Error> {
        let mut fetch_retries = 0;
        let mut processing_retries = 0;

        loop {
            match self.client.get_exchange_details(tradeid).await {
                Ok(details) if details.status.is_failed() => {
                    return Err(Error::TradeFailed {
                        tradeid,
                        status: details.status,
                    });
                },
                Ok(details) if details.status.is_processing() => {
                    if processing_retries >= MAX_PROCESSING_RETRIES {
                        return Err(Error::TradeStillProcessing(tradeid));
                    }

                    processing_retries += 1;
                    log::debug!(
                        "{} Trade {tradeid} is {}. Checking again in {} seconds...",
                        self.tag,
                        details.status,
                        PROCESSING_WAIT.as_secs(),
                    );
                    tokio::time::sleep(PROCESSING_WAIT).await;
                },
                Ok(details) => return Ok(details),
                Err(error) if !error.is_retryable() => return Err(error),
                Err(error) => {
                    if fetch_retries >= MAX_FETCH_RETRIES {
                        return Err(error);
                    }

                    fetch_retries += 1;

                    let wait = FETCH_RETRY_STEP * fetch_retries;

                    log::debug!(
                        "{} Error getting exchange details for trade {tradeid}: {error}. Retrying in {} seconds...",
                        self.tag,
                        wait.as_secs(),
                    );
                    tokio::time::sleep(wait).await;
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::TradeStatus;
    use crate::error::TradeOfferError;
    use crate::test_support::{self, MockTradeClient};
    use tokio::time::Instant;

    const TRADEID: TradeId = 3622543526924228084;

    fn handler(client: &Arc<MockTradeClient>) -> (IncomingOfferHandler, RecoveryFlag) {
        let flag = RecoveryFlag::default();
        let tag: Arc<str> = Arc::from("[alpha]");

        flag.clear();

        let dispatcher = OfferDispatcher::new(
            client.clone(),
            test_support::recipients(2),
            flag.clone(),
            tag.clone(),
        );
        let handler = IncomingOfferHandler::new(client.clone(), dispatcher, flag.clone(), tag);

        (handler, flag)
    }

    fn accepted() -> AcceptedOffer {
        AcceptedOffer {
            tradeid: Some(TRADEID),
            ..AcceptedOffer::default()
        }
    }

    fn gift() -> TradeOffer {
        test_support::offer(1, Vec::new(), test_support::items(3))
    }

    /// Lets spawned sends finish.
    async fn settle() {
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    #[test]
    fn backoff_grows_by_a_minute() {
        let error = Error::Response("Failure".into());

        assert_eq!(accept_backoff(1, &error), Duration::from_secs(60));
        assert_eq!(accept_backoff(2, &error), Duration::from_secs(120));
    }

    #[test]
    fn backoff_waits_out_timeout_code() {
        let error = Error::Trade(TradeOfferError::from("Please try again later. (16)"));

        assert_eq!(accept_backoff(1, &error), Duration::from_secs(15 * 60));
        assert_eq!(accept_backoff(2, &error), Duration::from_secs(15 * 60));
    }

    #[tokio::test(start_paused = true)]
    async fn declines_offer_asking_for_items() {
        let client = Arc::new(MockTradeClient::default());
        let (handler, flag) = handler(&client);
        let offer = test_support::offer(7, test_support::items(1), test_support::items(5));

        assert_eq!(handler.handle_offer(offer).await, OfferOutcome::Declined);
        assert_eq!(*client.declined.lock().unwrap(), vec![7]);
        assert!(client.accept_calls.lock().unwrap().is_empty());
        assert!(client.sent_offers().is_empty());
        assert!(!flag.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn forwards_received_items_under_new_ids() {
        let client = Arc::new(MockTradeClient::default());
        let (handler, flag) = handler(&client);

        client.push_accept(Ok(accepted()));
        client.push_exchange(Ok(test_support::exchange_details(
            TRADEID,
            TradeStatus::Complete,
            &[501, 502, 503],
        )));

        let outcome = handler.handle_offer(gift()).await;

        settle().await;

        let sent = client.sent_offers();

        assert_eq!(outcome, OfferOutcome::Forwarded { tradeid: TRADEID, items: 3 });
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].items_to_give.iter().map(|item| item.assetid).collect::<Vec<_>>(),
            vec![501, 502, 503],
        );
        assert!(!flag.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn items_without_new_ids_set_flag() {
        let client = Arc::new(MockTradeClient::default());
        let (handler, flag) = handler(&client);
        let mut details = test_support::exchange_details(TRADEID, TradeStatus::Complete, &[501, 502, 503]);

        details.assets_received[1].new_assetid = None;
        client.push_accept(Ok(accepted()));
        client.push_exchange(Ok(details));

        let outcome = handler.handle_offer(gift()).await;

        settle().await;

        let sent = client.sent_offers();

        assert_eq!(outcome, OfferOutcome::Forwarded { tradeid: TRADEID, items: 2 });
        assert_eq!(
            sent[0].items_to_give.iter().map(|item| item.assetid).collect::<Vec<_>>(),
            vec![501, 503],
        );
        assert!(flag.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn retries_accept_with_growing_waits() {
        let client = Arc::new(MockTradeClient::default());
        let (handler, _flag) = handler(&client);
        let start = Instant::now();

        client.push_accept(Err(Error::Response("Failure".into())));
        client.push_accept(Err(Error::Response("Failure".into())));
        client.push_accept(Ok(accepted()));
        client.push_exchange(Ok(test_support::exchange_details(TRADEID, TradeStatus::Complete, &[9])));

        let outcome = handler.handle_offer(gift()).await;
        let calls = client.accept_calls.lock().unwrap().clone();

        assert_eq!(outcome, OfferOutcome::Forwarded { tradeid: TRADEID, items: 1 });
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0] - start, Duration::ZERO);
        assert_eq!(calls[1] - calls[0], Duration::from_secs(60));
        assert_eq!(calls[2] - calls[1], Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_three_accept_attempts() {
        let client = Arc::new(MockTradeClient::default());
        let (handler, flag) = handler(&client);
        let start = Instant::now();

        for _ in 0..3 {
            client.push_accept(Err(Error::Trade(TradeOfferError::from("Please try again later. (16)"))));
        }

        let outcome = handler.handle_offer(gift()).await;
        let calls = client.accept_calls.lock().unwrap().clone();

        assert_eq!(outcome, OfferOutcome::AcceptFailed);
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1] - calls[0], Duration::from_secs(15 * 60));
        assert_eq!(calls[2] - calls[1], Duration::from_secs(15 * 60));
        // no wait after the last attempt
        assert_eq!(Instant::now() - start, Duration::from_secs(30 * 60));
        assert!(client.exchange_calls.lock().unwrap().is_empty());
        assert!(!flag.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_while_trade_is_processing() {
        let client = Arc::new(MockTradeClient::default());
        let (handler, flag) = handler(&client);

        client.push_exchange(Ok(test_support::exchange_details(TRADEID, TradeStatus::Committed, &[])));
        client.push_exchange(Ok(test_support::exchange_details(TRADEID, TradeStatus::Committed, &[])));
        client.push_exchange(Ok(test_support::exchange_details(TRADEID, TradeStatus::Complete, &[1, 2])));

        let details = handler.resolve_exchange_details(TRADEID).await.unwrap();
        let calls = client.exchange_calls.lock().unwrap().clone();

        assert_eq!(details.received_items().len(), 2);
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1] - calls[0], Duration::from_secs(60));
        assert_eq!(calls[2] - calls[1], Duration::from_secs(60));
        assert!(!flag.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn retries_fetch_errors_with_linear_backoff() {
        let client = Arc::new(MockTradeClient::default());
        let (handler, _flag) = handler(&client);

        for _ in 0..2 {
            client.push_exchange(Err(Error::Response("Failure".into())));
        }

        client.push_exchange(Ok(test_support::exchange_details(TRADEID, TradeStatus::Complete, &[1])));

        handler.resolve_exchange_details(TRADEID).await.unwrap();

        let calls = client.exchange_calls.lock().unwrap().clone();

        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1] - calls[0], Duration::from_secs(20));
        assert_eq!(calls[2] - calls[1], Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_errors_are_retried_five_times() {
        let client = Arc::new(MockTradeClient::default());
        let (handler, _flag) = handler(&client);
        let start = Instant::now();
        let result = handler.resolve_exchange_details(TRADEID).await;

        assert!(result.is_err());
        assert_eq!(client.exchange_calls.lock().unwrap().len(), 6);
        // 20 + 40 + 60 + 80 + 100
        assert_eq!(Instant::now() - start, Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn parse_errors_are_not_retried() {
        let client = Arc::new(MockTradeClient::default());
        let (handler, _flag) = handler(&client);
        let start = Instant::now();

        client.push_exchange(Err(Error::Parse(serde_json::from_str::<u32>("{").unwrap_err())));

        let result = handler.resolve_exchange_details(TRADEID).await;

        assert!(matches!(result, Err(Error::Parse(_))));
        assert_eq!(client.exchange_calls.lock().unwrap().len(), 1);
        assert_eq!(Instant::now() - start, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn processing_is_waited_out_three_times() {
        let client = Arc::new(MockTradeClient::default());
        let (handler, _flag) = handler(&client);

        for _ in 0..4 {
            client.push_exchange(Ok(test_support::exchange_details(TRADEID, TradeStatus::Init, &[])));
        }

        let result = handler.resolve_exchange_details(TRADEID).await;

        assert!(matches!(result, Err(Error::TradeStillProcessing(TRADEID))));
        assert_eq!(client.exchange_calls.lock().unwrap().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_trade_sets_flag_without_forwarding() {
        let client = Arc::new(MockTradeClient::default());
        let (handler, flag) = handler(&client);

        client.push_accept(Ok(accepted()));
        client.push_exchange(Ok(test_support::exchange_details(TRADEID, TradeStatus::Failed, &[1])));

        let outcome = handler.handle_offer(gift()).await;

        settle().await;

        assert_eq!(outcome, OfferOutcome::Unresolved);
        assert_eq!(client.exchange_calls.lock().unwrap().len(), 1);
        assert!(client.sent_offers().is_empty());
        assert!(flag.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_trade_id_sets_flag() {
        let client = Arc::new(MockTradeClient::default());
        let (handler, flag) = handler(&client);

        client.push_accept(Ok(AcceptedOffer::default()));

        assert_eq!(handler.handle_offer(gift()).await, OfferOutcome::Unresolved);
        assert!(client.exchange_calls.lock().unwrap().is_empty());
        assert!(flag.is_set());
    }
}
