use crate::client::TradeClient;
use crate::error::Error;
use crate::response::TradeOffer;
use crate::types::TradeOfferId;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Finds received offers that have not been seen before.
pub struct Poller {
    client: Arc<dyn TradeClient>,
    seen: HashSet<TradeOfferId>,
}

impl Poller {
    pub fn new(client: Arc<dyn TradeClient>) -> Self {
        Self {
            client,
            seen: HashSet::new(),
        }
    }

    /// Returns the active received offers not returned by a previous poll.
    pub async fn do_poll(&mut self) -> Result<Vec<TradeOffer>, Error> {
        let offers = self.client.get_active_received_offers().await?;
        let active = offers
            .iter()
            .map(|offer| offer.tradeofferid)
            .collect::<HashSet<_>>();
        let new_offers = offers
            .into_iter()
            .filter(|offer| self.seen.insert(offer.tradeofferid))
            .collect();

        // Offers no longer active won't come back.
        self.seen.retain(|tradeofferid| active.contains(tradeofferid));

        Ok(new_offers)
    }
}

/// Polls for new offers every `period`. The task ends once the receiver is dropped.
pub fn create_poller(
    client: Arc<dyn TradeClient>,
    tag: Arc<str>,
    period: Duration,
) -> (mpsc::Receiver<TradeOffer>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<TradeOffer>(10);
    let handle = tokio::spawn(async move {
        let mut poller = Poller::new(client);
        let mut interval = tokio::time::interval(period);

        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let offers = match poller.do_poll().await {
                Ok(offers) => offers,
                Err(error) => {
                    log::debug!("{tag} Error polling offers: {error}");
                    continue;
                },
            };

            for offer in offers {
                if tx.send(offer).await.is_err() {
                    // They closed the connection.
                    return;
                }
            }
        }
    });

    (rx, handle)
}
