use super::RecoveryFlag;
use crate::client::TradeClient;
use crate::error::Error;
use crate::item::Item;
use crate::recipient::{Recipient, Recipients};
use crate::request::NewTradeOfferBuilder;
use std::sync::Arc;
use futures::future::join_all;
use tokio::task::JoinHandle;

/// Offers never carry fewer items than this, unless fewer items are being sent.
pub const MIN_BATCH_SIZE: usize = 50;
/// Items are split across at most this many offers.
pub const MAX_BATCHES: usize = 5;

/// The number of items per offer when sending `total` items.
pub fn batch_size(total: usize) -> usize {
    MIN_BATCH_SIZE.max(total.div_ceil(MAX_BATCHES))
}

/// One offer's worth of items and who it goes to.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingOfferBatch {
    /// 1-based position of the batch within its dispatch.
    pub number: usize,
    pub recipient: Recipient,
    pub items: Vec<Item>,
}

/// Splits items into batches and sends each batch as an offer to a randomly chosen recipient.
#[derive(Clone)]
pub struct OfferDispatcher {
    client: Arc<dyn TradeClient>,
    recipients: Arc<Recipients>,
    flag: RecoveryFlag,
    tag: Arc<str>,
}

impl OfferDispatcher {
    pub fn new(
        client: Arc<dyn TradeClient>,
        recipients: Recipients,
        flag: RecoveryFlag,
        tag: Arc<str>,
    ) -> Self {
        Self {
            client,
            recipients: Arc::new(recipients),
            flag,
            tag,
        }
    }

    /// Partitions `items` into batches, in order. Every batch but the last is exactly
    /// [`batch_size`] items.
    pub fn batches(&self, items: Vec<Item>) -> Vec<OutgoingOfferBatch> {
        if items.is_empty() {
            return Vec::new();
        }

        let size = batch_size(items.len());

        items
            .chunks(size)
            .enumerate()
            .map(|(i, chunk)| OutgoingOfferBatch {
                number: i + 1,
                recipient: self.recipients.choose().clone(),
                items: chunk.to_vec(),
            })
            .collect()
    }

    /// Sends `items` in batches. Each batch is sent on its own task and the handles are returned
    /// without waiting on them. Failures are logged and set the recovery flag.
    pub fn dispatch(&self, items: Vec<Item>) -> Vec<JoinHandle<()>> {
        let total = items.len();
        let batches = self.batches(items);

        if batches.is_empty() {
            return Vec::new();
        }

        log::info!(
            "{} {} items will be sent in {} groups of up to {} items.",
            self.tag,
            total,
            batches.len(),
            batch_size(total),
        );

        batches
            .into_iter()
            .map(|batch| {
                let dispatcher = self.clone();

                tokio::spawn(async move {
                    dispatcher.send_batch(batch).await;
                })
            })
            .collect()
    }

    async fn send_batch(&self, batch: OutgoingOfferBatch) {
        let count = batch.items.len();
        let partner = u64::from(batch.recipient.partner);
        let offer = NewTradeOfferBuilder::to_recipient(&batch.recipient)
            .items_to_give(batch.items)
            .build();

        log::info!("{} Sending group #{} of {count} items to {partner}.", self.tag, batch.number);

        match self.client.send_offer(&offer).await {
            Ok(sent) => {
                log::info!(
                    "{} Sent group #{} as offer #{}.",
                    self.tag,
                    batch.number,
                    sent.tradeofferid,
                );
            },
            Err(error) => {
                log::warn!("{} Error sending group #{}: {error}", self.tag, batch.number);

                if error.is_offer_limit() {
                    log::info!("{} Too many outstanding offers. Canceling all sent offers...", self.tag);

                    if let Err(error) = self.cancel_active_offers().await {
                        log::warn!("{} Error getting sent offers: {error}", self.tag);
                    }
                }

                self.flag.set();
            },
        }
    }

    /// Cancels every active offer we sent. The cancellations run concurrently; individual
    /// failures are logged. Returns the number of offers cancelled.
    pub async fn cancel_active_offers(&self) -> Result<usize, Error> {
        let offers = self.client.get_active_sent_offers().await?;
        let results = join_all(offers
            .iter()
            .map(|offer| self.client.cancel_offer(offer.tradeofferid))
        ).await;
        let mut cancelled = 0;

        for (offer, result) in offers.iter().zip(results) {
            match result {
                Ok(()) => cancelled += 1,
                Err(error) => log::warn!(
                    "{} Error canceling offer #{}: {error}",
                    self.tag,
                    offer.tradeofferid,
                ),
            }
        }

        log::info!("{} Canceled {cancelled} of {} sent offers.", self.tag, offers.len());
        Ok(cancelled)
    }
}
