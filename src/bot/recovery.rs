use super::{OfferDispatcher, RecoveryFlag};
use crate::client::TradeClient;
use crate::types::{AppId, ContextId};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// What a recovery tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryTick {
    /// The flag was not set.
    Idle,
    /// The inventory could not be read. The flag stays set.
    Failed,
    /// The inventory was empty. The flag stays set.
    Empty,
    /// The flag was cleared and this many items were dispatched.
    Dispatched(usize),
}

/// Sweeps tradable items stuck in the inventory whenever the recovery flag is set.
pub struct RecoveryLoop {
    client: Arc<dyn TradeClient>,
    dispatcher: OfferDispatcher,
    flag: RecoveryFlag,
    tag: Arc<str>,
    appid: AppId,
    contextid: ContextId,
}

impl RecoveryLoop {
    pub fn new(
        client: Arc<dyn TradeClient>,
        dispatcher: OfferDispatcher,
        flag: RecoveryFlag,
        tag: Arc<str>,
        appid: AppId,
        contextid: ContextId,
    ) -> Self {
        Self {
            client,
            dispatcher,
            flag,
            tag,
            appid,
            contextid,
        }
    }

    pub async fn tick(&self) -> RecoveryTick {
        if !self.flag.is_set() {
            return RecoveryTick::Idle;
        }

        let items = match self.client.get_inventory(self.appid, self.contextid, true).await {
            Ok(items) => items,
            Err(error) if error.is_transient_failure() => return RecoveryTick::Failed,
            Err(error) => {
                log::warn!("{} Error loading inventory: {error}", self.tag);
                return RecoveryTick::Failed;
            },
        };

        if items.is_empty() {
            return RecoveryTick::Empty;
        }

        let count = items.len();

        // Cleared before sending so a failing send can set it again.
        self.flag.clear();
        log::info!("{} Found {count} items in inventory. Sending them...", self.tag);
        self.dispatcher.dispatch(items);

        RecoveryTick::Dispatched(count)
    }

    /// Ticks every `period`, starting one period from now.
    pub fn spawn(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);

            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }
}
