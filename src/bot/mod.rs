//! A bot forwards everything its account receives to the configured recipients.
//!
//! Once started, a bot keeps its web session alive, accepts offers that only give it items,
//! forwards the received items in batches, and periodically sweeps its inventory whenever
//! forwarding may have left items behind.

mod confirmations;
mod dispatcher;
mod incoming;
mod polling;
mod recovery;
mod recovery_flag;
mod session_manager;

pub use confirmations::{check_confirmations, spawn_confirmation_checker};
pub use dispatcher::{batch_size, OfferDispatcher, OutgoingOfferBatch, MAX_BATCHES, MIN_BATCH_SIZE};
pub use incoming::{accept_backoff, IncomingOfferHandler, OfferOutcome, MAX_ACCEPT_ATTEMPTS};
pub use polling::{create_poller, Poller};
pub use recovery::{RecoveryLoop, RecoveryTick};
pub use recovery_flag::RecoveryFlag;
pub use session_manager::SessionManager;

use crate::client::{AuthCodeProvider, CommunityClient, CommunityEvent, SteamClient, TradeClient};
use crate::config::BotConfig;
use crate::error::{ConfigError, Error};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Debug messages from the web session that are too noisy to log.
const SUPPRESSED_DEBUG_MESSAGES: &[&str] = &["Checking confirmations"];

/// Intervals for a bot's background tasks.
#[derive(Debug, Clone, Copy)]
pub struct BotOptions {
    /// The wait between logging the client on and logging into the web session. Default is 30
    /// seconds.
    pub community_login_delay: Duration,
    /// Interval to check for mobile confirmations at. Default is 10 seconds.
    pub confirmation_interval: Duration,
    /// Interval to poll for new offers at. Default is 30 seconds.
    pub poll_interval: Duration,
    /// Interval to check the recovery flag at. Default is 60 seconds.
    pub recovery_interval: Duration,
}

impl Default for BotOptions {
    fn default() -> Self {
        Self {
            community_login_delay: Duration::from_secs(30),
            confirmation_interval: Duration::from_secs(10),
            poll_interval: Duration::from_secs(30),
            recovery_interval: Duration::from_secs(60),
        }
    }
}

/// The collaborators a bot drives.
#[derive(Clone)]
pub struct BotClients {
    pub steam: Arc<dyn SteamClient>,
    pub community: Arc<dyn CommunityClient>,
    pub trade: Arc<dyn TradeClient>,
    pub auth: Arc<dyn AuthCodeProvider>,
}

/// The background tasks of a started bot.
#[derive(Debug)]
pub struct BotTasks {
    pub events: JoinHandle<()>,
    pub confirmations: JoinHandle<()>,
    pub poller: JoinHandle<()>,
    pub offers: JoinHandle<()>,
    pub recovery: JoinHandle<()>,
}

impl BotTasks {
    /// Stops every task.
    pub fn abort(&self) {
        self.events.abort();
        self.confirmations.abort();
        self.poller.abort();
        self.offers.abort();
        self.recovery.abort();
    }
}

/// One managed account.
pub struct Bot {
    config: Arc<BotConfig>,
    tag: Arc<str>,
    clients: BotClients,
    options: BotOptions,
    flag: RecoveryFlag,
    session: Arc<SessionManager>,
    dispatcher: OfferDispatcher,
}

impl Bot {
    /// Creates a bot with the default [`BotOptions`]. Fails if the configured target has no
    /// valid recipients.
    pub fn new(config: BotConfig, clients: BotClients) -> Result<Self, ConfigError> {
        Self::with_options(config, clients, BotOptions::default())
    }

    pub fn with_options(
        config: BotConfig,
        clients: BotClients,
        options: BotOptions,
    ) -> Result<Self, ConfigError> {
        let recipients = config.recipients()?;
        let tag: Arc<str> = Arc::from(config.tag());
        let config = Arc::new(config);
        let flag = RecoveryFlag::default();
        let session = Arc::new(SessionManager::new(
            Arc::clone(&config),
            Arc::clone(&tag),
            Arc::clone(&clients.steam),
            Arc::clone(&clients.community),
            Arc::clone(&clients.trade),
            Arc::clone(&clients.auth),
        ));
        let dispatcher = OfferDispatcher::new(
            Arc::clone(&clients.trade),
            recipients,
            flag.clone(),
            Arc::clone(&tag),
        );

        Ok(Self {
            config,
            tag,
            clients,
            options,
            flag,
            session,
            dispatcher,
        })
    }

    /// The tag prefixed to this bot's log lines.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn recovery_flag(&self) -> &RecoveryFlag {
        &self.flag
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn dispatcher(&self) -> &OfferDispatcher {
        &self.dispatcher
    }

    /// Logs in and starts the background tasks. Returns once the web session is established.
    pub async fn start(&self) -> Result<BotTasks, Error> {
        log::info!("{} Logging into Steam client...", self.tag);

        let logged_on = self.session.log_on_client().await?;

        match logged_on.public_ip {
            Some(ip) => log::info!("{} Logged into Steam client with IP {ip}.", self.tag),
            None => log::info!("{} Logged into Steam client.", self.tag),
        }

        log::info!(
            "{} Waiting {} seconds before logging into Steam Community website...",
            self.tag,
            self.options.community_login_delay.as_secs(),
        );
        tokio::time::sleep(self.options.community_login_delay).await;

        let events = self.clients.community.subscribe();

        self.session.retry_login().await;

        let events = self.spawn_event_handler(events);
        let confirmations = spawn_confirmation_checker(
            Arc::clone(&self.clients.trade),
            Arc::clone(&self.tag),
            self.options.confirmation_interval,
        );
        let (mut new_offers, poller) = create_poller(
            Arc::clone(&self.clients.trade),
            Arc::clone(&self.tag),
            self.options.poll_interval,
        );
        let handler = IncomingOfferHandler::new(
            Arc::clone(&self.clients.trade),
            self.dispatcher.clone(),
            self.flag.clone(),
            Arc::clone(&self.tag),
        );
        let offers = tokio::spawn(async move {
            while let Some(offer) = new_offers.recv().await {
                handler.spawn(offer);
            }
        });
        let recovery = RecoveryLoop::new(
            Arc::clone(&self.clients.trade),
            self.dispatcher.clone(),
            self.flag.clone(),
            Arc::clone(&self.tag),
            self.config.appid,
            self.config.contextid,
        ).spawn(self.options.recovery_interval);

        Ok(BotTasks {
            events,
            confirmations,
            poller,
            offers,
            recovery,
        })
    }

    fn spawn_event_handler(&self, mut events: broadcast::Receiver<CommunityEvent>) -> JoinHandle<()> {
        let session = Arc::clone(&self.session);
        let tag = Arc::clone(&self.tag);

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(CommunityEvent::Debug(message)) => {
                        if !SUPPRESSED_DEBUG_MESSAGES.contains(&message.as_str()) {
                            log::debug!("{tag} {message}");
                        }
                    },
                    Ok(CommunityEvent::SessionExpired) => {
                        log::info!("{tag} Session expired.");

                        let session = Arc::clone(&session);

                        tokio::spawn(async move {
                            session.retry_login().await;
                        });
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        log::debug!("{tag} Skipped {skipped} web session events.");
                    },
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Starts every bot independently. A bot that fails to start is logged and does not affect
    /// the others.
    pub fn spawn_all(bots: Vec<Bot>) -> Vec<JoinHandle<Option<BotTasks>>> {
        bots
            .into_iter()
            .map(|bot| tokio::spawn(async move {
                match bot.start().await {
                    Ok(tasks) => Some(tasks),
                    Err(error) => {
                        log::warn!("{} Error starting bot: {error}", bot.tag);
                        None
                    },
                }
            }))
            .collect()
    }
}
