use crate::client::{AuthCodeProvider, CommunityClient, LoggedOn, LoginDetails, SteamClient, TradeClient};
use crate::config::BotConfig;
use crate::error::{Error, LoginError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Login attempts per cycle.
pub const LOGIN_ATTEMPTS: u32 = 3;
/// The wait after each failed attempt.
pub const LOGIN_RETRY_WAIT: Duration = Duration::from_secs(30);
/// The extra wait after a cycle where every attempt failed.
pub const LOGIN_CYCLE_WAIT: Duration = Duration::from_secs(60);
/// The wait before generating a new code when the client rejects one.
pub const AUTH_CODE_WAIT: Duration = Duration::from_secs(30);

/// Keeps the web session alive. At most one login sequence runs at a time; calls made while
/// one is running return immediately.
pub struct SessionManager {
    config: Arc<BotConfig>,
    tag: Arc<str>,
    steam: Arc<dyn SteamClient>,
    community: Arc<dyn CommunityClient>,
    trade: Arc<dyn TradeClient>,
    auth: Arc<dyn AuthCodeProvider>,
    logging_in: AtomicBool,
}

impl SessionManager {
    pub fn new(
        config: Arc<BotConfig>,
        tag: Arc<str>,
        steam: Arc<dyn SteamClient>,
        community: Arc<dyn CommunityClient>,
        trade: Arc<dyn TradeClient>,
        auth: Arc<dyn AuthCodeProvider>,
    ) -> Self {
        Self {
            config,
            tag,
            steam,
            community,
            trade,
            auth,
            logging_in: AtomicBool::new(false),
        }
    }

    /// Whether a login sequence is running.
    pub fn is_logging_in(&self) -> bool {
        self.logging_in.load(Ordering::SeqCst)
    }

    fn login_details(&self) -> Result<LoginDetails<'_>, Error> {
        let two_factor_code = self.auth.generate(&self.config.shared_secret)?;

        log::info!("{} Using 2FA code \"{two_factor_code}\".", self.tag);

        Ok(LoginDetails {
            account_name: &self.config.username,
            password: &self.config.password,
            two_factor_code,
        })
    }

    /// Logs the client on. A rejected code is replaced with a fresh one after
    /// [`AUTH_CODE_WAIT`], for as long as it takes; any other rejection is returned.
    pub async fn log_on_client(&self) -> Result<LoggedOn, Error> {
        loop {
            let details = self.login_details()?;

            match self.steam.log_on(&details).await {
                Ok(logged_on) => return Ok(logged_on),
                Err(LoginError::InvalidAuthCode) => {
                    log::info!(
                        "{} Invalid two-factor code. Waiting {} seconds before generating a new one...",
                        self.tag,
                        AUTH_CODE_WAIT.as_secs(),
                    );
                    tokio::time::sleep(AUTH_CODE_WAIT).await;
                },
                Err(error) => return Err(error.into()),
            }
        }
    }

    /// Logs into the web session and installs the cookies on the trade client, retrying until
    /// both work. Returns immediately if another call is already logging in.
    pub async fn retry_login(&self) {
        if self.logging_in.swap(true, Ordering::SeqCst) {
            log::debug!("{} Already logging in.", self.tag);
            return;
        }

        log::info!("{} Logging into Steam Community website...", self.tag);

        while !self.login_cycle().await {
            log::info!(
                "{} Can't log in to account! Waiting {} seconds before trying again...",
                self.tag,
                LOGIN_CYCLE_WAIT.as_secs(),
            );
            tokio::time::sleep(LOGIN_CYCLE_WAIT).await;
        }

        self.logging_in.store(false, Ordering::SeqCst);
        log::info!("{} Logged into Steam Community website.", self.tag);
    }

    /// One cycle of [`LOGIN_ATTEMPTS`] attempts, each failure followed by [`LOGIN_RETRY_WAIT`].
    /// Returns whether an attempt succeeded.
    async fn login_cycle(&self) -> bool {
        for attempt in 1..=LOGIN_ATTEMPTS {
            match self.login().await {
                Ok(()) => return true,
                Err(Error::Login(LoginError::SteamGuardMobile)) => {
                    log::warn!(
                        "{} Login attempt {attempt} needs approval from the mobile app.",
                        self.tag,
                    );
                },
                Err(error) => {
                    log::warn!("{} Login attempt {attempt} failed: {error}", self.tag);
                },
            }

            tokio::time::sleep(LOGIN_RETRY_WAIT).await;
        }

        false
    }

    /// A single attempt: log in, then install the cookies.
    async fn login(&self) -> Result<(), Error> {
        let details = self.login_details()?;
        let cookies = self.community.login(&details).await?;

        self.trade.set_cookies(cookies)
    }
}
