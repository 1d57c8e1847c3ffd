use crate::client::TradeClient;
use crate::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Accepts every pending trade confirmation. Returns how many were accepted.
pub async fn check_confirmations(client: &dyn TradeClient, tag: &str) -> Result<usize, Error> {
    let confirmations = client.get_trade_confirmations().await?;
    let mut accepted = 0;

    for confirmation in &confirmations {
        match client.accept_confirmation(confirmation).await {
            Ok(()) => {
                log::info!("{tag} Accepted confirmation {confirmation}.");
                accepted += 1;
            },
            Err(error) => log::warn!("{tag} Error accepting confirmation {confirmation}: {error}"),
        }
    }

    Ok(accepted)
}

/// Checks confirmations every `period`.
pub fn spawn_confirmation_checker(
    client: Arc<dyn TradeClient>,
    tag: Arc<str>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);

        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            if let Err(error) = check_confirmations(client.as_ref(), &tag).await {
                log::debug!("{tag} Error checking confirmations: {error}");
            }
        }
    })
}
