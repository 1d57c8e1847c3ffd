use serde::{Serialize, Deserialize};
use strum::Display;

/// The type of a mobile confirmation.
#[derive(Debug, Serialize, Deserialize, Display, PartialEq, Eq, Clone, Copy, Default)]
#[serde(from = "u32", into = "u32")]
pub enum ConfirmationType {
    #[default]
    Generic,
    /// Confirmation to confirm a trade.
    Trade,
    MarketSell,
    AccountRecovery,
    Unknown(u32),
}

impl From<u32> for ConfirmationType {
    fn from(value: u32) -> Self {
        match value {
            1 => Self::Generic,
            2 => Self::Trade,
            3 => Self::MarketSell,
            6 => Self::AccountRecovery,
            other => Self::Unknown(other),
        }
    }
}

impl From<ConfirmationType> for u32 {
    fn from(confirmation_type: ConfirmationType) -> Self {
        match confirmation_type {
            ConfirmationType::Generic => 1,
            ConfirmationType::Trade => 2,
            ConfirmationType::MarketSell => 3,
            ConfirmationType::AccountRecovery => 6,
            ConfirmationType::Unknown(other) => other,
        }
    }
}
