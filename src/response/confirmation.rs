use crate::enums::ConfirmationType;
use crate::serialize;
use std::fmt;
use serde::{Serialize, Deserialize};

/// Mobile confirmation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Confirmation {
    /// The ID of the confirmation.
    #[serde(with = "serialize::string")]
    pub id: u64,
    /// Trade offer ID or market transaction ID.
    #[serde(with = "serialize::string")]
    pub creator_id: u64,
    /// The nonce.
    #[serde(with = "serialize::string")]
    pub nonce: u64,
    /// The confirmation type.
    #[serde(default)]
    pub r#type: ConfirmationType,
    /// The headline.
    #[serde(default)]
    pub headline: String,
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.r#type, self.headline)
    }
}
