use num_enum::{TryFromPrimitive, IntoPrimitive};
use serde_repr::{Serialize_repr, Deserialize_repr};
use strum::{Display, EnumString};

/// The state of a trade offer.
#[derive(Serialize_repr, Deserialize_repr, Display, EnumString, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum TradeOfferState {
    Invalid = 1,
    Active = 2,
    Accepted = 3,
    Countered = 4,
    Expired = 5,
    Canceled = 6,
    Declined = 7,
    InvalidItems = 8,
    CreatedNeedsConfirmation = 9,
    CanceledBySecondFactor = 10,
    InEscrow = 11,
}

impl TradeOfferState {
    /// An offer in this state still occupies one of the outstanding offer slots with the partner.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, Self::Active | Self::CreatedNeedsConfirmation)
    }
}
