//! Models for responses.

mod accepted_offer;
mod confirmation;
mod exchange_details;
mod sent_offer;
mod trade_offer;

pub use accepted_offer::AcceptedOffer;
pub use confirmation::Confirmation;
pub use exchange_details::{ExchangeDetails, ExchangeAsset};
pub use sent_offer::SentOffer;
pub use trade_offer::TradeOffer;
