//! Enumerated types.

mod confirmation_type;
mod trade_offer_state;
mod trade_status;

pub use confirmation_type::ConfirmationType;
pub use trade_offer_state::TradeOfferState;
pub use trade_status::TradeStatus;
