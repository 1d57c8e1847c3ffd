//! Models for making requests.

mod new_trade_offer;

pub use new_trade_offer::{NewTradeOffer, NewTradeOfferBuilder};
