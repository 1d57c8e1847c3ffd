//! Types for common values in Steam responses.

/// Uniquely identifies an application on Steam. For example: 730 for Counter-Strike 2.
pub type AppId = u32;
/// A context ID belonging to an [`AppId`].
pub type ContextId = u64;
/// An asset ID unique to an [`AppId`] + [`ContextId`] combination.
pub type AssetId = u64;
/// An amount for stackable items. For non-stackable items this is simply `1`.
pub type Amount = u32;
/// An ID of a trade offer.
pub type TradeOfferId = u64;
/// An ID of a trade. Present on offers once they have been accepted.
pub type TradeId = u64;

pub use crate::time::ServerTime;

use reqwest_middleware::ClientWithMiddleware;

pub(crate) type HttpClient = ClientWithMiddleware;
