//! Error types.

use crate::enums::TradeStatus;
use crate::types::TradeId;
use std::num::ParseIntError;
use reqwest::StatusCode;

/// Convenience type for results returned by this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any error produced while talking to Steam or driving a bot.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid parameter: {}", .0)]
    Parameter(&'static str),
    #[error("Unexpected response: {}", .0)]
    Response(String),
    #[error("Request error: {}", .0)]
    Reqwest(#[from] reqwest::Error),
    #[error("Request middleware error: {}", .0)]
    ReqwestMiddleware(anyhow::Error),
    #[error("Error parsing response: {}", .0)]
    Parse(#[from] serde_json::Error),
    #[error("Error {}", .0)]
    Http(StatusCode),
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Trade error: {}", .0)]
    Trade(#[from] TradeOfferError),
    #[error("Login error: {}", .0)]
    Login(#[from] LoginError),
    #[error("Error generating code: {}", .0)]
    Totp(#[from] another_steam_totp::Error),
    #[error("Error setting cookies: {}", .0)]
    SetCookies(#[from] SetCookiesError),
    #[error("Trade {} failed with status {}", .tradeid, .status)]
    TradeFailed {
        tradeid: TradeId,
        status: TradeStatus,
    },
    #[error("Trade {} is still processing", .0)]
    TradeStillProcessing(TradeId),
    #[error("No trade ID for accepted offer")]
    MissingTradeId,
    #[error("Confirmation unsuccessful. {}", .0.as_deref().unwrap_or("The confirmation may have succeeded, the confirmation no longer exists, or another trade may be going through. Check confirmations again to verify."))]
    ConfirmationUnsuccessful(Option<String>),
}

impl Error {
    /// The EResult code carried by a trade error, if any.
    pub fn eresult(&self) -> Option<i32> {
        match self {
            Self::Trade(error) => error.code(),
            _ => None,
        }
    }

    /// Whether Steam refused an offer because too many offers are outstanding.
    pub fn is_offer_limit(&self) -> bool {
        match self {
            Self::Trade(TradeOfferError::LimitExceeded) => true,
            Self::Trade(TradeOfferError::Unknown(message)) |
            Self::Response(message) => {
                let message = message.to_lowercase();

                message.contains("too many trade offers") ||
                message.contains("too many outstanding")
            },
            _ => false,
        }
    }

    /// Whether this is the generic "Failure" Steam responds with when a service is having a
    /// moment. Requests failing this way are expected to succeed later.
    pub fn is_transient_failure(&self) -> bool {
        match self {
            Self::Trade(TradeOfferError::Fail) => true,
            Self::Response(message) => message.contains("Failure"),
            _ => false,
        }
    }

    /// Whether the same request may succeed if made again. Malformed parameters and responses
    /// that fail to parse will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::Parameter(_) |
            Self::Parse(_) |
            Self::Totp(_) |
            Self::SetCookies(_) |
            Self::TradeFailed { .. } |
            Self::MissingTradeId
        )
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(error: reqwest_middleware::Error) -> Error {
        match error {
            reqwest_middleware::Error::Reqwest(e) => Error::Reqwest(e),
            reqwest_middleware::Error::Middleware(e) => Error::ReqwestMiddleware(e),
        }
    }
}

/// An error classified from the EResult code Steam appends to trade errors e.g.
/// "There was an error accepting this trade offer. Please try again later. (28)".
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TradeOfferError {
    #[error("{}", .0)]
    Unknown(String),
    #[error("Unknown EResult {}", .0)]
    UnknownEResult(i32),
    #[error("Failure")]
    Fail,
    #[error("InvalidState")]
    InvalidState,
    #[error("AccessDenied")]
    AccessDenied,
    #[error("Timeout")]
    Timeout,
    #[error("ServiceUnavailable")]
    ServiceUnavailable,
    #[error("LimitExceeded")]
    LimitExceeded,
    #[error("Revoked")]
    Revoked,
    #[error("AlreadyRedeemed")]
    AlreadyRedeemed,
}

impl TradeOfferError {
    /// Classifies an EResult code.
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => Self::Fail,
            11 => Self::InvalidState,
            15 => Self::AccessDenied,
            16 => Self::Timeout,
            20 => Self::ServiceUnavailable,
            25 => Self::LimitExceeded,
            26 => Self::Revoked,
            28 => Self::AlreadyRedeemed,
            _ => Self::UnknownEResult(code),
        }
    }

    /// The EResult code for this error.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Fail => Some(2),
            Self::InvalidState => Some(11),
            Self::AccessDenied => Some(15),
            Self::Timeout => Some(16),
            Self::ServiceUnavailable => Some(20),
            Self::LimitExceeded => Some(25),
            Self::Revoked => Some(26),
            Self::AlreadyRedeemed => Some(28),
            Self::UnknownEResult(code) => Some(*code),
            Self::Unknown(_) => None,
        }
    }
}

impl From<&str> for TradeOfferError {
    fn from(message: &str) -> Self {
        if let Some(code) = message.trim().rsplit(' ').next() {
            let mut chars = code.chars();

            if chars.next() != Some('(') || chars.next_back() != Some(')') {
                return Self::Unknown(message.into());
            }

            if let Ok(code) = chars.as_str().parse::<i32>() {
                return Self::from_code(code);
            }
        }

        Self::Unknown(message.into())
    }
}

/// A login was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LoginError {
    #[error("Invalid account name or password")]
    InvalidCredentials,
    #[error("Invalid or expired two-factor code")]
    InvalidAuthCode,
    /// The login must be approved from the mobile authenticator.
    #[error("SteamGuardMobile: confirm the login from the Steam mobile app")]
    SteamGuardMobile,
    #[error("Too many login attempts")]
    RateLimited,
    #[error("{}", .0)]
    Other(String),
}

/// Cookies could not be used to establish a session.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SetCookiesError {
    #[error("Missing steamLoginSecure cookie")]
    MissingLoginCookie,
    #[error("Malformed steamLoginSecure cookie")]
    MalformedLoginCookie,
    #[error("Invalid SteamID in cookies: {}", .0)]
    SteamID(#[from] ParseIntError),
}

/// Configuration could not be loaded.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Filesystem error: {}", .0)]
    FileSystem(#[from] std::io::Error),
    #[error("Error parsing config: {}", .0)]
    Parse(#[from] serde_json::Error),
    #[error("Missing environment variable {}", .0)]
    MissingVariable(&'static str),
    #[error("Invalid recipient \"{}\"", .0)]
    InvalidRecipient(String),
    #[error("Bot {} has no recipients", .0)]
    NoRecipients(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trade_offer_error() {
        let message = "There was an error accepting this trade offer. Please try again later. (28)";
        let error = TradeOfferError::from(message);

        assert_eq!(error, TradeOfferError::AlreadyRedeemed);
    }

    #[test]
    fn parses_trade_offer_error_without_code() {
        let message = "You have sent too many trade offers, or have too many outstanding trade offers with Partner.";
        let error = TradeOfferError::from(message);

        assert_eq!(error, TradeOfferError::Unknown(message.into()));
        assert!(Error::Trade(error).is_offer_limit());
    }

    #[test]
    fn detects_accept_timeout_code() {
        let error = Error::from(TradeOfferError::from("Please try again later. (16)"));

        assert_eq!(error.eresult(), Some(16));
        assert!(!error.is_offer_limit());
    }

    #[test]
    fn detects_transient_failure() {
        assert!(Error::Response("Failure".into()).is_transient_failure());
        assert!(Error::Trade(TradeOfferError::Fail).is_transient_failure());
        assert!(!Error::NotLoggedIn.is_transient_failure());
    }

    #[test]
    fn classifies_retryable_errors() {
        let parse_error = serde_json::from_str::<u32>("<html>").unwrap_err();

        assert!(Error::Response("Failure".into()).is_retryable());
        assert!(Error::Http(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(Error::NotLoggedIn.is_retryable());
        assert!(!Error::Parameter("tradeid").is_retryable());
        assert!(!Error::Parse(parse_error).is_retryable());
    }
}
