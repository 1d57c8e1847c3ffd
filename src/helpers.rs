use crate::error::{Error, TradeOfferError};
use crate::types::HttpClient;
use std::sync::Arc;
use reqwest::{header, cookie::Jar};
use reqwest_middleware::ClientBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use lazy_regex::{regex_is_match, regex_captures};

pub const COMMUNITY_HOSTNAME: &str = "steamcommunity.com";
pub const WEB_API_HOSTNAME: &str = "api.steampowered.com";
pub const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.71 Safari/537.36";

/// Creates a client sharing `cookies`, optionally routing every request through `proxy`.
pub fn get_default_client(
    cookies: Arc<Jar>,
    user_agent: &'static str,
    proxy: Option<&str>,
) -> Result<HttpClient, Error> {
    let mut headers = header::HeaderMap::new();
    
    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(user_agent));
    
    let mut builder = reqwest::ClientBuilder::new()
        .cookie_provider(cookies)
        .default_headers(headers);
    
    if let Some(proxy) = proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    
    Ok(ClientBuilder::new(builder.build()?).build())
}

/// Generates a random sessionid.
pub fn generate_sessionid() -> String {
    // Should look like "37bf523a24034ec06c60ec61"
    (0..12)
        .map(|_| format!("{:02x}", rand::random::<u8>()))
        .collect()
}

fn is_login(location: Option<&header::HeaderValue>) -> bool {
    location
        .and_then(|location| location.to_str().ok())
        .map(|location| regex_is_match!("/login", location))
        .unwrap_or(false)
}

/// Steam puts the reason for a failed trade action in `strError`.
fn parse_trade_error(body: &[u8]) -> Option<TradeOfferError> {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(rename = "strError")]
        str_error: String,
    }
    
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|body| TradeOfferError::from(body.str_error.as_str()))
}

/// Checks the status of a response and reads its body.
pub async fn check_response(response: reqwest::Response) -> Result<bytes::Bytes, Error> {
    let status = response.status();
    
    match status.as_u16() {
        300..=399 if is_login(response.headers().get(header::LOCATION)) => {
            Err(Error::NotLoggedIn)
        },
        401 => Err(Error::NotLoggedIn),
        400..=599 => {
            let body = response.bytes().await?;
            
            if let Some(error) = parse_trade_error(&body) {
                Err(Error::Trade(error))
            } else {
                Err(Error::Http(status))
            }
        },
        _ => Ok(response.bytes().await?),
    }
}

/// Checks a response and deserializes its body, detecting Steam's HTML error pages.
pub async fn parses_response<D>(response: reqwest::Response) -> Result<D, Error>
where
    D: DeserializeOwned,
{
    let body = check_response(response).await?;
    
    parse_body(&body)
}

fn parse_body<D>(body: &[u8]) -> Result<D, Error>
where
    D: DeserializeOwned,
{
    match serde_json::from_slice::<D>(body) {
        Ok(body) => Ok(body),
        Err(parse_error) => {
            let html = String::from_utf8_lossy(body);
            
            if let Some(error) = parse_trade_error(body) {
                Err(Error::Trade(error))
            } else if regex_is_match!(r#"<h1>Sorry!</h1>"#, &html) {
                if let Some((_, message)) = regex_captures!("<h3>(.+)</h3>", &html) {
                    Err(Error::Response(message.into()))
                } else {
                    Err(Error::Response("Unexpected error".into()))
                }
            } else if regex_is_match!(r#"<h1>Sign In</h1>"#, &html) && regex_is_match!(r#"g_steamID = false;"#, &html) {
                Err(Error::NotLoggedIn)
            } else if let Some((_, message)) = regex_captures!(r#"<div id="error_msg">\s*([^<]+)\s*</div>"#, &html) {
                Err(Error::Trade(TradeOfferError::from(message.trim())))
            } else {
                Err(Error::Parse(parse_error))
            }
        },
    }
}
