use crate::error::SetCookiesError;
use crate::helpers::generate_sessionid;

const LOGIN_COOKIE_NAME: &str = "steamLoginSecure";
const SESSIONID_COOKIE_NAME: &str = "sessionid";

/// Session data from cookies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// The session ID. Sent with every form post.
    pub sessionid: String,
    /// The access token for Web API calls.
    pub access_token: String,
    /// The SteamID of the logged-in user.
    pub steamid: u64,
}

impl Session {
    /// Reads the session from login cookies. A `sessionid` cookie is generated and appended to
    /// `cookies` when missing.
    pub fn from_cookies(cookies: &mut Vec<String>) -> Result<Self, SetCookiesError> {
        let mut sessionid = None;
        let mut login = None;
        
        for cookie in cookies.iter() {
            let pair = cookie.split(';').next().unwrap_or_default();
            
            if let Some((name, value)) = pair.split_once('=') {
                match name.trim() {
                    SESSIONID_COOKIE_NAME => sessionid = Some(value.trim().to_string()),
                    LOGIN_COOKIE_NAME => login = Some(value.trim().to_string()),
                    _ => {},
                }
            }
        }
        
        let login = login.ok_or(SetCookiesError::MissingLoginCookie)?;
        let (steamid, access_token) = login
            .split_once("%7C%7C")
            .or_else(|| login.split_once("||"))
            .ok_or(SetCookiesError::MalformedLoginCookie)?;
        let steamid = steamid.parse::<u64>()?;
        let access_token = access_token.to_string();
        let sessionid = match sessionid {
            Some(sessionid) => sessionid,
            None => {
                let sessionid = generate_sessionid();
                
                cookies.push(format!("{SESSIONID_COOKIE_NAME}={sessionid}"));
                sessionid
            },
        };
        
        Ok(Self {
            sessionid,
            access_token,
            steamid,
        })
    }
}
