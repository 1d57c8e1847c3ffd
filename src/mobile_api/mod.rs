//! Mobile confirmations, signed with the account's identity secret.

mod operation;

use operation::Operation;

use crate::enums::ConfirmationType;
use crate::error::Error;
use crate::helpers::{parses_response, COMMUNITY_HOSTNAME};
use crate::response::Confirmation;
use crate::session::Session;
use crate::types::HttpClient;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use another_steam_totp::{generate_confirmation_key, get_device_id, Tag};
use serde::Deserialize;

const REQUESTED_WITH: &str = "com.valvesoftware.android.steam.community";

/// The API for mobile confirmations. Shares its client and session with
/// [`crate::api::SteamTradeOfferAPI`].
#[derive(Debug, Clone)]
pub struct MobileAPI {
    pub(crate) client: HttpClient,
    pub(crate) session: Arc<RwLock<Option<Session>>>,
    /// The identity secret for mobile confirmations.
    pub(crate) identity_secret: Option<String>,
    /// The time offset from Steam's servers.
    pub(crate) time_offset: Option<i64>,
}

impl MobileAPI {
    fn get_url(pathname: &str) -> String {
        format!("https://{COMMUNITY_HOSTNAME}{pathname}")
    }
    
    fn get_confirmation_query_params(
        &self,
        tag: Tag,
    ) -> Result<HashMap<&'static str, String>, Error> {
        let steamid = self.session
            .read()
            .map_err(|_| Error::NotLoggedIn)?
            .as_ref()
            .map(|session| session.steamid)
            .ok_or(Error::NotLoggedIn)?;
        let identity_secret = self.identity_secret
            .as_ref()
            .ok_or(Error::Parameter("No identity secret"))?;
        let (key, time) = generate_confirmation_key(identity_secret, tag, self.time_offset)?;
        let mut params: HashMap<&'static str, String> = HashMap::new();
        
        params.insert("p", get_device_id(steamid));
        params.insert("a", steamid.to_string());
        params.insert("k", key);
        params.insert("t", time.to_string());
        params.insert("m", "react".into());
        params.insert("tag", tag.to_string());
        
        Ok(params)
    }
    
    /// Gets the pending trade confirmations.
    pub async fn get_trade_confirmations(&self) -> Result<Vec<Confirmation>, Error> {
        #[derive(Deserialize)]
        struct GetConfirmationsResponse {
            #[serde(default)]
            success: bool,
            #[serde(default)]
            message: Option<String>,
            #[serde(default)]
            conf: Vec<Confirmation>,
        }
        
        let query = self.get_confirmation_query_params(Tag::Conf)?;
        let response = self.client.get(Self::get_url("/mobileconf/getlist"))
            .header("X-Requested-With", REQUESTED_WITH)
            .query(&query)
            .send()
            .await?;
        let body: GetConfirmationsResponse = parses_response(response).await?;
        
        if !body.success {
            return Err(Error::ConfirmationUnsuccessful(body.message));
        }
        
        Ok(body.conf
            .into_iter()
            .filter(|confirmation| confirmation.r#type == ConfirmationType::Trade)
            .collect())
    }
    
    /// Accepts a confirmation.
    pub async fn accept_confirmation(&self, confirmation: &Confirmation) -> Result<(), Error> {
        self.send_confirmation_ajax(confirmation, Operation::Allow).await
    }
    
    async fn send_confirmation_ajax(
        &self,
        confirmation: &Confirmation,
        operation: Operation,
    ) -> Result<(), Error> {
        #[derive(Deserialize)]
        struct SendConfirmationResponse {
            success: bool,
            #[serde(default)]
            message: Option<String>,
        }
        
        let mut query = self.get_confirmation_query_params(Tag::Conf)?;
        
        query.insert("op", operation.to_string());
        query.insert("cid", confirmation.id.to_string());
        query.insert("ck", confirmation.nonce.to_string());
        
        let response = self.client.get(Self::get_url("/mobileconf/ajaxop"))
            .header("X-Requested-With", REQUESTED_WITH)
            .query(&query)
            .send()
            .await?;
        let body: SendConfirmationResponse = parses_response(response).await?;
        
        if !body.success {
            return Err(Error::ConfirmationUnsuccessful(body.message));
        }
        
        Ok(())
    }
}
