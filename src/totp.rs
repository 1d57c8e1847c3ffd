use crate::client::AuthCodeProvider;
use crate::error::Error;
use another_steam_totp::generate_auth_code;

/// Generates Steam Guard codes the same way the mobile authenticator does.
#[derive(Debug, Clone, Copy, Default)]
pub struct SteamTotp {
    /// How many seconds this machine's clock is behind Steam's servers.
    pub time_offset: Option<i64>,
}

impl AuthCodeProvider for SteamTotp {
    fn generate(&self, shared_secret: &str) -> Result<String, Error> {
        Ok(generate_auth_code(shared_secret, self.time_offset)?)
    }
}
