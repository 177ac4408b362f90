//! Runtime configuration
//!
//! Every setting can be given as a command-line flag or through the
//! environment variable named next to it.

use crate::auth::OAuthConfig;
use crate::error::{BridgeError, Result};
use clap::Args;
use std::path::PathBuf;

/// Cloud control API base URL
pub const DEFAULT_API_URL: &str = "https://api.ws.sonos.com/control/api/v1";
/// OAuth authorization endpoint
pub const DEFAULT_AUTH_URL: &str = "https://api.sonos.com/login/v3/oauth";
/// OAuth token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://api.sonos.com/login/v3/oauth/access";
/// Redirect URI registered for the OAuth client
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost/integrations/sonos/auth";

/// Integration name used as the token file name
pub const AUDIO_INTEGRATION: &str = "sonos";

/// Configuration for the audio integration
#[derive(Debug, Clone, Args)]
pub struct BridgeConfig {
    /// Household to control; can also be chosen later with a `set-household` message
    #[arg(long, env = "SONOS_HOUSEHOLD_ID")]
    pub household_id: Option<String>,

    /// OAuth client id
    #[arg(long, env = "SONOS_CLIENT_ID", default_value = "")]
    pub client_id: String,

    /// OAuth client secret
    #[arg(long, env = "SONOS_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    pub client_secret: String,

    #[arg(long, env = "SONOS_REDIRECT_URI", default_value = DEFAULT_REDIRECT_URI)]
    pub redirect_uri: String,

    /// Base URL of the control API
    #[arg(long, env = "SONOS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[arg(long, env = "SONOS_AUTH_URL", default_value = DEFAULT_AUTH_URL)]
    pub auth_url: String,

    #[arg(long, env = "SONOS_TOKEN_URL", default_value = DEFAULT_TOKEN_URL)]
    pub token_url: String,

    /// Scope volume changes to single players (true) or whole groups (false)
    #[arg(long, env = "CONTROL_PLAYERS", default_value_t = true, action = clap::ArgAction::Set)]
    pub control_players: bool,

    /// Directory holding encrypted credentials
    #[arg(long, env = "ENCRYPTION_FILE_PATH", default_value = "tokens")]
    pub token_dir: PathBuf,

    /// Passphrase the credential encryption key is derived from
    #[arg(long, env = "ENCRYPTION_KEY", hide_env_values = true)]
    pub encryption_key: Option<String>,
}

impl BridgeConfig {
    /// OAuth settings for the audio integration
    pub fn oauth(&self) -> Result<OAuthConfig> {
        if self.client_id.is_empty() {
            return Err(BridgeError::InvalidConfig("SONOS_CLIENT_ID is not set".to_string()));
        }

        Ok(OAuthConfig {
            integration: AUDIO_INTEGRATION.to_string(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scopes: vec!["playback-control-all".to_string()],
            auth_url: self.auth_url.clone(),
            token_url: self.token_url.clone(),
        })
    }

    /// The encryption passphrase, required for anything touching stored tokens
    pub fn encryption_key(&self) -> Result<&str> {
        self.encryption_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| BridgeError::InvalidConfig("ENCRYPTION_KEY is not set".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: BridgeConfig,
    }

    #[test]
    fn test_defaults_and_flags() {
        let cli = TestCli::parse_from([
            "test",
            "--client-id",
            "abc",
            "--control-players",
            "false",
            "--household-id",
            "HH_1",
        ]);

        assert_eq!(cli.config.client_id, "abc");
        assert!(!cli.config.control_players);
        assert_eq!(cli.config.household_id.as_deref(), Some("HH_1"));
        assert_eq!(cli.config.api_url, DEFAULT_API_URL);
        assert_eq!(cli.config.token_dir, PathBuf::from("tokens"));
    }

    #[test]
    fn test_oauth_requires_client_id() {
        let cli = TestCli::parse_from(["test", "--client-id", ""]);
        assert!(matches!(cli.config.oauth(), Err(BridgeError::InvalidConfig(_))));

        let cli = TestCli::parse_from(["test", "--client-id", "abc", "--client-secret", "shh"]);
        let oauth = cli.config.oauth().unwrap();
        assert_eq!(oauth.integration, AUDIO_INTEGRATION);
        assert_eq!(oauth.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(oauth.client_secret, "shh");
    }
}
