use crate::auth::TokenProvider;
use crate::error::{BridgeError, Result};
use crate::types::{
    GroupId, GroupsResponse, Household, HouseholdsResponse, PlaybackCommand, PlayerId, Volume, VolumeTarget,
};
use async_trait::async_trait;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

/// Remote control API of the audio platform
///
/// The orchestrator only talks to the platform through this trait, so tests
/// can substitute a recording fake for the HTTP client.
#[async_trait]
pub trait AudioApi: Send + Sync {
    /// List households the credential has access to
    async fn households(&self) -> Result<Vec<Household>>;

    /// Fetch every group and player of a household
    async fn groups(&self, household_id: &str) -> Result<GroupsResponse>;

    /// Start or pause playback of a group
    async fn playback(&self, group_id: &str, command: PlaybackCommand) -> Result<()>;

    /// Set volume of a player or a group, in percent
    async fn set_volume(&self, target: &VolumeTarget, volume: Volume) -> Result<()>;

    /// Replace the member list of a group
    async fn set_group_members(&self, group_id: &GroupId, player_ids: &[PlayerId]) -> Result<()>;
}

/// HTTP client for the cloud control API
///
/// Stateless apart from the token provider: every request asks it for a
/// currently valid credential.
pub struct AudioClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenProvider>,
}

impl AudioClient {
    /// Create a client against `base_url` (e.g. `https://api.ws.sonos.com/control/api/v1`)
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, tokens: Arc<TokenProvider>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Get the API base URL, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send an authenticated request and fail on non-success statuses
    async fn send(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> Result<Response> {
        let credential = self.tokens.current_token().await?;
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method, &url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, credential.bearer());
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} returned {}: {}", url, status, body);
            return Err(BridgeError::RemoteRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, None).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn post(&self, path: &str, body: Option<serde_json::Value>) -> Result<()> {
        self.send(Method::POST, path, body).await?;
        Ok(())
    }
}

#[async_trait]
impl AudioApi for AudioClient {
    async fn households(&self) -> Result<Vec<Household>> {
        let response: HouseholdsResponse = self.get_json("/households").await?;
        Ok(response.households)
    }

    async fn groups(&self, household_id: &str) -> Result<GroupsResponse> {
        self.get_json(&format!("/households/{}/groups", household_id)).await
    }

    async fn playback(&self, group_id: &str, command: PlaybackCommand) -> Result<()> {
        self.post(&format!("/groups/{}/playback/{}", group_id, command.as_str()), None)
            .await
    }

    async fn set_volume(&self, target: &VolumeTarget, volume: Volume) -> Result<()> {
        let path = match target {
            VolumeTarget::Player(id) => format!("/players/{}/playerVolume", id),
            VolumeTarget::Group(id) => format!("/groups/{}/groupVolume", id),
        };
        self.post(&path, Some(json!({ "volume": volume }))).await
    }

    async fn set_group_members(&self, group_id: &GroupId, player_ids: &[PlayerId]) -> Result<()> {
        self.post(
            &format!("/groups/{}/groups/setGroupMembers", group_id),
            Some(json!({ "playerIds": player_ids })),
        )
        .await
    }
}
