//! Message-bus bridge for a cloud multi-room audio platform
//!
//! This library turns room-level intents arriving on a home-automation bus
//! ("play in the Kitchen", "make the Den join whatever is playing") into calls
//! against the platform's cloud control API. It supports:
//!
//! - Play, pause and volume per room
//! - Joining the currently playing group, leaving a group, playing solo
//! - A pull-only directory of groups and players, resynced after every regroup
//! - OAuth credentials with transparent refresh and encrypted persistence
//! - Routing of decoded bus messages to integrations by target
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use homebus_bridge::{AudioClient, FileTokenStore, OAuthClient, OAuthConfig, Orchestrator, TokenProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = reqwest::Client::new();
//!     let oauth = OAuthClient::new(
//!         OAuthConfig {
//!             integration: "sonos".to_string(),
//!             client_id: "client-id".to_string(),
//!             client_secret: "client-secret".to_string(),
//!             redirect_uri: "http://localhost/integrations/sonos/auth".to_string(),
//!             scopes: vec!["playback-control-all".to_string()],
//!             auth_url: "https://api.sonos.com/login/v3/oauth".to_string(),
//!             token_url: "https://api.sonos.com/login/v3/oauth/access".to_string(),
//!         },
//!         http.clone(),
//!     );
//!
//!     let store = Arc::new(FileTokenStore::new("tokens", "passphrase"));
//!     let tokens = Arc::new(TokenProvider::new("sonos", Arc::new(oauth), store));
//!     let api = Arc::new(AudioClient::new(http, "https://api.ws.sonos.com/control/api/v1", tokens));
//!
//!     let orchestrator = Orchestrator::new(api, Some("HOUSEHOLD_ID".to_string()), true);
//!     orchestrator.set_volume("Kitchen", 30).await?;
//!     orchestrator.join_playing_group("Kitchen").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Bus Messages
//!
//! Raw payloads go through a [`Dispatcher`], which decodes them and picks the
//! integration registered for the message's `target`:
//!
//! ```no_run
//! use std::sync::Arc;
//! use homebus_bridge::{AudioApi, Dispatcher, Orchestrator};
//!
//! async fn serve(api: Arc<dyn AudioApi>) {
//!     let mut dispatcher = Dispatcher::new();
//!     dispatcher.register(Arc::new(Orchestrator::new(api, None, true)));
//!
//!     dispatcher
//!         .handle(br#"{"target":"music","command":"set-household","value":"HOUSEHOLD_ID"}"#)
//!         .await;
//!     dispatcher
//!         .handle(br#"{"target":"music","room":"Den","action":"volume","value":25}"#)
//!         .await;
//! }
//! ```
//!
//! # Architecture
//!
//! - **Dispatcher**: Decodes bus payloads and routes them by target
//! - **Orchestrator**: One locked critical section per control operation
//! - **Directory**: Cached groups and players, replaced wholesale on refresh
//! - **Room**: Shared per-room state, created on first reference
//! - **Client**: Authenticated HTTP calls to the control API
//! - **Auth / TokenStore**: OAuth credentials, refresh and encrypted storage
//! - **Protocol**: Bus message structures and validation
//! - **Types**: Domain types and data structures

mod auth;
mod client;
mod config;
mod directory;
mod dispatcher;
mod error;
mod orchestrator;
mod protocol;
mod room;
mod token_store;
mod types;

// Public exports
pub use auth::{Credential, OAuthClient, OAuthConfig, TokenProvider, TokenRefresher};
pub use client::{AudioApi, AudioClient};
pub use config::{BridgeConfig, AUDIO_INTEGRATION};
pub use directory::Directory;
pub use dispatcher::{Dispatcher, Integration};
pub use error::{BridgeError, Result};
pub use orchestrator::{Orchestrator, MUSIC_TARGET};
pub use protocol::{AudioAction, ControlMessage, InboundMessage, SetupCommand, SetupMessage};
pub use room::{Room, RoomResolver, RoomState};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use types::{
    Group, GroupId, GroupsResponse, Household, HouseholdId, PlaybackCommand, PlaybackState, Player,
    PlayerId, Volume, VolumeTarget, MAX_VOLUME,
};
