use serde::{Deserialize, Serialize};

/// Player identifier assigned by the remote service
pub type PlayerId = String;

/// Group identifier assigned by the remote service
pub type GroupId = String;

/// Household identifier
pub type HouseholdId = String;

/// Volume as a percentage in [0, 100]
pub type Volume = u8;

/// Highest accepted volume
pub const MAX_VOLUME: Volume = 100;

/// Playback state reported for a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlaybackState {
    #[serde(rename = "PLAYBACK_STATE_IDLE")]
    Idle,
    #[serde(rename = "PLAYBACK_STATE_BUFFERING")]
    Buffering,
    #[serde(rename = "PLAYBACK_STATE_PAUSED")]
    Paused,
    #[serde(rename = "PLAYBACK_STATE_PLAYING")]
    Playing,
    /// Anything the service reports that we do not model
    #[default]
    #[serde(other)]
    Unknown,
}

impl PlaybackState {
    /// Whether audio is currently playing
    pub fn is_playing(self) -> bool {
        self == PlaybackState::Playing
    }
}

/// A physical audio endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,

    /// Capability flags (e.g. "PLAYBACK", "CLOUD")
    #[serde(default)]
    pub capabilities: Vec<String>,

    #[serde(default)]
    pub software_version: Option<String>,

    #[serde(default)]
    pub is_unregistered: bool,

    /// Device ids bonded into this player (e.g. a stereo pair)
    #[serde(default)]
    pub device_ids: Vec<String>,
}

/// A set of players bonded for synchronized playback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub coordinator_id: PlayerId,

    #[serde(default)]
    pub playback_state: PlaybackState,

    /// Ordered member list
    #[serde(default)]
    pub player_ids: Vec<PlayerId>,
}

impl Group {
    /// Whether the player is a member of this group
    pub fn contains(&self, player_id: &str) -> bool {
        self.player_ids.iter().any(|id| id == player_id)
    }
}

/// Payload of `GET /households/{id}/groups`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupsResponse {
    #[serde(default)]
    pub groups: Vec<Group>,

    #[serde(default)]
    pub players: Vec<Player>,
}

/// Account-level container for groups and players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub id: HouseholdId,

    #[serde(default)]
    pub name: Option<String>,
}

/// Payload of `GET /households`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdsResponse {
    #[serde(default)]
    pub households: Vec<Household>,
}

/// Playback transitions the control API accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    Play,
    Pause,
}

impl PlaybackCommand {
    /// Path segment under `/groups/{id}/playback/`
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackCommand::Play => "play",
            PlaybackCommand::Pause => "pause",
        }
    }
}

/// What a volume change applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeTarget {
    /// A single player, regardless of its group
    Player(PlayerId),
    /// Every player in a group
    Group(GroupId),
}
