use crate::error::{BridgeError, Result};
use crate::types::{HouseholdId, Volume, MAX_VOLUME};
use serde::{Deserialize, Serialize};

/// Control message: act on a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMessage {
    /// Integration the message is for (e.g. "music", "light")
    pub target: String,
    pub room: String,
    /// e.g. "play", "pause", "volume"
    pub action: String,
    /// Required by `volume`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

/// Setup message: configure an integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupMessage {
    pub target: String,
    /// e.g. "discover-households", "set-household"
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Any message accepted from the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InboundMessage {
    Control(ControlMessage),
    Setup(SetupMessage),
}

impl InboundMessage {
    /// Decode a raw bus payload
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// Integration the message is addressed to
    pub fn target(&self) -> &str {
        match self {
            InboundMessage::Control(msg) => &msg.target,
            InboundMessage::Setup(msg) => &msg.target,
        }
    }
}

/// A validated audio control intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioAction {
    Play,
    Pause,
    Volume(Volume),
    Join,
    Leave,
    Solo,
}

impl AudioAction {
    /// Action name as it appears on the bus
    pub fn name(&self) -> &'static str {
        match self {
            AudioAction::Play => "play",
            AudioAction::Pause => "pause",
            AudioAction::Volume(_) => "volume",
            AudioAction::Join => "join",
            AudioAction::Leave => "leave",
            AudioAction::Solo => "solo",
        }
    }
}

impl TryFrom<&ControlMessage> for AudioAction {
    type Error = BridgeError;

    fn try_from(msg: &ControlMessage) -> Result<Self> {
        match msg.action.as_str() {
            "play" => Ok(AudioAction::Play),
            "pause" => Ok(AudioAction::Pause),
            "volume" => {
                let value = msg
                    .value
                    .ok_or_else(|| BridgeError::MissingValue("volume action requires a value".to_string()))?;
                // Out-of-range values are rejected, never clamped
                let volume = Volume::try_from(value)
                    .ok()
                    .filter(|v| *v <= MAX_VOLUME)
                    .ok_or_else(|| {
                        BridgeError::InvalidValue(format!("volume {} outside 0..={}", value, MAX_VOLUME))
                    })?;
                Ok(AudioAction::Volume(volume))
            }
            "join" => Ok(AudioAction::Join),
            "leave" => Ok(AudioAction::Leave),
            "solo" => Ok(AudioAction::Solo),
            other => Err(BridgeError::UnknownAction(other.to_string())),
        }
    }
}

/// A validated audio setup command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupCommand {
    DiscoverHouseholds,
    SetHousehold(HouseholdId),
}

impl TryFrom<&SetupMessage> for SetupCommand {
    type Error = BridgeError;

    fn try_from(msg: &SetupMessage) -> Result<Self> {
        match msg.command.as_str() {
            "discover-households" => Ok(SetupCommand::DiscoverHouseholds),
            "set-household" => match msg.value.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => Ok(SetupCommand::SetHousehold(id.to_string())),
                _ => Err(BridgeError::MissingValue("set-household requires a household id".to_string())),
            },
            other => Err(BridgeError::UnknownCommand(other.to_string())),
        }
    }
}
