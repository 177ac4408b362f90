use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while handling a bus message
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Transport-level failure talking to a remote API
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(#[from] reqwest::Error),

    /// Remote API answered with a non-success status
    #[error("Remote rejected request ({status}): {body}")]
    RemoteRejected {
        /// HTTP status code
        status: u16,
        /// Response body, kept for diagnostics
        body: String,
    },

    /// Response payload could not be parsed
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The room's player is not known to the directory
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// The room's player is not a member of any group
    #[error("Room {0} is not in any group")]
    NotInAnyGroup(String),

    /// No group is currently playing
    #[error("No group is currently playing")]
    NoActiveGroup,

    /// Removing the room would leave its group empty
    #[error("Room {0} is the only member of its group")]
    SoleMember(String),

    /// A message omitted a value its action requires
    #[error("Missing value: {0}")]
    MissingValue(String),

    /// A message carried a value outside its accepted range
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Control message named an action this integration does not know
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Setup message named a command this integration does not know
    #[error("Unknown setup command: {0}")]
    UnknownCommand(String),

    /// No integration is registered for the message target
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    /// Directory refresh was requested before a household was chosen
    #[error("No household configured")]
    HouseholdNotSet,

    /// No credential is stored for the integration
    #[error("Not authenticated with {0}")]
    NotAuthenticated(String),

    /// Token endpoint refused a refresh or code exchange
    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),

    /// Persisted credential could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is missing or malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BridgeError {
    /// Whether the failure came from validating the message itself,
    /// as opposed to talking to the remote service
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BridgeError::MissingValue(_)
                | BridgeError::InvalidValue(_)
                | BridgeError::UnknownAction(_)
                | BridgeError::UnknownCommand(_)
                | BridgeError::UnknownTarget(_)
        )
    }
}
