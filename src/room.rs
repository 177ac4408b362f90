use crate::types::{PlayerId, Volume};
use parking_lot::Mutex;
use std::sync::Arc;

/// Handle to a logical listening zone
///
/// Cloning a `Room` yields another handle to the same stored state, so a
/// change made through one handle is visible through every other.
#[derive(Clone, Debug)]
pub struct Room {
    name: Arc<str>,
    state: Arc<Mutex<RoomState>>,
}

/// Room state snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoomState {
    /// Player the room name resolved to at the last refresh
    pub player_id: Option<PlayerId>,

    /// Whether the last playback command for this room was `play`
    pub playing: bool,

    /// Last volume set through this room
    pub volume: Option<Volume>,
}

impl Room {
    /// Create a room with default state
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            state: Arc::new(Mutex::new(RoomState::default())),
        }
    }

    /// Get the room name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a snapshot of the room state
    pub fn state_snapshot(&self) -> RoomState {
        self.state.lock().clone()
    }

    /// Get the player id resolved at the last refresh
    pub fn player_id(&self) -> Option<PlayerId> {
        self.state.lock().player_id.clone()
    }

    /// Check if the last playback command was `play`
    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    /// Get the last volume set through this room
    pub fn volume(&self) -> Option<Volume> {
        self.state.lock().volume
    }

    pub(crate) fn set_player_id(&self, player_id: Option<PlayerId>) {
        self.state.lock().player_id = player_id;
    }

    pub(crate) fn set_playing(&self, playing: bool) {
        self.state.lock().playing = playing;
    }

    pub(crate) fn set_volume(&self, volume: Volume) {
        self.state.lock().volume = Some(volume);
    }

    /// Whether two handles refer to the same stored room
    pub fn same_as(&self, other: &Room) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

/// Process-lifetime list of rooms, keyed by name
///
/// Households hold tens of rooms, so lookup is a linear scan.
#[derive(Debug, Default)]
pub struct RoomResolver {
    rooms: Vec<Room>,
}

impl RoomResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the room called `name`, creating it on first sight
    pub fn resolve(&mut self, name: &str) -> Room {
        if let Some(room) = self.rooms.iter().find(|room| room.name() == name) {
            return room.clone();
        }

        tracing::info!("New room: {}", name);
        let room = Room::new(name);
        self.rooms.push(room.clone());
        room
    }

    /// Look up a room without creating it
    pub fn get(&self, name: &str) -> Option<Room> {
        self.rooms.iter().find(|room| room.name() == name).cloned()
    }

    /// Get all rooms seen so far
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Number of rooms seen so far
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no room has been referenced yet
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
