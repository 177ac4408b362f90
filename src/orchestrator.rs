//! Control orchestration for the audio platform
//!
//! Every control operation runs as one critical section under a single
//! process-wide lock: refresh the directory, resolve the room, issue the
//! remote call(s), refresh again after any membership change. Remote I/O
//! happens while the lock is held; command volume is button presses, not bulk
//! traffic. Narrowing the section to map mutation only (snapshot, call outside
//! the lock, compare-and-swap the result) is the upgrade path if throughput
//! ever matters.

use crate::client::AudioApi;
use crate::directory::Directory;
use crate::dispatcher::Integration;
use crate::error::{BridgeError, Result};
use crate::protocol::{AudioAction, ControlMessage, SetupCommand, SetupMessage};
use crate::room::{Room, RoomResolver};
use crate::types::{GroupId, Household, HouseholdId, PlaybackCommand, PlayerId, Volume, VolumeTarget};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Bus target served by the orchestrator
pub const MUSIC_TARGET: &str = "music";

/// State guarded by the orchestrator lock
#[derive(Debug, Default)]
struct Engine {
    household: Option<HouseholdId>,
    directory: Directory,
    rooms: RoomResolver,
}

/// Translates control intents into remote calls against the audio platform
pub struct Orchestrator {
    api: Arc<dyn AudioApi>,
    /// Scope volume to single players instead of their groups
    control_players: bool,
    engine: Mutex<Engine>,
}

impl Orchestrator {
    /// Create an orchestrator over `api`
    ///
    /// `household` may be `None` and chosen later with [`Orchestrator::set_household`];
    /// until then every control operation fails with `HouseholdNotSet`.
    /// `control_players` scopes volume changes to single players instead of
    /// whole groups.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use homebus_bridge::{AudioApi, Orchestrator};
    ///
    /// async fn party_mode(api: Arc<dyn AudioApi>) -> Result<(), Box<dyn std::error::Error>> {
    ///     let orchestrator = Orchestrator::new(api, Some("HOUSEHOLD_ID".to_string()), true);
    ///     orchestrator.play("Kitchen").await?;
    ///     orchestrator.join_playing_group("Den").await?;
    ///     orchestrator.set_volume("Den", 40).await?;
    ///     Ok(())
    /// }
    /// ```
    pub fn new(api: Arc<dyn AudioApi>, household: Option<HouseholdId>, control_players: bool) -> Self {
        Self {
            api,
            control_players,
            engine: Mutex::new(Engine {
                household,
                ..Engine::default()
            }),
        }
    }

    /// Run one control action for `room`
    pub async fn execute(&self, room: &str, action: AudioAction) -> Result<()> {
        let mut engine = self.engine.lock().await;
        engine.refresh(self.api.as_ref()).await?;
        let room = engine.resolve(room);

        let api = self.api.as_ref();
        match action {
            AudioAction::Play => engine.playback(api, &room, PlaybackCommand::Play).await,
            AudioAction::Pause => engine.playback(api, &room, PlaybackCommand::Pause).await,
            AudioAction::Volume(volume) => engine.set_volume(api, &room, volume, self.control_players).await,
            AudioAction::Join => engine.join_playing_group(api, &room).await,
            AudioAction::Leave => engine.leave_group(api, &room).await,
            AudioAction::Solo => engine.play_solo(api, &room).await,
        }
    }

    /// Start playback of the group containing the room
    pub async fn play(&self, room: &str) -> Result<()> {
        self.execute(room, AudioAction::Play).await
    }

    /// Pause playback of the group containing the room
    pub async fn pause(&self, room: &str) -> Result<()> {
        self.execute(room, AudioAction::Pause).await
    }

    /// Set volume in percent; callers validate the range
    pub async fn set_volume(&self, room: &str, volume: Volume) -> Result<()> {
        self.execute(room, AudioAction::Volume(volume)).await
    }

    /// Add the room to the group that is currently playing
    pub async fn join_playing_group(&self, room: &str) -> Result<()> {
        self.execute(room, AudioAction::Join).await
    }

    /// Take the room out of its group
    pub async fn leave_group(&self, room: &str) -> Result<()> {
        self.execute(room, AudioAction::Leave).await
    }

    /// Reduce the room's group to just the room, keeping it playing if it was
    pub async fn play_solo(&self, room: &str) -> Result<()> {
        self.execute(room, AudioAction::Solo).await
    }

    /// Refresh the directory on its own
    pub async fn refresh(&self) -> Result<()> {
        self.engine.lock().await.refresh(self.api.as_ref()).await
    }

    /// List households visible to the credential
    pub async fn discover_households(&self) -> Result<Vec<Household>> {
        let households = self.api.households().await?;
        for household in &households {
            tracing::info!(
                "Found household {} {}",
                household.id,
                household.name.as_deref().unwrap_or_default()
            );
        }
        Ok(households)
    }

    /// Choose the household subsequent commands operate on
    pub async fn set_household(&self, household_id: impl Into<HouseholdId>) {
        let household_id = household_id.into();
        tracing::info!("Household set to {}", household_id);
        self.engine.lock().await.household = Some(household_id);
    }

    /// Get the household commands currently operate on
    pub async fn household(&self) -> Option<HouseholdId> {
        self.engine.lock().await.household.clone()
    }

    /// Copy of the directory as of the last refresh
    pub async fn directory_snapshot(&self) -> Directory {
        self.engine.lock().await.directory.clone()
    }

    /// Look up a room that has been referenced before
    pub async fn room(&self, name: &str) -> Option<Room> {
        self.engine.lock().await.rooms.get(name)
    }
}

impl Engine {
    async fn refresh(&mut self, api: &dyn AudioApi) -> Result<()> {
        let household = self.household.as_deref().ok_or(BridgeError::HouseholdNotSet)?;
        self.directory.refresh(api, household).await
    }

    fn resolve(&mut self, name: &str) -> Room {
        let room = self.rooms.resolve(name);
        room.set_player_id(self.directory.player_id(name).cloned());
        room
    }

    fn player_of(&self, room: &Room) -> Result<PlayerId> {
        self.directory
            .player_id(room.name())
            .cloned()
            .ok_or_else(|| BridgeError::RoomNotFound(room.name().to_string()))
    }

    fn group_of(&self, room: &Room, player_id: &str) -> Result<GroupId> {
        self.directory
            .group_containing(player_id)
            .cloned()
            .ok_or_else(|| BridgeError::NotInAnyGroup(room.name().to_string()))
    }

    async fn playback(&mut self, api: &dyn AudioApi, room: &Room, command: PlaybackCommand) -> Result<()> {
        let player_id = self.player_of(room)?;
        let group_id = self.group_of(room, &player_id)?;

        api.playback(&group_id, command).await?;
        room.set_playing(command == PlaybackCommand::Play);

        tracing::info!("Playback {} in room {} (group {})", command.as_str(), room.name(), group_id);
        Ok(())
    }

    async fn set_volume(&mut self, api: &dyn AudioApi, room: &Room, volume: Volume, control_players: bool) -> Result<()> {
        let player_id = self.player_of(room)?;
        let target = if control_players {
            VolumeTarget::Player(player_id)
        } else {
            VolumeTarget::Group(self.group_of(room, &player_id)?)
        };

        api.set_volume(&target, volume).await?;
        room.set_volume(volume);

        tracing::info!("Volume changed to {} for {}", volume, room.name());
        Ok(())
    }

    async fn join_playing_group(&mut self, api: &dyn AudioApi, room: &Room) -> Result<()> {
        let group = self.directory.playing_group().cloned().ok_or(BridgeError::NoActiveGroup)?;
        let player_id = self.player_of(room)?;

        if group.contains(&player_id) {
            tracing::debug!("Room {} already in playing group {}", room.name(), group.id);
            return Ok(());
        }

        let mut members = group.player_ids.clone();
        members.push(player_id);
        self.set_members(api, &group.id, &members).await?;

        tracing::info!("Room {} joined the playing group", room.name());
        Ok(())
    }

    async fn leave_group(&mut self, api: &dyn AudioApi, room: &Room) -> Result<()> {
        let player_id = self.player_of(room)?;
        let group_id = self.group_of(room, &player_id)?;
        let members = self
            .directory
            .group(&group_id)
            .map(|group| group.player_ids.clone())
            .unwrap_or_default();

        if members.len() <= 1 {
            return Err(BridgeError::SoleMember(room.name().to_string()));
        }

        let remaining: Vec<PlayerId> = members.into_iter().filter(|id| *id != player_id).collect();
        self.set_members(api, &group_id, &remaining).await?;

        tracing::info!("Room {} left its group", room.name());
        Ok(())
    }

    async fn play_solo(&mut self, api: &dyn AudioApi, room: &Room) -> Result<()> {
        let player_id = self.player_of(room)?;
        let group_id = self.group_of(room, &player_id)?;

        // Snapshot before mutating: the group may be restructured by the call
        let (was_playing, already_solo) = match self.directory.group(&group_id) {
            Some(group) => (group.playback_state.is_playing(), group.player_ids == [player_id.clone()]),
            None => (false, false),
        };

        if already_solo {
            tracing::debug!("Room {} already plays solo", room.name());
            return Ok(());
        }

        self.set_members(api, &group_id, std::slice::from_ref(&player_id)).await?;

        // Singleton groups tend to come out of a regroup paused
        if was_playing {
            let solo_group = self.group_of(room, &player_id)?;
            api.playback(&solo_group, PlaybackCommand::Play).await?;
            room.set_playing(true);
        }

        tracing::info!("Room {} is now playing solo", room.name());
        Ok(())
    }

    /// Replace a group's members, then resync: the service may reassign group ids
    async fn set_members(&mut self, api: &dyn AudioApi, group_id: &GroupId, members: &[PlayerId]) -> Result<()> {
        api.set_group_members(group_id, members).await?;
        self.refresh(api).await
    }
}

#[async_trait]
impl Integration for Orchestrator {
    fn target(&self) -> &str {
        MUSIC_TARGET
    }

    async fn handle_control(&self, msg: &ControlMessage) -> Result<()> {
        let action = AudioAction::try_from(msg)?;
        self.execute(&msg.room, action).await
    }

    async fn handle_setup(&self, msg: &SetupMessage) -> Result<()> {
        match SetupCommand::try_from(msg)? {
            SetupCommand::DiscoverHouseholds => {
                self.discover_households().await?;
            }
            SetupCommand::SetHousehold(household_id) => self.set_household(household_id).await,
        }
        Ok(())
    }
}
