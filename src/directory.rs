//! Local view of the household's groups and players
//!
//! The directory is pull-only: nothing updates it except [`Directory::refresh`],
//! which replaces every map wholesale from one `groups` call. Group ids are not
//! stable across membership changes, so the membership index is rebuilt from
//! scratch on each refresh and never merged.

use crate::client::AudioApi;
use crate::error::Result;
use crate::types::{Group, GroupId, GroupsResponse, Player, PlayerId};
use std::collections::HashMap;

/// Cache of groups, players and the player → group membership index
#[derive(Debug, Default, Clone)]
pub struct Directory {
    /// Player display name → player
    players: HashMap<String, Player>,
    /// Group id → group
    groups: HashMap<GroupId, Group>,
    /// Player id → id of the group containing it
    membership: HashMap<PlayerId, GroupId>,
}

impl Directory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch groups and players of `household_id` and replace the cache.
    ///
    /// On any failure the previous contents are kept untouched.
    pub async fn refresh(&mut self, api: &dyn AudioApi, household_id: &str) -> Result<()> {
        let response = api.groups(household_id).await?;
        self.replace(response);
        Ok(())
    }

    /// Replace every map from a `groups` payload
    pub fn replace(&mut self, response: GroupsResponse) {
        let mut membership = HashMap::new();
        for group in &response.groups {
            tracing::debug!("Found group {} ({}) with {} player(s)", group.name, group.id, group.player_ids.len());
            for player_id in &group.player_ids {
                if let Some(previous) = membership.insert(player_id.clone(), group.id.clone()) {
                    tracing::warn!("Player {} reported in groups {} and {}", player_id, previous, group.id);
                }
            }
        }

        self.players = response
            .players
            .into_iter()
            .map(|player| (player.name.clone(), player))
            .collect();
        self.groups = response
            .groups
            .into_iter()
            .map(|group| (group.id.clone(), group))
            .collect();
        self.membership = membership;

        tracing::debug!(
            "Directory refreshed: {} group(s), {} player(s)",
            self.groups.len(),
            self.players.len()
        );
    }

    /// Look up a player by display name
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    /// Id of the player whose display name is `name`
    pub fn player_id(&self, name: &str) -> Option<&PlayerId> {
        self.player(name).map(|player| &player.id)
    }

    /// Look up a group by id
    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.get(group_id)
    }

    /// Id of the group currently containing `player_id`
    pub fn group_containing(&self, player_id: &str) -> Option<&GroupId> {
        self.membership
            .get(player_id)
            .filter(|group_id| self.groups.contains_key(group_id.as_str()))
    }

    /// The single group that is currently playing.
    ///
    /// Returns `None` if nothing plays, and also when several groups report
    /// playing, since there is then no well-defined group to join.
    pub fn playing_group(&self) -> Option<&Group> {
        let mut playing = self.groups.values().filter(|group| group.playback_state.is_playing());
        let first = playing.next()?;
        if playing.next().is_some() {
            tracing::warn!("More than one group is playing, no active group chosen");
            return None;
        }
        Some(first)
    }

    /// Iterate over all known players
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Iterate over all known groups
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Whether nothing has been loaded yet
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.players.is_empty()
    }
}
