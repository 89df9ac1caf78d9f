use std::collections::HashMap;

use parking_lot::RwLock;

use crate::models::Player;

/// Players of one session in join order. Shared by every snapshot of the
/// session; joins append in place.
#[derive(Debug, Default)]
pub struct Roster {
    inner: RwLock<RosterInner>,
}

#[derive(Debug, Default)]
struct RosterInner {
    players: Vec<Player>,
    slots: HashMap<String, usize>,
}

impl Roster {
    /// Appends the player. Returns `false` if the id already joined.
    pub fn insert(&self, player: Player) -> bool {
        let mut inner = self.inner.write();
        if inner.slots.contains_key(&player.id) {
            return false;
        }
        let slot = inner.players.len();
        inner.slots.insert(player.id.clone(), slot);
        inner.players.push(player);
        true
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.inner.read().slots.contains_key(player_id)
    }

    pub fn get(&self, player_id: &str) -> Option<Player> {
        let inner = self.inner.read();
        let slot = *inner.slots.get(player_id)?;
        inner.players.get(slot).cloned()
    }

    pub fn players(&self) -> Vec<Player> {
        self.inner.read().players.clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.inner
            .read()
            .players
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
