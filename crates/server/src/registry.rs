//! Live bot registry.
//!
//! The only structure shared across threads. The simulation thread registers
//! and unregisters actors; network handlers look them up through the read
//! side of the lock.

use common::{BotClass, BotId, FactionId, PlayerId, RegionId, TeamId};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::error;

/// A bot currently instantiated in the world.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotActor {
    pub id: BotId,
    pub name: String,
    pub class: BotClass,
    pub race: Option<u8>,
    pub faction: FactionId,
    pub team: TeamId,
    pub region: RegionId,
    pub level: u8,
    /// Source archetype of a generated bot.
    pub archetype: Option<BotId>,
    pub owner: Option<PlayerId>,
    /// Travels the waypoint graph on its own.
    pub wanderer: bool,
    /// AI updates enabled.
    pub active: bool,
    /// Queued for or taking part in a match.
    pub match_participant: bool,
}

#[derive(Debug, Default)]
struct RegistryInner {
    actors: HashMap<BotId, BotActor>,
    /// Lowercased name to every live id carrying it.
    names: HashMap<String, BTreeSet<BotId>>,
}

/// Reader-writer locked set of live actors.
#[derive(Debug, Default)]
pub struct BotRegistry {
    inner: RwLock<RegistryInner>,
}

impl BotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a live actor. Duplicate ids are rejected.
    pub fn register(&self, actor: BotActor) -> bool {
        let mut inner = self.inner.write();
        if inner.actors.contains_key(&actor.id) {
            error!("Bot {} is already registered", actor.id);
            return false;
        }
        inner
            .names
            .entry(actor.name.to_lowercase())
            .or_default()
            .insert(actor.id);
        inner.actors.insert(actor.id, actor);
        true
    }

    pub fn unregister(&self, id: BotId) -> Option<BotActor> {
        let mut inner = self.inner.write();
        let Some(actor) = inner.actors.remove(&id) else {
            error!("Bot {} is not registered", id);
            return None;
        };
        let key = actor.name.to_lowercase();
        if let Some(ids) = inner.names.get_mut(&key) {
            ids.remove(&id);
            if ids.is_empty() {
                inner.names.remove(&key);
            }
        }
        Some(actor)
    }

    pub fn contains(&self, id: BotId) -> bool {
        self.inner.read().actors.contains_key(&id)
    }

    /// Snapshot of one actor.
    pub fn find(&self, id: BotId) -> Option<BotActor> {
        self.inner.read().actors.get(&id).cloned()
    }

    /// Case-insensitive lookup; the lowest id wins when names collide.
    pub fn find_by_name(&self, name: &str) -> Option<BotActor> {
        let inner = self.inner.read();
        let id = inner.names.get(&name.to_lowercase())?.iter().next()?;
        inner.actors.get(id).cloned()
    }

    /// Live bots owned by `owner`, ascending id.
    pub fn owned_by(&self, owner: PlayerId) -> Vec<BotId> {
        let inner = self.inner.read();
        let mut ids: Vec<BotId> = inner
            .actors
            .values()
            .filter(|a| a.owner == Some(owner))
            .map(|a| a.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn set_owner(&self, id: BotId, owner: Option<PlayerId>) -> bool {
        self.update(id, |a| a.owner = owner)
    }

    pub fn set_active(&self, id: BotId, active: bool) -> bool {
        self.update(id, |a| a.active = active)
    }

    pub fn set_match_participant(&self, id: BotId, participant: bool) -> bool {
        self.update(id, |a| a.match_participant = participant)
    }

    pub fn set_region(&self, id: BotId, region: RegionId) -> bool {
        self.update(id, |a| a.region = region)
    }

    fn update(&self, id: BotId, f: impl FnOnce(&mut BotActor)) -> bool {
        match self.inner.write().actors.get_mut(&id) {
            Some(actor) => {
                f(actor);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().actors.is_empty()
    }

    /// Copy of every live actor, ascending id.
    pub fn snapshot(&self) -> Vec<BotActor> {
        let mut actors: Vec<BotActor> = self.inner.read().actors.values().cloned().collect();
        actors.sort_unstable_by_key(|a| a.id);
        actors
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    pub(crate) fn actor(id: BotId, name: &str) -> BotActor {
        BotActor {
            id,
            name: name.to_string(),
            class: BotClass::Mage,
            race: Some(1),
            faction: 1,
            team: TeamId::Alliance,
            region: 0,
            level: 10,
            archetype: None,
            owner: None,
            wanderer: true,
            active: true,
            match_participant: false,
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = BotRegistry::new();
        assert!(registry.register(actor(2, "Jaina")));
        assert!(registry.register(actor(1, "jaina")));
        assert!(!registry.register(actor(1, "Other")));

        assert_eq!(registry.find_by_name("JAINA").map(|a| a.id), Some(1));
        registry.unregister(1);
        assert_eq!(registry.find_by_name("jaina").map(|a| a.id), Some(2));
        assert!(registry.unregister(1).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_owner_queries() {
        let registry = BotRegistry::new();
        registry.register(actor(5, "A"));
        registry.register(actor(3, "B"));
        registry.set_owner(5, Some(42));
        registry.set_owner(3, Some(42));
        assert_eq!(registry.owned_by(42), vec![3, 5]);
        assert!(!registry.set_owner(9, Some(1)));
    }

    #[test]
    fn test_concurrent_readers() {
        let registry = Arc::new(BotRegistry::new());
        for id in 0..50 {
            registry.register(actor(id, &format!("bot{}", id)));
        }
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..50).filter(|id| registry.find(*id).is_some()).count()
                })
            })
            .collect();
        for reader in readers {
            assert_eq!(reader.join().unwrap(), 50);
        }
    }
}
