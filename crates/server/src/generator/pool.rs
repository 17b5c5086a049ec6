//! Spare identity pools.

use crate::sampler::Sampler;
use common::{BotClass, BotId};
use std::collections::{BTreeMap, BTreeSet};

/// Archetype identities not currently live, grouped by class.
///
/// A class entry exists only while it holds at least one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparePool {
    by_class: BTreeMap<BotClass, BTreeSet<BotId>>,
}

impl SparePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: BotClass, id: BotId) -> bool {
        self.by_class.entry(class).or_default().insert(id)
    }

    /// Remove an identity, dropping the class once it runs dry.
    pub fn remove(&mut self, class: BotClass, id: BotId) -> bool {
        let Some(ids) = self.by_class.get_mut(&class) else {
            return false;
        };
        let removed = ids.remove(&id);
        if ids.is_empty() {
            self.by_class.remove(&class);
        }
        removed
    }

    pub fn contains(&self, class: BotClass, id: BotId) -> bool {
        self.by_class.get(&class).is_some_and(|ids| ids.contains(&id))
    }

    pub fn is_empty(&self) -> bool {
        self.by_class.is_empty()
    }

    /// Total identities across all classes.
    pub fn len(&self) -> usize {
        self.by_class.values().map(BTreeSet::len).sum()
    }

    pub fn class_len(&self, class: BotClass) -> usize {
        self.by_class.get(&class).map_or(0, BTreeSet::len)
    }

    pub fn classes(&self) -> impl Iterator<Item = BotClass> + '_ {
        self.by_class.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BotClass, BotId)> + '_ {
        self.by_class
            .iter()
            .flat_map(|(class, ids)| ids.iter().map(move |id| (*class, *id)))
    }

    /// Sub-pool of the identities accepted by `keep`.
    pub fn filtered(&self, mut keep: impl FnMut(BotClass, BotId) -> bool) -> SparePool {
        let mut out = SparePool::new();
        for (class, id) in self.iter() {
            if keep(class, id) {
                out.insert(class, id);
            }
        }
        out
    }

    /// A class uniformly among non-empty classes, then an identity uniformly within it.
    pub fn pick(&self, sampler: &mut Sampler) -> Option<(BotClass, BotId)> {
        let (class, ids) = sampler.pick_iter(self.by_class.iter())?;
        let id = sampler.pick_iter(ids.iter())?;
        Some((*class, *id))
    }
}
