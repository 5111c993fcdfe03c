use std::collections::HashMap;

use super::index::ProbeId;

/// Position of a suite under construction in the engine's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotId(pub usize);

/// Lookup from a suite call to the one suite node built for it.
///
/// Keyed by probe identity, not by name: two suites with equal names are
/// different nodes unless they are the same call. Entries are added once and
/// never removed while a file is being reconstructed.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    slots: HashMap<ProbeId, SlotId>,
}

impl Registry {
    pub fn lookup(&self, probe: ProbeId) -> Option<SlotId> {
        self.slots.get(&probe).copied()
    }

    pub fn contains(&self, probe: ProbeId) -> bool {
        self.slots.contains_key(&probe)
    }

    /// Record the slot built for `probe`.
    ///
    /// A probe is registered at most once; the first slot wins.
    pub fn register(&mut self, probe: ProbeId, slot: SlotId) {
        self.slots.entry(probe).or_insert(slot);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
