//! A five-slot equip loadout.

use super::{Artifact, ArtifactSlot};
use crate::ids::SetId;

/// At most one artifact per slot.
///
/// Swapping is expressed by [`ArtifactSet::with`], which returns a new
/// loadout and leaves the original untouched.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArtifactSet {
    slots: [Option<Artifact>; ArtifactSlot::COUNT],
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a loadout; a later artifact replaces an earlier one in the same slot.
    pub fn from_artifacts(artifacts: impl IntoIterator<Item = Artifact>) -> Self {
        let mut set = Self::new();
        for artifact in artifacts {
            set.insert(artifact);
        }
        set
    }

    pub fn get(&self, slot: ArtifactSlot) -> Option<&Artifact> {
        self.slots[slot.index()].as_ref()
    }

    /// Places an artifact in its slot, returning the one it displaced.
    pub fn insert(&mut self, artifact: Artifact) -> Option<Artifact> {
        let index = artifact.slot.index();
        self.slots[index].replace(artifact)
    }

    pub fn remove(&mut self, slot: ArtifactSlot) -> Option<Artifact> {
        self.slots[slot.index()].take()
    }

    /// Returns a copy with `artifact` swapped into its slot.
    #[must_use]
    pub fn with(&self, artifact: Artifact) -> Self {
        let mut swapped = self.clone();
        swapped.insert(artifact);
        swapped
    }

    /// Equipped artifacts in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Number of equipped pieces belonging to `set`.
    pub fn count_set(&self, set: &SetId) -> usize {
        self.iter().filter(|a| &a.set == set).count()
    }
}

impl FromIterator<Artifact> for ArtifactSet {
    fn from_iter<T: IntoIterator<Item = Artifact>>(iter: T) -> Self {
        Self::from_artifacts(iter)
    }
}
