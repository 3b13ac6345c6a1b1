//! Viewer profiles and the active-profile selection.

use cinevault_model::prelude::{Profile, ProfileDraft, ProfileId};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{LibraryError, LibraryResult};

#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: DashMap<ProfileId, Profile>,
    active: RwLock<Option<ProfileId>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, draft: ProfileDraft) -> LibraryResult<Profile> {
        let id = ProfileId::new(Uuid::now_v7().to_string())?;
        let profile = draft.into_profile(id)?;
        self.profiles.insert(profile.id.clone(), profile.clone());
        debug!(profile = %profile.id, kids = profile.is_kids, "profile created");
        Ok(profile)
    }

    pub fn update(&self, id: &ProfileId, draft: ProfileDraft) -> LibraryResult<Profile> {
        let mut entry = self
            .profiles
            .get_mut(id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
        let updated = draft.into_profile(id.clone())?;
        *entry = updated.clone();
        Ok(updated)
    }

    /// Remove a profile. Deleting the active profile clears the selection.
    pub fn delete(&self, id: &ProfileId) -> LibraryResult<Profile> {
        let (_, removed) = self
            .profiles
            .remove(id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
        let mut active = self.active.write();
        if active.as_ref() == Some(id) {
            *active = None;
        }
        Ok(removed)
    }

    pub fn get(&self, id: &ProfileId) -> LibraryResult<Profile> {
        self.profiles
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    /// All profiles by name.
    pub fn list(&self) -> Vec<Profile> {
        let mut profiles: Vec<Profile> = self
            .profiles
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        profiles.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        profiles
    }

    pub fn kids(&self) -> Vec<Profile> {
        self.list().into_iter().filter(|p| p.is_kids).collect()
    }

    /// Select (`Some`) or clear (`None`) the active profile.
    pub fn set_active(&self, id: Option<&ProfileId>) -> LibraryResult<()> {
        if let Some(id) = id
            && !self.profiles.contains_key(id)
        {
            return Err(LibraryError::NotFound(id.to_string()));
        }
        *self.active.write() = id.cloned();
        Ok(())
    }

    pub fn active(&self) -> Option<Profile> {
        let active = self.active.read();
        active
            .as_ref()
            .and_then(|id| self.profiles.get(id).map(|entry| entry.value().clone()))
    }
}
