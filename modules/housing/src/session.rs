//! Client-side view state for a logged-in student.
//!
//! A [`StudentSession`] owns the favorites set and the currently selected
//! listing. It talks to the marketplace only through [`HousingApi`], so the
//! same session works against the in-process client or a remote adapter.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::contract::client::HousingApi;
use crate::contract::error::HousingError;
use crate::contract::model::{Actor, Listing};

pub struct StudentSession {
    api: Arc<dyn HousingApi>,
    actor: Actor,
    favorites: HashSet<Uuid>,
    selected: Option<Listing>,
}

impl StudentSession {
    pub fn new(api: Arc<dyn HousingApi>, actor: Actor) -> Self {
        Self {
            api,
            actor,
            favorites: HashSet::new(),
            selected: None,
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn favorites(&self) -> &HashSet<Uuid> {
        &self.favorites
    }

    pub fn is_favorite(&self, listing_id: Uuid) -> bool {
        self.favorites.contains(&listing_id)
    }

    /// Replace the local favorites set with the server's.
    pub async fn refresh_favorites(&mut self) -> Result<(), HousingError> {
        let favorites = self.api.list_favorites(&self.actor).await?;
        self.favorites = favorites
            .into_iter()
            .map(|f| f.favorite.listing_id)
            .collect();
        debug!(count = self.favorites.len(), "Favorites refreshed");
        Ok(())
    }

    /// Optimistically flip a favorite and confirm it with the server.
    ///
    /// The local set changes before the remote call. A toggle is not
    /// idempotent, and an `Unavailable` answer may come after the server
    /// already applied it, so the single retry asks for the intended state
    /// with `add_favorite`/`remove_favorite` instead of toggling again. If
    /// that fails too the set is restored to its prior contents and the error
    /// is returned. On success the set follows the server. Returns the state
    /// after the toggle.
    pub async fn toggle_favorite(&mut self, listing_id: Uuid) -> Result<bool, HousingError> {
        let snapshot = self.favorites.clone();
        let wanted = !self.favorites.remove(&listing_id);
        if wanted {
            self.favorites.insert(listing_id);
        }

        let result = match self.api.toggle_favorite(&self.actor, listing_id).await {
            Ok(toggle) => Ok(toggle.added),
            Err(e) if e.is_retryable() => {
                warn!(%listing_id, wanted, error = %e, "Favorite toggle failed, retrying once");
                self.set_favorite(listing_id, wanted).await.map(|()| wanted)
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(added) => {
                if added {
                    self.favorites.insert(listing_id);
                } else {
                    self.favorites.remove(&listing_id);
                }
                info!(%listing_id, added, "Favorite toggled");
                Ok(added)
            }
            Err(e) => {
                self.favorites = snapshot;
                warn!(%listing_id, error = %e, "Favorite toggle rolled back");
                Err(e)
            }
        }
    }

    /// Drive the server to `wanted`; already being there counts as success.
    async fn set_favorite(&self, listing_id: Uuid, wanted: bool) -> Result<(), HousingError> {
        if wanted {
            match self.api.add_favorite(&self.actor, listing_id).await {
                Ok(_) | Err(HousingError::Conflict { .. }) => Ok(()),
                Err(e) => Err(e),
            }
        } else {
            match self.api.remove_favorite(&self.actor, listing_id).await {
                Ok(()) | Err(HousingError::NotFound { entity: "Favorite", .. }) => Ok(()),
                Err(e) => Err(e),
            }
        }
    }

    pub fn select_listing(&mut self, listing: Listing) {
        self.selected = Some(listing);
    }

    pub fn selected_listing(&self) -> Option<&Listing> {
        self.selected.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}
