//! Identity store backed by a JSON document on disk.
//!
//! Mirrors the shape of a hosted document store: one record per user under
//! `users`, each holding the profile and the `favorites` array, plus a
//! `session` field naming the signed-in user.
//!
//! ```json
//! {
//!   "session": "u1",
//!   "users": {
//!     "u1": { "displayName": "Ada", "email": "ada@example.com", "favorites": ["3", "7"] }
//!   }
//! }
//! ```

use crate::error::StoreError;
use crate::store::{IDENTITY_EVENT_CAPACITY, IdentityStore};
use crate::types::{FavoritesSet, Identity, IdentityEvent, IdentityId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    session: Option<IdentityId>,
    #[serde(default)]
    users: BTreeMap<IdentityId, UserRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    favorites: FavoritesSet,
}

pub struct JsonFileStore {
    path: PathBuf,
    events: broadcast::Sender<IdentityEvent>,
    // Serializes read-modify-write cycles on the document
    io_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (events, _) = broadcast::channel(IDENTITY_EVENT_CAPACITY);
        Self {
            path: path.into(),
            events,
            io_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record the identity's profile, make it the session and notify
    /// subscribers. Existing favorites are kept.
    pub async fn sign_in(&self, identity: Identity) -> Result<(), StoreError> {
        {
            let _guard = self.io_lock.lock().await;
            let mut document = self.load().await?;
            let record = document.users.entry(identity.id.clone()).or_default();
            if identity.display_name.is_some() {
                record.display_name = identity.display_name.clone();
            }
            if identity.email.is_some() {
                record.email = identity.email.clone();
            }
            document.session = Some(identity.id.clone());
            self.save(&document).await?;
        }
        info!("Signed in {} ({})", identity.id, self.path.display());
        let _ = self.events.send(IdentityEvent::SignedIn(identity));
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), StoreError> {
        {
            let _guard = self.io_lock.lock().await;
            let mut document = self.load().await?;
            document.session = None;
            self.save(&document).await?;
        }
        info!("Signed out ({})", self.path.display());
        let _ = self.events.send(IdentityEvent::SignedOut);
        Ok(())
    }

    async fn load(&self) -> Result<StoreDocument, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(StoreDocument::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No store document at {}, starting empty", self.path.display());
                Ok(StoreDocument::default())
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Write to a sibling temp file, then rename over the document so a crash
    /// never leaves a half-written record.
    async fn save(&self, document: &StoreDocument) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(document)?;
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn current_identity(&self) -> Result<Option<Identity>, StoreError> {
        let document = self.load().await?;
        let Some(id) = document.session else {
            return Ok(None);
        };
        let record = document.users.get(&id);
        Ok(Some(Identity {
            display_name: record.and_then(|r| r.display_name.clone()),
            email: record.and_then(|r| r.email.clone()),
            id,
        }))
    }

    async fn read_favorites(
        &self,
        identity: &IdentityId,
    ) -> Result<Option<FavoritesSet>, StoreError> {
        let document = self.load().await?;
        Ok(document
            .users
            .get(identity)
            .map(|record| record.favorites.clone()))
    }

    async fn write_favorites(
        &self,
        identity: &IdentityId,
        favorites: &FavoritesSet,
    ) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.load().await?;
        document.users.entry(identity.clone()).or_default().favorites = favorites.clone();
        self.save(&document).await?;
        debug!("Wrote {} favorites for {}", favorites.len(), identity);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<IdentityEvent> {
        self.events.subscribe()
    }
}
