use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of the `users` table. Every column but `id` may be null on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Storage path of the avatar, e.g. `avatars/avatars/<file>.jpg`.
    #[serde(default)]
    pub image: Option<String>,
}

/// Column set written by a profile update. `image` is always sent, so a
/// `None` clears the avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub address: String,
    pub bio: String,
    pub email: String,
    pub image: Option<String>,
}

impl User {
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// The record as it reads after `update` has been stored.
    pub fn with_update(&self, update: &ProfileUpdate) -> Self {
        Self {
            id: self.id,
            name: Some(update.name.clone()),
            email: Some(update.email.clone()),
            bio: Some(update.bio.clone()),
            address: Some(update.address.clone()),
            image: update.image.clone(),
        }
    }
}
