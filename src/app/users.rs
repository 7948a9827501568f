use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

use crate::app::session::Session;
use crate::domain::user::{ProfileUpdate, User};
use crate::infra::remote::RemoteDataService;

#[derive(Clone)]
pub struct UserService {
    remote: Arc<dyn RemoteDataService>,
}

impl UserService {
    pub fn new(remote: Arc<dyn RemoteDataService>) -> Self {
        Self { remote }
    }

    pub async fn get_user(&self, access_token: &str, user_id: Uuid) -> Result<User> {
        let user = self.remote.get_user(access_token, user_id).await?;
        Ok(user)
    }

    /// Writes the profile columns of the session's user and, once stored,
    /// replaces the session copy. A failed write leaves the session as is.
    pub async fn update_profile(&self, session: &mut Session, update: ProfileUpdate) -> Result<User> {
        self.remote
            .update_user(session.access_token(), session.user_id(), &update)
            .await?;

        let user = session.user().with_update(&update);
        session.set_user(user.clone());
        Ok(user)
    }
}
