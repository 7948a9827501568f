use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::app::session::Session;
use crate::app::users::UserService;
use crate::infra::remote::{AuthSession, RemoteDataService};

#[derive(Clone)]
pub struct AuthService {
    remote: Arc<dyn RemoteDataService>,
}

impl AuthService {
    pub fn new(remote: Arc<dyn RemoteDataService>) -> Self {
        Self { remote }
    }

    /// Creates the account. The display name travels as auth metadata; the
    /// service derives the `users` row from it.
    pub async fn sign_up(
        &self,
        display_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthSession>> {
        let session = self.remote.sign_up(email, password, display_name).await?;
        info!(
            email = %email,
            session_issued = session.is_some(),
            "account created"
        );
        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let auth = self.remote.sign_in(email, password).await?;
        self.start_session(auth).await
    }

    /// Loads the profile row for freshly issued credentials.
    pub async fn start_session(&self, auth: AuthSession) -> Result<Session> {
        let users = UserService::new(self.remote.clone());
        let user = users.get_user(&auth.access_token, auth.user_id).await?;
        info!(user_id = %auth.user_id, "session started");
        Ok(Session::new(auth, user))
    }

    /// The session is gone once this is called, whatever the remote answer.
    pub async fn sign_out(&self, session: Session) -> Result<()> {
        let auth = session.into_auth();
        self.remote.sign_out(&auth.access_token).await?;
        info!(user_id = %auth.user_id, "signed out");
        Ok(())
    }
}
