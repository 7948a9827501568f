use uuid::Uuid;

use crate::domain::user::User;
use crate::infra::remote::AuthSession;

/// The signed-in user: credentials plus the profile row loaded at launch.
/// Owned by the front end and handed to every operation that needs it;
/// signing out consumes it.
#[derive(Debug, Clone)]
pub struct Session {
    auth: AuthSession,
    user: User,
}

impl Session {
    pub fn new(auth: AuthSession, user: User) -> Self {
        Self { auth, user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> Uuid {
        self.auth.user_id
    }

    pub fn access_token(&self) -> &str {
        &self.auth.access_token
    }

    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref().or(self.auth.email.as_deref())
    }

    pub(crate) fn set_user(&mut self, user: User) {
        self.user = user;
    }

    pub(crate) fn into_auth(self) -> AuthSession {
        self.auth
    }
}
