use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::domain::engagement::{Comment, PostLike};
use crate::domain::media::{Bucket, StoredObject};
use crate::domain::post::{NewPost, Post};
use crate::domain::user::{ProfileUpdate, User};

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Credentials issued by the auth service.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Request surface of the hosted backend: auth, relational tables and
/// object storage. Every table and storage call carries the caller's access
/// token; nothing here holds session state.
#[async_trait]
pub trait RemoteDataService: Send + Sync {
    /// `None` when the account was created but the service withholds a
    /// session until the email address is confirmed.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> RemoteResult<Option<AuthSession>>;

    async fn sign_in(&self, email: &str, password: &str) -> RemoteResult<AuthSession>;

    async fn sign_out(&self, access_token: &str) -> RemoteResult<()>;

    async fn list_posts(&self, access_token: &str) -> RemoteResult<Vec<Post>>;

    async fn list_users_by_ids(&self, access_token: &str, ids: &[Uuid])
        -> RemoteResult<Vec<User>>;

    async fn get_user(&self, access_token: &str, id: Uuid) -> RemoteResult<User>;

    async fn insert_post(&self, access_token: &str, post: &NewPost) -> RemoteResult<Post>;

    async fn insert_post_like(&self, access_token: &str, like: &PostLike) -> RemoteResult<()>;

    async fn insert_comment(&self, access_token: &str, comment: &Comment) -> RemoteResult<()>;

    async fn update_user(
        &self,
        access_token: &str,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> RemoteResult<()>;

    async fn upload(
        &self,
        access_token: &str,
        bucket: Bucket,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> RemoteResult<StoredObject>;
}
