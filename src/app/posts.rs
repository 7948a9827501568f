use anyhow::Result;
use std::sync::Arc;
use time::OffsetDateTime;

use crate::app::session::Session;
use crate::domain::post::{NewPost, Post};
use crate::infra::remote::RemoteDataService;

#[derive(Clone)]
pub struct PostService {
    remote: Arc<dyn RemoteDataService>,
}

impl PostService {
    pub fn new(remote: Arc<dyn RemoteDataService>) -> Self {
        Self { remote }
    }

    /// `image` is the stored path of an already uploaded image.
    pub async fn create_post(
        &self,
        session: &Session,
        body: String,
        image: Option<String>,
    ) -> Result<Post> {
        let new_post = NewPost {
            body,
            user_id: session.user_id(),
            image,
            created_at: OffsetDateTime::now_utc(),
        };
        let post = self
            .remote
            .insert_post(session.access_token(), &new_post)
            .await?;
        Ok(post)
    }
}
