use anyhow::Result;
use std::sync::Arc;

use crate::app::session::Session;
use crate::domain::engagement::{Comment, PostLike};
use crate::domain::post::PostId;
use crate::infra::remote::RemoteDataService;

/// Likes and comments. Each call inserts one row; repeats are not detected,
/// so liking twice stores two likes.
#[derive(Clone)]
pub struct EngagementService {
    remote: Arc<dyn RemoteDataService>,
}

impl EngagementService {
    pub fn new(remote: Arc<dyn RemoteDataService>) -> Self {
        Self { remote }
    }

    pub async fn like_post(&self, session: &Session, post_id: PostId) -> Result<PostLike> {
        let like = PostLike {
            post_id,
            user_id: session.user_id(),
        };
        self.remote
            .insert_post_like(session.access_token(), &like)
            .await?;
        Ok(like)
    }

    pub async fn comment_post(
        &self,
        session: &Session,
        post_id: PostId,
        text: String,
    ) -> Result<Comment> {
        let comment = Comment {
            post_id,
            user_id: session.user_id(),
            text,
        };
        self.remote
            .insert_comment(session.access_token(), &comment)
            .await?;
        Ok(comment)
    }
}
