use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::post::PostId;

/// Row of `postLikes`. Nothing keeps the pair unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostLike {
    pub post_id: PostId,
    pub user_id: Uuid,
}

/// Row of `comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub post_id: PostId,
    pub user_id: Uuid,
    pub text: String,
}
