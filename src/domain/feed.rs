use serde::Serialize;

use crate::domain::post::Post;

pub const UNKNOWN_AUTHOR_NAME: &str = "Unknown User";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum Avatar {
    /// Bundled placeholder image.
    Default,
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedAuthor {
    pub name: String,
    pub avatar: Avatar,
}

impl FeedAuthor {
    pub fn placeholder() -> Self {
        Self {
            name: UNKNOWN_AUTHOR_NAME.to_string(),
            avatar: Avatar::Default,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.name == UNKNOWN_AUTHOR_NAME && self.avatar == Avatar::Default
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub post: Post,
    pub author: FeedAuthor,
    pub image_url: Option<String>,
    pub time_ago: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feed {
    /// Avatar of the signed-in user, shown in the header.
    pub viewer_avatar: Avatar,
    pub items: Vec<FeedItem>,
}
