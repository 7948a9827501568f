use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::app::session::Session;
use crate::domain::feed::{Feed, FeedAuthor, FeedItem, UNKNOWN_AUTHOR_NAME};
use crate::domain::post::Post;
use crate::domain::user::User;
use crate::infra::remote::RemoteDataService;
use crate::infra::storage::PublicStorage;

#[derive(Clone)]
pub struct FeedService {
    remote: Arc<dyn RemoteDataService>,
    storage: PublicStorage,
}

impl FeedService {
    pub fn new(remote: Arc<dyn RemoteDataService>, storage: PublicStorage) -> Self {
        Self { remote, storage }
    }

    pub async fn get_home_feed(&self, session: &Session) -> Result<Feed> {
        self.get_home_feed_at(session, OffsetDateTime::now_utc()).await
    }

    /// Posts first, then their authors. Without posts the author lookup is
    /// never sent; a failed author lookup renders every post with the
    /// placeholder author instead of failing the feed.
    pub async fn get_home_feed_at(&self, session: &Session, now: OffsetDateTime) -> Result<Feed> {
        let posts = self.remote.list_posts(session.access_token()).await?;
        let authors = self.fetch_authors(session, &posts).await;

        let items = posts
            .into_iter()
            .map(|post| {
                let author = post.user_id.and_then(|id| authors.get(&id));
                let author = self.resolve_author(author);
                let image_url = self.storage.image_url(post.image.as_deref());
                let time_ago = time_ago(post.created_at, now);
                FeedItem {
                    post,
                    author,
                    image_url,
                    time_ago,
                }
            })
            .collect();

        Ok(Feed {
            viewer_avatar: self.storage.avatar(session.user().image.as_deref()),
            items,
        })
    }

    async fn fetch_authors(&self, session: &Session, posts: &[Post]) -> HashMap<Uuid, User> {
        let ids = distinct_author_ids(posts);
        if ids.is_empty() {
            return HashMap::new();
        }

        match self
            .remote
            .list_users_by_ids(session.access_token(), &ids)
            .await
        {
            Ok(users) => {
                debug!(requested = ids.len(), found = users.len(), "resolved post authors");
                users.into_iter().map(|user| (user.id, user)).collect()
            }
            Err(err) => {
                warn!(error = ?err, requested = ids.len(), "failed to fetch post authors");
                HashMap::new()
            }
        }
    }

    fn resolve_author(&self, user: Option<&User>) -> FeedAuthor {
        let Some(user) = user else {
            return FeedAuthor::placeholder();
        };
        FeedAuthor {
            name: user
                .display_name()
                .unwrap_or(UNKNOWN_AUTHOR_NAME)
                .to_string(),
            avatar: self.storage.avatar(user.image.as_deref()),
        }
    }
}

/// Author ids in first-seen order, each once. Posts without an author
/// reference contribute nothing.
pub fn distinct_author_ids(posts: &[Post]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(posts.len());
    posts
        .iter()
        .filter_map(|post| post.user_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

pub fn time_ago(created_at: OffsetDateTime, now: OffsetDateTime) -> String {
    let seconds = (now - created_at).whole_seconds();
    match seconds {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 7 * 86_400 => format!("{}d ago", s / 86_400),
        _ => {
            let date = created_at.date();
            format!(
                "{}-{:02}-{:02}",
                date.year(),
                u8::from(date.month()),
                date.day()
            )
        }
    }
}
