use std::fmt;

use crate::domain::feed::{Avatar, Feed};
use crate::domain::user::User;

fn avatar_label(avatar: &Avatar) -> &str {
    match avatar {
        Avatar::Default => "(default avatar)",
        Avatar::Remote(url) => url,
    }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

/// The home screen as text.
pub struct FeedScreen<'a>(pub &'a Feed);

impl fmt::Display for FeedScreen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let feed = self.0;
        writeln!(f, "LinkUp  [{}]", avatar_label(&feed.viewer_avatar))?;

        if feed.items.is_empty() {
            return writeln!(f, "No posts yet.");
        }

        for item in &feed.items {
            writeln!(f, "----------------------------------------")?;
            writeln!(
                f,
                "#{}  {}  {}",
                item.post.id, item.author.name, item.time_ago
            )?;
            writeln!(f, "    avatar: {}", avatar_label(&item.author.avatar))?;
            writeln!(f, "{}", item.post.body)?;
            if let Some(ref url) = item.image_url {
                writeln!(f, "    image: {}", url)?;
            }
        }
        Ok(())
    }
}

pub struct ProfileScreen<'a> {
    pub user: &'a User,
    pub avatar: &'a Avatar,
}

impl fmt::Display for ProfileScreen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user = self.user;
        writeln!(f, "name:    {}", text(&user.name))?;
        writeln!(f, "email:   {}", text(&user.email))?;
        writeln!(f, "address: {}", text(&user.address))?;
        writeln!(f, "bio:     {}", text(&user.bio))?;
        writeln!(f, "avatar:  {}", avatar_label(self.avatar))
    }
}
