use crate::app::auth::AuthService;
use crate::app::engagement::EngagementService;
use crate::app::feed::FeedService;
use crate::app::media::{MediaService, PickedImage};
use crate::app::posts::PostService;
use crate::app::session::Session;
use crate::app::users::UserService;
use crate::domain::feed::Feed;
use crate::domain::media::ImageKind;
use crate::domain::post::{Post, PostId};
use crate::domain::user::ProfileUpdate;
use crate::screens::Alert;
use crate::AppState;
use std::path::Path;

pub type ScreenResult<T> = Result<T, Alert>;

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub body: String,
    pub image: Option<PickedImage>,
}

impl PostDraft {
    /// Draft from the shell: the body is checked before the image file is
    /// read, so a missing body wins over an unreadable file.
    pub async fn load(body: String, image_path: Option<&Path>) -> ScreenResult<Self> {
        require_post_body(&body)?;
        let image = match image_path {
            Some(path) => Some(PickedImage::open(path).await.map_err(|err| {
                tracing::error!(error = ?err, path = %path.display(), "failed to open image");
                Alert::error("Failed to upload image.")
            })?),
            None => None,
        };
        Ok(Self { body, image })
    }
}

fn require_post_body(body: &str) -> ScreenResult<()> {
    if body.trim().is_empty() {
        return Err(Alert::error("Content is required."));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: String,
    pub address: String,
    pub bio: String,
    pub email: String,
    /// A newly picked avatar. `None` keeps the stored one.
    pub avatar: Option<PickedImage>,
}

impl ProfileForm {
    /// Form prefilled from the session's profile, as the profile screen opens.
    pub fn from_session(session: &Session) -> Self {
        let user = session.user();
        Self {
            name: user.name.clone().unwrap_or_default(),
            address: user.address.clone().unwrap_or_default(),
            bio: user.bio.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
            avatar: None,
        }
    }

    /// Reads a newly picked avatar, once the required fields are present.
    pub async fn attach_avatar(&mut self, path: &Path) -> ScreenResult<()> {
        self.require_fields()?;
        let image = PickedImage::open(path).await.map_err(|err| {
            tracing::error!(error = ?err, path = %path.display(), "failed to open avatar");
            Alert::error("Failed to upload avatar.")
        })?;
        self.avatar = Some(image);
        Ok(())
    }

    fn require_fields(&self) -> ScreenResult<()> {
        if self.name.is_empty() || self.email.is_empty() {
            return Err(Alert::error("Name and email are required."));
        }
        Ok(())
    }
}

fn remote_message(err: &anyhow::Error, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

pub async fn signup(state: &AppState, form: SignUpForm) -> ScreenResult<Alert> {
    if form.name.is_empty() {
        return Err(Alert::error("Name is required"));
    }
    if form.email.is_empty() {
        return Err(Alert::error("Email is required"));
    }
    if form.password.is_empty() {
        return Err(Alert::error("Password is required"));
    }

    let service = AuthService::new(state.remote.clone());
    service
        .sign_up(&form.name, &form.email, &form.password)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, email = %form.email, "failed to sign up");
            Alert::error(remote_message(&err, "An error occurred during signup."))
        })?;

    Ok(Alert::success("Sign Up Successfully"))
}

pub async fn login(state: &AppState, email: &str, password: &str) -> ScreenResult<(Session, Alert)> {
    if email.is_empty() {
        return Err(Alert::error("Email is required"));
    }
    if password.is_empty() {
        return Err(Alert::error("Password is required"));
    }

    let service = AuthService::new(state.remote.clone());
    let session = service.sign_in(email, password).await.map_err(|err| {
        tracing::error!(error = ?err, email = %email, "failed to sign in");
        Alert::error(remote_message(&err, "Login failed"))
    })?;

    let alert = Alert::new("Login successful", format!("Welcome back, {}!", email));
    Ok((session, alert))
}

/// Takes the session by value: whatever the service answers, the caller is
/// signed out afterwards.
pub async fn logout(state: &AppState, session: Session) -> ScreenResult<Alert> {
    let user_id = session.user_id();
    let service = AuthService::new(state.remote.clone());
    service.sign_out(session).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %user_id, "failed to sign out");
        Alert::new("Sign Out", "Error Signing Out!")
    })?;

    Ok(Alert::new("Sign Out", "Signed out"))
}

pub async fn home_feed(state: &AppState, session: &Session) -> ScreenResult<Feed> {
    let service = FeedService::new(state.remote.clone(), state.storage.clone());
    service.get_home_feed(session).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %session.user_id(), "failed to fetch posts");
        Alert::new("Error fetching posts", remote_message(&err, "Unknown error"))
    })
}

pub async fn like_post(state: &AppState, session: &Session, post_id: PostId) -> ScreenResult<Alert> {
    let service = EngagementService::new(state.remote.clone());
    service.like_post(session, post_id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %session.user_id(), post_id, "failed to like post");
        Alert::new("Error liking post", remote_message(&err, "Unknown error"))
    })?;

    Ok(Alert::titled("Liked!"))
}

pub async fn add_comment(
    state: &AppState,
    session: &Session,
    post_id: PostId,
    text: String,
) -> ScreenResult<Alert> {
    if text.trim().is_empty() {
        return Err(Alert::error("Comment cannot be empty."));
    }

    let service = EngagementService::new(state.remote.clone());
    service
        .comment_post(session, post_id, text)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %session.user_id(), post_id, "failed to add comment");
            Alert::new("Error adding comment", remote_message(&err, "Unknown error"))
        })?;

    Ok(Alert::titled("Comment added!"))
}

/// Uploads the picked image first; a failed upload means no post is written.
pub async fn create_post(
    state: &AppState,
    session: &Session,
    draft: PostDraft,
) -> ScreenResult<(Post, Alert)> {
    require_post_body(&draft.body)?;

    let image = match draft.image {
        Some(ref picked) => {
            let media = MediaService::new(state.remote.clone(), state.media);
            let stored = media
                .upload_image(session, ImageKind::PostImage, picked)
                .await
                .map_err(|err| {
                    tracing::error!(error = ?err, user_id = %session.user_id(), "failed to upload post image");
                    Alert::error("Failed to upload image.")
                })?;
            Some(stored.full_path)
        }
        None => None,
    };

    let service = PostService::new(state.remote.clone());
    let post = service
        .create_post(session, draft.body, image)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %session.user_id(), "failed to create post");
            Alert::error("Failed to create post")
        })?;

    tracing::info!(user_id = %session.user_id(), post_id = post.id, "post created");
    Ok((post, Alert::success("Post created successfully")))
}

/// Uploads a new avatar when one was picked, then writes the profile. The
/// session only changes after the write succeeds.
pub async fn save_profile(
    state: &AppState,
    session: &mut Session,
    form: ProfileForm,
) -> ScreenResult<Alert> {
    form.require_fields()?;

    let image = match form.avatar {
        Some(ref picked) => {
            let media = MediaService::new(state.remote.clone(), state.media);
            let stored = media
                .upload_image(session, ImageKind::Avatar, picked)
                .await
                .map_err(|err| {
                    tracing::error!(error = ?err, user_id = %session.user_id(), "failed to upload avatar");
                    Alert::error("Failed to upload avatar.")
                })?;
            Some(stored.full_path)
        }
        None => session.user().image.clone(),
    };

    let update = ProfileUpdate {
        name: form.name,
        address: form.address,
        bio: form.bio,
        email: form.email,
        image,
    };

    let user_id = session.user_id();
    let service = UserService::new(state.remote.clone());
    service.update_profile(session, update).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %user_id, "failed to update profile");
        Alert::error("Failed to update profile")
    })?;

    tracing::info!(user_id = %user_id, "profile updated");
    Ok(Alert::success("Profile updated successfully"))
}
