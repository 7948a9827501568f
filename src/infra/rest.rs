use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::domain::engagement::{Comment, PostLike};
use crate::domain::media::{Bucket, StoredObject};
use crate::domain::post::{NewPost, Post};
use crate::domain::user::{ProfileUpdate, User};
use crate::infra::remote::{AuthSession, RemoteDataService, RemoteError, RemoteResult};

const APIKEY_HEADER: &str = "apikey";
const PREFER_HEADER: &str = "prefer";
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// HTTP client for the hosted backend (`/auth/v1`, `/rest/v1`,
/// `/storage/v1`). Cloning shares the connection pool.
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Deserialize)]
struct AuthUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// Signup answers with a full session, or with the bare user when email
/// confirmation is pending.
#[derive(Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key", default)]
    key: Option<String>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
            .filter(|message| !message.is_empty())
    }
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.http_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let http = builder
            .build()
            .map_err(|err| anyhow!("failed to build http client: {}", err))?;

        Ok(Self {
            http,
            base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, access_token: &str) -> RequestBuilder {
        request
            .header(APIKEY_HEADER, &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
    }

    fn anonymous(&self, request: RequestBuilder) -> RequestBuilder {
        self.authorized(request, &self.anon_key)
    }

    async fn insert_rows<T: Serialize + Sync>(
        &self,
        access_token: &str,
        table: &str,
        row: &T,
    ) -> RemoteResult<()> {
        let request = self
            .http
            .post(self.endpoint(&format!("rest/v1/{}", table)))
            .header(PREFER_HEADER, "return=minimal")
            .json(&[row]);
        let response = self.authorized(request, access_token).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            if text.trim().is_empty() {
                format!("request failed with status {}", status.as_u16())
            } else {
                text
            }
        });

    Err(RemoteError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
    let response = ensure_success(response).await?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|err| RemoteError::Decode(err.to_string()))
}

fn in_filter(ids: &[Uuid]) -> String {
    let joined = ids
        .iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", joined)
}

#[async_trait]
impl RemoteDataService for RestClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> RemoteResult<Option<AuthSession>> {
        let request = self.http.post(self.endpoint("auth/v1/signup")).json(&json!({
            "email": email,
            "password": password,
            "data": { "name": display_name },
        }));
        let response = self.anonymous(request).send().await?;
        let body: SignUpResponse = decode(response).await?;

        let session = match (body.access_token, body.user) {
            (Some(access_token), Some(user)) => Some(AuthSession {
                access_token,
                user_id: user.id,
                email: user.email,
            }),
            _ => None,
        };
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> RemoteResult<AuthSession> {
        let request = self
            .http
            .post(self.endpoint("auth/v1/token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let response = self.anonymous(request).send().await?;
        let body: TokenResponse = decode(response).await?;

        Ok(AuthSession {
            access_token: body.access_token,
            user_id: body.user.id,
            email: body.user.email,
        })
    }

    async fn sign_out(&self, access_token: &str) -> RemoteResult<()> {
        let request = self.http.post(self.endpoint("auth/v1/logout"));
        let response = self.authorized(request, access_token).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn list_posts(&self, access_token: &str) -> RemoteResult<Vec<Post>> {
        let request = self
            .http
            .get(self.endpoint("rest/v1/posts"))
            .query(&[("select", "*")]);
        let response = self.authorized(request, access_token).send().await?;
        decode(response).await
    }

    async fn list_users_by_ids(
        &self,
        access_token: &str,
        ids: &[Uuid],
    ) -> RemoteResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let request = self
            .http
            .get(self.endpoint("rest/v1/users"))
            .query(&[("select", "*".to_string()), ("id", in_filter(ids))]);
        let response = self.authorized(request, access_token).send().await?;
        decode(response).await
    }

    async fn get_user(&self, access_token: &str, id: Uuid) -> RemoteResult<User> {
        let request = self
            .http
            .get(self.endpoint("rest/v1/users"))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))])
            .header(ACCEPT, SINGLE_OBJECT);
        let response = self.authorized(request, access_token).send().await?;
        decode(response).await
    }

    async fn insert_post(&self, access_token: &str, post: &NewPost) -> RemoteResult<Post> {
        let request = self
            .http
            .post(self.endpoint("rest/v1/posts"))
            .header(PREFER_HEADER, "return=representation")
            .json(&[post]);
        let response = self.authorized(request, access_token).send().await?;
        let mut rows: Vec<Post> = decode(response).await?;
        if rows.is_empty() {
            return Err(RemoteError::Decode("insert returned no rows".into()));
        }
        Ok(rows.swap_remove(0))
    }

    async fn insert_post_like(&self, access_token: &str, like: &PostLike) -> RemoteResult<()> {
        self.insert_rows(access_token, "postLikes", like).await
    }

    async fn insert_comment(&self, access_token: &str, comment: &Comment) -> RemoteResult<()> {
        self.insert_rows(access_token, "comments", comment).await
    }

    async fn update_user(
        &self,
        access_token: &str,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> RemoteResult<()> {
        let request = self
            .http
            .patch(self.endpoint("rest/v1/users"))
            .query(&[("id", format!("eq.{}", id))])
            .header(PREFER_HEADER, "return=minimal")
            .json(update);
        let response = self.authorized(request, access_token).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn upload(
        &self,
        access_token: &str,
        bucket: Bucket,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> RemoteResult<StoredObject> {
        let request = self
            .http
            .post(self.endpoint(&format!(
                "storage/v1/object/{}/{}",
                bucket.as_str(),
                path
            )))
            .header(CONTENT_TYPE, content_type)
            .body(body);
        let response = self.authorized(request, access_token).send().await?;
        let uploaded: UploadResponse = decode(response).await?;

        let full_path = uploaded
            .key
            .unwrap_or_else(|| format!("{}/{}", bucket.as_str(), path));
        Ok(StoredObject {
            path: path.to_string(),
            full_path,
        })
    }
}
