#![allow(dead_code)]

use axum::extract::{Path, Query, Request, State};
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use linkup::app::media::PickedImage;
use linkup::app::session::Session;
use linkup::config::ClientConfig;
use linkup::screens::handlers;
use linkup::AppState;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const TEST_ANON_KEY: &str = "test-anon-key";
pub const DEFAULT_PASSWORD: &str = "testpassword123";
pub const SIMULATED_FAILURE: &str = "simulated failure";

// ---------------------------------------------------------------------------
// Fake backend: an in-process stand-in for the hosted auth, table and
// storage endpoints. Records every request it receives.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SignUp,
    SignIn,
    SignOut,
    ListPosts,
    ListUsers,
    GetUser,
    InsertPost,
    InsertLike,
    InsertComment,
    UpdateUser,
    Upload,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub apikey: Option<String>,
}

impl RecordedRequest {
    /// Decoded query parameters.
    pub fn params(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(self.query.as_deref().unwrap_or("").as_bytes())
            .into_owned()
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub bucket: String,
    pub path: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

struct Account {
    email: String,
    password: String,
    user_id: Uuid,
    token: String,
}

#[derive(Default)]
struct BackendState {
    accounts: Vec<Account>,
    users: Vec<Value>,
    posts: Vec<Value>,
    likes: Vec<Value>,
    comments: Vec<Value>,
    uploads: Vec<StoredUpload>,
    requests: Vec<RecordedRequest>,
    failing: HashSet<Endpoint>,
    next_post_id: i64,
    require_email_confirmation: bool,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<BackendState>>,
}

fn failure(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn simulated(endpoint: Endpoint) -> Response {
    failure(
        StatusCode::BAD_REQUEST,
        json!({ "message": format!("{} ({:?})", SIMULATED_FAILURE, endpoint) }),
    )
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

impl FakeBackend {
    pub fn router(&self) -> Router {
        Router::new()
            .route("/auth/v1/signup", post(sign_up))
            .route("/auth/v1/token", post(token))
            .route("/auth/v1/logout", post(logout))
            .route("/rest/v1/posts", get(list_posts).post(insert_posts))
            .route("/rest/v1/users", get(select_users).patch(update_users))
            .route("/rest/v1/postLikes", post(insert_likes))
            .route("/rest/v1/comments", post(insert_comments))
            .route("/storage/v1/object/:bucket/*path", post(upload))
            .layer(middleware::from_fn_with_state(self.clone(), record))
            .with_state(self.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.inner.lock().expect("fake backend state poisoned")
    }

    // ---- switches ----

    pub fn fail(&self, endpoint: Endpoint) {
        self.lock().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.lock().failing.remove(&endpoint);
    }

    pub fn require_email_confirmation(&self) {
        self.lock().require_email_confirmation = true;
    }

    fn check(&self, endpoint: Endpoint, headers: Option<&HeaderMap>) -> Result<Option<Uuid>, Response> {
        let state = self.lock();
        if state.failing.contains(&endpoint) {
            return Err(simulated(endpoint));
        }
        let Some(headers) = headers else {
            return Ok(None);
        };
        let token = bearer(headers);
        match state
            .accounts
            .iter()
            .find(|account| Some(&account.token) == token.as_ref())
        {
            Some(account) => Ok(Some(account.user_id)),
            None => Err(failure(
                StatusCode::UNAUTHORIZED,
                json!({ "message": "JWT invalid" }),
            )),
        }
    }

    // ---- seeding ----

    pub fn seed_account(&self, name: &str, email: &str, password: &str) -> Uuid {
        let user_id = Uuid::new_v4();
        let mut state = self.lock();
        state.accounts.push(Account {
            email: email.to_string(),
            password: password.to_string(),
            user_id,
            token: format!("token-{}", Uuid::new_v4()),
        });
        state.users.push(json!({
            "id": user_id,
            "name": name,
            "email": email,
            "bio": null,
            "address": null,
            "image": null,
        }));
        user_id
    }

    pub fn remove_user_row(&self, user_id: Uuid) {
        let id = user_id.to_string();
        self.lock().users.retain(|row| row["id"] != json!(id));
    }

    pub fn seed_post(&self, user_id: Uuid, body: &str, image: Option<&str>) -> i64 {
        let mut state = self.lock();
        state.next_post_id += 1;
        let id = state.next_post_id;
        state.posts.push(json!({
            "id": id,
            "userId": user_id,
            "body": body,
            "image": image,
            "createdAt": "2024-05-01T12:00:00.000+00:00",
        }));
        id
    }

    /// Stores `row` as-is apart from a fresh `id`, for rows the client
    /// never writes itself.
    pub fn seed_raw_post(&self, mut row: Value) -> i64 {
        let mut state = self.lock();
        state.next_post_id += 1;
        let id = state.next_post_id;
        row["id"] = json!(id);
        state.posts.push(row);
        id
    }

    pub fn set_user_image(&self, user_id: Uuid, image: &str) {
        let id = json!(user_id.to_string());
        let mut state = self.lock();
        if let Some(row) = state.users.iter_mut().find(|row| row["id"] == id) {
            row["image"] = json!(image);
        }
    }

    // ---- inspection ----

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.path == path)
            .collect()
    }

    pub fn data_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| !request.path.starts_with("/auth/"))
            .collect()
    }

    pub fn posts(&self) -> Vec<Value> {
        self.lock().posts.clone()
    }

    pub fn likes(&self) -> Vec<Value> {
        self.lock().likes.clone()
    }

    pub fn comments(&self) -> Vec<Value> {
        self.lock().comments.clone()
    }

    pub fn uploads(&self) -> Vec<StoredUpload> {
        self.lock().uploads.clone()
    }

    pub fn user_row(&self, user_id: Uuid) -> Option<Value> {
        let id = json!(user_id.to_string());
        self.lock().users.iter().find(|row| row["id"] == id).cloned()
    }
}

async fn record(State(backend): State<FakeBackend>, request: Request, next: Next) -> Response {
    // Built in its own scope so no borrow of the request outlives it.
    let recorded = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            authorization: header("authorization"),
            apikey: header("apikey"),
        }
    };
    backend.lock().requests.push(recorded);
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Auth endpoints
// ---------------------------------------------------------------------------

async fn sign_up(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Response {
    if let Err(response) = backend.check(Endpoint::SignUp, None) {
        return response;
    }
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let name = body["data"]["name"].as_str().unwrap_or_default().to_string();

    if backend.lock().accounts.iter().any(|account| account.email == email) {
        return failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "code": 422, "msg": "User already registered" }),
        );
    }

    let user_id = backend.seed_account(&name, &email, &password);
    let state = backend.lock();
    if state.require_email_confirmation {
        return Json(json!({ "id": user_id, "email": email })).into_response();
    }
    let token = state
        .accounts
        .iter()
        .find(|account| account.user_id == user_id)
        .map(|account| account.token.clone())
        .unwrap_or_default();
    Json(json!({
        "access_token": token,
        "refresh_token": "refresh",
        "user": { "id": user_id, "email": email },
    }))
    .into_response()
}

async fn token(
    State(backend): State<FakeBackend>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = backend.check(Endpoint::SignIn, None) {
        return response;
    }
    if params.get("grant_type").map(String::as_str) != Some("password") {
        return failure(
            StatusCode::BAD_REQUEST,
            json!({ "error": "unsupported_grant_type" }),
        );
    }
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let state = backend.lock();
    match state
        .accounts
        .iter()
        .find(|account| account.email == email && account.password == password)
    {
        Some(account) => Json(json!({
            "access_token": account.token,
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh",
            "user": { "id": account.user_id, "email": account.email },
        }))
        .into_response(),
        None => failure(
            StatusCode::BAD_REQUEST,
            json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials",
            }),
        ),
    }
}

async fn logout(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    match backend.check(Endpoint::SignOut, Some(&headers)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(response) => response,
    }
}

// ---------------------------------------------------------------------------
// Table endpoints
// ---------------------------------------------------------------------------

async fn list_posts(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    if let Err(response) = backend.check(Endpoint::ListPosts, Some(&headers)) {
        return response;
    }
    Json(Value::Array(backend.posts())).into_response()
}

async fn insert_posts(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(rows): Json<Vec<Value>>,
) -> Response {
    if let Err(response) = backend.check(Endpoint::InsertPost, Some(&headers)) {
        return response;
    }
    let mut state = backend.lock();
    let mut inserted = Vec::with_capacity(rows.len());
    for mut row in rows {
        state.next_post_id += 1;
        row["id"] = json!(state.next_post_id);
        state.posts.push(row.clone());
        inserted.push(row);
    }

    let wants_rows = headers
        .get("prefer")
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.contains("return=representation"));
    if wants_rows {
        (StatusCode::CREATED, Json(Value::Array(inserted))).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn select_users(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let single = headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.contains("vnd.pgrst.object"));
    let endpoint = if single {
        Endpoint::GetUser
    } else {
        Endpoint::ListUsers
    };
    if let Err(response) = backend.check(endpoint, Some(&headers)) {
        return response;
    }

    let filter = params.get("id").cloned().unwrap_or_default();
    let wanted: Vec<String> = if let Some(list) = filter
        .strip_prefix("in.(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        list.split(',').map(str::to_string).collect()
    } else if let Some(id) = filter.strip_prefix("eq.") {
        vec![id.to_string()]
    } else {
        return failure(
            StatusCode::BAD_REQUEST,
            json!({ "message": format!("unsupported filter {}", filter) }),
        );
    };

    let rows: Vec<Value> = backend
        .lock()
        .users
        .iter()
        .filter(|row| {
            row["id"]
                .as_str()
                .map_or(false, |id| wanted.iter().any(|want| want == id))
        })
        .cloned()
        .collect();

    if single {
        return match rows.as_slice() {
            [row] => Json(row.clone()).into_response(),
            _ => failure(
                StatusCode::NOT_ACCEPTABLE,
                json!({
                    "code": "PGRST116",
                    "message": "JSON object requested, multiple (or no) rows returned",
                }),
            ),
        };
    }
    Json(Value::Array(rows)).into_response()
}

async fn update_users(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(patch): Json<Value>,
) -> Response {
    if let Err(response) = backend.check(Endpoint::UpdateUser, Some(&headers)) {
        return response;
    }
    let Some(id) = params.get("id").and_then(|filter| filter.strip_prefix("eq.")) else {
        return failure(StatusCode::BAD_REQUEST, json!({ "message": "missing id filter" }));
    };

    let mut state = backend.lock();
    if let Some(row) = state
        .users
        .iter_mut()
        .find(|row| row["id"].as_str() == Some(id))
    {
        if let (Some(row), Some(patch)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in patch {
                row.insert(key.clone(), value.clone());
            }
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn insert_likes(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(rows): Json<Vec<Value>>,
) -> Response {
    if let Err(response) = backend.check(Endpoint::InsertLike, Some(&headers)) {
        return response;
    }
    backend.lock().likes.extend(rows);
    StatusCode::CREATED.into_response()
}

async fn insert_comments(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(rows): Json<Vec<Value>>,
) -> Response {
    if let Err(response) = backend.check(Endpoint::InsertComment, Some(&headers)) {
        return response;
    }
    backend.lock().comments.extend(rows);
    StatusCode::CREATED.into_response()
}

// ---------------------------------------------------------------------------
// Storage endpoint
// ---------------------------------------------------------------------------

async fn upload(
    State(backend): State<FakeBackend>,
    Path((bucket, path)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(response) = backend.check(Endpoint::Upload, Some(&headers)) {
        return response;
    }
    let path = path.trim_start_matches('/').to_string();
    let mut state = backend.lock();
    if state
        .uploads
        .iter()
        .any(|upload| upload.bucket == bucket && upload.path == path)
    {
        return failure(
            StatusCode::BAD_REQUEST,
            json!({
                "statusCode": "409",
                "error": "Duplicate",
                "message": "The resource already exists",
            }),
        );
    }

    let key = format!("{}/{}", bucket, path);
    state.uploads.push(StoredUpload {
        bucket,
        path,
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        bytes: body,
    });
    Json(json!({ "Key": key, "Id": Uuid::new_v4() })).into_response()
}

// ---------------------------------------------------------------------------
// TestApp
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub backend: FakeBackend,
    pub state: AppState,
    pub config: ClientConfig,
}

pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Starts a fresh fake backend on a loopback port and points a client at it.
pub async fn spawn_app() -> TestApp {
    let backend = FakeBackend::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("cannot bind fake backend");
    let addr = listener.local_addr().expect("fake backend has no address");

    let router = backend.router();
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("fake backend stopped");
    });

    let config = ClientConfig::for_api(&format!("http://{}", addr), TEST_ANON_KEY)
        .expect("failed to build ClientConfig");
    let state = AppState::from_config(&config).expect("failed to build AppState");

    TestApp {
        backend,
        state,
        config,
    }
}

impl TestApp {
    pub fn create_user(&self, prefix: &str) -> TestUser {
        let name = format!("{} user", prefix);
        let email = format!("{}@example.com", prefix);
        let id = self.backend.seed_account(&name, &email, DEFAULT_PASSWORD);
        TestUser {
            id,
            name,
            email,
            password: DEFAULT_PASSWORD.to_string(),
        }
    }

    pub async fn sign_in(&self, user: &TestUser) -> Session {
        let (session, _) = handlers::login(&self.state, &user.email, &user.password)
            .await
            .expect("login failed");
        session
    }

    pub async fn create_signed_in_user(&self, prefix: &str) -> (TestUser, Session) {
        let user = self.create_user(prefix);
        let session = self.sign_in(&user).await;
        (user, session)
    }

    pub fn public_url(&self, stored_path: &str) -> String {
        format!("{}/{}", self.config.storage_public_url, stored_path)
    }
}

/// PNG of the given size, as a picked image.
pub fn png_image(width: u32, height: u32) -> PickedImage {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("failed to encode test png");
    PickedImage::from_bytes(out.into_inner())
}
