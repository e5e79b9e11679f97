//! HTTP request handlers for the Agora API.
//!
//! Thin transport layer over the core engines: handlers extract credentials,
//! resolve the actor, delegate to the engine, and map `CoreError` variants
//! onto HTTP statuses. All state coordination happens in the store; the
//! handlers hold it behind a mutex only because SQLite connections are not
//! thread-safe.

use crate::session::{SessionError, SessionManager};
use agora_domain::traits::NotificationStore;
use agora_domain::{
    AccountId, Actor, ContentId, CoreError, Credentials, ItemKind, Notification, NotificationId,
    VoteDirection, VoteSets,
};
use agora_engine::{AcceptanceEngine, ContentEngine, NewAnswer, NewQuestion, NoAssets, VoteLedger};
use agora_identity::IdentityResolver;
use agora_notify::{BroadcastSink, Fanout};
use agora_store::SqliteStore;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite store behind a mutex (connections are not thread-safe)
    pub store: Arc<Mutex<SqliteStore>>,
    /// Session manager for JWT bearer tokens
    pub sessions: Arc<SessionManager>,
    /// Best-effort notification fan-out
    pub fanout: Arc<Fanout<BroadcastSink>>,
    /// Actor resolution and edit authorization
    pub resolver: Arc<IdentityResolver>,
    /// Vote ledger
    pub votes: Arc<VoteLedger>,
    /// Acceptance state machine
    pub acceptance: Arc<AcceptanceEngine>,
    /// Content orchestration
    pub content: Arc<ContentEngine>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum ApiError {
    /// An error surfaced by the core engine
    Core(CoreError),
    /// Internal server error
    Internal(String),
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::Core(e)
    }
}

impl From<SessionError> for ApiError {
    fn from(_: SessionError) -> Self {
        ApiError::Core(CoreError::Unauthorized)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Core(e) => {
                let status = match &e {
                    CoreError::Unauthorized => StatusCode::UNAUTHORIZED,
                    CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
                    CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    CoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    CoreError::Conflict(_) => StatusCode::CONFLICT,
                    CoreError::Dependency(_) => StatusCode::BAD_GATEWAY,
                    CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

/// Vote request
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    /// "question" or "answer"
    pub item_type: ItemKind,
    /// Target item id
    pub item_id: String,
    /// "up" or "down"
    pub direction: VoteDirection,
}

/// Acceptance toggle response
#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptResponse {
    /// The answer's acceptance flag after the toggle
    pub is_accepted: bool,
}

/// Question creation request
#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    /// Title
    pub title: String,
    /// Body text
    pub content: String,
    /// Tag set
    #[serde(default)]
    pub tags: Vec<String>,
    /// Post without public attribution
    #[serde(default)]
    pub anonymous: bool,
    /// Client-held token keying anonymous edit/delete rights
    #[serde(default)]
    pub anon_user_id: Option<String>,
    /// Keys of assets already uploaded for this post
    #[serde(default)]
    pub asset_keys: Vec<String>,
}

/// Answer creation request
#[derive(Debug, Deserialize)]
pub struct CreateAnswerRequest {
    /// The question being answered
    pub question_id: String,
    /// Body text
    pub content: String,
    /// Post without public attribution
    #[serde(default)]
    pub anonymous: bool,
    /// Client-held token keying anonymous edit/delete rights
    #[serde(default)]
    pub anon_user_id: Option<String>,
    /// Keys of assets already uploaded for this post
    #[serde(default)]
    pub asset_keys: Vec<String>,
}

/// Creation response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    /// Id of the created item
    pub id: String,
}

/// Content update request
#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    /// Replacement body text
    pub content: String,
    /// Anonymous token, for token-keyed edit rights
    #[serde(default)]
    pub anon_user_id: Option<String>,
}

/// Content deletion request
#[derive(Debug, Default, Deserialize)]
pub struct DeleteContentRequest {
    /// Anonymous token, for token-keyed delete rights
    #[serde(default)]
    pub anon_user_id: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall health status
    pub status: String,
}

fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn lock_store(state: &AppState) -> Result<MutexGuard<'_, SqliteStore>, ApiError> {
    state
        .store
        .lock()
        .map_err(|_| ApiError::Internal("store lock poisoned".to_string()))
}

/// Extract the account principal from a bearer token, if one is present
fn bearer_account(state: &AppState, headers: &HeaderMap) -> Result<Option<AccountId>, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::Core(CoreError::Unauthorized))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Core(CoreError::Unauthorized))?;
    Ok(Some(state.sessions.verify_token(token)?))
}

/// Resolve an actor that must be an authenticated account
fn authenticated_actor(
    state: &AppState,
    headers: &HeaderMap,
    store: &SqliteStore,
) -> Result<Actor, ApiError> {
    let account =
        bearer_account(state, headers)?.ok_or(ApiError::Core(CoreError::Unauthorized))?;
    let actor = state
        .resolver
        .resolve_actor(&Credentials::authenticated(account), store, now())?;
    Ok(actor)
}

/// Resolve an actor from either a session or an anonymous token
fn session_or_token_actor(
    state: &AppState,
    headers: &HeaderMap,
    anon_token: Option<String>,
    store: &SqliteStore,
) -> Result<Actor, ApiError> {
    let credentials = Credentials {
        account: bearer_account(state, headers)?,
        anon_token,
    };
    let actor = state.resolver.resolve_actor(&credentials, store, now())?;
    Ok(actor)
}

fn parse_content_id(s: &str) -> Result<ContentId, ApiError> {
    ContentId::from_string(s).map_err(|e| ApiError::Core(CoreError::Validation(e)))
}

/// POST /vote - toggle a vote on a question or answer
async fn vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<VoteRequest>,
) -> Result<Json<VoteSets>, ApiError> {
    let mut store = lock_store(&state)?;
    let actor = authenticated_actor(&state, &headers, &store)?;
    let item_id = parse_content_id(&request.item_id)?;

    let sets = state.votes.apply_vote(
        &mut *store,
        request.item_type,
        item_id,
        &actor,
        request.direction,
    )?;
    Ok(Json(sets))
}

/// PUT /answers/:id/accept - toggle acceptance of an answer
async fn accept_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<AcceptResponse>, ApiError> {
    let mut store = lock_store(&state)?;
    let actor = authenticated_actor(&state, &headers, &store)?;
    let answer_id = parse_content_id(&id)?;

    let is_accepted =
        state
            .acceptance
            .toggle(&mut *store, &state.fanout, answer_id, &actor, now())?;
    Ok(Json(AcceptResponse { is_accepted }))
}

/// POST /questions - create a question
async fn create_question(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let mut store = lock_store(&state)?;
    let actor = authenticated_actor(&state, &headers, &store)?;

    let question = state.content.create_question(
        &mut *store,
        &mut NoAssets,
        NewQuestion {
            title: request.title,
            body: request.content,
            tags: request.tags,
            anonymous: request.anonymous,
            anon_token: request.anon_user_id,
            asset_keys: request.asset_keys,
        },
        &actor,
        now(),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: question.id.to_string(),
        }),
    ))
}

/// POST /answers - create an answer
async fn create_answer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateAnswerRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let mut store = lock_store(&state)?;
    let actor = authenticated_actor(&state, &headers, &store)?;
    let question_id = parse_content_id(&request.question_id)?;

    let answer = state.content.create_answer(
        &mut *store,
        &mut NoAssets,
        &state.fanout,
        NewAnswer {
            question_id,
            body: request.content,
            anonymous: request.anonymous,
            anon_token: request.anon_user_id,
            asset_keys: request.asset_keys,
        },
        &actor,
        now(),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: answer.id.to_string(),
        }),
    ))
}

async fn update_item(
    state: AppState,
    kind: ItemKind,
    id: String,
    headers: HeaderMap,
    request: UpdateContentRequest,
) -> Result<StatusCode, ApiError> {
    let mut store = lock_store(&state)?;
    let actor = session_or_token_actor(&state, &headers, request.anon_user_id, &store)?;
    let item_id = parse_content_id(&id)?;

    state
        .content
        .update_body(&mut *store, kind, item_id, request.content, &actor)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_item(
    state: AppState,
    kind: ItemKind,
    id: String,
    headers: HeaderMap,
    request: DeleteContentRequest,
) -> Result<StatusCode, ApiError> {
    let mut store = lock_store(&state)?;
    let actor = session_or_token_actor(&state, &headers, request.anon_user_id, &store)?;
    let item_id = parse_content_id(&id)?;

    state.content.delete(&mut *store, kind, item_id, &actor)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /questions/:id - edit a question body
async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateContentRequest>,
) -> Result<StatusCode, ApiError> {
    update_item(state, ItemKind::Question, id, headers, request).await
}

/// DELETE /questions/:id - delete a question and all of its answers
async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<DeleteContentRequest>,
) -> Result<StatusCode, ApiError> {
    delete_item(state, ItemKind::Question, id, headers, request).await
}

/// PUT /answers/:id - edit an answer body
async fn update_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateContentRequest>,
) -> Result<StatusCode, ApiError> {
    update_item(state, ItemKind::Answer, id, headers, request).await
}

/// DELETE /answers/:id - delete an answer
async fn delete_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<DeleteContentRequest>,
) -> Result<StatusCode, ApiError> {
    delete_item(state, ItemKind::Answer, id, headers, request).await
}

/// GET /notifications - list the caller's notifications, newest first
async fn list_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let store = lock_store(&state)?;
    let account =
        bearer_account(&state, &headers)?.ok_or(ApiError::Core(CoreError::Unauthorized))?;

    let notifications = store
        .notifications_for(account)
        .map_err(CoreError::store)?;
    Ok(Json(notifications))
}

/// PUT /notifications/:id/read - mark one of the caller's notifications read
async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let mut store = lock_store(&state)?;
    let account =
        bearer_account(&state, &headers)?.ok_or(ApiError::Core(CoreError::Unauthorized))?;
    let notification_id = NotificationId::from_string(&id)
        .map_err(|e| ApiError::Core(CoreError::Validation(e)))?;

    let marked = store
        .mark_read(notification_id, account)
        .map_err(CoreError::store)?;
    if !marked {
        return Err(ApiError::Core(CoreError::not_found(format!(
            "notification {}",
            notification_id
        ))));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /health - liveness check
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/vote", post(vote))
        .route("/questions", post(create_question))
        .route("/questions/:id", put(update_question))
        .route("/questions/:id", delete(delete_question))
        .route("/answers", post(create_answer))
        .route("/answers/:id", put(update_answer))
        .route("/answers/:id", delete(delete_answer))
        .route("/answers/:id/accept", put(accept_answer))
        .route("/notifications", get(list_notifications))
        .route("/notifications/:id/read", put(mark_notification_read))
        .route("/health", get(health_check))
        .with_state(state)
}
