use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use tgr_core::{domain::PeerRef, views::SentView};

use crate::{error::ApiError, router::AppState};

const DEFAULT_LIMIT: usize = 100;
const DEFAULT_POSTS_LIMIT: usize = 20;

const SEND_FIELDS_REQUIRED: &str = "userId and message are required";

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

impl LimitQuery {
    fn limit_or(&self, default: usize) -> Result<usize, ApiError> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| ApiError::bad_request("limit must be a number")),
        }
    }
}

/// `POST /send` body. `userId` may be a string (id or username) or a number.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub user_id: Option<Value>,
    pub message: Option<String>,
}

impl SendRequest {
    fn user_id(&self) -> Option<String> {
        match self.user_id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_i64() != Some(0) => Some(n.to_string()),
            _ => None,
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "initialized": state.session.is_initialized().await,
    }))
}

pub async fn status(State(state): State<AppState>) -> Json<Value> {
    let connected = state.session.is_connected().await;
    Json(json!({
        "connected": connected,
        "initialized": state.session.is_initialized().await,
    }))
}

pub async fn dialogs(
    State(state): State<AppState>,
    Query(q): Query<LimitQuery>,
) -> ApiResult<Value> {
    let limit = q.limit_or(DEFAULT_LIMIT)?;
    let dialogs = state.session.dialogs(limit).await?;
    Ok(Json(json!({ "dialogs": dialogs })))
}

pub async fn chat_members(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(q): Query<LimitQuery>,
) -> ApiResult<Value> {
    let limit = q.limit_or(DEFAULT_LIMIT)?;
    let chat = PeerRef::parse(&chat_id)?;
    let members = state.session.chat_members(&chat, limit).await?;
    Ok(Json(json!({ "members": members })))
}

pub async fn chat_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(q): Query<LimitQuery>,
) -> ApiResult<Value> {
    let limit = q.limit_or(DEFAULT_LIMIT)?;
    let chat = PeerRef::parse(&chat_id)?;
    let messages = state.session.messages(&chat, limit).await?;
    Ok(Json(json!({ "messages": messages })))
}

pub async fn channel_posts(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Query(q): Query<LimitQuery>,
) -> ApiResult<Value> {
    let limit = q.limit_or(DEFAULT_POSTS_LIMIT)?;
    let channel = PeerRef::parse(&channel_id)?;
    let posts = state.session.channel_posts(&channel, limit).await?;
    Ok(Json(json!({
        "channelId": channel_id,
        "count": posts.len(),
        "posts": posts,
    })))
}

pub async fn post_comments(
    State(state): State<AppState>,
    Path((channel_id, post_id)): Path<(String, String)>,
    Query(q): Query<LimitQuery>,
) -> ApiResult<Value> {
    let limit = q.limit_or(DEFAULT_LIMIT)?;
    let post_id = post_id
        .trim()
        .parse::<i32>()
        .map_err(|_| ApiError::bad_request("postId must be a number"))?;
    let channel = PeerRef::parse(&channel_id)?;

    let comments = state
        .session
        .post_comments(&channel, post_id, limit)
        .await?;
    Ok(Json(json!({
        "channelId": channel_id,
        "postId": post_id,
        "count": comments.len(),
        "comments": comments,
    })))
}

pub async fn send(
    State(state): State<AppState>,
    body: Result<Json<SendRequest>, JsonRejection>,
) -> ApiResult<SentView> {
    let Json(req) = body.map_err(|_| ApiError::bad_request(SEND_FIELDS_REQUIRED))?;

    let (Some(user_id), Some(message)) = (req.user_id(), req.message.filter(|m| !m.is_empty()))
    else {
        return Err(ApiError::bad_request(SEND_FIELDS_REQUIRED));
    };

    let peer = PeerRef::parse(&user_id)?;
    let sent = state.session.send_message(&peer, &message).await?;
    Ok(Json(sent))
}
