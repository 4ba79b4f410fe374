use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;

use dispatch_types::api::{FeedResponse, MessageResponse};

use crate::{AppState, blocking};

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct SinceQuery {
    /// Exclusive watermark in unix seconds; 0 means all history.
    #[serde(default)]
    pub since: u64,
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<Json<MessageResponse>, StatusCode> {
    let lookup = id.clone();
    let envelope = blocking(&state, move |delegate| {
        delegate.retrieve_message_for_user(&lookup, &query.address)
    })
    .await?
    .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(MessageResponse {
        id,
        envelope: B64.encode(envelope),
    }))
}

pub async fn get_inbox(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<SinceQuery>,
) -> Result<Json<FeedResponse>, StatusCode> {
    let items = blocking(&state, move |delegate| {
        delegate.retrieve_inbox(&address, query.since)
    })
    .await?;

    Ok(Json(feed(items)))
}

pub async fn get_public(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<SinceQuery>,
) -> Result<Json<FeedResponse>, StatusCode> {
    let items = blocking(&state, move |delegate| {
        delegate.retrieve_public(&address, query.since)
    })
    .await?;

    Ok(Json(feed(items)))
}

fn feed(items: Vec<Vec<u8>>) -> FeedResponse {
    FeedResponse {
        items: items.iter().map(|item| B64.encode(item)).collect(),
    }
}
