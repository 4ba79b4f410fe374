use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

use dispatch_types::api::{
    SaveAlertRequest, SavePrivateMailRequest, SavePrivateMailResponse, SavePublicMailRequest,
};

use crate::{AppState, blocking};

fn decode(field: &str) -> Result<Vec<u8>, StatusCode> {
    B64.decode(field).map_err(|_| StatusCode::BAD_REQUEST)
}

/// Alerts are fire-and-forget: accepted whether or not they were stored.
pub async fn save_alert(
    State(state): State<AppState>,
    Json(req): Json<SaveAlertRequest>,
) -> Result<StatusCode, StatusCode> {
    let alert = decode(&req.alert)?;

    blocking(&state, move |delegate| {
        delegate.save_incoming_alert(&alert, &req.to_address, &req.from_address)
    })
    .await?;

    Ok(StatusCode::ACCEPTED)
}

pub async fn save_public_mail(
    State(state): State<AppState>,
    Json(req): Json<SavePublicMailRequest>,
) -> Result<StatusCode, StatusCode> {
    let mail = decode(&req.mail)?;

    blocking(&state, move |delegate| {
        delegate.save_public_mail(&mail, &req.from_address)
    })
    .await?;

    Ok(StatusCode::ACCEPTED)
}

pub async fn save_private_mail(
    State(state): State<AppState>,
    Json(req): Json<SavePrivateMailRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let mail = decode(&req.mail)?;

    let id = blocking(&state, move |delegate| {
        delegate.save_private_mail(&mail, &req.from_address, &req.to_addresses)
    })
    .await?
    .ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;

    Ok((StatusCode::CREATED, Json(SavePrivateMailResponse { id })))
}
