// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Compose form endpoints.

use axum::{extract::State, http::StatusCode, Json};

use super::gate::SignedIn;
use crate::{
    compose::{ComposeDraft, SentMessage},
    error::ApiError,
    models::{ComposeDraftRequest, ComposeView},
    state::AppState,
};

/// Current compose form.
#[utoipa::path(
    get,
    path = "/v1/compose",
    tag = "Compose",
    responses((status = 200, description = "Compose form", body = ComposeView))
)]
pub async fn get_compose(State(state): State<AppState>, _: SignedIn) -> Json<ComposeView> {
    let form = state.compose.lock().await;
    Json(ComposeView::new(form.is_open(), form.draft()))
}

/// Open the form and replace the draft.
#[utoipa::path(
    put,
    path = "/v1/compose",
    tag = "Compose",
    request_body = ComposeDraftRequest,
    responses(
        (status = 200, description = "Draft saved", body = ComposeView),
        (status = 400, description = "Attachment is not valid base64")
    )
)]
pub async fn put_compose(
    State(state): State<AppState>,
    _: SignedIn,
    Json(request): Json<ComposeDraftRequest>,
) -> Result<Json<ComposeView>, ApiError> {
    let draft = ComposeDraft::try_from(request).map_err(ApiError::bad_request)?;
    let mut form = state.compose.lock().await;
    form.edit(draft);
    Ok(Json(ComposeView::new(form.is_open(), form.draft())))
}

/// Close the form and discard the draft.
#[utoipa::path(
    delete,
    path = "/v1/compose",
    tag = "Compose",
    responses((status = 204, description = "Draft discarded"))
)]
pub async fn delete_compose(State(state): State<AppState>, _: SignedIn) -> StatusCode {
    state.compose.lock().await.cancel();
    StatusCode::NO_CONTENT
}

/// Run the send workflow on the current draft.
#[utoipa::path(
    post,
    path = "/v1/compose/send",
    tag = "Compose",
    responses(
        (status = 200, description = "Message sent", body = SentMessage),
        (status = 409, description = "Compose form is not open"),
        (status = 422, description = "Draft failed validation"),
        (status = 502, description = "A chain or pinning step failed")
    )
)]
pub async fn send_compose(
    State(state): State<AppState>,
    _: SignedIn,
) -> Result<Json<SentMessage>, ApiError> {
    let _guard = state.lock_chain().await;
    let directory = state.contacts.lock().await.directory();
    let sent = state.compose.lock().await.send(&directory).await?;
    Ok(Json(sent))
}
