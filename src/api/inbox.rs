// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Inbox endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::gate::SignedIn;
use crate::{
    blockchain::Message,
    error::ApiError,
    models::{AttachmentResponse, InboxResponse, RefreshResponse},
    state::AppState,
};

/// Messages under the active tab.
#[utoipa::path(
    get,
    path = "/v1/inbox",
    tag = "Inbox",
    responses((status = 200, description = "Inbox", body = InboxResponse))
)]
pub async fn list_inbox(State(state): State<AppState>, _: SignedIn) -> Json<InboxResponse> {
    let inbox = state.inbox.lock().await;
    Json(InboxResponse {
        tab: inbox.tab(),
        messages: inbox.listed().to_vec(),
        selected: inbox.selected().cloned(),
    })
}

/// Re-read the inbox from the message contract.
#[utoipa::path(
    post,
    path = "/v1/inbox/refresh",
    tag = "Inbox",
    responses(
        (status = 200, description = "Inbox refreshed", body = RefreshResponse),
        (status = 502, description = "Inbox could not be read")
    )
)]
pub async fn refresh_inbox(
    State(state): State<AppState>,
    _: SignedIn,
) -> Result<Json<RefreshResponse>, ApiError> {
    let _guard = state.lock_chain().await;
    let count = state.inbox.lock().await.fetch_inbox().await?;
    Ok(Json(RefreshResponse { count }))
}

/// Open a message in the detail view.
#[utoipa::path(
    get,
    path = "/v1/inbox/{index}",
    tag = "Inbox",
    params(("index" = usize, Path, description = "Position in the inbox")),
    responses(
        (status = 200, description = "Message", body = Message),
        (status = 404, description = "No such message")
    )
)]
pub async fn get_message(
    State(state): State<AppState>,
    _: SignedIn,
    Path(index): Path<usize>,
) -> Result<Json<Message>, ApiError> {
    let mut inbox = state.inbox.lock().await;
    Ok(Json(inbox.select(index)?.clone()))
}

/// Close the detail view.
#[utoipa::path(
    delete,
    path = "/v1/inbox/selected",
    tag = "Inbox",
    responses((status = 204, description = "Detail view closed"))
)]
pub async fn close_message(State(state): State<AppState>, _: SignedIn) -> StatusCode {
    state.inbox.lock().await.close_detail();
    StatusCode::NO_CONTENT
}

/// Retrieve the pinned attachment of a message.
#[utoipa::path(
    get,
    path = "/v1/inbox/{index}/attachment",
    tag = "Inbox",
    params(("index" = usize, Path, description = "Position in the inbox")),
    responses(
        (status = 200, description = "Attachment", body = AttachmentResponse),
        (status = 404, description = "No such message or no attachment"),
        (status = 502, description = "Attachment could not be retrieved")
    )
)]
pub async fn get_attachment(
    State(state): State<AppState>,
    _: SignedIn,
    Path(index): Path<usize>,
) -> Result<Json<AttachmentResponse>, ApiError> {
    let bytes = state.inbox.lock().await.attachment(index).await?;
    Ok(Json(AttachmentResponse::from(bytes)))
}
