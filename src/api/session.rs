// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login, logout and the main shell.

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use super::gate::{SignedIn, SignedOut};
use crate::{
    error::ApiError,
    models::{LoginRequest, LoginView, MainView, TabRequest, WalletAddress},
    session::{Identity, LoginChallenge},
    state::AppState,
};

/// Main shell summary.
#[utoipa::path(
    get,
    path = "/",
    tag = "Session",
    responses(
        (status = 200, description = "Main shell", body = MainView),
        (status = 303, description = "Not logged in, redirect to /login")
    )
)]
pub async fn main_view(State(state): State<AppState>, SignedIn(identity): SignedIn) -> Json<MainView> {
    let tab = state.inbox.lock().await.tab();
    let compose_open = state.compose.lock().await.is_open();
    Json(MainView {
        identity,
        active_chain: state.wallet.active_chain().await,
        tab,
        compose_open,
    })
}

/// Login view.
#[utoipa::path(
    get,
    path = "/login",
    tag = "Session",
    responses(
        (status = 200, description = "Login view", body = LoginView),
        (status = 303, description = "Already logged in, redirect to /")
    )
)]
pub async fn login_view(State(state): State<AppState>, _: SignedOut) -> Json<LoginView> {
    Json(LoginView {
        wallet_address: WalletAddress::from(state.wallet.address()),
        challenge: None,
    })
}

/// Issue a login challenge for the wallet to sign.
#[utoipa::path(
    post,
    path = "/login/challenge",
    tag = "Session",
    responses(
        (status = 200, description = "Challenge issued", body = LoginChallenge),
        (status = 303, description = "Already logged in, redirect to /")
    )
)]
pub async fn issue_challenge(State(state): State<AppState>, _: SignedOut) -> Json<LoginChallenge> {
    Json(state.session.write().await.issue_challenge())
}

/// Complete login with the signed challenge.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Session",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = Identity),
        (status = 400, description = "No valid challenge"),
        (status = 401, description = "Signature not made by this wallet"),
        (status = 422, description = "Invalid email")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Identity>, ApiError> {
    let identity = state
        .session
        .write()
        .await
        .login(&request.email, &request.signature)?;
    info!(address = %identity.address, "User logged in");
    Ok(Json(identity))
}

/// Clear the session.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Session",
    responses((status = 204, description = "Logged out"))
)]
pub async fn logout(State(state): State<AppState>) -> StatusCode {
    if let Some(identity) = state.session.write().await.logout() {
        info!(address = %identity.address, "User logged out");
    }
    StatusCode::NO_CONTENT
}

/// Switch the active sidebar tab.
#[utoipa::path(
    post,
    path = "/v1/tabs",
    tag = "Session",
    request_body = TabRequest,
    responses((status = 200, description = "Tab switched", body = TabRequest))
)]
pub async fn set_tab(
    State(state): State<AppState>,
    _: SignedIn,
    Json(request): Json<TabRequest>,
) -> Json<TabRequest> {
    state.inbox.lock().await.set_tab(request.tab);
    Json(request)
}
