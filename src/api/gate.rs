// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session gate extractors.
//!
//! Protected handlers take [`SignedIn`]; without an identity the request is
//! answered with `303 See Other` to the login route.

use axum::{extract::FromRequestParts, http::request::Parts, response::Redirect};

use crate::session::{Identity, Route};
use crate::state::AppState;

/// The logged-in identity.
#[derive(Debug, Clone)]
pub struct SignedIn(pub Identity);

impl FromRequestParts<AppState> for SignedIn {
    type Rejection = Redirect;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = state.session.read().await;
        match session.current_identity() {
            Some(identity) => Ok(SignedIn(identity.clone())),
            None => Err(Redirect::to(
                session.redirect_for(Route::Main).unwrap_or(crate::session::LOGIN_ROUTE),
            )),
        }
    }
}

/// Rejects visitors who are already logged in.
#[derive(Debug, Clone, Copy)]
pub struct SignedOut;

impl FromRequestParts<AppState> for SignedOut {
    type Rejection = Redirect;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match state.session.read().await.redirect_for(Route::Login) {
            Some(target) => Err(Redirect::to(target)),
            None => Ok(SignedOut),
        }
    }
}
