// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use super::gate::SignedIn;
use crate::{notify::Notice, state::AppState};

/// Pending notices, oldest first. Returned notices are removed.
#[utoipa::path(
    get,
    path = "/v1/notices",
    tag = "Notices",
    responses((status = 200, description = "Pending notices", body = [Notice]))
)]
pub async fn drain_notices(State(state): State<AppState>, _: SignedIn) -> Json<Vec<Notice>> {
    Json(state.notices.drain())
}
