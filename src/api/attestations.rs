// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attestation lookups.

use axum::{
    extract::{Query, State},
    Json,
};

use super::gate::SignedIn;
use crate::{
    error::ApiError,
    models::{AttestationQueryParams, AttestationQueryResponse},
    state::AppState,
};

/// Query indexed attestations.
///
/// Both parameters default to the wallet address.
#[utoipa::path(
    get,
    path = "/v1/attestations",
    tag = "Attestations",
    params(AttestationQueryParams),
    responses(
        (status = 200, description = "Lookup result", body = AttestationQueryResponse),
        (status = 502, description = "Attestation service unreachable")
    )
)]
pub async fn query_attestations(
    State(state): State<AppState>,
    _: SignedIn,
    Query(params): Query<AttestationQueryParams>,
) -> Result<Json<AttestationQueryResponse>, ApiError> {
    let wallet = state.wallet.address().to_string();
    let attester = params.attester.unwrap_or_else(|| wallet.clone());
    let indexing_value = params.indexing_value.unwrap_or(wallet);

    let lookup = state
        .attestor
        .query_attestations(&attester, &indexing_value)
        .await?;
    Ok(Json(lookup.into()))
}
