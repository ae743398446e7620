// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet and contract status.

use axum::{extract::State, Json};
use tracing::warn;

use super::gate::SignedIn;
use crate::{
    models::{StatusResponse, WalletAddress},
    state::AppState,
};

/// Active chain, stake and last cross-chain receipt.
///
/// Contract reads run on the message chain; a failed read leaves its field
/// empty instead of failing the request.
#[utoipa::path(
    get,
    path = "/status",
    tag = "Status",
    responses(
        (status = 200, description = "Wallet status", body = StatusResponse),
        (status = 303, description = "Not logged in, redirect to /login")
    )
)]
pub async fn status(State(state): State<AppState>, _: SignedIn) -> Json<StatusResponse> {
    let address = state.wallet.address();
    let chain = state.plan.message_chain;

    let (stake, last_received) = {
        let _guard = state.lock_chain().await;
        let contracts = if state.wallet.switch_chain(chain).await {
            match state.wallet.contracts_on(chain).await {
                Ok(contracts) => Some(contracts),
                Err(e) => {
                    warn!(chain_id = chain, error = %e, "Contracts unavailable");
                    None
                }
            }
        } else {
            None
        };

        match contracts {
            Some(contracts) => {
                let stake = contracts
                    .staker
                    .stake_of(address)
                    .await
                    .map(|s| s.to_string())
                    .inspect_err(|e| warn!(error = %e, "Error reading stake"))
                    .ok();
                let last_received = contracts
                    .receiver
                    .last_received_message()
                    .await
                    .inspect_err(|e| warn!(error = %e, "Error reading last received message"))
                    .ok();
                (stake, last_received)
            }
            None => (None, None),
        }
    };

    Json(StatusResponse {
        wallet_address: WalletAddress::from(address),
        active_chain: state.wallet.active_chain().await,
        message_chain: state.plan.message_chain,
        payment_chain: state.plan.payment_chain,
        verification_chain: state.plan.verification_chain,
        stake,
        last_received,
    })
}
