// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact list and verification endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::gate::SignedIn;
use crate::{
    blockchain::{Contact, VerificationRequest},
    contacts::{ContactDraft, ContactManager},
    error::ApiError,
    models::{
        AttestRequest, AttestResponse, ContactFilterRequest, ContactsView, RefreshResponse,
        ToggleVerificationResponse,
    },
    state::AppState,
};

fn view(manager: &ContactManager) -> ContactsView {
    ContactsView {
        contacts: manager.visible().into_iter().cloned().collect(),
        show_verified: manager.show_verified,
        show_unverified: manager.show_unverified,
        draft: manager.draft.clone(),
    }
}

/// Visible contacts and the add-contact form.
#[utoipa::path(
    get,
    path = "/v1/contacts",
    tag = "Contacts",
    responses((status = 200, description = "Contacts", body = ContactsView))
)]
pub async fn list_contacts(State(state): State<AppState>, _: SignedIn) -> Json<ContactsView> {
    Json(view(&*state.contacts.lock().await))
}

/// Add a contact on the verification chain.
///
/// The submitted form becomes the draft; it is cleared only on success.
#[utoipa::path(
    post,
    path = "/v1/contacts",
    tag = "Contacts",
    request_body = ContactDraft,
    responses(
        (status = 201, description = "Contact added", body = Contact),
        (status = 422, description = "Missing or invalid field"),
        (status = 502, description = "Chain switch or transaction failed")
    )
)]
pub async fn add_contact(
    State(state): State<AppState>,
    _: SignedIn,
    Json(draft): Json<ContactDraft>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let _guard = state.lock_chain().await;
    let mut manager = state.contacts.lock().await;
    manager.draft = draft;
    let contact = manager.add_contact().await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// Re-read contacts and verification requests from the contract.
#[utoipa::path(
    post,
    path = "/v1/contacts/refresh",
    tag = "Contacts",
    responses(
        (status = 200, description = "Contacts refreshed", body = RefreshResponse),
        (status = 502, description = "Contacts could not be read")
    )
)]
pub async fn refresh_contacts(
    State(state): State<AppState>,
    _: SignedIn,
) -> Result<Json<RefreshResponse>, ApiError> {
    let _guard = state.lock_chain().await;
    let mut manager = state.contacts.lock().await;
    let count = manager.fetch_contacts().await?;
    manager.fetch_attestation_requests().await?;
    Ok(Json(RefreshResponse { count }))
}

/// Flip a contact's verified flag.
#[utoipa::path(
    post,
    path = "/v1/contacts/{email}/toggle",
    tag = "Contacts",
    params(("email" = String, Path, description = "Contact email")),
    responses(
        (status = 200, description = "Flag written and confirmed", body = ToggleVerificationResponse),
        (status = 404, description = "Unknown contact"),
        (status = 502, description = "Chain switch or transaction failed")
    )
)]
pub async fn toggle_verification(
    State(state): State<AppState>,
    _: SignedIn,
    Path(email): Path<String>,
) -> Result<Json<ToggleVerificationResponse>, ApiError> {
    let _guard = state.lock_chain().await;
    let verified = state.contacts.lock().await.toggle_verification(&email).await?;
    Ok(Json(ToggleVerificationResponse { email, verified }))
}

/// Update the visibility toggles.
#[utoipa::path(
    put,
    path = "/v1/contacts/filter",
    tag = "Contacts",
    request_body = ContactFilterRequest,
    responses((status = 200, description = "Filtered contacts", body = ContactsView))
)]
pub async fn set_filter(
    State(state): State<AppState>,
    _: SignedIn,
    Json(request): Json<ContactFilterRequest>,
) -> Json<ContactsView> {
    let mut manager = state.contacts.lock().await;
    if let Some(show) = request.show_verified {
        manager.show_verified = show;
    }
    if let Some(show) = request.show_unverified {
        manager.show_unverified = show;
    }
    Json(view(&manager))
}

/// Verification requests addressed to the user.
#[utoipa::path(
    get,
    path = "/v1/contacts/requests",
    tag = "Contacts",
    responses((status = 200, description = "Verification requests", body = [VerificationRequest]))
)]
pub async fn list_requests(
    State(state): State<AppState>,
    _: SignedIn,
) -> Json<Vec<VerificationRequest>> {
    Json(state.contacts.lock().await.requests().to_vec())
}

/// Approve a verification request through an attestation.
#[utoipa::path(
    post,
    path = "/v1/contacts/attest",
    tag = "Contacts",
    request_body = AttestRequest,
    responses(
        (status = 200, description = "Contact verified or already verified", body = AttestResponse),
        (status = 404, description = "Unknown contact"),
        (status = 502, description = "Attestation or transaction failed")
    )
)]
pub async fn attest(
    State(state): State<AppState>,
    SignedIn(identity): SignedIn,
    Json(request): Json<AttestRequest>,
) -> Result<Json<AttestResponse>, ApiError> {
    let _guard = state.lock_chain().await;
    let outcome = state
        .contacts
        .lock()
        .await
        .handle_attestation(
            &identity.email,
            &request.requester_email,
            &request.subject_email,
        )
        .await?;
    Ok(Json(AttestResponse { outcome }))
}
