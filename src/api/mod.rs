// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    attestation::AttestationRecord,
    blockchain::{AttestationStatus, Contact, Message, ReceivedPayment, VerificationRequest},
    compose::{ComposeStep, SentMessage},
    contacts::{AttestationOutcome, ContactDraft},
    inbox::Tab,
    models::{
        AttachmentResponse, AttachmentUpload, AttestRequest, AttestResponse,
        AttestationQueryResponse, ComposeDraftRequest, ComposeView, ContactFilterRequest,
        ContactsView, InboxResponse, LoginRequest, LoginView, MainView, RefreshResponse,
        StatusResponse, TabRequest, ToggleVerificationResponse, WalletAddress,
    },
    notify::{Notice, NoticeLevel},
    session::{Identity, LoginChallenge},
    state::AppState,
};

pub mod attestations;
pub mod compose;
pub mod contacts;
pub mod gate;
pub mod inbox;
pub mod notices;
pub mod session;
pub mod status;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/tabs", post(session::set_tab))
        .route(
            "/compose",
            get(compose::get_compose)
                .put(compose::put_compose)
                .delete(compose::delete_compose),
        )
        .route("/compose/send", post(compose::send_compose))
        .route("/inbox", get(inbox::list_inbox))
        .route("/inbox/refresh", post(inbox::refresh_inbox))
        .route("/inbox/selected", delete(inbox::close_message))
        .route("/inbox/{index}", get(inbox::get_message))
        .route("/inbox/{index}/attachment", get(inbox::get_attachment))
        .route(
            "/contacts",
            get(contacts::list_contacts).post(contacts::add_contact),
        )
        .route("/contacts/refresh", post(contacts::refresh_contacts))
        .route("/contacts/filter", put(contacts::set_filter))
        .route("/contacts/requests", get(contacts::list_requests))
        .route("/contacts/attest", post(contacts::attest))
        .route(
            "/contacts/{email}/toggle",
            post(contacts::toggle_verification),
        )
        .route("/attestations", get(attestations::query_attestations))
        .route("/notices", get(notices::drain_notices));

    Router::new()
        .route("/", get(session::main_view))
        .route("/login", get(session::login_view).post(session::login))
        .route("/login/challenge", post(session::issue_challenge))
        .route("/logout", post(session::logout))
        .route("/status", get(status::status))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        session::main_view,
        session::login_view,
        session::issue_challenge,
        session::login,
        session::logout,
        session::set_tab,
        status::status,
        compose::get_compose,
        compose::put_compose,
        compose::delete_compose,
        compose::send_compose,
        inbox::list_inbox,
        inbox::refresh_inbox,
        inbox::get_message,
        inbox::close_message,
        inbox::get_attachment,
        contacts::list_contacts,
        contacts::add_contact,
        contacts::refresh_contacts,
        contacts::toggle_verification,
        contacts::set_filter,
        contacts::list_requests,
        contacts::attest,
        attestations::query_attestations,
        notices::drain_notices
    ),
    components(
        schemas(
            WalletAddress,
            Identity,
            LoginChallenge,
            LoginRequest,
            LoginView,
            MainView,
            Tab,
            TabRequest,
            StatusResponse,
            ReceivedPayment,
            ComposeDraftRequest,
            AttachmentUpload,
            ComposeView,
            ComposeStep,
            SentMessage,
            Message,
            InboxResponse,
            RefreshResponse,
            AttachmentResponse,
            Contact,
            ContactDraft,
            ContactsView,
            ContactFilterRequest,
            ToggleVerificationResponse,
            VerificationRequest,
            AttestationStatus,
            AttestRequest,
            AttestResponse,
            AttestationOutcome,
            AttestationRecord,
            AttestationQueryResponse,
            Notice,
            NoticeLevel
        )
    ),
    tags(
        (name = "Session", description = "Wallet login and main shell"),
        (name = "Status", description = "Wallet and contract status"),
        (name = "Compose", description = "Compose and send messages"),
        (name = "Inbox", description = "Received messages"),
        (name = "Contacts", description = "Contact list and verification"),
        (name = "Attestations", description = "Attestation lookups"),
        (name = "Notices", description = "Transient user notices")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy::signers::{local::PrivateKeySigner, SignerSync};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::blockchain::ChainPlan;
    use crate::testing::{MockAttestor, MockPinner, MockWallet};

    struct Harness {
        app: Router,
        signer: PrivateKeySigner,
        wallet: Arc<MockWallet>,
        state: AppState,
    }

    fn harness() -> Harness {
        let signer = PrivateKeySigner::random();
        let wallet = Arc::new(MockWallet::with_address(signer.address()));
        let state = AppState::new(
            "env-test",
            wallet.clone(),
            Arc::new(MockPinner::new()),
            Arc::new(MockAttestor::new()),
            ChainPlan::default(),
        );
        Harness {
            app: router(state.clone()),
            signer,
            wallet,
            state,
        }
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn log_in(h: &Harness) {
        let response = call(&h.app, Method::POST, "/login/challenge", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let challenge = json_body(response).await;
        let message = challenge["message"].as_str().unwrap();
        let signature = h.signer.sign_message_sync(message.as_bytes()).unwrap();

        let response = call(
            &h.app,
            Method::POST,
            "/login",
            Some(json!({
                "email": "me@mirage.xyz",
                "signature": alloy::hex::encode_prefixed(signature.as_bytes()),
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let h = harness();
        let _ = h.app.into_make_service();
    }

    #[tokio::test]
    async fn protected_routes_redirect_to_login() {
        let h = harness();
        for uri in ["/", "/status", "/v1/inbox", "/v1/contacts", "/v1/notices"] {
            let response = call(&h.app, Method::GET, uri, None).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), "/login");
        }
        assert!(h.wallet.calls().is_empty());
    }

    #[tokio::test]
    async fn login_view_redirects_once_logged_in() {
        let h = harness();
        let response = call(&h.app, Method::GET, "/login", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        log_in(&h).await;
        let response = call(&h.app, Method::GET, "/login", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let response = call(&h.app, Method::GET, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let main = json_body(response).await;
        assert_eq!(main["identity"]["email"], "me@mirage.xyz");
        assert_eq!(main["tab"], "inbox");
    }

    #[tokio::test]
    async fn logout_closes_the_gate() {
        let h = harness();
        log_in(&h).await;
        let response = call(&h.app, Method::POST, "/logout", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = call(&h.app, Method::GET, "/v1/inbox", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn login_with_foreign_signature_is_unauthorized() {
        let h = harness();
        let response = call(&h.app, Method::POST, "/login/challenge", None).await;
        let challenge = json_body(response).await;
        let intruder = PrivateKeySigner::random();
        let signature = intruder
            .sign_message_sync(challenge["message"].as_str().unwrap().as_bytes())
            .unwrap();

        let response = call(
            &h.app,
            Method::POST,
            "/login",
            Some(json!({
                "email": "me@mirage.xyz",
                "signature": alloy::hex::encode_prefixed(signature.as_bytes()),
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(h.state.session.read().await.current_identity().is_none());
    }

    #[tokio::test]
    async fn compose_and_send_through_api() {
        let h = harness();
        log_in(&h).await;

        let response = call(
            &h.app,
            Method::PUT,
            "/v1/compose",
            Some(json!({
                "to": "0x1704000000000000000000000000000000028be0",
                "subject": "Test",
                "body": "Hello world"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["open"], true);

        let response = call(&h.app, Method::POST, "/v1/compose/send", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(h.wallet.sent().len(), 1);

        let notices = json_body(call(&h.app, Method::GET, "/v1/notices", None).await).await;
        assert_eq!(notices[0]["level"], "success");
        assert_eq!(notices[0]["message"], "Message sent successfully");

        let compose = json_body(call(&h.app, Method::GET, "/v1/compose", None).await).await;
        assert_eq!(compose["open"], false);
        assert_eq!(compose["to"], "");
    }

    #[tokio::test]
    async fn unknown_recipient_is_unprocessable_and_keeps_draft() {
        let h = harness();
        log_in(&h).await;
        call(
            &h.app,
            Method::PUT,
            "/v1/compose",
            Some(json!({
                "to": "unknown@example.com",
                "subject": "Test",
                "body": "Hello world"
            })),
        )
        .await;

        let response = call(&h.app, Method::POST, "/v1/compose/send", None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json_body(response).await["error"],
            "Invalid recipient email address"
        );
        assert!(h.wallet.calls().is_empty());

        let compose = json_body(call(&h.app, Method::GET, "/v1/compose", None).await).await;
        assert_eq!(compose["to"], "unknown@example.com");
    }

    #[tokio::test]
    async fn contact_added_then_toggled() {
        let h = harness();
        log_in(&h).await;

        let response = call(
            &h.app,
            Method::POST,
            "/v1/contacts",
            Some(json!({
                "account": "0x00000000000000000000000000000000000000ab",
                "email": "a@b.com",
                "chain_id": "1"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = call(&h.app, Method::POST, "/v1/contacts/a@b.com/toggle", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["verified"], true);

        let response = call(
            &h.app,
            Method::PUT,
            "/v1/contacts/filter",
            Some(json!({ "show_verified": false })),
        )
        .await;
        let view = json_body(response).await;
        assert_eq!(view["contacts"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn missing_message_is_not_found() {
        let h = harness();
        log_in(&h).await;
        let response = call(&h.app, Method::GET, "/v1/inbox/3", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn attestation_query_reports_uniform_failure() {
        let h = harness();
        log_in(&h).await;
        let response = call(&h.app, Method::GET, "/v1/attestations", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "No attestation for this address found.");
    }

    #[tokio::test]
    async fn status_reads_stake_on_message_chain() {
        let h = harness();
        h.wallet.set_stake(alloy::primitives::U256::from(42u64));
        log_in(&h).await;

        let body = json_body(call(&h.app, Method::GET, "/status", None).await).await;
        assert_eq!(body["stake"], "42");
        assert_eq!(body["active_chain"], crate::blockchain::SEPOLIA_CHAIN_ID);
    }
}
