// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::attestation::AttestationError;
use crate::compose::{ComposeError, ComposeFailure};
use crate::contacts::ContactError;
use crate::inbox::InboxError;
use crate::session::SessionError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    /// A chain, pinning or attestation call failed.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::InvalidEmail => Self::unprocessable(e.to_string()),
            SessionError::NoChallenge | SessionError::ChallengeExpired => {
                Self::bad_request(e.to_string())
            }
            SessionError::InvalidSignature(_) | SessionError::WrongSigner(_) => {
                Self::unauthorized(e.to_string())
            }
        }
    }
}

impl From<ComposeFailure> for ApiError {
    fn from(failure: ComposeFailure) -> Self {
        match failure.error {
            ComposeError::NotOpen => Self::conflict(failure.error.to_string()),
            _ if failure.is_validation() => Self::unprocessable(failure.notice()),
            _ => Self::bad_gateway(failure.to_string()),
        }
    }
}

impl From<ContactError> for ApiError {
    fn from(e: ContactError) -> Self {
        match e {
            ContactError::MissingFields
            | ContactError::InvalidAccount(_)
            | ContactError::InvalidChainId(_) => Self::unprocessable(e.to_string()),
            ContactError::UnknownContact(_) => Self::not_found(e.to_string()),
            _ => Self::bad_gateway(e.to_string()),
        }
    }
}

impl From<InboxError> for ApiError {
    fn from(e: InboxError) -> Self {
        match e {
            InboxError::NotFound(_) | InboxError::NoAttachment(_) => Self::not_found(e.to_string()),
            _ => Self::bad_gateway(e.to_string()),
        }
    }
}

impl From<AttestationError> for ApiError {
    fn from(e: AttestationError) -> Self {
        Self::bad_gateway(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::ComposeStep;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let gw = ApiError::bad_gateway("rpc down");
        assert_eq!(gw.status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }

    #[test]
    fn validation_failures_are_unprocessable_with_notice_text() {
        let err = ApiError::from(ComposeFailure {
            step: ComposeStep::Validate,
            error: ComposeError::InvalidRecipient("unknown@example.com".into()),
        });
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message, "Invalid recipient email address");
    }

    #[test]
    fn chain_failures_are_bad_gateway() {
        let err = ApiError::from(ComposeFailure {
            step: ComposeStep::Pay,
            error: ComposeError::ChainSwitchRejected(43113),
        });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(err.message.starts_with("pay step failed"));
    }

    #[test]
    fn wrong_signer_is_unauthorized() {
        let err = ApiError::from(SessionError::WrongSigner(alloy::primitives::Address::ZERO));
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
