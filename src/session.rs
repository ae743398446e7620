// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet-based login gate.
//!
//! ## Flow
//!
//! 1. `POST /login/challenge` issues a single-use message naming the login
//!    environment, the wallet address and a random nonce.
//! 2. The wallet signs it (EIP-191 personal sign).
//! 3. `POST /login` recovers the signer; it must be the configured wallet.
//!
//! Exactly one identity is logged in at a time. Protected routes redirect to
//! `/login` without one, and `/login` redirects to `/` with one.

use std::str::FromStr;

use alloy::primitives::{Address, Signature};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// How long a login challenge stays valid.
const CHALLENGE_TTL_SECS: i64 = 300;

pub const LOGIN_ROUTE: &str = "/login";
pub const MAIN_ROUTE: &str = "/";

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    #[schema(value_type = String)]
    pub address: Address,
    pub email: String,
}

/// Views guarded by the session gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Any protected view
    Main,
    Login,
}

/// Message the wallet must sign to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoginChallenge {
    pub nonce: Uuid,
    pub message: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No login challenge outstanding")]
    NoChallenge,

    #[error("Login challenge expired")]
    ChallengeExpired,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Signature was made by {0}, not by this wallet")]
    WrongSigner(Address),
}

pub struct SessionGate {
    environment_id: String,
    wallet_address: Address,
    identity: Option<Identity>,
    challenge: Option<LoginChallenge>,
}

impl SessionGate {
    pub fn new(environment_id: impl Into<String>, wallet_address: Address) -> Self {
        Self {
            environment_id: environment_id.into(),
            wallet_address,
            identity: None,
            challenge: None,
        }
    }

    pub fn current_identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Issue a fresh challenge, replacing any outstanding one.
    pub fn issue_challenge(&mut self) -> LoginChallenge {
        let nonce = Uuid::new_v4();
        let issued_at = Utc::now();
        let message = format!(
            "Sign in to Mirage\n\nEnvironment: {}\nWallet: {}\nNonce: {}\nIssued At: {}",
            self.environment_id,
            self.wallet_address,
            nonce,
            issued_at.to_rfc3339()
        );
        let challenge = LoginChallenge {
            nonce,
            message,
            issued_at,
        };
        self.challenge = Some(challenge.clone());
        challenge
    }

    /// Complete login with the signature over the outstanding challenge.
    ///
    /// The challenge is consumed whether or not verification succeeds.
    pub fn login(&mut self, email: &str, signature: &str) -> Result<Identity, SessionError> {
        let challenge = self.challenge.take().ok_or(SessionError::NoChallenge)?;
        if Utc::now() - challenge.issued_at > Duration::seconds(CHALLENGE_TTL_SECS) {
            return Err(SessionError::ChallengeExpired);
        }

        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(SessionError::InvalidEmail);
        }

        let signature = Signature::from_str(signature.trim())
            .map_err(|e| SessionError::InvalidSignature(e.to_string()))?;
        let signer = signature
            .recover_address_from_msg(challenge.message.as_bytes())
            .map_err(|e| SessionError::InvalidSignature(e.to_string()))?;
        if signer != self.wallet_address {
            return Err(SessionError::WrongSigner(signer));
        }

        let identity = Identity {
            address: signer,
            email: email.to_string(),
        };
        self.identity = Some(identity.clone());
        Ok(identity)
    }

    /// Clear the identity. Returns the identity that was logged in.
    pub fn logout(&mut self) -> Option<Identity> {
        self.challenge = None;
        self.identity.take()
    }

    /// Where a visitor of `route` must be sent, if anywhere.
    pub fn redirect_for(&self, route: Route) -> Option<&'static str> {
        match (route, self.identity.is_some()) {
            (Route::Main, false) => Some(LOGIN_ROUTE),
            (Route::Login, true) => Some(MAIN_ROUTE),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::signers::{local::PrivateKeySigner, SignerSync};

    use super::*;

    fn sign(signer: &PrivateKeySigner, message: &str) -> String {
        let signature = signer.sign_message_sync(message.as_bytes()).unwrap();
        alloy::hex::encode_prefixed(signature.as_bytes())
    }

    #[test]
    fn login_with_wallet_signature_creates_identity() {
        let signer = PrivateKeySigner::random();
        let mut gate = SessionGate::new("env-123", signer.address());

        let challenge = gate.issue_challenge();
        assert!(challenge.message.contains("env-123"));

        let identity = gate
            .login("me@mirage.xyz", &sign(&signer, &challenge.message))
            .expect("login succeeds");
        assert_eq!(identity.address, signer.address());
        assert_eq!(gate.current_identity(), Some(&identity));
    }

    #[test]
    fn signature_from_other_wallet_is_rejected() {
        let signer = PrivateKeySigner::random();
        let intruder = PrivateKeySigner::random();
        let mut gate = SessionGate::new("env", signer.address());

        let challenge = gate.issue_challenge();
        let err = gate
            .login("me@mirage.xyz", &sign(&intruder, &challenge.message))
            .unwrap_err();
        assert_eq!(err, SessionError::WrongSigner(intruder.address()));
        assert!(gate.current_identity().is_none());
    }

    #[test]
    fn challenge_is_single_use() {
        let signer = PrivateKeySigner::random();
        let mut gate = SessionGate::new("env", signer.address());
        let challenge = gate.issue_challenge();
        let signature = sign(&signer, &challenge.message);

        gate.login("me@mirage.xyz", &signature).unwrap();
        gate.logout();
        assert_eq!(
            gate.login("me@mirage.xyz", &signature),
            Err(SessionError::NoChallenge)
        );
    }

    #[test]
    fn invalid_email_is_rejected() {
        let signer = PrivateKeySigner::random();
        let mut gate = SessionGate::new("env", signer.address());
        let challenge = gate.issue_challenge();
        assert_eq!(
            gate.login("not-an-email", &sign(&signer, &challenge.message)),
            Err(SessionError::InvalidEmail)
        );
    }

    #[test]
    fn redirects_follow_identity() {
        let signer = PrivateKeySigner::random();
        let mut gate = SessionGate::new("env", signer.address());
        assert_eq!(gate.redirect_for(Route::Main), Some(LOGIN_ROUTE));
        assert_eq!(gate.redirect_for(Route::Login), None);

        let challenge = gate.issue_challenge();
        gate.login("me@mirage.xyz", &sign(&signer, &challenge.message))
            .unwrap();
        assert_eq!(gate.redirect_for(Route::Main), None);
        assert_eq!(gate.redirect_for(Route::Login), Some(MAIN_ROUTE));

        assert!(gate.logout().is_some());
        assert_eq!(gate.redirect_for(Route::Main), Some(LOGIN_ROUTE));
    }
}
