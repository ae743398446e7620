// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! IPFS pinning through Pinata.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::Deserialize;
use tracing::{debug, warn};

const DEFAULT_API_BASE_URL: &str = "https://api.pinata.cloud";
const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Result of a successful pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedFile {
    /// Content hash (CID)
    pub hash: String,
    /// Gateway URL the content can be retrieved from
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PinError {
    #[error("No file selected")]
    NoFile,

    #[error("Pinning configuration missing: {0}")]
    MissingConfig(String),

    #[error("Pinning request failed: {0}")]
    Request(String),

    #[error("Pinning response was invalid: {0}")]
    InvalidResponse(String),
}

/// Content-addressed storage used for attachments.
#[async_trait]
pub trait FilePinner: Send + Sync {
    /// Upload and pin `file`. A missing file is an error.
    async fn pin(&self, file: Option<&Attachment>) -> Result<PinnedFile, PinError>;

    /// Retrieve pinned content. Any failure yields `None`.
    async fn fetch(&self, hash: &str) -> Option<Vec<u8>>;
}

#[derive(Debug, Deserialize)]
struct PinFileResponse {
    #[serde(rename = "IpfsHash", default)]
    ipfs_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PinataClient {
    api_base_url: String,
    api_key: String,
    api_secret: String,
    gateway: String,
    http: Client,
}

impl PinataClient {
    pub fn new(
        api_base_url: Option<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        gateway: impl Into<String>,
    ) -> Result<Self, PinError> {
        let api_key = api_key.into();
        let api_secret = api_secret.into();
        let gateway = gateway.into();
        if api_key.trim().is_empty() || api_secret.trim().is_empty() {
            return Err(PinError::MissingConfig("API key and secret".to_string()));
        }
        if gateway.trim().is_empty() {
            return Err(PinError::MissingConfig("gateway".to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| PinError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url: api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            api_secret,
            gateway,
            http,
        })
    }

    /// Gateway URL for a content hash.
    pub fn gateway_url(&self, hash: &str) -> String {
        gateway_url(&self.gateway, hash)
    }
}

#[async_trait]
impl FilePinner for PinataClient {
    async fn pin(&self, file: Option<&Attachment>) -> Result<PinnedFile, PinError> {
        let file = file.ok_or(PinError::NoFile)?;

        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| PinError::Request(format!("invalid content type: {e}")))?;
        }
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}{}", self.api_base_url, PIN_FILE_PATH))
            .header("pinata_api_key", &self.api_key)
            .header("pinata_secret_api_key", &self.api_secret)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PinError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Pinning request rejected");
            return Err(PinError::Request(format!("HTTP {status} from pinning API")));
        }

        let parsed: PinFileResponse = response
            .json()
            .await
            .map_err(|e| PinError::InvalidResponse(e.to_string()))?;
        let pinned = pinned_file(&self.gateway, parsed)?;
        debug!(hash = %pinned.hash, file = %file.file_name, "Pinned attachment");
        Ok(pinned)
    }

    async fn fetch(&self, hash: &str) -> Option<Vec<u8>> {
        let url = self.gateway_url(hash);
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(hash, error = %e, "Error getting file from IPFS");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(hash, status = %response.status(), "Error getting file from IPFS");
            return None;
        }
        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                warn!(hash, error = %e, "Error reading file from IPFS");
                None
            }
        }
    }
}

fn gateway_url(gateway: &str, hash: &str) -> String {
    format!("{gateway}{hash}")
}

/// Validate the pin response; a missing or empty hash is a failed pin.
fn pinned_file(gateway: &str, response: PinFileResponse) -> Result<PinnedFile, PinError> {
    let hash = response
        .ipfs_hash
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| PinError::InvalidResponse("missing IpfsHash in response".to_string()))?;
    Ok(PinnedFile {
        url: gateway_url(gateway, &hash),
        hash,
    })
}
