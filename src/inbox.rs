// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Inbox view: received messages, detail selection and sidebar tabs.
//!
//! The list is fetched on demand and replaced wholesale.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::blockchain::{ContractError, Message, Wallet, WalletError};
use crate::pinning::FilePinner;

/// Sidebar tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Inbox,
    Starred,
    Sent,
    Drafts,
    Spam,
    Trash,
    Contacts,
}

#[derive(Debug, thiserror::Error)]
pub enum InboxError {
    #[error("Wallet refused to switch to chain {0}")]
    ChainSwitchRejected(u64),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("No message at index {0}")]
    NotFound(usize),

    #[error("Message {0} has no attachment")]
    NoAttachment(usize),

    #[error("Attachment could not be retrieved")]
    AttachmentUnavailable,
}

pub struct InboxView {
    wallet: Arc<dyn Wallet>,
    pinner: Arc<dyn FilePinner>,
    message_chain: u64,
    messages: Vec<Message>,
    selected: Option<usize>,
    tab: Tab,
}

impl InboxView {
    pub fn new(wallet: Arc<dyn Wallet>, pinner: Arc<dyn FilePinner>, message_chain: u64) -> Self {
        Self {
            wallet,
            pinner,
            message_chain,
            messages: Vec::new(),
            selected: None,
            tab: Tab::default(),
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.selected = None;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages listed under the active tab. Only the inbox carries data.
    pub fn listed(&self) -> &[Message] {
        match self.tab {
            Tab::Inbox => &self.messages,
            _ => &[],
        }
    }

    /// Read the user's messages and replace the local list.
    ///
    /// On failure the previous list stays in place.
    pub async fn fetch_inbox(&mut self) -> Result<usize, InboxError> {
        match self.read_inbox().await {
            Ok(messages) => {
                debug!(count = messages.len(), "Inbox fetched");
                self.messages = messages;
                self.selected = None;
                Ok(self.messages.len())
            }
            Err(e) => {
                warn!(error = %e, "Error fetching inbox");
                Err(e)
            }
        }
    }

    async fn read_inbox(&self) -> Result<Vec<Message>, InboxError> {
        if !self.wallet.switch_chain(self.message_chain).await {
            return Err(InboxError::ChainSwitchRejected(self.message_chain));
        }
        let contracts = self.wallet.contracts_on(self.message_chain).await?;
        Ok(contracts
            .message
            .get_user_inbox(self.wallet.address())
            .await?)
    }

    /// Open the detail view for message `index`.
    pub fn select(&mut self, index: usize) -> Result<&Message, InboxError> {
        let message = self.messages.get(index).ok_or(InboxError::NotFound(index))?;
        self.selected = Some(index);
        Ok(message)
    }

    pub fn selected(&self) -> Option<&Message> {
        self.selected.and_then(|i| self.messages.get(i))
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    /// Retrieve the pinned attachment of message `index`.
    pub async fn attachment(&self, index: usize) -> Result<Vec<u8>, InboxError> {
        let message = self.messages.get(index).ok_or(InboxError::NotFound(index))?;
        let reference = message
            .image_hash
            .as_deref()
            .ok_or(InboxError::NoAttachment(index))?;
        self.pinner
            .fetch(content_hash(reference))
            .await
            .ok_or(InboxError::AttachmentUnavailable)
    }
}

/// Messages store the gateway URL; the pinner wants the bare hash.
fn content_hash(reference: &str) -> &str {
    reference
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(reference)
}
