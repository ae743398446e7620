// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Compose/Send Workflow
//!
//! Sending a message is a fixed sequence of steps, each of which must finish
//! before the next starts:
//!
//! ```text
//! Validate -> Attach? -> Pay? -> SwitchToMessageChain -> EstimateGas -> Submit -> Finalize
//! ```
//!
//! - `Attach` runs only when a file is selected; a failed pin aborts the send.
//! - `Pay` runs only for a non-zero amount. It moves the wallet to the payment
//!   chain and sends the fixed CCIP unit payment.
//! - Every step that touches a contract asserts the wallet is on the chain it
//!   expects and resolves fresh handles for that chain.
//!
//! The first failing step aborts the rest and is reported through a single
//! [`ComposeFailure`]. A payment that was confirmed before a later failure is
//! not rolled back.

use std::{fmt, str::FromStr, sync::Arc};

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::blockchain::{
    parse_payment, AmountError, ChainPlan, ContractError, SendMessageCall, TxReceipt, Wallet,
    WalletError, PAYMENT_DECIMALS, PAYMENT_UNIT_AMOUNT,
};
use crate::contacts::RecipientDirectory;
use crate::notify::NoticeBoard;
use crate::pinning::{Attachment, FilePinner, PinError, PinnedFile};

pub const SENT_NOTICE: &str = "Message sent successfully";
pub const MISSING_FIELDS_NOTICE: &str = "Please fill in all required fields";
pub const INVALID_RECIPIENT_NOTICE: &str = "Invalid recipient email address";
pub const INVALID_AMOUNT_NOTICE: &str = "Invalid payment amount";
pub const FAILED_NOTICE: &str = "Failed to send message";

/// The compose form's contents. Lives only while the form is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeDraft {
    /// Address or email
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<Attachment>,
    /// Decimal amount; blank or zero means no payment
    pub payment_amount: Option<String>,
}

impl ComposeDraft {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComposeStep {
    Validate,
    Attach,
    Pay,
    SwitchToMessageChain,
    EstimateGas,
    Submit,
    Finalize,
}

impl fmt::Display for ComposeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComposeStep::Validate => "validate",
            ComposeStep::Attach => "attach",
            ComposeStep::Pay => "pay",
            ComposeStep::SwitchToMessageChain => "switch_to_message_chain",
            ComposeStep::EstimateGas => "estimate_gas",
            ComposeStep::Submit => "submit",
            ComposeStep::Finalize => "finalize",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("Recipient, subject and body are required")]
    MissingFields,

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Invalid payment amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error(transparent)]
    Pin(#[from] PinError),

    #[error("Wallet refused to switch to chain {0}")]
    ChainSwitchRejected(u64),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("Compose form is not open")]
    NotOpen,
}

/// The single abort channel of the workflow.
#[derive(Debug, thiserror::Error)]
#[error("{step} step failed: {error}")]
pub struct ComposeFailure {
    pub step: ComposeStep,
    #[source]
    pub error: ComposeError,
}

impl ComposeFailure {
    fn at(step: ComposeStep) -> impl FnOnce(ComposeError) -> Self {
        move |error| Self { step, error }
    }

    /// Failures caught before any external call.
    pub fn is_validation(&self) -> bool {
        self.step == ComposeStep::Validate
    }

    /// Notice shown to the user for this failure.
    pub fn notice(&self) -> &'static str {
        match &self.error {
            ComposeError::MissingFields => MISSING_FIELDS_NOTICE,
            ComposeError::InvalidRecipient(_) => INVALID_RECIPIENT_NOTICE,
            ComposeError::InvalidAmount(_) => INVALID_AMOUNT_NOTICE,
            _ => FAILED_NOTICE,
        }
    }
}

/// Output of the validate step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    pub to: Address,
    pub subject: String,
    pub body: String,
    /// Payment in base units, if any
    pub payment: Option<U256>,
}

/// A confirmed send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SentMessage {
    #[schema(value_type = String)]
    pub to: Address,
    pub tx_hash: String,
    pub block_number: u64,
    pub gas_estimate: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_tx_hash: Option<String>,
}

/// Resolve the recipient: a literal address is used as typed, anything else
/// must be an email known to `directory`.
pub fn resolve_recipient(to: &str, directory: &RecipientDirectory) -> Result<Address, ComposeError> {
    let to = to.trim();
    if to.starts_with("0x") {
        return Address::from_str(to).map_err(|_| ComposeError::InvalidRecipient(to.to_string()));
    }
    directory
        .lookup(to)
        .ok_or_else(|| ComposeError::InvalidRecipient(to.to_string()))
}

/// The steps of one send, bound to the collaborators they call.
pub struct ComposeWorkflow<'a> {
    wallet: &'a dyn Wallet,
    pinner: &'a dyn FilePinner,
    plan: &'a ChainPlan,
}

impl<'a> ComposeWorkflow<'a> {
    pub fn new(wallet: &'a dyn Wallet, pinner: &'a dyn FilePinner, plan: &'a ChainPlan) -> Self {
        Self {
            wallet,
            pinner,
            plan,
        }
    }

    pub fn validate(
        &self,
        draft: &ComposeDraft,
        directory: &RecipientDirectory,
    ) -> Result<ValidatedDraft, ComposeError> {
        if [&draft.to, &draft.subject, &draft.body]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(ComposeError::MissingFields);
        }

        Ok(ValidatedDraft {
            to: resolve_recipient(&draft.to, directory)?,
            subject: draft.subject.clone(),
            body: draft.body.clone(),
            payment: parse_payment(draft.payment_amount.as_deref(), PAYMENT_DECIMALS)?,
        })
    }

    pub async fn attach(
        &self,
        attachment: Option<&Attachment>,
    ) -> Result<Option<PinnedFile>, ComposeError> {
        match attachment {
            None => Ok(None),
            Some(file) => Ok(Some(self.pinner.pin(Some(file)).await?)),
        }
    }

    pub async fn pay(
        &self,
        to: Address,
        payment: Option<U256>,
    ) -> Result<Option<TxReceipt>, ComposeError> {
        if payment.is_none() {
            return Ok(None);
        }

        let chain = self.plan.payment_chain;
        if !self.wallet.switch_chain(chain).await {
            return Err(ComposeError::ChainSwitchRejected(chain));
        }
        let contracts = self.wallet.contracts_on(chain).await?;
        let receipt = contracts
            .payment
            .send_message_pay_link(self.plan.chain_selector, to, U256::from(PAYMENT_UNIT_AMOUNT))
            .await?;
        info!(tx_hash = %receipt.tx_hash, chain_id = chain, "Payment confirmed");
        Ok(Some(receipt))
    }

    /// Returns the chain the remaining steps must run on.
    pub async fn switch_to_message_chain(&self) -> Result<u64, ComposeError> {
        let chain = self.plan.message_chain;
        if !self.wallet.switch_chain(chain).await {
            return Err(ComposeError::ChainSwitchRejected(chain));
        }
        Ok(chain)
    }

    pub async fn estimate_gas(&self, chain: u64, call: &SendMessageCall) -> Result<u64, ComposeError> {
        let contracts = self.wallet.contracts_on(chain).await?;
        Ok(contracts.message.estimate_send_message(call).await?)
    }

    pub async fn submit(&self, chain: u64, call: &SendMessageCall) -> Result<TxReceipt, ComposeError> {
        let contracts = self.wallet.contracts_on(chain).await?;
        Ok(contracts.message.send_message(call).await?)
    }

    /// Run every step up to and including `Submit`.
    pub async fn run(
        &self,
        draft: &ComposeDraft,
        directory: &RecipientDirectory,
    ) -> Result<SentMessage, ComposeFailure> {
        use ComposeStep::*;

        let validated = self
            .validate(draft, directory)
            .map_err(ComposeFailure::at(Validate))?;
        let pinned = self
            .attach(draft.attachment.as_ref())
            .await
            .map_err(ComposeFailure::at(Attach))?;
        let payment = self
            .pay(validated.to, validated.payment)
            .await
            .map_err(ComposeFailure::at(Pay))?;
        let chain = self
            .switch_to_message_chain()
            .await
            .map_err(ComposeFailure::at(SwitchToMessageChain))?;

        let call = SendMessageCall {
            to: validated.to,
            subject: validated.subject,
            body: validated.body,
            attachment_url: pinned.as_ref().map(|p| p.url.clone()).unwrap_or_default(),
            has_payment: validated.payment.is_some(),
            amount: validated.payment.unwrap_or(U256::ZERO),
        };
        let gas_estimate = self
            .estimate_gas(chain, &call)
            .await
            .map_err(ComposeFailure::at(EstimateGas))?;
        let receipt = self
            .submit(chain, &call)
            .await
            .map_err(ComposeFailure::at(Submit))?;

        Ok(SentMessage {
            to: call.to,
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
            gas_estimate,
            attachment_url: pinned.map(|p| p.url),
            payment_tx_hash: payment.map(|p| p.tx_hash),
        })
    }
}

/// Compose form state: open flag plus the draft.
pub struct ComposeForm {
    wallet: Arc<dyn Wallet>,
    pinner: Arc<dyn FilePinner>,
    notices: Arc<NoticeBoard>,
    plan: ChainPlan,
    open: bool,
    draft: ComposeDraft,
}

impl ComposeForm {
    pub fn new(
        wallet: Arc<dyn Wallet>,
        pinner: Arc<dyn FilePinner>,
        notices: Arc<NoticeBoard>,
        plan: ChainPlan,
    ) -> Self {
        Self {
            wallet,
            pinner,
            notices,
            plan,
            open: false,
            draft: ComposeDraft::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &ComposeDraft {
        &self.draft
    }

    /// Replace the draft, opening the form if needed.
    pub fn edit(&mut self, draft: ComposeDraft) {
        self.open = true;
        self.draft = draft;
    }

    /// Close the form and discard the draft.
    pub fn cancel(&mut self) {
        self.open = false;
        self.draft = ComposeDraft::default();
    }

    /// Send the current draft. On success the form is closed and cleared;
    /// on failure the draft is kept for a retry.
    pub async fn send(&mut self, directory: &RecipientDirectory) -> Result<SentMessage, ComposeFailure> {
        if !self.open {
            return Err(ComposeFailure {
                step: ComposeStep::Validate,
                error: ComposeError::NotOpen,
            });
        }

        let workflow = ComposeWorkflow::new(self.wallet.as_ref(), self.pinner.as_ref(), &self.plan);
        match workflow.run(&self.draft, directory).await {
            Ok(sent) => {
                info!(
                    tx_hash = %sent.tx_hash,
                    to = %sent.to,
                    step = %ComposeStep::Finalize,
                    "Message sent"
                );
                self.notices.success(SENT_NOTICE);
                self.cancel();
                Ok(sent)
            }
            Err(failure) => {
                if !failure.is_validation() {
                    warn!(step = %failure.step, error = %failure.error, "Error sending message");
                }
                self.notices.error(failure.notice());
                Err(failure)
            }
        }
    }
}
