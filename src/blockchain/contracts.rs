// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract bindings for the messaging, CCIP sender, CCIP receiver and
//! staker contracts.
//!
//! Each contract is exposed as a capability trait so workflows can be
//! exercised without a chain. The alloy implementations are bound to a
//! signer-bound provider for one chain and must be re-derived after every
//! chain switch (see [`super::wallet::Wallet::contracts_on`]).

use std::sync::Arc;

use alloy::{
    primitives::{Address, U256},
    providers::DynProvider,
    rpc::types::TransactionReceipt,
    sol,
};
use async_trait::async_trait;

use super::amount::format_amount;
use super::types::{
    AttestationStatus, Contact, ContractAddresses, Message, ReceivedPayment, SendMessageCall,
    TxReceipt, VerificationRequest, PAYMENT_DECIMALS,
};

sol! {
    #[sol(rpc)]
    interface IMessageContract {
        struct Contact {
            address account;
            string email;
            uint256 chainId;
            bool verified;
        }

        struct VerificationRequest {
            address requester;
            string requesterEmail;
            string subjectEmail;
            bool approved;
        }

        struct Message {
            address sender;
            address receiver;
            string subject;
            string content;
            string imageHash;
            uint256 timestamp;
            bool paymentRequested;
            uint256 paymentAmount;
        }

        function sendMessage(address to, string subject, string body, string attachmentUrl, bool hasPayment, uint256 amount) external;
        function addUserContact(address owner, Contact contact) external;
        function getUserContacts(address owner) external view returns (Contact[] memory);
        function isContactVerified(address owner, string email) external view returns (bool);
        function setContactVerified(address owner, string email, bool verified) external;
        function getVerificationRequests(address owner) external view returns (VerificationRequest[] memory);
        function getUserInbox(address owner) external view returns (Message[] memory);
    }
}

sol! {
    #[sol(rpc)]
    interface ISenderContract {
        function sendMessagePayLINK(uint64 destinationChainSelector, address receiver, uint256 amount) external returns (bytes32 messageId);
    }
}

sol! {
    #[sol(rpc)]
    interface IReceiverContract {
        function getLastReceivedMessageDetails() external view returns (bytes32 messageId, uint64 sourceChainSelector, address sender, string text);
    }
}

sol! {
    #[sol(rpc)]
    interface IStakerContract {
        function getStake(address account) external view returns (uint256);
    }
}

/// Errors raised by contract calls.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("Contract call failed: {0}")]
    Call(String),

    #[error("Gas estimation failed: {0}")]
    GasEstimation(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Transaction {0} reverted")]
    Reverted(String),
}

/// Messaging contract: messages, contacts, verification flags, inbox.
#[async_trait]
pub trait MessageContract: Send + Sync {
    async fn estimate_send_message(&self, call: &SendMessageCall) -> Result<u64, ContractError>;
    async fn send_message(&self, call: &SendMessageCall) -> Result<TxReceipt, ContractError>;
    async fn add_user_contact(
        &self,
        owner: Address,
        contact: &Contact,
    ) -> Result<TxReceipt, ContractError>;
    async fn get_user_contacts(&self, owner: Address) -> Result<Vec<Contact>, ContractError>;
    async fn is_contact_verified(&self, owner: Address, email: &str)
        -> Result<bool, ContractError>;
    async fn set_contact_verified(
        &self,
        owner: Address,
        email: &str,
        verified: bool,
    ) -> Result<TxReceipt, ContractError>;
    async fn get_verification_requests(
        &self,
        owner: Address,
    ) -> Result<Vec<VerificationRequest>, ContractError>;
    async fn get_user_inbox(&self, owner: Address) -> Result<Vec<Message>, ContractError>;
}

/// CCIP sender contract used for the optional payment leg.
#[async_trait]
pub trait PaymentContract: Send + Sync {
    async fn send_message_pay_link(
        &self,
        chain_selector: u64,
        to: Address,
        amount: U256,
    ) -> Result<TxReceipt, ContractError>;
}

/// CCIP receiver contract on the message chain.
#[async_trait]
pub trait ReceiverContract: Send + Sync {
    async fn last_received_message(&self) -> Result<ReceivedPayment, ContractError>;
}

/// Staking contract.
#[async_trait]
pub trait StakerContract: Send + Sync {
    async fn stake_of(&self, account: Address) -> Result<U256, ContractError>;
}

/// The four contract handles bound to one signer on one chain.
#[derive(Clone)]
pub struct ContractSet {
    pub chain_id: u64,
    pub message: Arc<dyn MessageContract>,
    pub payment: Arc<dyn PaymentContract>,
    pub receiver: Arc<dyn ReceiverContract>,
    pub staker: Arc<dyn StakerContract>,
}

impl ContractSet {
    /// Bind all four contracts to a signer-bound provider.
    pub fn bind(chain_id: u64, addresses: &ContractAddresses, provider: &DynProvider) -> Self {
        Self {
            chain_id,
            message: Arc::new(AlloyMessageContract {
                instance: IMessageContract::new(addresses.message, provider.clone()),
            }),
            payment: Arc::new(AlloyPaymentContract {
                instance: ISenderContract::new(addresses.sender, provider.clone()),
            }),
            receiver: Arc::new(AlloyReceiverContract {
                instance: IReceiverContract::new(addresses.receiver, provider.clone()),
            }),
            staker: Arc::new(AlloyStakerContract {
                instance: IStakerContract::new(addresses.staker, provider.clone()),
            }),
        }
    }
}

/// Turn a mined receipt into a [`TxReceipt`], failing if it reverted.
fn confirmed(receipt: TransactionReceipt) -> Result<TxReceipt, ContractError> {
    let tx_hash = format!("{:?}", receipt.transaction_hash);
    if !receipt.status() {
        return Err(ContractError::Reverted(tx_hash));
    }
    Ok(TxReceipt {
        tx_hash,
        block_number: receipt.block_number.unwrap_or(0),
        gas_used: receipt.gas_used,
    })
}

fn call_error(e: impl std::fmt::Display) -> ContractError {
    ContractError::Call(e.to_string())
}

fn tx_error(e: impl std::fmt::Display) -> ContractError {
    ContractError::TransactionFailed(e.to_string())
}

fn u256_to_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

impl From<IMessageContract::Contact> for Contact {
    fn from(raw: IMessageContract::Contact) -> Self {
        Self {
            account: raw.account,
            email: raw.email,
            chain_id: u256_to_u64(raw.chainId),
            verified: raw.verified,
        }
    }
}

impl From<&Contact> for IMessageContract::Contact {
    fn from(contact: &Contact) -> Self {
        Self {
            account: contact.account,
            email: contact.email.clone(),
            chainId: U256::from(contact.chain_id),
            verified: contact.verified,
        }
    }
}

impl From<IMessageContract::VerificationRequest> for VerificationRequest {
    fn from(raw: IMessageContract::VerificationRequest) -> Self {
        Self {
            requester: raw.requester,
            requester_email: raw.requesterEmail,
            subject_email: raw.subjectEmail,
            status: if raw.approved {
                AttestationStatus::Approved
            } else {
                AttestationStatus::Pending
            },
        }
    }
}

impl From<IMessageContract::Message> for Message {
    fn from(raw: IMessageContract::Message) -> Self {
        Self {
            sender: raw.sender,
            receiver: raw.receiver,
            subject: raw.subject,
            content: raw.content,
            image_hash: (!raw.imageHash.is_empty()).then_some(raw.imageHash),
            timestamp: u256_to_u64(raw.timestamp),
            payment_requested: raw.paymentRequested,
            payment_amount: format_amount(raw.paymentAmount, PAYMENT_DECIMALS),
        }
    }
}

struct AlloyMessageContract {
    instance: IMessageContract::IMessageContractInstance<DynProvider>,
}

#[async_trait]
impl MessageContract for AlloyMessageContract {
    async fn estimate_send_message(&self, call: &SendMessageCall) -> Result<u64, ContractError> {
        self.instance
            .sendMessage(
                call.to,
                call.subject.clone(),
                call.body.clone(),
                call.attachment_url.clone(),
                call.has_payment,
                call.amount,
            )
            .estimate_gas()
            .await
            .map_err(|e| ContractError::GasEstimation(e.to_string()))
    }

    async fn send_message(&self, call: &SendMessageCall) -> Result<TxReceipt, ContractError> {
        let receipt = self
            .instance
            .sendMessage(
                call.to,
                call.subject.clone(),
                call.body.clone(),
                call.attachment_url.clone(),
                call.has_payment,
                call.amount,
            )
            .send()
            .await
            .map_err(tx_error)?
            .get_receipt()
            .await
            .map_err(tx_error)?;
        confirmed(receipt)
    }

    async fn add_user_contact(
        &self,
        owner: Address,
        contact: &Contact,
    ) -> Result<TxReceipt, ContractError> {
        let receipt = self
            .instance
            .addUserContact(owner, contact.into())
            .send()
            .await
            .map_err(tx_error)?
            .get_receipt()
            .await
            .map_err(tx_error)?;
        confirmed(receipt)
    }

    async fn get_user_contacts(&self, owner: Address) -> Result<Vec<Contact>, ContractError> {
        let contacts = self
            .instance
            .getUserContacts(owner)
            .call()
            .await
            .map_err(call_error)?;
        Ok(contacts.into_iter().map(Contact::from).collect())
    }

    async fn is_contact_verified(
        &self,
        owner: Address,
        email: &str,
    ) -> Result<bool, ContractError> {
        self.instance
            .isContactVerified(owner, email.to_string())
            .call()
            .await
            .map_err(call_error)
    }

    async fn set_contact_verified(
        &self,
        owner: Address,
        email: &str,
        verified: bool,
    ) -> Result<TxReceipt, ContractError> {
        let receipt = self
            .instance
            .setContactVerified(owner, email.to_string(), verified)
            .send()
            .await
            .map_err(tx_error)?
            .get_receipt()
            .await
            .map_err(tx_error)?;
        confirmed(receipt)
    }

    async fn get_verification_requests(
        &self,
        owner: Address,
    ) -> Result<Vec<VerificationRequest>, ContractError> {
        let requests = self
            .instance
            .getVerificationRequests(owner)
            .call()
            .await
            .map_err(call_error)?;
        Ok(requests.into_iter().map(VerificationRequest::from).collect())
    }

    async fn get_user_inbox(&self, owner: Address) -> Result<Vec<Message>, ContractError> {
        let messages = self
            .instance
            .getUserInbox(owner)
            .call()
            .await
            .map_err(call_error)?;
        Ok(messages.into_iter().map(Message::from).collect())
    }
}

struct AlloyPaymentContract {
    instance: ISenderContract::ISenderContractInstance<DynProvider>,
}

#[async_trait]
impl PaymentContract for AlloyPaymentContract {
    async fn send_message_pay_link(
        &self,
        chain_selector: u64,
        to: Address,
        amount: U256,
    ) -> Result<TxReceipt, ContractError> {
        let receipt = self
            .instance
            .sendMessagePayLINK(chain_selector, to, amount)
            .send()
            .await
            .map_err(tx_error)?
            .get_receipt()
            .await
            .map_err(tx_error)?;
        confirmed(receipt)
    }
}

struct AlloyReceiverContract {
    instance: IReceiverContract::IReceiverContractInstance<DynProvider>,
}

#[async_trait]
impl ReceiverContract for AlloyReceiverContract {
    async fn last_received_message(&self) -> Result<ReceivedPayment, ContractError> {
        let details = self
            .instance
            .getLastReceivedMessageDetails()
            .call()
            .await
            .map_err(call_error)?;
        Ok(ReceivedPayment {
            message_id: format!("{:?}", details.messageId),
            source_chain_selector: details.sourceChainSelector,
            sender: details.sender,
            text: details.text,
        })
    }
}

struct AlloyStakerContract {
    instance: IStakerContract::IStakerContractInstance<DynProvider>,
}

#[async_trait]
impl StakerContract for AlloyStakerContract {
    async fn stake_of(&self, account: Address) -> Result<U256, ContractError> {
        self.instance
            .getStake(account)
            .call()
            .await
            .map_err(call_error)
    }
}
