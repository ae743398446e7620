// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::attestation::Attestor;
use crate::blockchain::{ChainPlan, Wallet};
use crate::compose::ComposeForm;
use crate::contacts::ContactManager;
use crate::inbox::InboxView;
use crate::notify::NoticeBoard;
use crate::pinning::FilePinner;
use crate::session::SessionGate;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<SessionGate>>,
    pub wallet: Arc<dyn Wallet>,
    pub attestor: Arc<dyn Attestor>,
    pub notices: Arc<NoticeBoard>,
    pub compose: Arc<Mutex<ComposeForm>>,
    pub contacts: Arc<Mutex<ContactManager>>,
    pub inbox: Arc<Mutex<InboxView>>,
    pub plan: ChainPlan,
    /// Held by every request that switches the wallet's active chain.
    chain: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        environment_id: impl Into<String>,
        wallet: Arc<dyn Wallet>,
        pinner: Arc<dyn FilePinner>,
        attestor: Arc<dyn Attestor>,
        plan: ChainPlan,
    ) -> Self {
        let notices = Arc::new(NoticeBoard::new());
        let session = SessionGate::new(environment_id, wallet.address());
        let compose = ComposeForm::new(wallet.clone(), pinner.clone(), notices.clone(), plan);
        let contacts = ContactManager::new(
            wallet.clone(),
            attestor.clone(),
            notices.clone(),
            plan.verification_chain,
        );
        let inbox = InboxView::new(wallet.clone(), pinner, plan.message_chain);

        Self {
            session: Arc::new(RwLock::new(session)),
            wallet,
            attestor,
            notices,
            compose: Arc::new(Mutex::new(compose)),
            contacts: Arc::new(Mutex::new(contacts)),
            inbox: Arc::new(Mutex::new(inbox)),
            plan,
            chain: Arc::new(Mutex::new(())),
        }
    }

    /// Exclusive use of the wallet's active chain.
    pub async fn lock_chain(&self) -> MutexGuard<'_, ()> {
        self.chain.lock().await
    }
}
