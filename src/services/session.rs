// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::constants::{SUPPORTED_CHAINS, is_supported_chain};
use crate::common::error::AppError;
use alloy::primitives::Address;
use async_trait::async_trait;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn on_supported_chain(&self) -> bool {
        self.chain_id.is_some_and(is_supported_chain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Connected { account: Address, chain_id: u64 },
    Disconnected,
    ChainChanged(u64),
}

/// Connected wallet and chain. Events are the only writer; every reader sees
/// updates in the order they were applied.
#[derive(Debug)]
pub struct WalletSession {
    state: watch::Sender<SessionState>,
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletSession {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { state }
    }

    pub fn connected(account: Address, chain_id: u64) -> Self {
        let session = Self::new();
        session.apply(SessionEvent::Connected { account, chain_id });
        session
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn apply(&self, event: SessionEvent) {
        self.state.send_modify(|s| match event {
            SessionEvent::Connected { account, chain_id } => {
                s.account = Some(account);
                s.chain_id = Some(chain_id);
            }
            SessionEvent::Disconnected => *s = SessionState::default(),
            SessionEvent::ChainChanged(chain_id) => s.chain_id = Some(chain_id),
        });
        tracing::debug!(target: "session", ?event, "Session updated");
    }
}

/// Asks the wallet to move to another chain. `Ok(false)` means the user declined.
#[async_trait]
pub trait NetworkSwitcher: Send + Sync {
    async fn request_switch(&self, target_chain: u64) -> Result<bool, AppError>;
}

/// Switcher for signers bound to a single RPC endpoint: it can never move, so
/// every request is declined.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedEndpoint;

#[async_trait]
impl NetworkSwitcher for FixedEndpoint {
    async fn request_switch(&self, target_chain: u64) -> Result<bool, AppError> {
        tracing::warn!(
            target: "session",
            target_chain,
            "Endpoint is pinned to one chain; point the RPC URL at the target chain"
        );
        Ok(false)
    }
}

/// Runs before every write.
#[derive(Debug, Clone, Copy)]
pub struct NetworkGate {
    target_chain: u64,
}

impl NetworkGate {
    pub fn new(target_chain: u64) -> Self {
        Self { target_chain }
    }

    pub fn target_chain(&self) -> u64 {
        self.target_chain
    }

    /// Connected account, once the session is on a supported chain. A switch
    /// is requested before any contract call goes out.
    pub async fn preflight(
        &self,
        session: &WalletSession,
        switcher: &dyn NetworkSwitcher,
    ) -> Result<Address, AppError> {
        let state = session.state();
        let account = state.account.ok_or(AppError::WalletNotConnected)?;
        if state.on_supported_chain() {
            return Ok(account);
        }

        let current = state.chain_id.unwrap_or_default();
        tracing::info!(
            target: "session",
            current,
            target = self.target_chain,
            "Unsupported network, requesting switch"
        );
        if switcher.request_switch(self.target_chain).await? {
            session.apply(SessionEvent::ChainChanged(self.target_chain));
            Ok(account)
        } else {
            Err(AppError::WrongNetwork {
                current,
                expected: SUPPORTED_CHAINS.to_vec(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::{CHAIN_BSC, CHAIN_POLYGON};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Recording {
        accept: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NetworkSwitcher for Recording {
        async fn request_switch(&self, _target: u64) -> Result<bool, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.accept)
        }
    }

    fn switcher(accept: bool) -> Recording {
        Recording {
            accept,
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn blocks_without_wallet() {
        let session = WalletSession::new();
        let sw = switcher(true);
        let err = NetworkGate::new(CHAIN_BSC)
            .preflight(&session, &sw)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::WalletNotConnected));
        assert_eq!(sw.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn supported_chain_passes_without_prompt() {
        let account = Address::repeat_byte(1);
        let session = WalletSession::connected(account, CHAIN_BSC);
        let sw = switcher(false);
        let got = NetworkGate::new(CHAIN_BSC)
            .preflight(&session, &sw)
            .await
            .unwrap();
        assert_eq!(got, account);
        assert_eq!(sw.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn wrong_chain_prompts_and_records_switch() {
        let session = WalletSession::connected(Address::repeat_byte(2), CHAIN_POLYGON);
        let mut rx = session.subscribe();
        let sw = switcher(true);

        NetworkGate::new(CHAIN_BSC)
            .preflight(&session, &sw)
            .await
            .unwrap();
        assert_eq!(sw.calls.load(Ordering::SeqCst), 1);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().chain_id, Some(CHAIN_BSC));
    }

    #[tokio::test]
    async fn declined_switch_is_wrong_network() {
        let session = WalletSession::connected(Address::repeat_byte(3), CHAIN_POLYGON);
        let err = NetworkGate::new(CHAIN_BSC)
            .preflight(&session, &FixedEndpoint)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::WrongNetwork { current: 137, .. }));
        assert_eq!(session.state().chain_id, Some(CHAIN_POLYGON));
    }

    #[test]
    fn disconnect_clears_state() {
        let session = WalletSession::connected(Address::repeat_byte(4), CHAIN_BSC);
        session.apply(SessionEvent::Disconnected);
        assert_eq!(session.state(), SessionState::default());
    }
}
