// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::constants::{BIT_DECIMALS, NATIVE_DECIMALS, STABLE_DECIMALS};
use crate::common::error::AppError;
use crate::domain::countdown::current_unix;
use crate::domain::staking::{StakePosition, TierTerms};
use crate::domain::task::Task;
use crate::domain::units::format_token;
use crate::infrastructure::contracts::token::native_balance;
use crate::infrastructure::contracts::{CheckInStatus, Contracts, Stablecoin};
use crate::network::explorer::{ExplorerClient, ExplorerStats};
use crate::network::provider::ChainProvider;
use crate::services::session::SessionState;
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Balances {
    pub native: Option<U256>,
    pub bit: Option<U256>,
    pub usdt: Option<U256>,
    pub usdc: Option<U256>,
}

/// Wallet-scoped reads refreshed on the fast cadence. `None` means the read
/// failed or does not apply; the previous value is kept.
#[derive(Debug, Clone, Default)]
pub struct FastReadings {
    pub balances: Balances,
    pub stakes: Option<Vec<StakePosition>>,
    pub check_in: Option<CheckInStatus>,
    pub tasks: Option<Vec<Task>>,
}

/// Global figures refreshed on the slow cadence.
#[derive(Debug, Clone, Default)]
pub struct SlowReadings {
    pub bit_price: Option<U256>,
    pub sale_active: Option<bool>,
    pub total_sold: Option<U256>,
    pub total_staked: Option<U256>,
    pub tiers: Option<Vec<TierTerms>>,
    pub explorer: Option<ExplorerStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub account: Option<Address>,
    pub balances: Balances,
    pub bit_price: Option<U256>,
    pub sale_active: Option<bool>,
    pub total_sold: Option<U256>,
    pub total_staked: Option<U256>,
    pub tiers: Vec<TierTerms>,
    pub stakes: Vec<StakePosition>,
    pub check_in: Option<CheckInStatus>,
    pub tasks: Vec<Task>,
    pub explorer: Option<ExplorerStats>,
    pub fast_updated_at: u64,
    pub slow_updated_at: u64,
}

fn merge<T>(slot: &mut Option<T>, fresh: Option<T>) {
    if fresh.is_some() {
        *slot = fresh;
    }
}

impl DashboardSnapshot {
    pub fn apply_fast(&mut self, account: Option<Address>, r: FastReadings, now: u64) {
        if self.account != account {
            // Wallet changed: nothing from the old wallet may leak through.
            self.balances = Balances::default();
            self.stakes.clear();
            self.check_in = None;
            self.tasks.clear();
            self.account = account;
        }
        merge(&mut self.balances.native, r.balances.native);
        merge(&mut self.balances.bit, r.balances.bit);
        merge(&mut self.balances.usdt, r.balances.usdt);
        merge(&mut self.balances.usdc, r.balances.usdc);
        if let Some(stakes) = r.stakes {
            self.stakes = stakes;
        }
        merge(&mut self.check_in, r.check_in);
        if let Some(tasks) = r.tasks {
            self.tasks = tasks;
        }
        self.fast_updated_at = now;
    }

    pub fn apply_slow(&mut self, r: SlowReadings, now: u64) {
        merge(&mut self.bit_price, r.bit_price);
        merge(&mut self.sale_active, r.sale_active);
        merge(&mut self.total_sold, r.total_sold);
        merge(&mut self.total_staked, r.total_staked);
        if let Some(tiers) = r.tiers {
            self.tiers = tiers;
        }
        merge(&mut self.explorer, r.explorer);
        self.slow_updated_at = now;
    }

    /// Plain-text rendering for the terminal.
    pub fn render(&self, now: u64) -> String {
        let amount = |v: Option<U256>, decimals: u8| {
            v.map(|v| format_token(v, decimals))
                .unwrap_or_else(|| "-".to_string())
        };
        let mut out = String::new();
        match self.account {
            Some(a) => {
                let _ = writeln!(out, "Wallet      {a}");
            }
            None => {
                let _ = writeln!(out, "Wallet      not connected");
            }
        }
        let _ = writeln!(
            out,
            "Balances    {} BNB | {} BIT | {} USDT | {} USDC",
            amount(self.balances.native, NATIVE_DECIMALS),
            amount(self.balances.bit, BIT_DECIMALS),
            amount(self.balances.usdt, STABLE_DECIMALS),
            amount(self.balances.usdc, STABLE_DECIMALS),
        );
        let _ = writeln!(
            out,
            "BIT price   ${} (sale {})",
            amount(self.bit_price, STABLE_DECIMALS),
            match self.sale_active {
                Some(true) => "open",
                Some(false) => "closed",
                None => "unknown",
            }
        );
        let _ = writeln!(
            out,
            "Presale     {} BIT sold | {} BIT staked",
            amount(self.total_sold, BIT_DECIMALS),
            amount(self.total_staked, BIT_DECIMALS),
        );
        if let Some(stats) = self.explorer {
            let plus = if stats.transfers_capped { "+" } else { "" };
            let _ = writeln!(
                out,
                "Explorer    {} holders | {}{} transfers",
                stats.holders, stats.transfers, plus
            );
        }
        for s in self.stakes.iter().filter(|s| !s.withdrawn) {
            let _ = writeln!(
                out,
                "Stake #{}    {} BIT at {}% | unlocks in {}",
                s.index,
                format_token(s.amount, BIT_DECIMALS),
                s.apr_bps as f64 / 100.0,
                s.countdown(now)
            );
        }
        if let Some(status) = self.check_in {
            let _ = writeln!(
                out,
                "Check-in    next in {} | claimable {} BIT",
                status.countdown(now),
                format_token(status.claimable, BIT_DECIMALS)
            );
        }
        for t in &self.tasks {
            let state = match t.countdown(now) {
                Some(c) => c.to_string(),
                None if t.completed => "done".to_string(),
                None => "open".to_string(),
            };
            let _ = writeln!(out, "Task #{}     {} ({}) {}", t.id, t.title, t.display_reward(), state);
        }
        out
    }
}

/// Where the poller gets its numbers from.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn read_fast(&self, account: Option<Address>) -> FastReadings;
    async fn read_slow(&self) -> SlowReadings;
}

fn keep<T>(what: &str, result: Result<T, AppError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(target: "dashboard", field = what, error = %e, "Read failed; keeping previous value");
            None
        }
    }
}

/// Live source reading the contracts and the block explorer.
#[derive(Clone)]
pub struct ChainDashboardSource {
    provider: ChainProvider,
    contracts: Contracts,
    explorer: ExplorerClient,
}

impl ChainDashboardSource {
    pub fn new(provider: ChainProvider, contracts: Contracts, explorer: ExplorerClient) -> Self {
        Self {
            provider,
            contracts,
            explorer,
        }
    }
}

#[async_trait]
impl DashboardSource for ChainDashboardSource {
    async fn read_fast(&self, account: Option<Address>) -> FastReadings {
        let c = &self.contracts;
        let tasks = match c.tasks.as_ref() {
            Some(t) => keep("tasks", t.tasks(account).await),
            None => None,
        };
        let Some(owner) = account else {
            return FastReadings {
                tasks,
                ..Default::default()
            };
        };

        let (native, bit, usdt, usdc) = tokio::join!(
            native_balance(&self.provider, owner),
            async {
                match c.bit.as_ref() {
                    Some(t) => Some(t.balance_of(owner).await),
                    None => None,
                }
            },
            async {
                match c.stablecoin(Stablecoin::Usdt) {
                    Ok(t) => Some(t.balance_of(owner).await),
                    Err(_) => None,
                }
            },
            async {
                match c.stablecoin(Stablecoin::Usdc) {
                    Ok(t) => Some(t.balance_of(owner).await),
                    Err(_) => None,
                }
            },
        );
        let stakes = match c.staking.as_ref() {
            Some(s) => keep("stakes", s.user_stakes(owner).await),
            None => None,
        };
        let check_in = match c.airdrop.as_ref() {
            Some(a) => keep("check_in", a.status(owner).await),
            None => None,
        };

        FastReadings {
            balances: Balances {
                native: keep("native_balance", native),
                bit: bit.and_then(|r| keep("bit_balance", r)),
                usdt: usdt.and_then(|r| keep("usdt_balance", r)),
                usdc: usdc.and_then(|r| keep("usdc_balance", r)),
            },
            stakes,
            check_in,
            tasks,
        }
    }

    async fn read_slow(&self) -> SlowReadings {
        let c = &self.contracts;
        let mut out = SlowReadings {
            explorer: Some(self.explorer.stats().await),
            ..Default::default()
        };
        if let Some(p) = c.purchase.as_ref() {
            out.bit_price = keep("bit_price", p.bit_price().await);
            out.sale_active = keep("sale_active", p.sale_active().await);
            out.total_sold = keep("total_sold", p.total_sold().await);
        }
        if let Some(s) = c.staking.as_ref() {
            out.total_staked = keep("total_staked", s.total_staked().await);
            out.tiers = keep("tiers", s.all_tiers().await);
        }
        out
    }
}

/// Read side of a running poller.
#[derive(Clone)]
pub struct DashboardHandle {
    snapshot: watch::Receiver<DashboardSnapshot>,
    refresh: Arc<Notify>,
}

impl DashboardHandle {
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshot.clone()
    }

    /// Refresh everything now, e.g. after a transaction confirms.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }
}

pub struct DashboardPoller {
    source: Arc<dyn DashboardSource>,
    session: watch::Receiver<SessionState>,
    fast_every: Duration,
    slow_every: Duration,
    snapshot: watch::Sender<DashboardSnapshot>,
    refresh: Arc<Notify>,
    shutdown: CancellationToken,
}

impl DashboardPoller {
    pub fn new(
        source: Arc<dyn DashboardSource>,
        session: watch::Receiver<SessionState>,
        fast_every: Duration,
        slow_every: Duration,
        shutdown: CancellationToken,
    ) -> (Self, DashboardHandle) {
        let (tx, rx) = watch::channel(DashboardSnapshot::default());
        let refresh = Arc::new(Notify::new());
        let handle = DashboardHandle {
            snapshot: rx,
            refresh: refresh.clone(),
        };
        (
            Self {
                source,
                session,
                fast_every,
                slow_every,
                snapshot: tx,
                refresh,
                shutdown,
            },
            handle,
        )
    }

    async fn refresh_fast(&self, account: Option<Address>) {
        let readings = self.source.read_fast(account).await;
        self.snapshot
            .send_modify(|s| s.apply_fast(account, readings, current_unix()));
        tracing::debug!(target: "dashboard", ?account, "Fast group refreshed");
    }

    async fn refresh_slow(&self) {
        let readings = self.source.read_slow().await;
        self.snapshot
            .send_modify(|s| s.apply_slow(readings, current_unix()));
        tracing::debug!(target: "dashboard", "Slow group refreshed");
    }

    pub async fn run(self) -> Result<(), AppError> {
        let mut session = self.session.clone();
        let mut session_open = true;
        let mut fast = interval(self.fast_every);
        let mut slow = interval(self.slow_every);
        fast.set_missed_tick_behavior(MissedTickBehavior::Skip);
        slow.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            target: "dashboard",
            fast_secs = self.fast_every.as_secs(),
            slow_secs = self.slow_every.as_secs(),
            "Dashboard poller started"
        );
        loop {
            let account = session.borrow().account;
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!(target: "dashboard", "Shutdown requested; stopping poller");
                    return Ok(());
                }
                _ = fast.tick() => self.refresh_fast(account).await,
                _ = slow.tick() => self.refresh_slow().await,
                _ = self.refresh.notified() => {
                    self.refresh_fast(account).await;
                    self.refresh_slow().await;
                }
                changed = session.changed(), if session_open => {
                    match changed {
                        Ok(()) => {
                            let account = session.borrow_and_update().account;
                            self.refresh_fast(account).await;
                        }
                        Err(_) => session_open = false,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::CHAIN_BSC;
    use crate::services::session::{SessionEvent, WalletSession};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        fast: AtomicUsize,
        slow: AtomicUsize,
    }

    #[async_trait]
    impl DashboardSource for CountingSource {
        async fn read_fast(&self, account: Option<Address>) -> FastReadings {
            let n = self.fast.fetch_add(1, Ordering::SeqCst) as u64;
            FastReadings {
                balances: Balances {
                    bit: account.map(|_| U256::from(n + 1)),
                    ..Default::default()
                },
                ..Default::default()
            }
        }

        async fn read_slow(&self) -> SlowReadings {
            self.slow.fetch_add(1, Ordering::SeqCst);
            SlowReadings {
                bit_price: Some(U256::from(108_000_000_000_000u64)),
                ..Default::default()
            }
        }
    }

    #[test]
    fn failed_reads_keep_previous_values() {
        let mut snap = DashboardSnapshot::default();
        let account = Some(Address::repeat_byte(1));
        snap.apply_fast(
            account,
            FastReadings {
                balances: Balances {
                    bit: Some(U256::from(5u64)),
                    native: Some(U256::from(7u64)),
                    ..Default::default()
                },
                ..Default::default()
            },
            10,
        );
        snap.apply_fast(account, FastReadings::default(), 20);
        assert_eq!(snap.balances.bit, Some(U256::from(5u64)));
        assert_eq!(snap.balances.native, Some(U256::from(7u64)));
        assert_eq!(snap.fast_updated_at, 20);

        snap.apply_slow(
            SlowReadings {
                bit_price: Some(U256::from(1u64)),
                ..Default::default()
            },
            30,
        );
        snap.apply_slow(SlowReadings::default(), 40);
        assert_eq!(snap.bit_price, Some(U256::from(1u64)));
    }

    #[test]
    fn wallet_switch_clears_wallet_fields() {
        let mut snap = DashboardSnapshot::default();
        let reading = FastReadings {
            balances: Balances {
                bit: Some(U256::from(5u64)),
                ..Default::default()
            },
            ..Default::default()
        };
        snap.apply_fast(Some(Address::repeat_byte(1)), reading, 1);
        snap.apply_fast(Some(Address::repeat_byte(2)), FastReadings::default(), 2);
        assert_eq!(snap.balances.bit, None);
        assert_eq!(snap.account, Some(Address::repeat_byte(2)));
    }

    #[tokio::test]
    async fn poller_publishes_and_refreshes_on_demand() {
        let source = Arc::new(CountingSource {
            fast: AtomicUsize::new(0),
            slow: AtomicUsize::new(0),
        });
        let session = WalletSession::new();
        let shutdown = CancellationToken::new();
        let (poller, handle) = DashboardPoller::new(
            source.clone(),
            session.subscribe(),
            Duration::from_secs(3600),
            Duration::from_secs(3600),
            shutdown.clone(),
        );
        let task = tokio::spawn(poller.run());

        let mut rx = handle.subscribe();
        tokio::time::timeout(Duration::from_secs(5), async {
            while rx.borrow_and_update().slow_updated_at == 0 {
                rx.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
        assert!(handle.snapshot().bit_price.is_some());

        session.apply(SessionEvent::Connected {
            account: Address::repeat_byte(9),
            chain_id: CHAIN_BSC,
        });
        tokio::time::timeout(Duration::from_secs(5), async {
            while rx.borrow_and_update().balances.bit.is_none() {
                rx.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
        assert_eq!(handle.snapshot().account, Some(Address::repeat_byte(9)));

        let slow_before = source.slow.load(Ordering::SeqCst);
        handle.refresh_now();
        tokio::time::timeout(Duration::from_secs(5), async {
            while source.slow.load(Ordering::SeqCst) == slow_before {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        shutdown.cancel();
        task.await.unwrap().unwrap();
    }

    #[test]
    fn render_marks_missing_values() {
        let snap = DashboardSnapshot::default();
        let text = snap.render(0);
        assert!(text.contains("not connected"));
        assert!(text.contains("- BIT"));
    }

    #[test]
    fn render_trims_bit_and_marks_capped_transfers() {
        let snap = DashboardSnapshot {
            account: Some(Address::repeat_byte(1)),
            balances: Balances {
                bit: Some(U256::from(1_234_567_891u64)),
                ..Default::default()
            },
            explorer: Some(ExplorerStats {
                holders: 321,
                transfers: 10_000,
                holders_fallback: false,
                transfers_fallback: false,
                transfers_capped: true,
            }),
            ..Default::default()
        };
        let text = snap.render(0);
        assert!(text.contains("1.23 BIT"));
        assert!(!text.contains("1.2345"));
        assert!(text.contains("10000+ transfers"));
    }
}
