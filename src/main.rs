// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use bit_access::api::{AppState, spawn_server};
use bit_access::app::config::GlobalSettings;
use bit_access::app::logging::setup_logging;
use bit_access::common::constants::{
    BIT_DECIMALS, NATIVE_DECIMALS, STABLE_DECIMALS, advertised_chains, explorer_tx_url,
};
use bit_access::common::parsing::parse_address_hex;
use bit_access::domain::countdown::current_unix;
use bit_access::domain::error::AppError;
use bit_access::domain::shop::ShippingInfo;
use bit_access::domain::staking::StakingTier;
use bit_access::domain::units::{calculate_bit, format_units, parse_units, usd_to_stable_units};
use bit_access::infrastructure::contracts::{Contracts, NewListing, Stablecoin, TokenClient, TxOutcome};
use bit_access::infrastructure::network::explorer::{ExplorerClient, Fallbacks};
use bit_access::infrastructure::network::provider::{ChainProvider, ConnectionFactory};
use bit_access::infrastructure::storage::ImageStore;
use bit_access::services::dashboard::{ChainDashboardSource, DashboardPoller};
use bit_access::services::exchange::{ChainShopGateway, ExchangeContext, ExchangeWorkflow};
use bit_access::services::notify::WhatsAppOrderNotifier;
use bit_access::services::session::{FixedEndpoint, NetworkGate, NetworkSwitcher, WalletSession};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(author, version, about = "BIT Access dashboard services")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Emit JSON logs (overrides config)
    #[arg(long, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the backend HTTP API (order links, image storage, stats)
    Serve {
        /// Listen address (overrides config)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Poll and print the dashboard until interrupted
    Watch {
        /// Read-only view of another wallet
        #[arg(long)]
        account: Option<String>,
        /// Print one snapshot and exit
        #[arg(long, default_value_t = false)]
        once: bool,
    },
    /// Holder and transfer counts from the block explorer
    Stats,
    /// Networks in picker order; inactive ones are listed but not usable
    Networks,
    /// BIT received for a USD amount
    Quote {
        amount_usd: String,
        /// USD per BIT; read from the presale contract when omitted
        #[arg(long)]
        price: Option<String>,
    },
    /// List Exchange Shop items
    Items {
        #[arg(long)]
        category: Option<String>,
        /// Hide inactive and sold-out items
        #[arg(long, default_value_t = false)]
        available: bool,
    },
    /// Exchange BIT for a shop item (approve, shipping, exchange)
    Exchange {
        item_id: u64,
        #[command(flatten)]
        shipping: ShippingArgs,
    },
    /// Buy BIT in the presale
    Buy {
        /// USD amount for stablecoins, BNB amount for native payment
        amount: String,
        /// usdt, usdc or bnb
        #[arg(long, default_value = "usdt")]
        pay: String,
        /// Send the stablecoin approval first when the allowance is short
        #[arg(long, default_value_t = false)]
        approve: bool,
    },
    /// Stake BIT for a fixed term
    Stake {
        amount: String,
        /// 30, 90, 180 or 365
        #[arg(long, default_value = "30")]
        days: StakingTier,
        #[arg(long, default_value_t = false)]
        approve: bool,
    },
    /// Withdraw an unlocked stake
    Unstake { index: u64 },
    /// Daily airdrop check-in
    CheckIn,
    /// Claim accumulated airdrop rewards
    Claim,
    /// Complete a community task
    CompleteTask {
        task_id: u64,
        /// Record the link visit first
        #[arg(long, default_value_t = false)]
        visit: bool,
    },
    /// List a new Exchange Shop item (admin)
    ListItem {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Price in BIT
        #[arg(long)]
        price: String,
        #[arg(long)]
        stock: u64,
        #[arg(long, default_value = "General")]
        category: String,
        /// Local image to upload into the object store
        #[arg(long, conflicts_with = "image_url")]
        image: Option<std::path::PathBuf>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        whatsapp: String,
    },
}

#[derive(Args, Debug)]
struct ShippingArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    country: String,
    #[arg(long)]
    zip: String,
    #[arg(long)]
    landmark: Option<String>,
}

impl From<ShippingArgs> for ShippingInfo {
    fn from(a: ShippingArgs) -> Self {
        ShippingInfo {
            full_name: a.full_name,
            email: a.email,
            phone_number: a.phone,
            city: a.city,
            state: a.state,
            country: a.country,
            zip_code: a.zip,
            landmark: a.landmark,
        }
    }
}

/// Everything a command needs to talk to the chain.
struct Runtime {
    settings: GlobalSettings,
    provider: ChainProvider,
    contracts: Contracts,
    session: Arc<WalletSession>,
    gate: NetworkGate,
    switcher: Arc<dyn NetworkSwitcher>,
}

impl Runtime {
    async fn connect(settings: GlobalSettings) -> Result<Self, AppError> {
        let rpc = settings.get_http_provider(settings.chain_id)?;
        let (provider, account) = match settings.wallet_key_value() {
            Some(key) => {
                let signer = ConnectionFactory::signer(&key)?;
                let account = signer.address();
                (ConnectionFactory::with_wallet(&rpc, signer)?, Some(account))
            }
            None => (ConnectionFactory::read_only(&rpc)?, None),
        };

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| AppError::Connection(format!("chain_id detect failed: {e}")))?;
        if chain_id != settings.chain_id {
            tracing::warn!(
                target: "config",
                configured = settings.chain_id,
                detected = chain_id,
                "RPC endpoint serves a different chain than configured"
            );
        }

        let session = Arc::new(match account {
            Some(a) => WalletSession::connected(a, chain_id),
            None => WalletSession::new(),
        });
        tracing::info!(target: "config", chain_id, account = ?account, rpc = %rpc, "Connected");

        let contracts = Contracts::new(provider.clone(), &settings.contract_addresses());
        let gate = NetworkGate::new(settings.chain_id);
        Ok(Self {
            settings,
            provider,
            contracts,
            session,
            gate,
            switcher: Arc::new(FixedEndpoint),
        })
    }

    async fn preflight(&self) -> Result<Address, AppError> {
        self.gate
            .preflight(&self.session, self.switcher.as_ref())
            .await
    }

    fn chain_id(&self) -> u64 {
        self.session.state().chain_id.unwrap_or(self.settings.chain_id)
    }

    fn report(&self, action: &str, outcome: &TxOutcome) {
        let hash = format!("{:#x}", outcome.tx_hash);
        println!("{action} confirmed: {}", explorer_tx_url(self.chain_id(), &hash));
    }
}

fn explorer_client(settings: &GlobalSettings) -> Result<ExplorerClient, AppError> {
    ExplorerClient::new(
        settings.explorer_api_url.clone(),
        settings.explorer_api_key_value(),
        settings.contract_addresses().bit_token,
        Fallbacks {
            holders: settings.holders_fallback,
            transfers: settings.transfers_fallback,
        },
    )
}

fn image_store(settings: &GlobalSettings) -> ImageStore {
    ImageStore::new(
        settings.upload_dir_path(),
        settings.public_base_url_value(),
        settings.max_upload_bytes,
    )
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Unknown(anyhow::anyhow!("serialize output: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Check the allowance and, when allowed to, approve the shortfall first.
async fn ensure_or_approve(
    rt: &Runtime,
    token: &TokenClient,
    owner: Address,
    spender: Address,
    amount: U256,
    approve: bool,
) -> Result<(), AppError> {
    match token.ensure_allowance(owner, spender, amount).await {
        Err(AppError::InsufficientAllowance { .. }) if approve => {
            let outcome = token.approve(spender, amount).await?;
            rt.report("approve", &outcome);
            Ok(())
        }
        other => other,
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = GlobalSettings::load_with_path(cli.config.as_deref())?;
    setup_logging(
        if settings.debug { "debug" } else { "info" },
        cli.log_json || settings.log_json,
    );

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.server_bind.clone());
            let state = Arc::new(AppState::new(
                image_store(&settings),
                explorer_client(&settings)?,
            ));
            let shutdown = CancellationToken::new();
            spawn_server(&bind, state, shutdown.clone()).await?;
            tokio::signal::ctrl_c()
                .await
                .map_err(|e| AppError::Initialization(format!("signal handler: {e}")))?;
            tracing::info!(target: "api", "Shutdown requested");
            shutdown.cancel();
        }
        Command::Stats => {
            print_json(&explorer_client(&settings)?.stats().await)?;
        }
        Command::Networks => {
            for chain in advertised_chains() {
                let marker = if chain.id == settings.chain_id { "*" } else { " " };
                let status = if chain.active { "active" } else { "coming soon" };
                println!("{marker} {:>6}  {:<24} {:<5} {status}", chain.id, chain.name, chain.native_symbol);
            }
        }
        Command::Quote { amount_usd, price } => {
            let price = match price {
                Some(p) => p,
                None => {
                    let rt = Runtime::connect(settings).await?;
                    let raw = rt.contracts.purchase()?.bit_price().await?;
                    format_units(raw, STABLE_DECIMALS)
                }
            };
            println!("{} BIT at ${} per BIT", calculate_bit(&amount_usd, &price)?, price);
        }
        Command::Watch { account, once } => {
            let explorer = explorer_client(&settings)?;
            let fast = settings.fast_poll_interval();
            let slow = settings.slow_poll_interval();
            let rt = Runtime::connect(settings).await?;
            let session = match account.as_deref() {
                Some(raw) => {
                    let a = parse_address_hex(raw)
                        .ok_or_else(|| AppError::InvalidAddress(raw.to_string()))?;
                    Arc::new(WalletSession::connected(a, rt.chain_id()))
                }
                None => rt.session.clone(),
            };

            let source = Arc::new(ChainDashboardSource::new(
                rt.provider.clone(),
                rt.contracts.clone(),
                explorer,
            ));
            let shutdown = CancellationToken::new();
            let (poller, handle) =
                DashboardPoller::new(source, session.subscribe(), fast, slow, shutdown.clone());
            let task = tokio::spawn(poller.run());

            let mut updates = handle.subscribe();
            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let snap = updates.borrow_and_update().clone();
                        if snap.fast_updated_at == 0 || snap.slow_updated_at == 0 {
                            continue;
                        }
                        println!("{}", snap.render(current_unix()));
                        if once {
                            break;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            shutdown.cancel();
            task.await
                .map_err(|e| AppError::Unknown(anyhow::anyhow!("poller join: {e}")))??;
        }
        Command::Items {
            category,
            available,
        } => {
            let rt = Runtime::connect(settings).await?;
            let catalog = rt.contracts.shop()?.items().await?;
            let items: Vec<_> = catalog
                .items()
                .iter()
                .filter(|i| !available || i.is_available())
                .filter(|i| {
                    category
                        .as_deref()
                        .is_none_or(|c| i.category.eq_ignore_ascii_case(c))
                })
                .collect();
            for item in items {
                println!(
                    "#{:<4} {:<32} {:>16}  stock {:<4} [{}]",
                    item.id,
                    item.name,
                    item.display_price(),
                    item.stock,
                    item.category
                );
            }
            println!("categories: {}", catalog.categories().join(", "));
        }
        Command::Exchange { item_id, shipping } => {
            let notify_url = settings.order_notify_url_value();
            let rt = Runtime::connect(settings).await?;
            let shop = rt.contracts.shop()?.clone();
            let bit = rt.contracts.bit()?.clone();
            let item = shop.item(item_id).await?;

            let ctx = ExchangeContext {
                gateway: Arc::new(ChainShopGateway::new(bit, shop)),
                notifier: Arc::new(WhatsAppOrderNotifier::new(notify_url)?),
                session: rt.session.clone(),
                switcher: rt.switcher.clone(),
                gate: rt.gate,
            };
            let mut flow = ExchangeWorkflow::new(item, ctx)?;
            flow.approve().await?;
            flow.submit_shipping(shipping.into())?;
            let receipt = flow.exchange().await?;
            print_json(&receipt)?;
        }
        Command::Buy {
            amount,
            pay,
            approve,
        } => {
            let rt = Runtime::connect(settings).await?;
            let owner = rt.preflight().await?;
            let purchase = rt.contracts.purchase()?;
            let outcome = if pay.eq_ignore_ascii_case("bnb") {
                let value = parse_units(&amount, NATIVE_DECIMALS)?;
                purchase.buy_with_bnb(value).await?
            } else {
                let coin: Stablecoin = pay.parse()?;
                let token = rt.contracts.stablecoin(coin)?;
                let units = usd_to_stable_units(&amount, token.decimals())?;
                token.ensure_balance(owner, units).await?;
                ensure_or_approve(&rt, token, owner, purchase.address(), units, approve).await?;
                purchase.buy_with_stable(coin, units).await?
            };
            rt.report("buy", &outcome);
        }
        Command::Stake {
            amount,
            days,
            approve,
        } => {
            let rt = Runtime::connect(settings).await?;
            let owner = rt.preflight().await?;
            let staking = rt.contracts.staking()?;
            let bit = rt.contracts.bit()?;
            let units = parse_units(&amount, BIT_DECIMALS)?;
            bit.ensure_balance(owner, units).await?;
            ensure_or_approve(&rt, bit, owner, staking.address(), units, approve).await?;
            let outcome = staking.stake(units, days).await?;
            rt.report("stake", &outcome);
        }
        Command::Unstake { index } => {
            let rt = Runtime::connect(settings).await?;
            let owner = rt.preflight().await?;
            let staking = rt.contracts.staking()?;
            let now = current_unix();
            if let Some(position) = staking
                .user_stakes(owner)
                .await?
                .into_iter()
                .find(|s| s.index == index)
                && !position.is_unlocked(now)
            {
                return Err(AppError::Workflow(format!(
                    "stake #{index} unlocks in {}",
                    position.countdown(now)
                )));
            }
            let outcome = staking.unstake(index).await?;
            rt.report("unstake", &outcome);
        }
        Command::CheckIn => {
            let rt = Runtime::connect(settings).await?;
            let owner = rt.preflight().await?;
            let airdrop = rt.contracts.airdrop()?;
            let status = airdrop.status(owner).await?;
            let now = current_unix();
            if !status.can_check_in(now) {
                return Err(AppError::Workflow(format!(
                    "next check-in in {}",
                    status.countdown(now)
                )));
            }
            let outcome = airdrop.check_in().await?;
            rt.report("checkIn", &outcome);
        }
        Command::Claim => {
            let rt = Runtime::connect(settings).await?;
            let owner = rt.preflight().await?;
            let airdrop = rt.contracts.airdrop()?;
            if airdrop.status(owner).await?.claimable.is_zero() {
                return Err(AppError::Workflow("nothing to claim".into()));
            }
            let outcome = airdrop.claim().await?;
            rt.report("claim", &outcome);
        }
        Command::CompleteTask { task_id, visit } => {
            let rt = Runtime::connect(settings).await?;
            rt.preflight().await?;
            let tasks = rt.contracts.tasks()?;
            if visit {
                let outcome = tasks.visit_link(task_id).await?;
                rt.report("visitLink", &outcome);
            }
            let outcome = tasks.complete_task(task_id).await?;
            rt.report("completeTask", &outcome);
        }
        Command::ListItem {
            name,
            description,
            price,
            stock,
            category,
            image,
            image_url,
            whatsapp,
        } => {
            let image_url = match image {
                Some(path) => {
                    let bytes = tokio::fs::read(&path).await.map_err(|e| {
                        AppError::Storage(format!("read {}: {}", path.display(), e))
                    })?;
                    let file_name = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("image");
                    let content_type = match path.extension().and_then(|e| e.to_str()) {
                        Some("png") => "image/png",
                        Some("gif") => "image/gif",
                        Some("webp") => "image/webp",
                        _ => "image/jpeg",
                    };
                    image_store(&settings)
                        .put(file_name, content_type, &bytes)
                        .await?
                        .public_url
                }
                None => image_url.unwrap_or_default(),
            };

            let rt = Runtime::connect(settings).await?;
            rt.preflight().await?;
            let listing = NewListing {
                name,
                description,
                price: parse_units(&price, BIT_DECIMALS)?,
                stock,
                category,
                image_url,
                merchant_whatsapp: whatsapp,
            };
            let outcome = rt.contracts.shop()?.list_item(listing).await?;
            rt.report("listItem", &outcome);
        }
    }
    Ok(())
}
