use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use bit_access::common::constants::{BIT_DECIMALS, CHAIN_BSC, CHAIN_POLYGON};
use bit_access::common::error::AppError;
use bit_access::domain::shop::{Item, ShippingInfo};
use bit_access::domain::units::whole_tokens;
use bit_access::infrastructure::contracts::TxOutcome;
use bit_access::services::exchange::{
    Approval, ExchangeContext, ExchangeStep, ExchangeWorkflow, ShopGateway,
};
use bit_access::services::notify::{OrderDetails, OrderNotifier};
use bit_access::services::session::{FixedEndpoint, NetworkGate, NetworkSwitcher, WalletSession};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct MockGateway {
    approvals: AtomicUsize,
    exchanges: AtomicUsize,
    fail_approve: bool,
    fail_exchange: bool,
    zero_hash: bool,
}

#[async_trait]
impl ShopGateway for MockGateway {
    async fn approve(&self, _owner: Address, item: &Item) -> Result<Approval, AppError> {
        self.approvals.fetch_add(1, Ordering::SeqCst);
        if self.fail_approve {
            return Err(AppError::Transaction {
                hash: String::new(),
                reason: "user rejected the request".into(),
            });
        }
        Ok(Approval {
            tx_hash: Some(B256::repeat_byte(0xaa)),
            amount: item.price,
        })
    }

    async fn exchange_item(&self, _owner: Address, _item: &Item) -> Result<TxOutcome, AppError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange {
            return Err(AppError::Transaction {
                hash: "0xdead".into(),
                reason: "exchangeItem reverted on-chain".into(),
            });
        }
        let tx_hash = if self.zero_hash {
            B256::ZERO
        } else {
            B256::repeat_byte(0xbb)
        };
        Ok(TxOutcome {
            tx_hash,
            block_number: Some(1),
            gas_used: 21_000,
        })
    }
}

#[derive(Default)]
struct MockNotifier {
    fail: bool,
    seen: Mutex<Vec<OrderDetails>>,
}

#[async_trait]
impl OrderNotifier for MockNotifier {
    async fn notify(&self, order: &OrderDetails) -> Result<String, AppError> {
        self.seen.lock().unwrap().push(order.clone());
        if self.fail {
            return Err(AppError::Connection("backend down".into()));
        }
        Ok("https://wa.me/2348012345678?text=hi".into())
    }
}

struct AcceptSwitch;

#[async_trait]
impl NetworkSwitcher for AcceptSwitch {
    async fn request_switch(&self, _target: u64) -> Result<bool, AppError> {
        Ok(true)
    }
}

fn item() -> Item {
    Item {
        id: 4,
        name: "Ceramic mug".into(),
        description: "350ml".into(),
        price: whole_tokens(250, BIT_DECIMALS),
        merchant: Address::repeat_byte(0x22),
        stock: 5,
        active: true,
        category: "Home".into(),
        image_url: String::new(),
        merchant_whatsapp: "+234 801 234 5678".into(),
    }
}

fn shipping() -> ShippingInfo {
    ShippingInfo {
        full_name: "Ada Obi".into(),
        email: "ada@example.com".into(),
        phone_number: "+234 800 000 0000".into(),
        city: "Lagos".into(),
        state: "Lagos".into(),
        country: "Nigeria".into(),
        zip_code: "100001".into(),
        landmark: None,
    }
}

fn context(
    gateway: Arc<MockGateway>,
    notifier: Arc<MockNotifier>,
    session: WalletSession,
    switcher: Arc<dyn NetworkSwitcher>,
) -> ExchangeContext {
    ExchangeContext {
        gateway,
        notifier,
        session: Arc::new(session),
        switcher,
        gate: NetworkGate::new(CHAIN_BSC),
    }
}

fn connected() -> WalletSession {
    WalletSession::connected(Address::repeat_byte(0x01), CHAIN_BSC)
}

#[tokio::test]
async fn full_flow_reaches_receipt() {
    let gateway = Arc::new(MockGateway::default());
    let notifier = Arc::new(MockNotifier::default());
    let ctx = context(gateway.clone(), notifier.clone(), connected(), Arc::new(FixedEndpoint));
    let mut flow = ExchangeWorkflow::new(item(), ctx).unwrap();

    assert!(matches!(flow.approve().await.unwrap(), ExchangeStep::Shipping { .. }));
    assert!(matches!(
        flow.submit_shipping(shipping()).unwrap(),
        ExchangeStep::Exchange { .. }
    ));
    let receipt = flow.exchange().await.unwrap();

    assert_eq!(receipt.item_id, 4);
    assert_eq!(receipt.display_price, "250 BIT");
    assert_eq!(receipt.tx_hash, B256::repeat_byte(0xbb));
    assert!(receipt.explorer_url.starts_with("https://bscscan.com/tx/0xbbbb"));
    assert_eq!(
        receipt.whatsapp_url.as_deref(),
        Some("https://wa.me/2348012345678?text=hi")
    );
    assert!(flow.receipt().is_some());

    let seen = notifier.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].item_name, "Ceramic mug");
    assert_eq!(seen[0].tx_hash, format!("0x{}", "bb".repeat(32)));
}

#[tokio::test]
async fn exchange_is_unreachable_without_approval() {
    let gateway = Arc::new(MockGateway::default());
    let ctx = context(
        gateway.clone(),
        Arc::new(MockNotifier::default()),
        connected(),
        Arc::new(FixedEndpoint),
    );
    let mut flow = ExchangeWorkflow::new(item(), ctx).unwrap();

    assert!(matches!(flow.exchange().await, Err(AppError::Workflow(_))));
    assert!(matches!(
        flow.submit_shipping(shipping()),
        Err(AppError::Workflow(_))
    ));
    assert_eq!(gateway.exchanges.load(Ordering::SeqCst), 0);
    assert_eq!(flow.step(), &ExchangeStep::Approve);
}

#[tokio::test]
async fn failed_approval_keeps_step() {
    let gateway = Arc::new(MockGateway {
        fail_approve: true,
        ..Default::default()
    });
    let ctx = context(
        gateway,
        Arc::new(MockNotifier::default()),
        connected(),
        Arc::new(FixedEndpoint),
    );
    let mut flow = ExchangeWorkflow::new(item(), ctx).unwrap();

    assert!(matches!(flow.approve().await, Err(AppError::Transaction { .. })));
    assert_eq!(flow.step(), &ExchangeStep::Approve);
}

#[tokio::test]
async fn invalid_shipping_keeps_step() {
    let ctx = context(
        Arc::new(MockGateway::default()),
        Arc::new(MockNotifier::default()),
        connected(),
        Arc::new(FixedEndpoint),
    );
    let mut flow = ExchangeWorkflow::new(item(), ctx).unwrap();
    flow.approve().await.unwrap();

    let mut bad = shipping();
    bad.email = "not-an-email".into();
    assert!(matches!(
        flow.submit_shipping(bad),
        Err(AppError::Validation { .. })
    ));
    assert!(matches!(flow.step(), ExchangeStep::Shipping { .. }));
}

#[tokio::test]
async fn reverted_exchange_stays_on_exchange_step() {
    let gateway = Arc::new(MockGateway {
        fail_exchange: true,
        ..Default::default()
    });
    let notifier = Arc::new(MockNotifier::default());
    let ctx = context(gateway, notifier.clone(), connected(), Arc::new(FixedEndpoint));
    let mut flow = ExchangeWorkflow::new(item(), ctx).unwrap();
    flow.approve().await.unwrap();
    flow.submit_shipping(shipping()).unwrap();

    assert!(flow.exchange().await.is_err());
    assert!(matches!(flow.step(), ExchangeStep::Exchange { .. }));
    assert!(notifier.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn zero_hash_never_produces_receipt() {
    let gateway = Arc::new(MockGateway {
        zero_hash: true,
        ..Default::default()
    });
    let ctx = context(
        gateway,
        Arc::new(MockNotifier::default()),
        connected(),
        Arc::new(FixedEndpoint),
    );
    let mut flow = ExchangeWorkflow::new(item(), ctx).unwrap();
    flow.approve().await.unwrap();
    flow.submit_shipping(shipping()).unwrap();

    assert!(matches!(flow.exchange().await, Err(AppError::Transaction { .. })));
    assert!(flow.receipt().is_none());
}

#[tokio::test]
async fn notification_failure_does_not_fail_exchange() {
    let notifier = Arc::new(MockNotifier {
        fail: true,
        ..Default::default()
    });
    let ctx = context(
        Arc::new(MockGateway::default()),
        notifier,
        connected(),
        Arc::new(FixedEndpoint),
    );
    let mut flow = ExchangeWorkflow::new(item(), ctx).unwrap();
    flow.approve().await.unwrap();
    flow.submit_shipping(shipping()).unwrap();

    let receipt = flow.exchange().await.unwrap();
    assert!(receipt.whatsapp_url.is_none());
    assert!(receipt.notify_error.is_some());
}

#[tokio::test]
async fn wrong_network_blocks_before_gateway_call() {
    let gateway = Arc::new(MockGateway::default());
    let session = WalletSession::connected(Address::repeat_byte(0x01), CHAIN_POLYGON);
    let ctx = context(
        gateway.clone(),
        Arc::new(MockNotifier::default()),
        session,
        Arc::new(FixedEndpoint),
    );
    let mut flow = ExchangeWorkflow::new(item(), ctx).unwrap();

    assert!(matches!(flow.approve().await, Err(AppError::WrongNetwork { .. })));
    assert_eq!(gateway.approvals.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn accepted_switch_lets_approval_through() {
    let gateway = Arc::new(MockGateway::default());
    let session = WalletSession::connected(Address::repeat_byte(0x01), CHAIN_POLYGON);
    let ctx = context(
        gateway.clone(),
        Arc::new(MockNotifier::default()),
        session,
        Arc::new(AcceptSwitch),
    );
    let mut flow = ExchangeWorkflow::new(item(), ctx).unwrap();

    flow.approve().await.unwrap();
    assert_eq!(gateway.approvals.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn disconnected_wallet_is_blocked_and_reset_restarts() {
    let ctx = context(
        Arc::new(MockGateway::default()),
        Arc::new(MockNotifier::default()),
        WalletSession::new(),
        Arc::new(FixedEndpoint),
    );
    let mut flow = ExchangeWorkflow::new(item(), ctx.clone()).unwrap();
    assert!(matches!(flow.approve().await, Err(AppError::WalletNotConnected)));

    let mut flow = ExchangeWorkflow::new(
        item(),
        ExchangeContext {
            session: Arc::new(connected()),
            ..ctx
        },
    )
    .unwrap();
    flow.approve().await.unwrap();
    flow.reset();
    assert_eq!(flow.step(), &ExchangeStep::Approve);
}

#[test]
fn sold_out_items_cannot_start_a_flow() {
    let mut sold_out = item();
    sold_out.stock = 0;
    let ctx = context(
        Arc::new(MockGateway::default()),
        Arc::new(MockNotifier::default()),
        connected(),
        Arc::new(FixedEndpoint),
    );
    assert!(matches!(
        ExchangeWorkflow::new(sold_out, ctx),
        Err(AppError::Workflow(_))
    ));
}
