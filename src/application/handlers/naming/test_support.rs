//! Shared fixtures for the naming handler tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use super::{
    AcceptApplicationHandler, ApplyForNameHandler, CancelApplicationHandler,
    RejectApplicationHandler, ToggleNameHandler,
};
use crate::adapters::memory::{InMemoryConnectionSource, InMemoryCurrencyGateway};
use crate::application::{ApplicationQueue, NameRegistry, Session};
use crate::domain::foundation::OwnerId;
use crate::ports::{CurrencyError, CurrencyGateway};

type Hook = Box<dyn Fn() + Send + Sync>;

/// Currency gateway over an in-memory ledger whose calls can be made to fail.
pub(super) struct ScriptedGateway {
    ledger: Arc<InMemoryCurrencyGateway>,
    fail_consume: AtomicBool,
    fail_add_back: AtomicBool,
    consume_calls: AtomicU32,
    add_back_calls: AtomicU32,
    on_consume: Mutex<Option<Hook>>,
    on_add_back: Mutex<Option<Hook>>,
}

impl ScriptedGateway {
    fn new(ledger: Arc<InMemoryCurrencyGateway>) -> Self {
        Self {
            ledger,
            fail_consume: AtomicBool::new(false),
            fail_add_back: AtomicBool::new(false),
            consume_calls: AtomicU32::new(0),
            add_back_calls: AtomicU32::new(0),
            on_consume: Mutex::new(None),
            on_add_back: Mutex::new(None),
        }
    }

    pub(super) fn fail_consume(&self, fail: bool) {
        self.fail_consume.store(fail, Ordering::SeqCst);
    }

    pub(super) fn fail_add_back(&self, fail: bool) {
        self.fail_add_back.store(fail, Ordering::SeqCst);
    }

    /// Runs `hook` at the start of every `consume` call.
    pub(super) fn on_consume(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_consume.lock().unwrap() = Some(Box::new(hook));
    }

    /// Runs `hook` at the start of every `add_back` call.
    pub(super) fn on_add_back(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_add_back.lock().unwrap() = Some(Box::new(hook));
    }

    pub(super) fn consume_calls(&self) -> u32 {
        self.consume_calls.load(Ordering::SeqCst)
    }

    pub(super) fn add_back_calls(&self) -> u32 {
        self.add_back_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CurrencyGateway for ScriptedGateway {
    async fn consume(&self, owner: OwnerId, amount: i64, memo: &str) -> Result<i64, CurrencyError> {
        self.consume_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = self.on_consume.lock().unwrap().as_ref() {
            hook();
        }
        if self.fail_consume.load(Ordering::SeqCst) {
            return Err(CurrencyError::unavailable("scripted consume failure"));
        }
        self.ledger.consume(owner, amount, memo).await
    }

    async fn add_back(&self, owner: OwnerId, amount: i64, memo: &str) -> Result<i64, CurrencyError> {
        self.add_back_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = self.on_add_back.lock().unwrap().as_ref() {
            hook();
        }
        if self.fail_add_back.load(Ordering::SeqCst) {
            return Err(CurrencyError::unavailable("scripted refund failure"));
        }
        self.ledger.add_back(owner, amount, memo).await
    }

    fn currency_name(&self) -> &str {
        self.ledger.currency_name()
    }
}

/// Registry, queue, and gateway wired over one in-memory store.
pub(super) struct Harness {
    pub source: Arc<InMemoryConnectionSource>,
    pub registry: Arc<NameRegistry>,
    pub queue: Arc<ApplicationQueue>,
    pub ledger: Arc<InMemoryCurrencyGateway>,
    pub gateway: Arc<ScriptedGateway>,
}

impl Harness {
    pub(super) fn new() -> Self {
        let source = Arc::new(InMemoryConnectionSource::new());
        let session = Arc::new(Session::new(source.clone()));
        let registry = Arc::new(NameRegistry::new(session.clone()));
        let queue = Arc::new(ApplicationQueue::new(session, registry.clone()));
        let ledger = Arc::new(InMemoryCurrencyGateway::default());
        let gateway = Arc::new(ScriptedGateway::new(ledger.clone()));
        Self {
            source,
            registry,
            queue,
            ledger,
            gateway,
        }
    }

    pub(super) fn apply_handler(&self) -> ApplyForNameHandler {
        ApplyForNameHandler::new(self.queue.clone(), self.gateway.clone())
    }

    pub(super) fn accept_handler(&self) -> AcceptApplicationHandler {
        AcceptApplicationHandler::new(self.queue.clone(), self.registry.clone())
    }

    pub(super) fn reject_handler(&self) -> RejectApplicationHandler {
        RejectApplicationHandler::new(self.queue.clone(), self.gateway.clone())
    }

    pub(super) fn cancel_handler(&self) -> CancelApplicationHandler {
        CancelApplicationHandler::new(self.queue.clone(), self.gateway.clone())
    }

    pub(super) fn toggle_handler(&self) -> ToggleNameHandler {
        ToggleNameHandler::new(self.registry.clone(), self.gateway.clone())
    }
}
