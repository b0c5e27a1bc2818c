//! In-memory broker used by the unit tests

use crate::ack::confirm_channel;
use crate::config::DialConfig;
use crate::message::PublishMessage;
use crate::traits::{
    BrokerChannel, BrokerConnection, BrokerConnector, BrokerError, Confirmation, QueueSpec,
};

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Default)]
pub(crate) struct MockState {
    pub dials: AtomicUsize,
    pub closes: AtomicUsize,
    pub publishes: AtomicUsize,
    pub overlaps: AtomicUsize,
    pub fail_dial_from: Option<usize>,
    pub stall_dial: bool,
    pub fail_declare: bool,
    pub lose_channel_on_confirms: bool,
    pub confirms_supported: bool,
    pub nack_every: Option<u64>,
    pub fail_on: HashSet<usize>,
    pub stall_after: Option<usize>,
    pub publish_delay: Option<Duration>,
}

/// Connector over shared, inspectable state
#[derive(Clone)]
pub(crate) struct MockBroker {
    pub state: Arc<MockState>,
}

impl MockBroker {
    pub fn new() -> Self {
        Self::from_state(MockState {
            confirms_supported: true,
            ..Default::default()
        })
    }

    pub fn from_state(state: MockState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    pub fn dials(&self) -> usize {
        self.state.dials.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn publishes(&self) -> usize {
        self.state.publishes.load(Ordering::SeqCst)
    }

    pub fn overlaps(&self) -> usize {
        self.state.overlaps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrokerConnector for MockBroker {
    fn broker_name(&self) -> &str {
        "mock"
    }

    async fn connect(
        &self,
        target: &str,
        _dial: &DialConfig,
    ) -> Result<Box<dyn BrokerConnection>, BrokerError> {
        let dial = self.state.dials.fetch_add(1, Ordering::SeqCst) + 1;
        if self.state.stall_dial {
            std::future::pending::<()>().await;
        }
        if let Some(from) = self.state.fail_dial_from {
            if dial >= from {
                return Err(BrokerError::Connect(format!("{target}: connection refused")));
            }
        }
        Ok(Box::new(MockConnection {
            state: Arc::clone(&self.state),
            queue: format!("amq.gen-{dial}"),
            closed: Arc::new(AtomicBool::new(false)),
        }))
    }
}

struct MockConnection {
    state: Arc<MockState>,
    queue: String,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl BrokerConnection for MockConnection {
    async fn open_channel(&self) -> Result<Box<dyn BrokerChannel>, BrokerError> {
        Ok(Box::new(MockChannel {
            state: Arc::clone(&self.state),
            queue: self.queue.clone(),
            closed: Arc::clone(&self.closed),
            busy: AtomicBool::new(false),
            next_tag: AtomicU64::new(1),
            confirms: OnceLock::new(),
        }))
    }

    async fn close(&self) -> Result<(), BrokerError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(BrokerError::Closed);
        }
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockChannel {
    state: Arc<MockState>,
    queue: String,
    closed: Arc<AtomicBool>,
    busy: AtomicBool,
    next_tag: AtomicU64,
    confirms: OnceLock<mpsc::Sender<Confirmation>>,
}

#[async_trait]
impl BrokerChannel for MockChannel {
    async fn enable_confirms(&self) -> Result<mpsc::Receiver<Confirmation>, BrokerError> {
        if self.state.lose_channel_on_confirms {
            return Err(BrokerError::Channel("channel closed by broker".into()));
        }
        if !self.state.confirms_supported {
            return Err(BrokerError::Confirms("NOT_IMPLEMENTED".into()));
        }
        let (tx, rx) = confirm_channel();
        let _ = self.confirms.set(tx);
        Ok(rx)
    }

    async fn declare_queue(&self, spec: &QueueSpec) -> Result<String, BrokerError> {
        if self.state.fail_declare {
            return Err(BrokerError::Declare("ACCESS_REFUSED".into()));
        }
        assert_eq!(spec, &QueueSpec::scratch());
        Ok(self.queue.clone())
    }

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        _message: &PublishMessage,
    ) -> Result<(), BrokerError> {
        assert_eq!(exchange, "");
        assert_eq!(routing_key, self.queue);

        if self.closed.load(Ordering::SeqCst) {
            return Err(BrokerError::Closed);
        }
        if self.busy.swap(true, Ordering::SeqCst) {
            self.state.overlaps.fetch_add(1, Ordering::SeqCst);
        }

        let n = self.state.publishes.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(stall) = self.state.stall_after {
            if n > stall {
                std::future::pending::<()>().await;
            }
        }
        if let Some(delay) = self.state.publish_delay {
            tokio::time::sleep(delay).await;
        }
        self.busy.store(false, Ordering::SeqCst);

        if self.state.fail_on.contains(&n) {
            return Err(BrokerError::Publish(format!("simulated failure #{n}")));
        }

        if let Some(tx) = self.confirms.get() {
            let tag = self.next_tag.fetch_add(1, Ordering::SeqCst);
            let nack = self
                .state
                .nack_every
                .is_some_and(|every| tag % every == 0);
            let confirmation = if nack {
                Confirmation::nack(tag)
            } else {
                Confirmation::ack(tag)
            };
            let _ = tx.try_send(confirmation);
        }
        Ok(())
    }
}
