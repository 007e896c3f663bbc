use crate::domain::ports::{Gateway, StatusReport};
use crate::domain::transaction::{Transaction, TransactionStatus};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-process stand-in for a payment processor.
///
/// Approves everything and hands out sequential ids of the form
/// `<provider>-<n>`. An offline dummy fails every call with a connection error,
/// which is handy for exercising failover.
#[derive(Debug)]
pub struct DummyGateway {
    provider: String,
    trans_amount_limit: Option<Decimal>,
    offline: bool,
    issued: AtomicU64,
}

impl DummyGateway {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            trans_amount_limit: None,
            offline: false,
            issued: AtomicU64::new(0),
        }
    }

    pub fn offline(provider: impl Into<String>) -> Self {
        Self {
            offline: true,
            ..Self::new(provider)
        }
    }

    pub fn with_trans_amount_limit(mut self, limit: Decimal) -> Self {
        self.trans_amount_limit = Some(limit);
        self
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    fn next_id(&self) -> Result<String> {
        if self.offline {
            return Err(GatewayError::ConnectionError(format!(
                "{} is offline",
                self.provider
            ))
            .into());
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("{}-{}", self.provider, n))
    }
}

impl Default for DummyGateway {
    fn default() -> Self {
        Self::new("dummy")
    }
}

#[async_trait]
impl Gateway for DummyGateway {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn trans_amount_limit(&self) -> Option<Decimal> {
        self.trans_amount_limit
    }

    async fn charge(&self, _tx: &Transaction) -> Result<String> {
        self.next_id()
    }

    async fn authorize(&self, _tx: &Transaction) -> Result<String> {
        self.next_id()
    }

    async fn capture(&self, _tx: &Transaction) -> Result<String> {
        self.next_id()
    }

    async fn refund(&self, _tx: &Transaction) -> Result<String> {
        self.next_id()
    }

    async fn credit(&self, _tx: &Transaction) -> Result<String> {
        self.next_id()
    }

    async fn void(&self, _tx: &Transaction) -> Result<String> {
        self.next_id()
    }

    async fn status(&self, tx: &Transaction) -> Result<StatusReport> {
        if self.offline {
            self.next_id()?;
        }
        let transaction_id = tx
            .transaction_id
            .clone()
            .ok_or_else(|| GatewayError::TransactionNotFound("no transaction id".to_string()))?;
        Ok(StatusReport {
            transaction_id,
            status: TransactionStatus::Complete,
        })
    }
}
