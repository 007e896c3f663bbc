use super::counter::{CountDelta, CounterLimits, Counts, LimitKind, Reservation};
use super::operation::Operation;
use super::transaction::{Transaction, TransactionStatus};
use crate::error::{GatewayError, PaymentError, Result, StorageResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Result of a status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub transaction_id: String,
    pub status: TransactionStatus,
}

/// A payment processor integration.
///
/// Implementations map the transaction onto their wire format and classify the
/// processor's answer into the shared error taxonomy. Each operation returns the
/// provider's transaction id.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Tag identifying the processor; counter storage is keyed by it.
    fn provider(&self) -> &str;

    /// Largest amount a single transaction may carry on this gateway.
    fn trans_amount_limit(&self) -> Option<Decimal> {
        None
    }

    async fn charge(&self, tx: &Transaction) -> Result<String>;
    async fn authorize(&self, tx: &Transaction) -> Result<String>;
    async fn capture(&self, tx: &Transaction) -> Result<String>;
    async fn refund(&self, tx: &Transaction) -> Result<String>;
    async fn credit(&self, tx: &Transaction) -> Result<String>;
    async fn void(&self, tx: &Transaction) -> Result<String>;

    async fn status(&self, _tx: &Transaction) -> Result<StatusReport> {
        Err(GatewayError::TransactionFailed(format!(
            "status queries are not supported by {}",
            self.provider()
        ))
        .into())
    }
}

pub type GatewayBox = Arc<dyn Gateway>;

/// Persistent day/month usage totals, keyed by provider.
///
/// Every read and write first resets values whose period has ended.
/// `reserve` must run its read, check and increment as one atomic step per
/// provider.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Creates a zeroed entry for `provider` if none exists.
    async fn ensure_provider(&self, provider: &str) -> StorageResult<()>;

    async fn get_counts(&self, provider: &str) -> StorageResult<Counts>;

    /// Applies `delta` unconditionally and returns the new totals.
    async fn set_counts(&self, provider: &str, delta: CountDelta) -> StorageResult<Counts>;

    /// Adds `delta` unless a limit in `limits` would trip, in which case nothing
    /// is written and the tripped limit is returned.
    async fn reserve(
        &self,
        provider: &str,
        delta: CountDelta,
        limits: &CounterLimits,
    ) -> StorageResult<std::result::Result<Reservation, LimitKind>>;

    /// Reverts a reservation in full.
    async fn release(&self, reservation: &Reservation) -> StorageResult<()>;
}

pub type CounterStoreBox = Arc<dyn CounterStore>;

/// Source of the current calendar date for counter periods.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub type ClockBox = Arc<dyn Clock>;

/// Notified of every gateway-class failure the dispatcher fails over from.
pub trait FailureObserver: Send + Sync {
    fn on_failure(
        &self,
        error: &PaymentError,
        gateway: &dyn Gateway,
        tx: &Transaction,
        op: Operation,
    );
}

impl<F> FailureObserver for F
where
    F: Fn(&PaymentError, &dyn Gateway, &Transaction, Operation) + Send + Sync,
{
    fn on_failure(
        &self,
        error: &PaymentError,
        gateway: &dyn Gateway,
        tx: &Transaction,
        op: Operation,
    ) {
        self(error, gateway, tx, op)
    }
}
