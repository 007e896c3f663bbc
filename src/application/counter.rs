use crate::domain::counter::{CountDelta, CounterLimits, Reservation};
use crate::domain::ports::{CounterStoreBox, Gateway, GatewayBox, StatusReport};
use crate::domain::transaction::Transaction;
use crate::error::{GatewayError, Result, ValidationError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::future::Future;
use tracing::{error, warn};

/// Wraps a gateway with day/month usage limits.
///
/// Only `charge` and `capture` are counted since they commit spend. The
/// counters are reserved before the wrapped gateway is called and released
/// again if it fails, so concurrent calls never under-count an in-flight
/// transaction.
pub struct CountedGateway {
    inner: GatewayBox,
    store: CounterStoreBox,
    limits: CounterLimits,
}

impl CountedGateway {
    pub fn new(inner: GatewayBox, store: CounterStoreBox, limits: CounterLimits) -> Self {
        Self {
            inner,
            store,
            limits,
        }
    }

    pub fn limits(&self) -> &CounterLimits {
        &self.limits
    }

    pub fn inner(&self) -> &GatewayBox {
        &self.inner
    }

    async fn guarded<F>(&self, tx: &Transaction, call: F) -> Result<String>
    where
        F: Future<Output = Result<String>> + Send,
    {
        let amount = tx.amount.ok_or(ValidationError::MissingField("amount"))?;
        let provider = self.inner.provider();

        let reservation = match self
            .store
            .reserve(provider, CountDelta::transaction(amount), &self.limits)
            .await
            .map_err(GatewayError::from)?
        {
            Ok(reservation) => reservation,
            Err(kind) => {
                warn!(provider, %amount, limit = %kind, "counter limit reached");
                return Err(GatewayError::LimitExceeded(kind).into());
            }
        };

        let mut guard = ReleaseGuard::new(self.store.clone(), reservation);
        match call.await {
            Ok(id) => {
                guard.keep();
                Ok(id)
            }
            Err(err) => {
                guard.release().await;
                Err(err)
            }
        }
    }
}

#[async_trait]
impl Gateway for CountedGateway {
    fn provider(&self) -> &str {
        self.inner.provider()
    }

    fn trans_amount_limit(&self) -> Option<Decimal> {
        self.inner.trans_amount_limit()
    }

    async fn charge(&self, tx: &Transaction) -> Result<String> {
        self.guarded(tx, self.inner.charge(tx)).await
    }

    async fn authorize(&self, tx: &Transaction) -> Result<String> {
        self.inner.authorize(tx).await
    }

    async fn capture(&self, tx: &Transaction) -> Result<String> {
        self.guarded(tx, self.inner.capture(tx)).await
    }

    async fn refund(&self, tx: &Transaction) -> Result<String> {
        self.inner.refund(tx).await
    }

    async fn credit(&self, tx: &Transaction) -> Result<String> {
        self.inner.credit(tx).await
    }

    async fn void(&self, tx: &Transaction) -> Result<String> {
        self.inner.void(tx).await
    }

    async fn status(&self, tx: &Transaction) -> Result<StatusReport> {
        self.inner.status(tx).await
    }
}

/// Releases a reservation unless told to keep it.
///
/// If the guarded call is cancelled (a dispatcher timeout drops the future)
/// the release is handed to the runtime from `Drop`.
struct ReleaseGuard {
    store: CounterStoreBox,
    reservation: Option<Reservation>,
}

impl ReleaseGuard {
    fn new(store: CounterStoreBox, reservation: Reservation) -> Self {
        Self {
            store,
            reservation: Some(reservation),
        }
    }

    fn keep(&mut self) {
        self.reservation = None;
    }

    /// The reservation stays armed until the store call returns, so a
    /// cancellation while it is pending still releases from `Drop`.
    async fn release(&mut self) {
        if let Some(reservation) = self.reservation.clone() {
            release(&self.store, &reservation).await;
            self.reservation = None;
        }
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        let Some(reservation) = self.reservation.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store = self.store.clone();
                handle.spawn(async move { release(&store, &reservation).await });
            }
            Err(_) => error!(
                provider = %reservation.provider,
                "no runtime to release cancelled counter reservation"
            ),
        }
    }
}

async fn release(store: &CounterStoreBox, reservation: &Reservation) {
    if let Err(err) = store.release(reservation).await {
        error!(provider = %reservation.provider, error = %err, "counter rollback failed");
    }
}
