use crate::domain::counter::LimitKind;
use crate::domain::operation::{Operation, Receipt};
use crate::domain::ports::{FailureObserver, GatewayBox};
use crate::domain::transaction::Transaction;
use crate::domain::validation::validate;
use crate::error::{GatewayError, PaymentError, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Clone)]
enum Route {
    Single(GatewayBox),
    Multi(Arc<[GatewayBox]>),
}

/// Routes operations to one gateway, or to an ordered list of gateways with
/// failover.
///
/// In multi-gateway mode the gateways are tried strictly in list order. A
/// gateway-class error moves on to the next gateway; any other error is
/// returned at once, since a bad card or request fails the same way
/// everywhere. When every gateway fails the last gateway error is returned.
///
/// `Dispatcher` is a cheap handle: cloning it shares the gateways.
#[derive(Clone)]
pub struct Dispatcher {
    route: Route,
    timeout: Option<Duration>,
    observers: Vec<Arc<dyn FailureObserver>>,
}

impl Dispatcher {
    pub fn single(gateway: GatewayBox) -> Self {
        Self {
            route: Route::Single(gateway),
            timeout: None,
            observers: Vec::new(),
        }
    }

    /// Gateways are tried in the given order; the first has top priority.
    pub fn multi(gateways: Vec<GatewayBox>) -> Self {
        Self {
            route: Route::Multi(gateways.into()),
            timeout: None,
            observers: Vec::new(),
        }
    }

    /// Bounds every gateway call. A call that runs out of time counts as a
    /// connection error.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_observer(mut self, observer: impl FailureObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    pub fn gateways(&self) -> &[GatewayBox] {
        match &self.route {
            Route::Single(gateway) => std::slice::from_ref(gateway),
            Route::Multi(gateways) => gateways,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self.route, Route::Multi(_))
    }

    /// Creates an empty transaction bound to this dispatcher.
    pub fn new_transaction(&self) -> Transaction {
        Transaction::new(self.clone())
    }

    /// Validates `tx` for `op` and runs it.
    ///
    /// On success the provider transaction id is written to `tx` (and the
    /// status, for status queries) and returned. After a multi-gateway success
    /// `tx` is rebound to the gateway that processed it, so follow-up
    /// operations go to the same processor.
    pub async fn send(&self, tx: &mut Transaction, op: Operation) -> Result<String> {
        let receipt = match &self.route {
            Route::Single(gateway) => {
                validate(op, tx)?;
                self.attempt(gateway, tx, op).await?
            }
            Route::Multi(gateways) => {
                if gateways.is_empty() {
                    return Err(PaymentError::Configuration(
                        "gateway list is empty".to_string(),
                    ));
                }
                validate(op, tx)?;
                let (gateway, receipt) = self.fail_over(gateways, tx, op).await?;
                tx.rebind(self.pinned_to(gateway));
                receipt
            }
        };

        if let Some(status) = receipt.status {
            tx.status = Some(status);
        }
        tx.transaction_id = Some(receipt.transaction_id.clone());
        Ok(receipt.transaction_id)
    }

    async fn fail_over(
        &self,
        gateways: &[GatewayBox],
        tx: &Transaction,
        op: Operation,
    ) -> Result<(GatewayBox, Receipt)> {
        let mut last_error = None;

        for (position, gateway) in gateways.iter().enumerate() {
            match self.attempt(gateway, tx, op).await {
                Ok(receipt) => {
                    if position > 0 {
                        info!(
                            provider = gateway.provider(),
                            operation = %op,
                            position,
                            "failover succeeded"
                        );
                    }
                    return Ok((gateway.clone(), receipt));
                }
                Err(err) if err.is_gateway_error() => {
                    warn!(
                        provider = gateway.provider(),
                        operation = %op,
                        error = %err,
                        "gateway failed, trying next"
                    );
                    for observer in &self.observers {
                        observer.on_failure(&err, gateway.as_ref(), tx, op);
                    }
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            PaymentError::Configuration("gateway list is empty".to_string())
        }))
    }

    async fn attempt(
        &self,
        gateway: &GatewayBox,
        tx: &Transaction,
        op: Operation,
    ) -> Result<Receipt> {
        if let (Some(amount), Some(limit)) = (tx.amount, gateway.trans_amount_limit())
            && amount > limit
        {
            return Err(GatewayError::LimitExceeded(LimitKind::TransactionAmount).into());
        }

        debug!(provider = gateway.provider(), operation = %op, "sending");
        let call = op.invoke(gateway.as_ref(), tx);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                GatewayError::ConnectionError(format!(
                    "{} did not answer within {:?}",
                    gateway.provider(),
                    limit
                ))
            })?,
            None => call.await,
        }
    }

    fn pinned_to(&self, gateway: GatewayBox) -> Dispatcher {
        Dispatcher {
            route: Route::Single(gateway),
            timeout: self.timeout,
            observers: self.observers.clone(),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let providers: Vec<&str> = self.gateways().iter().map(|g| g.provider()).collect();
        f.debug_struct("Dispatcher")
            .field("multi", &self.is_multi())
            .field("providers", &providers)
            .field("timeout", &self.timeout)
            .finish()
    }
}
