//! JSON router configuration.
//!
//! ```json
//! {
//!   "timeout_ms": 5000,
//!   "gateways": [
//!     { "kind": "dummy", "provider": "primary", "trans_amount_limit": "500",
//!       "counter": { "day_amount": "1000", "day_transactions": 50 } },
//!     { "kind": "dummy", "provider": "backup" }
//!   ]
//! }
//! ```

use crate::application::counter::CountedGateway;
use crate::application::dispatcher::Dispatcher;
use crate::domain::counter::CounterLimits;
use crate::domain::ports::{CounterStoreBox, GatewayBox};
use crate::error::{PaymentError, Result};
use crate::infrastructure::dummy::DummyGateway;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Gateway implementations that can be built from configuration.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    Dummy,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub kind: GatewayKind,
    pub provider: String,
    #[serde(default)]
    pub trans_amount_limit: Option<Decimal>,
    /// Dummy only: fail every call with a connection error.
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub counter: Option<CounterLimits>,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    pub gateways: Vec<GatewayConfig>,
}

impl RouterConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Builds a multi-gateway dispatcher in the configured order. Gateways with
    /// a `counter` block are wrapped in a [`CountedGateway`] sharing `store`.
    pub fn build(&self, store: CounterStoreBox) -> Result<Dispatcher> {
        if self.gateways.is_empty() {
            return Err(PaymentError::Configuration(
                "at least one gateway must be configured".to_string(),
            ));
        }

        let gateways = self
            .gateways
            .iter()
            .map(|config| config.build(store.clone()))
            .collect();

        let mut dispatcher = Dispatcher::multi(gateways);
        if let Some(ms) = self.timeout_ms {
            dispatcher = dispatcher.with_timeout(Duration::from_millis(ms));
        }
        Ok(dispatcher)
    }
}

impl GatewayConfig {
    fn build(&self, store: CounterStoreBox) -> GatewayBox {
        let gateway = match self.kind {
            GatewayKind::Dummy => {
                let mut dummy = if self.offline {
                    DummyGateway::offline(&self.provider)
                } else {
                    DummyGateway::new(&self.provider)
                };
                if let Some(limit) = self.trans_amount_limit {
                    dummy = dummy.with_trans_amount_limit(limit);
                }
                Arc::new(dummy) as GatewayBox
            }
        };

        match self.counter {
            Some(limits) => Arc::new(CountedGateway::new(gateway, store, limits)) as GatewayBox,
            None => gateway,
        }
    }
}
