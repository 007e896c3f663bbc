#![allow(dead_code)]

use async_trait::async_trait;
use gateway_failover::application::dispatcher::Dispatcher;
use gateway_failover::domain::ports::Gateway;
use gateway_failover::domain::transaction::Transaction;
use gateway_failover::error::{GatewayError, Result, TransactionError};
use rust_decimal::Decimal;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::NamedTempFile;

pub const REQUEST_HEADER: &str = "op, transaction_id, amount, card_number, expiration_month, expiration_year, check_account_number, check_routing_number";

/// What a [`ScriptedGateway`] answers to every call.
#[derive(Debug, Clone)]
pub enum Answer {
    Approve(&'static str),
    Gateway(GatewayError),
    Transaction(TransactionError),
}

/// Gateway with a fixed answer that counts how often it was called.
#[derive(Debug)]
pub struct ScriptedGateway {
    provider: String,
    answer: Answer,
    calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn approving(provider: &str, id: &'static str) -> Arc<Self> {
        Self::with_answer(provider, Answer::Approve(id))
    }

    pub fn failing(provider: &str, err: GatewayError) -> Arc<Self> {
        Self::with_answer(provider, Answer::Gateway(err))
    }

    pub fn rejecting(provider: &str, err: TransactionError) -> Arc<Self> {
        Self::with_answer(provider, Answer::Transaction(err))
    }

    fn with_answer(provider: &str, answer: Answer) -> Arc<Self> {
        Arc::new(Self {
            provider: provider.to_string(),
            answer,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Answer::Approve(id) => Ok(id.to_string()),
            Answer::Gateway(err) => Err(err.clone().into()),
            Answer::Transaction(err) => Err(err.clone().into()),
        }
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn charge(&self, _tx: &Transaction) -> Result<String> {
        self.answer()
    }

    async fn authorize(&self, _tx: &Transaction) -> Result<String> {
        self.answer()
    }

    async fn capture(&self, _tx: &Transaction) -> Result<String> {
        self.answer()
    }

    async fn refund(&self, _tx: &Transaction) -> Result<String> {
        self.answer()
    }

    async fn credit(&self, _tx: &Transaction) -> Result<String> {
        self.answer()
    }

    async fn void(&self, _tx: &Transaction) -> Result<String> {
        self.answer()
    }
}

/// A card transaction ready to charge or authorize.
pub fn card_transaction(dispatcher: &Dispatcher, amount: Decimal) -> Transaction {
    let mut tx = dispatcher.new_transaction();
    tx.amount = Some(amount);
    tx.card_number = Some("4007000000027".into());
    tx.expiration_month = Some(12);
    tx.expiration_year = Some(2030);
    tx
}

/// Writes a request CSV with the standard header followed by `rows`.
pub fn request_file(rows: &[&str]) -> NamedTempFile {
    let mut csv = NamedTempFile::new().unwrap();
    writeln!(csv, "{REQUEST_HEADER}").unwrap();
    for row in rows {
        writeln!(csv, "{row}").unwrap();
    }
    csv
}

/// Writes a router configuration to a temporary JSON file.
pub fn config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{json}").unwrap();
    file
}
