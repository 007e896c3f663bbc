use super::operation::Operation;
use crate::application::dispatcher::Dispatcher;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Settlement state reported by a status query.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    PendingSettlement,
    Complete,
    Canceled,
    Failed,
    Error,
}

/// Value of a provider-specific custom field, passed verbatim to the gateway.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum CustomValue {
    Bool(bool),
    Integer(i64),
    Decimal(Decimal),
    Text(String),
}

impl From<&str> for CustomValue {
    fn from(value: &str) -> Self {
        CustomValue::Text(value.to_string())
    }
}

impl From<String> for CustomValue {
    fn from(value: String) -> Self {
        CustomValue::Text(value)
    }
}

impl From<i64> for CustomValue {
    fn from(value: i64) -> Self {
        CustomValue::Integer(value)
    }
}

impl From<Decimal> for CustomValue {
    fn from(value: Decimal) -> Self {
        CustomValue::Decimal(value)
    }
}

impl From<bool> for CustomValue {
    fn from(value: bool) -> Self {
        CustomValue::Bool(value)
    }
}

/// Billing or shipping contact. Opaque to the dispatcher.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct Address {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
}

/// One attempted payment action.
///
/// A transaction is created by [`Dispatcher::new_transaction`] and stays bound
/// to that dispatcher. The caller fills in the fields and calls one of the
/// operation methods; on success the provider's transaction id is stored back
/// so follow-up operations (`capture` after `authorize`, `void`, ...) can run on
/// the same value.
#[derive(Debug, Clone)]
pub struct Transaction {
    dispatcher: Dispatcher,

    pub transaction_id: Option<String>,
    pub authorize_code: Option<String>,
    pub amount: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub freight: Option<Decimal>,
    pub tax_exempt: Option<bool>,
    pub order_number: Option<String>,
    pub customer_id: Option<String>,
    pub description: Option<String>,
    pub customer_ip: Option<String>,

    pub billing: Address,
    pub shipping: Address,

    pub card_number: Option<String>,
    pub expiration_month: Option<u32>,
    pub expiration_year: Option<i32>,
    pub security_code: Option<String>,

    pub check_account_number: Option<String>,
    pub check_routing_number: Option<String>,
    pub check_account_type: Option<String>,
    pub check_holder_type: Option<String>,
    pub check_number: Option<String>,

    pub custom_fields: HashMap<String, CustomValue>,
    /// Only ever written by a status query.
    pub status: Option<TransactionStatus>,
}

impl Transaction {
    pub(crate) fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            transaction_id: None,
            authorize_code: None,
            amount: None,
            tax: None,
            freight: None,
            tax_exempt: None,
            order_number: None,
            customer_id: None,
            description: None,
            customer_ip: None,
            billing: Address::default(),
            shipping: Address::default(),
            card_number: None,
            expiration_month: None,
            expiration_year: None,
            security_code: None,
            check_account_number: None,
            check_routing_number: None,
            check_account_type: None,
            check_holder_type: None,
            check_number: None,
            custom_fields: HashMap::new(),
            status: None,
        }
    }

    /// The dispatcher this transaction is currently bound to.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub(crate) fn rebind(&mut self, dispatcher: Dispatcher) {
        self.dispatcher = dispatcher;
    }

    /// Adds a provider-specific field passed through to the gateway untouched.
    pub fn custom_field(&mut self, name: impl Into<String>, value: impl Into<CustomValue>) {
        self.custom_fields.insert(name.into(), value.into());
    }

    pub async fn send(&mut self, op: Operation) -> Result<String> {
        let dispatcher = self.dispatcher.clone();
        dispatcher.send(self, op).await
    }

    /// Authorizes and captures in one step.
    pub async fn charge(&mut self) -> Result<String> {
        self.send(Operation::Charge).await
    }

    /// Authorizes only; the transaction must be captured to complete.
    pub async fn authorize(&mut self) -> Result<String> {
        self.send(Operation::Authorize).await
    }

    pub async fn capture(&mut self) -> Result<String> {
        self.send(Operation::Capture).await
    }

    pub async fn refund(&mut self) -> Result<String> {
        self.send(Operation::Refund).await
    }

    pub async fn credit(&mut self) -> Result<String> {
        self.send(Operation::Credit).await
    }

    pub async fn void(&mut self) -> Result<String> {
        self.send(Operation::Void).await
    }

    /// Refreshes [`Transaction::status`] from the processor.
    pub async fn status(&mut self) -> Result<TransactionStatus> {
        self.send(Operation::Status).await?;
        // A status receipt always carries a status.
        Ok(self.status.unwrap_or(TransactionStatus::Error))
    }
}

/// One row of a batch request file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct PaymentRequest {
    pub op: Operation,
    pub transaction_id: Option<String>,
    pub amount: Option<Decimal>,
    pub card_number: Option<String>,
    pub expiration_month: Option<u32>,
    pub expiration_year: Option<i32>,
    pub check_account_number: Option<String>,
    pub check_routing_number: Option<String>,
}

impl PaymentRequest {
    /// Copies the request fields onto a fresh transaction.
    pub fn fill(&self, tx: &mut Transaction) {
        tx.transaction_id = self.transaction_id.clone();
        tx.amount = self.amount;
        tx.card_number = self.card_number.clone();
        tx.expiration_month = self.expiration_month;
        tx.expiration_year = self.expiration_year;
        tx.check_account_number = self.check_account_number.clone();
        tx.check_routing_number = self.check_routing_number.clone();
    }
}
