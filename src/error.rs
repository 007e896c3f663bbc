//! Error taxonomy shared by gateways, the dispatcher and the counter guard.
//!
//! Errors fall into families. The dispatcher only looks at the family when it
//! decides whether to fail over: a [`GatewayError`] means another processor may
//! succeed, everything else is surfaced to the caller immediately.

use crate::domain::counter::LimitKind;
use miette::Diagnostic;
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Problems with the caller's input, detected before any gateway is contacted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field transaction.{0}")]
    MissingField(&'static str),
    #[error("card and check payment fields are mutually exclusive")]
    ConflictingPaymentMethods,
    #[error("invalid routing number {0:?}")]
    InvalidRoutingNumber(String),
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
}

/// Problems with the payment instrument or request itself. Another gateway
/// would reject it the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("transaction declined: {0}")]
    Declined(String),
    #[error("transaction held for review: {0}")]
    Held(String),
    #[error("invalid card information: {0}")]
    InvalidCardInformation(String),
    #[error("invalid card number: {0}")]
    InvalidCardNumber(String),
    #[error("invalid card expiration date: {0}")]
    InvalidCardExpirationDate(String),
    #[error("invalid card security code: {0}")]
    InvalidCardSecurityCode(String),
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("card expired: {0}")]
    ExpiredCard(String),
    #[error("duplicate transaction: {0}")]
    DuplicateTransaction(String),
    #[error("invalid billing address: {0}")]
    InvalidBillingAddress(String),
    #[error("invalid billing zip code: {0}")]
    InvalidBillingZipcode(String),
    #[error("invalid routing number: {0}")]
    InvalidRoutingNumber(String),
    #[error("invalid account number: {0}")]
    InvalidAccountNumber(String),
}

/// Problems with the processor or the integration. Eligible for failover.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("gateway failed to process transaction: {0}")]
    TransactionFailed(String),
    #[error("transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("{0}")]
    LimitExceeded(LimitKind),
    #[error("counter error: {0}")]
    CounterError(String),
}

/// Coarse family of a [`PaymentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Transaction,
    Gateway,
    Configuration,
    Internal,
}

#[derive(Error, Debug, Diagnostic)]
pub enum PaymentError {
    #[error(transparent)]
    #[diagnostic(code(payment::validation))]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    #[diagnostic(code(payment::transaction))]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    #[diagnostic(code(payment::gateway))]
    Gateway(#[from] GatewayError),
    #[error("configuration error: {0}")]
    #[diagnostic(code(payment::configuration))]
    Configuration(String),
    #[error("CSV error: {0}")]
    #[diagnostic(code(payment::csv))]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    #[diagnostic(code(payment::io))]
    Io(#[from] std::io::Error),
    #[error("invalid configuration file: {0}")]
    #[diagnostic(code(payment::config_file))]
    Config(#[from] serde_json::Error),
}

impl PaymentError {
    pub fn class(&self) -> ErrorClass {
        match self {
            PaymentError::Validation(_) => ErrorClass::Validation,
            PaymentError::Transaction(_) => ErrorClass::Transaction,
            PaymentError::Gateway(_) => ErrorClass::Gateway,
            PaymentError::Configuration(_) | PaymentError::Config(_) => ErrorClass::Configuration,
            PaymentError::Csv(_) | PaymentError::Io(_) => ErrorClass::Internal,
        }
    }

    /// Whether the failover loop may move on to the next gateway.
    pub fn is_gateway_error(&self) -> bool {
        self.class() == ErrorClass::Gateway
    }
}

/// Failures of a counter storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("corrupt counter record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("column family {0:?} not found")]
    MissingColumnFamily(&'static str),
    #[error("counter total would overflow ({0})")]
    Overflow(LimitKind),
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        GatewayError::CounterError(err.to_string())
    }
}

impl From<StorageError> for PaymentError {
    fn from(err: StorageError) -> Self {
        PaymentError::Gateway(err.into())
    }
}
