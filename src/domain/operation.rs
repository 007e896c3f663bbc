use super::ports::Gateway;
use super::transaction::{Transaction, TransactionStatus};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The operations every gateway understands.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Charge,
    Authorize,
    Capture,
    Refund,
    Credit,
    Void,
    Status,
}

/// What a successful operation hands back to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_id: String,
    pub status: Option<TransactionStatus>,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Charge,
        Operation::Authorize,
        Operation::Capture,
        Operation::Refund,
        Operation::Credit,
        Operation::Void,
        Operation::Status,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Charge => "charge",
            Operation::Authorize => "authorize",
            Operation::Capture => "capture",
            Operation::Refund => "refund",
            Operation::Credit => "credit",
            Operation::Void => "void",
            Operation::Status => "status",
        }
    }

    /// Charge and authorize start a new transaction and need an amount and a
    /// payment method. Everything else acts on an existing transaction id.
    pub fn opens_transaction(self) -> bool {
        matches!(self, Operation::Charge | Operation::Authorize)
    }

    /// Operations whose amount is sent as spend: the opening ones and capture.
    pub fn moves_funds(self) -> bool {
        matches!(
            self,
            Operation::Charge | Operation::Authorize | Operation::Capture
        )
    }

    pub async fn invoke(self, gateway: &dyn Gateway, tx: &Transaction) -> Result<Receipt> {
        let transaction_id = match self {
            Operation::Charge => gateway.charge(tx).await?,
            Operation::Authorize => gateway.authorize(tx).await?,
            Operation::Capture => gateway.capture(tx).await?,
            Operation::Refund => gateway.refund(tx).await?,
            Operation::Credit => gateway.credit(tx).await?,
            Operation::Void => gateway.void(tx).await?,
            Operation::Status => {
                let report = gateway.status(tx).await?;
                return Ok(Receipt {
                    transaction_id: report.transaction_id,
                    status: Some(report.status),
                });
            }
        };
        Ok(Receipt {
            transaction_id,
            status: None,
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown operation {s:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
        }
        assert_eq!(" VOID ".parse::<Operation>().unwrap(), Operation::Void);
        assert!("settle".parse::<Operation>().is_err());
    }

    #[test]
    fn test_opening_operations() {
        let opening: Vec<_> = Operation::ALL
            .into_iter()
            .filter(|op| op.opens_transaction())
            .collect();
        assert_eq!(opening, vec![Operation::Charge, Operation::Authorize]);
    }

    #[test]
    fn test_operations_moving_funds() {
        let moving: Vec<_> = Operation::ALL
            .into_iter()
            .filter(|op| op.moves_funds())
            .collect();
        assert_eq!(
            moving,
            vec![Operation::Charge, Operation::Authorize, Operation::Capture]
        );
    }
}
