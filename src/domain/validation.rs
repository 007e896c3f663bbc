//! Field checks run before an operation leaves the process.

use super::operation::Operation;
use super::transaction::Transaction;
use crate::error::ValidationError;
use rust_decimal::Decimal;

const ROUTING_WEIGHTS: [u32; 3] = [3, 7, 1];

/// Confirms `tx` carries what `op` needs. Never mutates the transaction.
pub fn validate(op: Operation, tx: &Transaction) -> Result<(), ValidationError> {
    if op.moves_funds()
        && let Some(amount) = tx.amount
        && amount <= Decimal::ZERO
    {
        return Err(ValidationError::NonPositiveAmount(amount));
    }

    if op.opens_transaction() {
        if tx.amount.is_none() {
            return Err(ValidationError::MissingField("amount"));
        }
        validate_payment_method(tx)
    } else if tx.transaction_id.is_none() {
        Err(ValidationError::MissingField("transaction_id"))
    } else {
        Ok(())
    }
}

fn validate_payment_method(tx: &Transaction) -> Result<(), ValidationError> {
    match (&tx.card_number, &tx.check_account_number) {
        (Some(_), Some(_)) => Err(ValidationError::ConflictingPaymentMethods),
        (Some(_), None) => {
            if tx.expiration_month.is_none() {
                return Err(ValidationError::MissingField("expiration_month"));
            }
            if tx.expiration_year.is_none() {
                return Err(ValidationError::MissingField("expiration_year"));
            }
            Ok(())
        }
        (None, Some(_)) => match &tx.check_routing_number {
            None => Err(ValidationError::MissingField("check_routing_number")),
            Some(routing) if !is_valid_routing_number(routing) => {
                Err(ValidationError::InvalidRoutingNumber(routing.clone()))
            }
            Some(_) => Ok(()),
        },
        (None, None) => Err(ValidationError::MissingField("card_number")),
    }
}

/// ABA routing number check: nine digits, the last being the weighted
/// (3, 7, 1) mod-10 check digit of the first eight.
pub fn is_valid_routing_number(routing: &str) -> bool {
    let digits: Option<Vec<u32>> = routing.chars().map(|c| c.to_digit(10)).collect();
    let Some(digits) = digits else {
        return false;
    };
    if digits.len() != 9 {
        return false;
    }

    let sum: u32 = digits[..8]
        .iter()
        .zip(ROUTING_WEIGHTS.iter().cycle())
        .map(|(d, w)| d * w)
        .sum();
    (10 - sum % 10) % 10 == digits[8]
}
