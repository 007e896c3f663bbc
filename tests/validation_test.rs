mod common;

use common::ScriptedGateway;
use gateway_failover::application::dispatcher::Dispatcher;
use gateway_failover::domain::operation::Operation;
use gateway_failover::domain::validation::is_valid_routing_number;
use gateway_failover::error::{PaymentError, ValidationError};
use rust_decimal_macros::dec;

#[test]
fn test_routing_number_checksum() {
    assert!(is_valid_routing_number("021000021"));
    assert!(is_valid_routing_number("011000015"));
    assert!(!is_valid_routing_number("012000021"));
    assert!(!is_valid_routing_number("02100002"));
    assert!(!is_valid_routing_number("02100002a"));
}

#[tokio::test]
async fn test_check_payment_with_valid_routing_number() {
    let gateway = ScriptedGateway::approving("ach", "c-1");
    let dispatcher = Dispatcher::single(gateway.clone());
    let mut tx = dispatcher.new_transaction();
    tx.amount = Some(dec!(75));
    tx.check_account_number = Some("123456789".into());
    tx.check_routing_number = Some("021000021".into());

    assert_eq!(tx.charge().await.unwrap(), "c-1");
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test]
async fn test_check_payment_with_bad_routing_number() {
    let gateway = ScriptedGateway::approving("ach", "c-1");
    let dispatcher = Dispatcher::single(gateway.clone());
    let mut tx = dispatcher.new_transaction();
    tx.amount = Some(dec!(75));
    tx.check_account_number = Some("123456789".into());
    tx.check_routing_number = Some("012000021".into());

    let err = tx.charge().await.unwrap_err();

    assert!(matches!(
        err,
        PaymentError::Validation(ValidationError::InvalidRoutingNumber(_))
    ));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_card_and_check_together_conflict() {
    let dispatcher = Dispatcher::single(ScriptedGateway::approving("a", "1"));
    let mut tx = dispatcher.new_transaction();
    tx.amount = Some(dec!(75));
    tx.card_number = Some("4007000000027".into());
    tx.expiration_month = Some(1);
    tx.expiration_year = Some(2031);
    tx.check_account_number = Some("123456789".into());
    tx.check_routing_number = Some("021000021".into());

    let err = tx.authorize().await.unwrap_err();

    assert!(matches!(
        err,
        PaymentError::Validation(ValidationError::ConflictingPaymentMethods)
    ));
}

#[tokio::test]
async fn test_follow_up_operations_need_transaction_id() {
    let dispatcher = Dispatcher::single(ScriptedGateway::approving("a", "1"));

    for op in [
        Operation::Capture,
        Operation::Refund,
        Operation::Credit,
        Operation::Void,
        Operation::Status,
    ] {
        let mut tx = dispatcher.new_transaction();
        let err = tx.send(op).await.unwrap_err();
        assert!(
            matches!(
                err,
                PaymentError::Validation(ValidationError::MissingField("transaction_id"))
            ),
            "{op} should require a transaction id"
        );
    }
}

#[tokio::test]
async fn test_card_needs_expiration() {
    let dispatcher = Dispatcher::single(ScriptedGateway::approving("a", "1"));
    let mut tx = dispatcher.new_transaction();
    tx.amount = Some(dec!(10));
    tx.card_number = Some("4007000000027".into());
    tx.expiration_year = Some(2031);

    let err = tx.charge().await.unwrap_err();

    assert_eq!(err.to_string(), "missing required field transaction.expiration_month");
}

#[tokio::test]
async fn test_negative_amount_rejected() {
    let dispatcher = Dispatcher::single(ScriptedGateway::approving("a", "1"));
    let mut tx = common::card_transaction(&dispatcher, dec!(-3));

    let err = tx.charge().await.unwrap_err();

    assert!(matches!(
        err,
        PaymentError::Validation(ValidationError::NonPositiveAmount(_))
    ));
}

#[tokio::test]
async fn test_void_with_leftover_zero_amount_is_sent() {
    let gateway = ScriptedGateway::approving("a", "v-1");
    let dispatcher = Dispatcher::single(gateway.clone());
    let mut tx = dispatcher.new_transaction();
    tx.transaction_id = Some("a-7".into());
    tx.amount = Some(dec!(0));

    assert_eq!(tx.void().await.unwrap(), "v-1");
    assert_eq!(gateway.calls(), 1);
}
