//! Application layer: routing operations to gateways and guarding them with
//! usage counters.
//!
//! [`dispatcher::Dispatcher`] validates a transaction and sends it to one
//! gateway or fails over across several. [`counter::CountedGateway`] wraps a
//! gateway and enforces day/month limits through a
//! [`CounterStore`](crate::domain::ports::CounterStore).

pub mod counter;
pub mod dispatcher;
