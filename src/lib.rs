//! Payment gateway dispatch with failover and usage-limit counters.
//!
//! A [`Dispatcher`](application::dispatcher::Dispatcher) sends normalized
//! payment operations to a single gateway or fails over across an ordered
//! list of them. Gateways can be wrapped in a
//! [`CountedGateway`](application::counter::CountedGateway) that enforces
//! day/month amount and transaction-count limits backed by a pluggable
//! counter store.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
