//! Domain types and the ports the application layer is written against.

pub mod counter;
pub mod operation;
pub mod ports;
pub mod transaction;
pub mod validation;
