//! Wallet value object and the storage ports the application layer talks to.

pub mod ports;
pub mod wallet;
