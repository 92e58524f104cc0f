//! Application layer orchestrating wallet transfers.
//!
//! `TransferCoordinator` is the entry point: it opens a store transaction,
//! locks both wallet rows, runs the `Wallet` arithmetic and persists the
//! result, or rolls everything back.

pub mod coordinator;
