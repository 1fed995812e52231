//! Concrete ledger backends

pub mod json;

pub use json::JsonLedger;
