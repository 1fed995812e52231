//! Utility implementations

pub mod memory_ledger;

pub use memory_ledger::MemoryLedger;
