//! # Payment Matcher
//!
//! Reconciles payment entries in an accounting ledger against outstanding
//! billing documents - invoices when receiving money (AR), bills when
//! paying it (AP) - linking each payment to the document it settles.
//!
//! ## Features
//!
//! - **Constraint-driven matching**: exact amount cancellation is always
//!   required; a date window and id/billing-id text rules narrow further
//! - **Deterministic disambiguation**: candidates are considered in ledger
//!   order and ties are never broken silently
//! - **Interactive confirmation**: optional blocking accept/skip/select
//!   prompts for every proposed match
//! - **Dry-run support**: identical reporting with no ledger mutation
//! - **Ledger abstraction**: any backend implementing [`DocumentLedger`]
//!   works, including the bundled JSON snapshot and in-memory ledgers
//!
//! ## Quick Start
//!
//! ```rust
//! use payment_matcher::{
//!     Document, DocumentKind, MatchConstraints, MatchEngine, MemoryLedger, Mode, Payment,
//! };
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! # async fn run() -> payment_matcher::MatchResult<()> {
//! let ledger = MemoryLedger::new();
//! ledger.add_document(Document::new(
//!     "INV-1".into(),
//!     DocumentKind::Invoice,
//!     "Assets:Receivable".into(),
//!     BigDecimal::from(100),
//!     NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
//! ));
//! ledger.add_payment(Payment::new(
//!     "Assets:Checking".into(),
//!     NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
//!     BigDecimal::from(-100),
//!     "payment INV-1".into(),
//! ));
//!
//! let constraints = MatchConstraints::new(Mode::Ar);
//! let mut engine = MatchEngine::new(
//!     ledger,
//!     constraints,
//!     "Assets:Checking".into(),
//!     "Assets:Receivable".into(),
//! );
//! let report = engine.run().await?;
//! assert_eq!(report.matched, 1);
//! # Ok(())
//! # }
//! ```

pub mod ledger;
pub mod matching;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use ledger::JsonLedger;
pub use matching::{candidate_indices, DateWindow, MatchConstraints, MatchEngine};
pub use traits::{DocumentLedger, MatchConfirmer, StdinConfirmer};
pub use types::*;
pub use utils::MemoryLedger;
