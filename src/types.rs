//! Core types and data structures for payment matching

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing mode selecting which side of the ledger is reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Accounts Receivable - match incoming payments against open invoices
    Ar,
    /// Accounts Payable - match outgoing payments against open bills
    Ap,
}

impl Mode {
    /// Sign multiplier applied to payment amounts by the amount predicate.
    ///
    /// Documents carry positive outstanding magnitudes in both modes;
    /// payments carry the opposite sign of what they cancel (negative in
    /// the AR account, positive in the AP account).
    pub fn sign(&self) -> i64 {
        match self {
            Mode::Ar => 1,
            Mode::Ap => -1,
        }
    }

    /// The document kind this mode settles
    pub fn document_kind(&self) -> DocumentKind {
        match self {
            Mode::Ar => DocumentKind::Invoice,
            Mode::Ap => DocumentKind::Bill,
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ar" => Ok(Mode::Ar),
            "ap" => Ok(Mode::Ap),
            other => Err(MatchError::Config(format!(
                "Invalid mode '{}': expected 'ar' or 'ap'",
                other
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Ar => write!(f, "ar"),
            Mode::Ap => write!(f, "ap"),
        }
    }
}

/// Kind of billing document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Customer invoice (AR side)
    Invoice,
    /// Vendor bill (AP side)
    Bill,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Invoice => write!(f, "Invoice"),
            DocumentKind::Bill => write!(f, "Bill"),
        }
    }
}

/// An outstanding invoice or bill awaiting settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier for the document
    pub id: String,
    /// Secondary identifier used by some organizations for cross-referencing
    #[serde(default)]
    pub billing_id: Option<String>,
    /// Whether this is an invoice (AR) or a bill (AP)
    pub kind: DocumentKind,
    /// Full path of the AR/AP account the document is posted to
    pub account: String,
    /// Outstanding amount, stored as a positive magnitude in both modes
    pub due_amount: BigDecimal,
    /// Date the document was posted
    pub due_date: NaiveDate,
    /// Terminal settled flag, written on a successful match
    #[serde(default)]
    pub settled: bool,
    /// Identifier of the payment that settled this document
    #[serde(default)]
    pub settled_by: Option<String>,
}

impl Document {
    /// Create a new open document
    pub fn new(
        id: String,
        kind: DocumentKind,
        account: String,
        due_amount: BigDecimal,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            billing_id: None,
            kind,
            account,
            due_amount,
            due_date,
            settled: false,
            settled_by: None,
        }
    }

    /// Set the billing id
    pub fn with_billing_id(mut self, billing_id: String) -> Self {
        self.billing_id = Some(billing_id);
        self
    }
}

/// A ledger transaction entry in the designated payment account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Stable identity of the payment within the ledger; generated when
    /// the backing store does not carry one
    #[serde(default = "fresh_payment_id")]
    pub id: String,
    /// Full path of the account the payment was recorded in
    pub account: String,
    /// Date of the transaction
    pub date: NaiveDate,
    /// Signed amount; opposite sign convention to the document it cancels
    pub amount: BigDecimal,
    /// Free-text memo/narration
    pub description: String,
    /// Identifier of the document this payment settles, once linked
    #[serde(default)]
    pub document: Option<String>,
}

fn fresh_payment_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Payment {
    /// Create a new unlinked payment with a generated identity
    pub fn new(account: String, date: NaiveDate, amount: BigDecimal, description: String) -> Self {
        Self {
            id: fresh_payment_id(),
            account,
            date,
            amount,
            description,
            document: None,
        }
    }

    /// Override the generated identity (for ledgers that carry their own)
    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }
}

/// How a single document fared during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// A payment was accepted for this document
    Matched {
        /// Identity of the matched payment
        payment_id: String,
        /// Date of the matched payment
        payment_date: NaiveDate,
        /// Amount of the matched payment
        amount: BigDecimal,
    },
    /// The operator declined the proposed match
    Skipped,
    /// No payment satisfied the constraint set
    NoCandidate,
    /// More than one payment satisfied the constraint set and no selection was made
    Ambiguous {
        /// Number of payments that tied
        candidates: usize,
    },
    /// The ledger rejected the link for this document
    LinkFailed {
        /// Collaborator-reported reason
        error: String,
    },
}

/// Per-document report entry emitted by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutcome {
    /// Identifier of the document this outcome describes
    pub document_id: String,
    /// Kind of the document, for operator-facing text
    pub kind: DocumentKind,
    /// What happened
    pub outcome: OutcomeKind,
}

impl fmt::Display for DocumentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            OutcomeKind::Matched {
                payment_date,
                amount,
                ..
            } => write!(
                f,
                "{} {}: matched payment on {} ({})",
                self.kind, self.document_id, payment_date, amount
            ),
            OutcomeKind::Skipped => {
                write!(f, "{} {}: skipped by operator", self.kind, self.document_id)
            }
            OutcomeKind::NoCandidate => {
                write!(f, "{} {}: no matching payment", self.kind, self.document_id)
            }
            OutcomeKind::Ambiguous { candidates } => write!(
                f,
                "{} {}: ambiguous ({} candidate payments), left open",
                self.kind, self.document_id, candidates
            ),
            OutcomeKind::LinkFailed { error } => write!(
                f,
                "{} {}: link failed ({}), left open",
                self.kind, self.document_id, error
            ),
        }
    }
}

/// Report for a complete matching run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Kind of document the run processed, for operator-facing text
    pub kind: DocumentKind,
    /// One outcome per open document, in processing order
    pub outcomes: Vec<DocumentOutcome>,
    /// Number of documents matched (including dry-run matches)
    pub matched: usize,
    /// Whether the run withheld mutations
    pub dry_run: bool,
}

impl RunReport {
    /// Operator-facing line reporting how many open documents were found
    pub fn found_line(&self) -> String {
        let noun = match self.kind {
            DocumentKind::Invoice => "invoices",
            DocumentKind::Bill => "bills",
        };
        format!("Found {} unpaid {}.", self.outcomes.len(), noun)
    }

    /// Operator-facing summary line for the end of the run
    pub fn summary(&self) -> String {
        if self.dry_run {
            format!(
                "DRY RUN: Found {} potential matches. No changes will be saved.",
                self.matched
            )
        } else if self.matched > 0 {
            format!("{} Matches found.", self.matched)
        } else {
            "No new matches found.".to_string()
        }
    }
}

/// Errors that can occur while matching payments to documents
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Ledger error: {0}")]
    Ledger(String),
    #[error("Link error: {0}")]
    Link(String),
    #[error("Commit error: {0}")]
    Commit(String),
    #[error("Confirmation error: {0}")]
    Confirm(String),
}

/// Result type for matching operations
pub type MatchResult<T> = Result<T, MatchError>;
