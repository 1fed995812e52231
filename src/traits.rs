//! Traits for ledger abstraction and operator confirmation

use async_trait::async_trait;
use std::io::{BufRead, Write};

use crate::types::*;

/// Capability interface over the external document ledger
///
/// This trait decouples the matching engine from any particular ledger
/// storage technology: a file-backed ledger, a database, or an in-memory
/// fake for tests can all satisfy it. The engine owns the handle
/// exclusively for the duration of a run and issues a single `commit`
/// at the end (unless the run is a dry run).
#[async_trait]
pub trait DocumentLedger: Send + Sync {
    /// List open (unsettled) documents of the mode's kind posted to the
    /// given AR/AP account, in stable ledger order
    async fn list_open_documents(
        &self,
        mode: Mode,
        ar_ap_account: &str,
    ) -> MatchResult<Vec<Document>>;

    /// List candidate payments recorded in the given payment account, in
    /// stable ledger order
    async fn list_payments(&self, payment_account: &str) -> MatchResult<Vec<Payment>>;

    /// Record the settlement association between a document and a payment
    async fn link(&mut self, document: &Document, payment: &Payment) -> MatchResult<()>;

    /// Persist all links recorded since the ledger was opened.
    ///
    /// All-or-nothing durability of this call is the collaborator's
    /// responsibility; the engine treats a failure as fatal.
    async fn commit(&mut self) -> MatchResult<()>;
}

/// Blocking operator confirmation for proposed matches
///
/// Both methods suspend the entire run until the operator responds; the
/// engine performs no other work while a prompt is outstanding.
pub trait MatchConfirmer: Send {
    /// Present a single-candidate match for accept/skip.
    /// Returns `true` to accept, `false` to skip the document.
    fn confirm(&mut self, document: &Document, payment: &Payment) -> MatchResult<bool>;

    /// Present an ambiguous candidate list for selection.
    /// Returns the index of the chosen payment, or `None` to skip the
    /// document entirely.
    fn select(&mut self, document: &Document, candidates: &[&Payment]) -> MatchResult<Option<usize>>;
}

/// Interactive confirmer reading from standard input
///
/// End-of-input (operator closing the stream) is treated as a skip for
/// the current document, not as a run-level failure.
pub struct StdinConfirmer;

impl StdinConfirmer {
    fn print_pair(document: &Document, payment: &Payment) {
        println!("{}", "-".repeat(20));
        println!("Potential match found:");
        println!("  Payment details:");
        println!("    Description: {}", payment.description);
        println!("    Date: {}", payment.date);
        println!("    Amount: {}", payment.amount);
        println!("  {} details:", document.kind);
        println!("    ID: {}", document.id);
        if let Some(billing_id) = &document.billing_id {
            println!("    Billing ID: {}", billing_id);
        }
        println!("    Date: {}", document.due_date);
        println!("    Amount: {}", document.due_amount);
    }

    fn read_line(prompt: &str) -> MatchResult<Option<String>> {
        print!("{}", prompt);
        std::io::stdout()
            .flush()
            .map_err(|e| MatchError::Confirm(e.to_string()))?;

        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| MatchError::Confirm(e.to_string()))?;
        if read == 0 {
            // EOF: operator cancelled
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl MatchConfirmer for StdinConfirmer {
    fn confirm(&mut self, document: &Document, payment: &Payment) -> MatchResult<bool> {
        Self::print_pair(document, payment);
        match Self::read_line("Match this? [y/N]: ")? {
            Some(answer) => Ok(answer.eq_ignore_ascii_case("y")),
            None => Ok(false),
        }
    }

    fn select(&mut self, document: &Document, candidates: &[&Payment]) -> MatchResult<Option<usize>> {
        println!("{}", "-".repeat(20));
        println!(
            "{} candidate payments for {} {}:",
            candidates.len(),
            document.kind,
            document.id
        );
        for (i, payment) in candidates.iter().enumerate() {
            println!(
                "  [{}] {} {} \"{}\"",
                i + 1,
                payment.date,
                payment.amount,
                payment.description
            );
        }

        let prompt = format!("Select a payment [1-{}] or press Enter to skip: ", candidates.len());
        loop {
            match Self::read_line(&prompt)? {
                None => return Ok(None),
                Some(answer) if answer.is_empty() => return Ok(None),
                Some(answer) => match answer.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= candidates.len() => return Ok(Some(n - 1)),
                    _ => println!("Invalid selection '{}'", answer),
                },
            }
        }
    }
}
