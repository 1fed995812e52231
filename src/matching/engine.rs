//! Matching engine: disambiguation, match application, and the run loop

use crate::matching::candidates::candidate_indices;
use crate::matching::constraints::MatchConstraints;
use crate::traits::{DocumentLedger, MatchConfirmer};
use crate::types::*;

/// Disambiguator verdict for a single document
#[derive(Debug, PartialEq, Eq)]
enum Decision {
    /// Index into the payment pool of the accepted candidate
    Accepted(usize),
    /// Operator declined the candidate(s)
    Skipped,
    /// No payment satisfied the constraint set
    NoCandidate,
    /// Unresolved tie between this many candidates
    Ambiguous(usize),
}

/// Drives a complete matching run against a document ledger
///
/// Processing is strictly sequential: documents are handled one at a time
/// in ledger order, and each accepted match removes its payment from the
/// pool before the next document is considered, so no payment is ever
/// matched twice. The only suspension point is the blocking confirmation
/// prompt.
pub struct MatchEngine<L: DocumentLedger> {
    ledger: L,
    constraints: MatchConstraints,
    payment_account: String,
    ar_ap_account: String,
    dry_run: bool,
    confirmer: Option<Box<dyn MatchConfirmer>>,
}

impl<L: DocumentLedger> MatchEngine<L> {
    /// Create an engine for one run over the given ledger
    pub fn new(
        ledger: L,
        constraints: MatchConstraints,
        payment_account: String,
        ar_ap_account: String,
    ) -> Self {
        Self {
            ledger,
            constraints,
            payment_account,
            ar_ap_account,
            dry_run: false,
            confirmer: None,
        }
    }

    /// Report matches without recording links or committing
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Install a confirmer; every proposed match then requires operator
    /// approval, and ambiguous candidate sets become selectable
    pub fn with_confirmer(mut self, confirmer: Box<dyn MatchConfirmer>) -> Self {
        self.confirmer = Some(confirmer);
        self
    }

    /// Access the underlying ledger
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Consume the engine, returning the ledger handle
    pub fn into_ledger(self) -> L {
        self.ledger
    }

    /// Run the full matching pass: enumerate open documents, match each
    /// against the payment pool, and commit the recorded links.
    ///
    /// Per-document failures are absorbed into the report; only ledger
    /// read failures and the final commit abort the run.
    pub async fn run(&mut self) -> MatchResult<RunReport> {
        let documents = self
            .ledger
            .list_open_documents(self.constraints.mode(), &self.ar_ap_account)
            .await?;
        tracing::info!(
            "Found {} unpaid {}s in '{}'",
            documents.len(),
            self.constraints.mode().document_kind(),
            self.ar_ap_account
        );

        let mut pool = self.ledger.list_payments(&self.payment_account).await?;
        tracing::info!(
            "Found {} candidate payments in '{}'",
            pool.len(),
            self.payment_account
        );

        let mut outcomes = Vec::with_capacity(documents.len());
        let mut matched = 0usize;

        for document in &documents {
            let outcome = match self.disambiguate(document, &pool) {
                Decision::Accepted(index) => {
                    let payment = pool[index].clone();
                    match self.apply(document, &payment).await {
                        Ok(()) => {
                            pool.remove(index);
                            matched += 1;
                            OutcomeKind::Matched {
                                payment_id: payment.id.clone(),
                                payment_date: payment.date,
                                amount: payment.amount.clone(),
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Link failed for {} {}: {}",
                                document.kind,
                                document.id,
                                e
                            );
                            OutcomeKind::LinkFailed {
                                error: e.to_string(),
                            }
                        }
                    }
                }
                Decision::Skipped => OutcomeKind::Skipped,
                Decision::NoCandidate => OutcomeKind::NoCandidate,
                Decision::Ambiguous(count) => {
                    tracing::warn!(
                        "{} {}: {} payments tie under the active constraints, leaving open",
                        document.kind,
                        document.id,
                        count
                    );
                    OutcomeKind::Ambiguous { candidates: count }
                }
            };

            outcomes.push(DocumentOutcome {
                document_id: document.id.clone(),
                kind: document.kind,
                outcome,
            });
        }

        if !self.dry_run && matched > 0 {
            self.ledger.commit().await?;
            tracing::info!("Committed {} links to the ledger", matched);
        }

        Ok(RunReport {
            kind: self.constraints.mode().document_kind(),
            outcomes,
            matched,
            dry_run: self.dry_run,
        })
    }

    /// Reduce the candidate set for one document to a verdict.
    ///
    /// Ties are never broken automatically: with no confirmer installed a
    /// multi-candidate document stays open. A prompt failure degrades to
    /// a skip for the document rather than aborting the batch.
    fn disambiguate(&mut self, document: &Document, pool: &[Payment]) -> Decision {
        let candidates = candidate_indices(document, pool, &self.constraints);

        match candidates.as_slice() {
            [] => Decision::NoCandidate,
            [index] => match self.confirmer.as_mut() {
                Some(confirmer) => match confirmer.confirm(document, &pool[*index]) {
                    Ok(true) => Decision::Accepted(*index),
                    Ok(false) => Decision::Skipped,
                    Err(e) => {
                        tracing::warn!("Confirmation failed, skipping {}: {}", document.id, e);
                        Decision::Skipped
                    }
                },
                None => Decision::Accepted(*index),
            },
            indices => match self.confirmer.as_mut() {
                Some(confirmer) => {
                    let shortlist: Vec<&Payment> = indices.iter().map(|&i| &pool[i]).collect();
                    match confirmer.select(document, &shortlist) {
                        Ok(Some(choice)) => match indices.get(choice) {
                            Some(&index) => Decision::Accepted(index),
                            None => {
                                tracing::warn!(
                                    "Selection {} out of range for {}, skipping",
                                    choice,
                                    document.id
                                );
                                Decision::Skipped
                            }
                        },
                        Ok(None) => Decision::Skipped,
                        Err(e) => {
                            tracing::warn!("Selection failed, skipping {}: {}", document.id, e);
                            Decision::Skipped
                        }
                    }
                }
                None => Decision::Ambiguous(indices.len()),
            },
        }
    }

    /// Finalize an accepted pairing. The action is logged identically in
    /// dry-run and real mode; only the link call is withheld on a dry run.
    async fn apply(&mut self, document: &Document, payment: &Payment) -> MatchResult<()> {
        tracing::info!(
            "Matching payment on {} ({}) to {} {} ({}) from {}",
            payment.date,
            payment.amount,
            document.kind,
            document.id,
            document.due_amount,
            document.due_date
        );
        if !self.dry_run {
            self.ledger.link(document, payment).await?;
        }
        Ok(())
    }
}
