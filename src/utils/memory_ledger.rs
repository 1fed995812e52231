//! In-memory ledger implementation for testing and development

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::traits::DocumentLedger;
use crate::types::*;

#[derive(Debug, Default)]
struct Inner {
    documents: Vec<Document>,
    payments: Vec<Payment>,
    commit_count: usize,
    fail_link_for: Option<String>,
    fail_commit: bool,
}

/// In-memory [`DocumentLedger`] for tests and development.
///
/// Clones share the same underlying state, so a test can keep a handle
/// while the engine owns another. Link and commit failures can be injected
/// to exercise the engine's error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryLedger {
    /// Create an empty in-memory ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document to the ledger
    pub fn add_document(&self, document: Document) {
        self.inner.write().unwrap().documents.push(document);
    }

    /// Add a payment to the ledger
    pub fn add_payment(&self, payment: Payment) {
        self.inner.write().unwrap().payments.push(payment);
    }

    /// Look up a document by id
    pub fn document(&self, id: &str) -> Option<Document> {
        self.inner
            .read()
            .unwrap()
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    /// Look up a payment by id
    pub fn payment(&self, id: &str) -> Option<Payment> {
        self.inner
            .read()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Number of times `commit` has succeeded
    pub fn commit_count(&self) -> usize {
        self.inner.read().unwrap().commit_count
    }

    /// Make `link` fail for the given document id
    pub fn fail_link_for(&self, document_id: &str) {
        self.inner.write().unwrap().fail_link_for = Some(document_id.to_string());
    }

    /// Make `commit` fail
    pub fn fail_commit(&self) {
        self.inner.write().unwrap().fail_commit = true;
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.documents.clear();
        inner.payments.clear();
        inner.commit_count = 0;
    }
}

#[async_trait]
impl DocumentLedger for MemoryLedger {
    async fn list_open_documents(
        &self,
        mode: Mode,
        ar_ap_account: &str,
    ) -> MatchResult<Vec<Document>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .documents
            .iter()
            .filter(|d| !d.settled && d.kind == mode.document_kind() && d.account == ar_ap_account)
            .cloned()
            .collect())
    }

    async fn list_payments(&self, payment_account: &str) -> MatchResult<Vec<Payment>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .payments
            .iter()
            .filter(|p| p.document.is_none() && p.account == payment_account)
            .cloned()
            .collect())
    }

    async fn link(&mut self, document: &Document, payment: &Payment) -> MatchResult<()> {
        let mut inner = self.inner.write().unwrap();

        if inner.fail_link_for.as_deref() == Some(document.id.as_str()) {
            return Err(MatchError::Link(format!(
                "injected link failure for '{}'",
                document.id
            )));
        }

        let doc = inner
            .documents
            .iter_mut()
            .find(|d| d.id == document.id)
            .ok_or_else(|| MatchError::Link(format!("unknown document '{}'", document.id)))?;
        doc.settled = true;
        doc.settled_by = Some(payment.id.clone());

        let pay = inner
            .payments
            .iter_mut()
            .find(|p| p.id == payment.id)
            .ok_or_else(|| MatchError::Link(format!("unknown payment '{}'", payment.id)))?;
        pay.document = Some(document.id.clone());

        Ok(())
    }

    async fn commit(&mut self) -> MatchResult<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.fail_commit {
            return Err(MatchError::Commit("injected commit failure".to_string()));
        }
        inner.commit_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_listing_filters_by_account_mode_and_state() {
        let mut ledger = MemoryLedger::new();
        let due = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

        ledger.add_document(Document::new(
            "INV-1".to_string(),
            DocumentKind::Invoice,
            "Assets:Receivable".to_string(),
            BigDecimal::from(100),
            due,
        ));
        ledger.add_document(Document::new(
            "BILL-1".to_string(),
            DocumentKind::Bill,
            "Liabilities:Payable".to_string(),
            BigDecimal::from(50),
            due,
        ));
        let payment = Payment::new(
            "Assets:Checking".to_string(),
            due,
            BigDecimal::from(-100),
            "payment INV-1".to_string(),
        );
        ledger.add_payment(payment.clone());
        ledger.add_payment(Payment::new(
            "Assets:Savings".to_string(),
            due,
            BigDecimal::from(-100),
            "other account".to_string(),
        ));

        let open = ledger
            .list_open_documents(Mode::Ar, "Assets:Receivable")
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, "INV-1");

        let pool = ledger.list_payments("Assets:Checking").await.unwrap();
        assert_eq!(pool.len(), 1);

        // Linked documents and payments drop out of both listings
        ledger.link(&open[0], &payment).await.unwrap();
        assert!(ledger
            .list_open_documents(Mode::Ar, "Assets:Receivable")
            .await
            .unwrap()
            .is_empty());
        assert!(ledger
            .list_payments("Assets:Checking")
            .await
            .unwrap()
            .is_empty());
    }
}
