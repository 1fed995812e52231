//! JSON snapshot ledger backing the command-line tool
//!
//! The snapshot file holds the known account paths plus the documents and
//! payments posted to them. Links are recorded in memory as matching
//! proceeds; `commit` rewrites the whole file in one call, which is the
//! all-or-nothing durability boundary the engine relies on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::traits::DocumentLedger;
use crate::types::*;

/// On-disk snapshot format
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    /// Full paths of the accounts present in the ledger
    #[serde(default)]
    accounts: Vec<String>,
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    payments: Vec<Payment>,
}

/// File-backed [`DocumentLedger`] over a JSON snapshot
#[derive(Debug)]
pub struct JsonLedger {
    path: PathBuf,
    snapshot: Snapshot,
}

impl JsonLedger {
    /// Open a snapshot file, reading it fully into memory
    pub fn open(path: impl AsRef<Path>) -> MatchResult<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = fs::read_to_string(&path).map_err(|e| {
            MatchError::Ledger(format!("cannot open ledger file '{}': {}", path.display(), e))
        })?;
        let snapshot = serde_json::from_str(&raw).map_err(|e| {
            MatchError::Ledger(format!(
                "cannot parse ledger file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self { path, snapshot })
    }

    /// Resolve an account path string against the ledger's account list.
    ///
    /// Unknown paths are a fatal error, caught before any matching begins.
    pub fn resolve_account(&self, account_path: &str) -> MatchResult<()> {
        if self.snapshot.accounts.iter().any(|a| a == account_path) {
            Ok(())
        } else {
            Err(MatchError::AccountNotFound(account_path.to_string()))
        }
    }
}

#[async_trait]
impl DocumentLedger for JsonLedger {
    async fn list_open_documents(
        &self,
        mode: Mode,
        ar_ap_account: &str,
    ) -> MatchResult<Vec<Document>> {
        Ok(self
            .snapshot
            .documents
            .iter()
            .filter(|d| !d.settled && d.kind == mode.document_kind() && d.account == ar_ap_account)
            .cloned()
            .collect())
    }

    async fn list_payments(&self, payment_account: &str) -> MatchResult<Vec<Payment>> {
        Ok(self
            .snapshot
            .payments
            .iter()
            .filter(|p| p.document.is_none() && p.account == payment_account)
            .cloned()
            .collect())
    }

    async fn link(&mut self, document: &Document, payment: &Payment) -> MatchResult<()> {
        let doc = self
            .snapshot
            .documents
            .iter_mut()
            .find(|d| d.id == document.id)
            .ok_or_else(|| MatchError::Link(format!("unknown document '{}'", document.id)))?;
        if doc.settled {
            return Err(MatchError::Link(format!(
                "document '{}' is already settled",
                document.id
            )));
        }

        let pay = self
            .snapshot
            .payments
            .iter_mut()
            .find(|p| p.id == payment.id)
            .ok_or_else(|| MatchError::Link(format!("unknown payment '{}'", payment.id)))?;
        if pay.document.is_some() {
            return Err(MatchError::Link(format!(
                "payment '{}' is already linked",
                payment.id
            )));
        }

        pay.document = Some(document.id.clone());
        doc.settled = true;
        doc.settled_by = Some(payment.id.clone());
        Ok(())
    }

    async fn commit(&mut self) -> MatchResult<()> {
        let serialized = serde_json::to_string_pretty(&self.snapshot)
            .map_err(|e| MatchError::Commit(e.to_string()))?;
        fs::write(&self.path, serialized).map_err(|e| {
            MatchError::Commit(format!(
                "cannot write ledger file '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "accounts": [
            "Assets:Current Assets:Checking Account",
            "Assets:Accounts Receivable"
        ],
        "documents": [
            {
                "id": "INV-1",
                "kind": "invoice",
                "account": "Assets:Accounts Receivable",
                "due_amount": "100",
                "due_date": "2024-01-10"
            }
        ],
        "payments": [
            {
                "account": "Assets:Current Assets:Checking Account",
                "date": "2024-01-12",
                "amount": "-100",
                "description": "payment INV-1"
            }
        ]
    }"#;

    fn write_snapshot(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_resolve_account() {
        let file = write_snapshot(SNAPSHOT);
        let ledger = JsonLedger::open(file.path()).unwrap();

        assert!(ledger
            .resolve_account("Assets:Current Assets:Checking Account")
            .is_ok());
        assert!(matches!(
            ledger.resolve_account("Assets:Petty Cash"),
            Err(MatchError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_open_missing_file_is_ledger_error() {
        let result = JsonLedger::open("/nonexistent/ledger.json");
        assert!(matches!(result, Err(MatchError::Ledger(_))));
    }

    #[tokio::test]
    async fn test_payments_without_ids_get_generated_identities() {
        let file = write_snapshot(SNAPSHOT);
        let ledger = JsonLedger::open(file.path()).unwrap();

        let payments = ledger
            .list_payments("Assets:Current Assets:Checking Account")
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);
        assert!(!payments[0].id.is_empty());
    }

    #[tokio::test]
    async fn test_link_and_commit_round_trip() {
        let file = write_snapshot(SNAPSHOT);
        let mut ledger = JsonLedger::open(file.path()).unwrap();

        let doc = ledger
            .list_open_documents(Mode::Ar, "Assets:Accounts Receivable")
            .await
            .unwrap()
            .remove(0);
        let payment = ledger
            .list_payments("Assets:Current Assets:Checking Account")
            .await
            .unwrap()
            .remove(0);

        assert_eq!(doc.due_amount, BigDecimal::from(100));
        assert_eq!(
            payment.date,
            NaiveDate::from_ymd_opt(2024, 1, 12).unwrap()
        );

        ledger.link(&doc, &payment).await.unwrap();
        ledger.commit().await.unwrap();

        // The settled state survives a reopen
        let reopened = JsonLedger::open(file.path()).unwrap();
        assert!(reopened
            .list_open_documents(Mode::Ar, "Assets:Accounts Receivable")
            .await
            .unwrap()
            .is_empty());
        assert!(reopened
            .list_payments("Assets:Current Assets:Checking Account")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_double_link_rejected() {
        let file = write_snapshot(SNAPSHOT);
        let mut ledger = JsonLedger::open(file.path()).unwrap();

        let doc = ledger
            .list_open_documents(Mode::Ar, "Assets:Accounts Receivable")
            .await
            .unwrap()
            .remove(0);
        let payment = ledger
            .list_payments("Assets:Current Assets:Checking Account")
            .await
            .unwrap()
            .remove(0);

        ledger.link(&doc, &payment).await.unwrap();
        let second = ledger.link(&doc, &payment).await;
        assert!(matches!(second, Err(MatchError::Link(_))));
    }
}
