//! Matching configuration and constraint predicates

use bigdecimal::BigDecimal;

use crate::types::*;

/// Inclusive window on the distance between payment date and document date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// Days the document date may fall after the payment date
    pub days_before: i64,
    /// Days the document date may fall before the payment date
    pub days_after: i64,
}

/// The run's matching configuration, validated at construction
///
/// The amount constraint is always on; the remaining predicates are
/// optional narrowing filters. All enabled predicates are combined with
/// logical AND.
#[derive(Debug, Clone)]
pub struct MatchConstraints {
    mode: Mode,
    date_window: Option<DateWindow>,
    match_id: bool,
    match_billing_id: bool,
}

impl MatchConstraints {
    /// Create a constraint set with only the mandatory amount constraint
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            date_window: None,
            match_id: false,
            match_billing_id: false,
        }
    }

    /// Build a constraint set from command-line style options.
    ///
    /// `days_before` and `days_after` must be given together or not at
    /// all; specifying only one is a configuration error, rejected before
    /// any document is processed.
    pub fn from_options(
        mode: Mode,
        days_before: Option<i64>,
        days_after: Option<i64>,
        match_id: bool,
        match_billing_id: bool,
    ) -> MatchResult<Self> {
        let date_window = match (days_before, days_after) {
            (Some(days_before), Some(days_after)) => Some(DateWindow {
                days_before,
                days_after,
            }),
            (None, None) => None,
            _ => {
                return Err(MatchError::Config(
                    "days_before and days_after must be specified together".to_string(),
                ))
            }
        };

        Ok(Self {
            mode,
            date_window,
            match_id,
            match_billing_id,
        })
    }

    /// Enable the date window constraint
    pub fn with_date_window(mut self, days_before: i64, days_after: i64) -> Self {
        self.date_window = Some(DateWindow {
            days_before,
            days_after,
        });
        self
    }

    /// Require the document id to occur in the payment description
    pub fn with_match_id(mut self) -> Self {
        self.match_id = true;
        self
    }

    /// Require the document billing id to occur in the payment description
    pub fn with_match_billing_id(mut self) -> Self {
        self.match_billing_id = true;
        self
    }

    /// The mode this constraint set was built for
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Mandatory predicate: the payment must exactly cancel the document's
    /// outstanding amount under the mode's sign convention
    pub fn amount_matches(&self, document: &Document, payment: &Payment) -> bool {
        &payment.amount * BigDecimal::from(self.mode.sign()) == -(&document.due_amount)
    }

    /// Optional predicate: document date within the configured window of
    /// the payment date (inclusive on both ends); true when no window is set
    pub fn date_matches(&self, document: &Document, payment: &Payment) -> bool {
        match self.date_window {
            Some(window) => {
                let diff = (payment.date - document.due_date).num_days();
                -window.days_before <= diff && diff <= window.days_after
            }
            None => true,
        }
    }

    /// Optional predicate: document id occurs in the payment description;
    /// true when disabled
    pub fn id_matches(&self, document: &Document, payment: &Payment) -> bool {
        !self.match_id || payment.description.contains(&document.id)
    }

    /// Optional predicate: billing id occurs in the payment description.
    /// A document without a billing id cannot satisfy this predicate while
    /// it is enabled; true when disabled
    pub fn billing_id_matches(&self, document: &Document, payment: &Payment) -> bool {
        if !self.match_billing_id {
            return true;
        }
        match &document.billing_id {
            Some(billing_id) => payment.description.contains(billing_id),
            None => false,
        }
    }

    /// Evaluate the full constraint set for a document/payment pair
    pub fn eligible(&self, document: &Document, payment: &Payment) -> bool {
        self.amount_matches(document, payment)
            && self.date_matches(document, payment)
            && self.id_matches(document, payment)
            && self.billing_id_matches(document, payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(amount: i64, due: NaiveDate) -> Document {
        Document::new(
            "INV-1".to_string(),
            DocumentKind::Invoice,
            "Assets:Receivable".to_string(),
            BigDecimal::from(amount),
            due,
        )
    }

    fn payment(amount: i64, on: NaiveDate, description: &str) -> Payment {
        Payment::new(
            "Assets:Checking".to_string(),
            on,
            BigDecimal::from(amount),
            description.to_string(),
        )
    }

    #[test]
    fn test_half_specified_window_rejected() {
        let err = MatchConstraints::from_options(Mode::Ar, Some(5), None, false, false);
        assert!(matches!(err, Err(MatchError::Config(_))));

        let err = MatchConstraints::from_options(Mode::Ar, None, Some(5), false, false);
        assert!(matches!(err, Err(MatchError::Config(_))));

        assert!(MatchConstraints::from_options(Mode::Ar, None, None, false, false).is_ok());
        assert!(MatchConstraints::from_options(Mode::Ar, Some(0), Some(0), false, false).is_ok());
    }

    #[test]
    fn test_amount_must_cancel_exactly_ar() {
        let constraints = MatchConstraints::new(Mode::Ar);
        let doc = invoice(100, date(2024, 1, 10));

        let pay = payment(-100, date(2024, 1, 12), "payment");
        assert!(constraints.amount_matches(&doc, &pay));

        // Same sign does not cancel
        let pay = payment(100, date(2024, 1, 12), "payment");
        assert!(!constraints.amount_matches(&doc, &pay));

        // Near-equality is not equality
        let pay = payment(-99, date(2024, 1, 12), "payment");
        assert!(!constraints.amount_matches(&doc, &pay));
    }

    #[test]
    fn test_amount_sign_convention_ap() {
        let constraints = MatchConstraints::new(Mode::Ap);
        let doc = Document::new(
            "BILL-7".to_string(),
            DocumentKind::Bill,
            "Liabilities:Payable".to_string(),
            BigDecimal::from(250),
            date(2024, 3, 1),
        );

        let pay = payment(250, date(2024, 3, 3), "vendor payment");
        assert!(constraints.amount_matches(&doc, &pay));

        let pay = payment(-250, date(2024, 3, 3), "vendor payment");
        assert!(!constraints.amount_matches(&doc, &pay));
    }

    #[test]
    fn test_date_window_inclusive_bounds() {
        let constraints = MatchConstraints::new(Mode::Ar).with_date_window(5, 3);
        let doc = invoice(100, date(2024, 1, 10));

        // diff = payment - document, must lie in [-5, 3]
        assert!(constraints.date_matches(&doc, &payment(-100, date(2024, 1, 5), "")));
        assert!(constraints.date_matches(&doc, &payment(-100, date(2024, 1, 13), "")));
        assert!(!constraints.date_matches(&doc, &payment(-100, date(2024, 1, 4), "")));
        assert!(!constraints.date_matches(&doc, &payment(-100, date(2024, 1, 14), "")));
    }

    #[test]
    fn test_date_window_boundary_excludes_late_payment() {
        // days_before=5, days_after=0: a payment six days after the
        // document date is outside the window even with a matching amount.
        let constraints = MatchConstraints::new(Mode::Ar).with_date_window(5, 0);
        let doc = invoice(100, date(2024, 1, 10));
        let pay = payment(-100, date(2024, 1, 16), "payment INV-1");

        assert!(constraints.amount_matches(&doc, &pay));
        assert!(!constraints.date_matches(&doc, &pay));
        assert!(!constraints.eligible(&doc, &pay));
    }

    #[test]
    fn test_id_substring_constraint() {
        let constraints = MatchConstraints::new(Mode::Ar).with_match_id();
        let doc = invoice(100, date(2024, 1, 10));

        assert!(constraints.eligible(&doc, &payment(-100, date(2024, 1, 12), "wire INV-1 jan")));
        assert!(!constraints.eligible(&doc, &payment(-100, date(2024, 1, 12), "wire jan")));
    }

    #[test]
    fn test_billing_id_substring_constraint() {
        let constraints = MatchConstraints::new(Mode::Ar).with_match_billing_id();
        let doc = invoice(100, date(2024, 1, 10)).with_billing_id("PO-991".to_string());

        assert!(constraints.eligible(&doc, &payment(-100, date(2024, 1, 12), "ref PO-991")));
        assert!(!constraints.eligible(&doc, &payment(-100, date(2024, 1, 12), "ref PO-100")));

        // A document without a billing id cannot satisfy the enabled flag
        let bare = invoice(100, date(2024, 1, 10));
        assert!(!constraints.eligible(&bare, &payment(-100, date(2024, 1, 12), "ref PO-991")));
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let constraints = MatchConstraints::new(Mode::Ar)
            .with_date_window(5, 5)
            .with_match_id();
        let doc = invoice(100, date(2024, 1, 10));

        // Passes amount and id but fails the window
        let pay = payment(-100, date(2024, 2, 1), "payment INV-1");
        assert!(!constraints.eligible(&doc, &pay));

        // Passes everything
        let pay = payment(-100, date(2024, 1, 12), "payment INV-1");
        assert!(constraints.eligible(&doc, &pay));
    }
}
