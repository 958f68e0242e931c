use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::api::{Backend, PayoutSubmission, RequestSequence, SubmittedRow, Ticket};
use crate::error::{AdminError, Result};
use crate::models::SupplierInvoice;
use crate::money::round2;

use super::row::PayoutRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    #[default]
    Cash,
    Bank,
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMode::Cash => f.write_str("Cash"),
            PaymentMode::Bank => f.write_str("Bank"),
        }
    }
}

impl FromStr for PaymentMode {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMode::Cash),
            "bank" => Ok(PaymentMode::Bank),
            _ => Err(AdminError::InvalidChoice {
                field: "payment mode",
                value: s.to_string(),
                expected: "cash, bank",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Online,
    Cheque,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Online => f.write_str("Online"),
            PaymentMethod::Cheque => f.write_str("Cheque"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "online" => Ok(PaymentMethod::Online),
            "cheque" | "check" => Ok(PaymentMethod::Cheque),
            _ => Err(AdminError::InvalidChoice {
                field: "payment method",
                value: s.to_string(),
                expected: "online, cheque",
            }),
        }
    }
}

/// Header fields submitted together with the rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutHeader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub payment_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    pub payment_mode: PaymentMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_check_no: Option<String>,
    pub narration: String,
}

/// Outcome of picking a bill for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillSelection {
    Selected,
    /// No outstanding invoice has that number; the row was left as it was.
    NotFound,
}

/// Advance receipts total the received amounts; otherwise the remaining balances.
pub fn grand_total(rows: &[PayoutRow], advanced_receipt: bool) -> Result<Decimal> {
    rows.iter()
        .try_fold(Decimal::ZERO, |total, row| {
            let line = if advanced_receipt {
                Some(row.received())
            } else {
                row.paid().checked_sub(row.received())
            };
            line.and_then(|line| total.checked_add(line))
        })
        .ok_or(AdminError::AmountOverflow)
}

pub fn total_received(rows: &[PayoutRow]) -> Result<Decimal> {
    rows.iter()
        .try_fold(Decimal::ZERO, |total, row| total.checked_add(row.received()))
        .ok_or(AdminError::AmountOverflow)
}

fn initial_rows() -> Vec<PayoutRow> {
    vec![PayoutRow::blank(1)]
}

/// A payout under construction: header, at least one row, and the selected
/// supplier's outstanding invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutLedger {
    #[serde(default)]
    pub advanced_receipt: bool,
    #[serde(default)]
    pub header: PayoutHeader,
    #[serde(default = "initial_rows")]
    rows: Vec<PayoutRow>,
    #[serde(default)]
    supplier_invoices: Vec<SupplierInvoice>,
    #[serde(skip)]
    sequence: RequestSequence,
}

impl Default for PayoutLedger {
    fn default() -> Self {
        Self {
            advanced_receipt: false,
            header: PayoutHeader::default(),
            rows: initial_rows(),
            supplier_invoices: Vec::new(),
            sequence: RequestSequence::default(),
        }
    }
}

impl PayoutLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the one-row minimum after loading from disk
    pub(crate) fn normalize(&mut self) {
        if self.rows.is_empty() {
            self.rows = initial_rows();
        }
    }

    pub fn rows(&self) -> &[PayoutRow] {
        &self.rows
    }

    pub fn supplier_invoices(&self) -> &[SupplierInvoice] {
        &self.supplier_invoices
    }

    /// Append a blank row and return its id
    pub fn add_row(&mut self) -> u32 {
        let id = self.rows.iter().map(|row| row.id).max().map_or(1, |max| max + 1);
        self.rows.push(PayoutRow::blank(id));
        id
    }

    /// Remove a row by id. The last remaining row is never removed.
    pub fn remove_row(&mut self, id: u32) -> bool {
        if self.rows.len() <= 1 {
            return false;
        }
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        before != self.rows.len()
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut PayoutRow> {
        let count = self.rows.len();
        self.rows
            .get_mut(index)
            .ok_or(AdminError::RowOutOfRange { index: index + 1, count })
    }

    /// Fill a row from the supplier invoice numbered `invoice_no`
    pub fn select_bill(
        &mut self,
        index: usize,
        invoice_no: &str,
        supplier_invoices: &[SupplierInvoice],
    ) -> Result<BillSelection> {
        let row = self.row_mut(index)?;
        match supplier_invoices.iter().find(|inv| inv.invoice_no == invoice_no) {
            Some(invoice) => {
                row.apply_bill(invoice);
                debug!(row = row.id, bill = invoice_no, "bill selected");
                Ok(BillSelection::Selected)
            }
            None => {
                warn!(row = row.id, bill = invoice_no, "no outstanding invoice with that number");
                Ok(BillSelection::NotFound)
            }
        }
    }

    /// `select_bill` against the invoices loaded for the current supplier
    pub fn select_loaded_bill(&mut self, index: usize, invoice_no: &str) -> Result<BillSelection> {
        let invoices = std::mem::take(&mut self.supplier_invoices);
        let outcome = self.select_bill(index, invoice_no, &invoices);
        self.supplier_invoices = invoices;
        outcome
    }

    pub fn set_received_amount(&mut self, index: usize, text: &str) -> Result<()> {
        self.row_mut(index)?.enter_received(text);
        Ok(())
    }

    pub fn set_advanced_receipt(&mut self, enabled: bool) {
        self.advanced_receipt = enabled;
    }

    pub fn grand_total(&self) -> Result<Decimal> {
        grand_total(&self.rows, self.advanced_receipt)
    }

    pub fn total_received(&self) -> Result<Decimal> {
        total_received(&self.rows)
    }

    /// Issue a ticket for a supplier invoice fetch
    pub fn begin_supplier_load(&mut self) -> Ticket {
        self.sequence.issue()
    }

    /// Switch to `supplier` with its fetched invoices, unless a newer fetch was issued since.
    pub fn apply_supplier_invoices(
        &mut self,
        ticket: Ticket,
        supplier: &str,
        invoices: Vec<SupplierInvoice>,
    ) -> bool {
        if !self.sequence.accept(ticket) {
            warn!(?ticket, supplier, "discarding stale supplier invoices");
            return false;
        }
        self.header.supplier = Some(supplier.to_string());
        self.supplier_invoices = invoices;
        true
    }

    /// Select a supplier and load its outstanding invoices.
    /// A failed fetch leaves the previous supplier in place.
    pub fn load_supplier(&mut self, backend: &dyn Backend, supplier: &str) -> Result<usize> {
        let ticket = self.begin_supplier_load();
        let invoices = backend.fetch_supplier_invoices(supplier)?;
        let count = invoices.len();
        self.apply_supplier_invoices(ticket, supplier, invoices);
        Ok(count)
    }

    /// Build the `POST /payout` body. Bank details are only sent for bank payments.
    pub fn to_submission(&self) -> Result<PayoutSubmission> {
        let header = &self.header;
        let bank_payment = header.payment_mode == PaymentMode::Bank;

        let rows = self
            .rows
            .iter()
            .map(|row| -> Result<SubmittedRow> {
                let balance = row.balance_amount(self.advanced_receipt)?;
                Ok(SubmittedRow {
                    bill_no: row.bill_no.clone(),
                    bill_amount: row.bill_amount,
                    paid_amount: row.paid_amount,
                    received_amount: row.received_amount.clone(),
                    balance_amount: balance.and_then(|balance| balance.amount()),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PayoutSubmission {
            date: header.date,
            payment_no: header.payment_no.clone(),
            supplier_name: header.supplier.clone().unwrap_or_default(),
            payment_mode: header.payment_mode,
            bank_name: header.bank.clone().filter(|_| bank_payment),
            method: header.method.filter(|_| bank_payment),
            transaction_check_no: header.transaction_check_no.clone().filter(|_| bank_payment),
            rows,
            grand_total: round2(self.grand_total()?),
            narration: header.narration.clone(),
        })
    }

    /// Post the ledger. On success the form is cleared; on failure nothing changes.
    pub fn submit(&mut self, backend: &dyn Backend) -> Result<()> {
        let submission = self.to_submission()?;
        if let Err(e) = backend.submit_payout(&submission) {
            warn!(error = %e, "payout submission failed, keeping ledger");
            return Err(e);
        }
        info!(rows = submission.rows.len(), total = %submission.grand_total, "payout submitted");
        self.reset();
        Ok(())
    }

    /// Clear the header and collapse to a single blank row.
    /// The advance-receipt toggle is kept.
    pub fn reset(&mut self) {
        self.header = PayoutHeader::default();
        self.rows = initial_rows();
        self.supplier_invoices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bank, ChannelBalance, Invoice, Supplier};
    use crate::payout::Balance;
    use crate::session::AccountScope;
    use rust_decimal_macros::dec;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeBackend {
        invoices: Vec<SupplierInvoice>,
        fail_fetch: bool,
        fail_submit: bool,
        submitted: RefCell<Vec<PayoutSubmission>>,
    }

    impl Backend for FakeBackend {
        fn fetch_invoices(&self, _scope: &AccountScope) -> Result<Vec<Invoice>> {
            Ok(Vec::new())
        }

        fn fetch_suppliers(&self, _scope: &AccountScope) -> Result<Vec<Supplier>> {
            Ok(Vec::new())
        }

        fn fetch_banks(&self, _scope: &AccountScope) -> Result<Vec<Bank>> {
            Ok(Vec::new())
        }

        fn fetch_supplier_invoices(&self, _supplier_name: &str) -> Result<Vec<SupplierInvoice>> {
            if self.fail_fetch {
                return Err(AdminError::Status {
                    endpoint: "http://test/supplierInvoices".to_string(),
                    status: 503,
                });
            }
            Ok(self.invoices.clone())
        }

        fn submit_payout(&self, submission: &PayoutSubmission) -> Result<()> {
            if self.fail_submit {
                return Err(AdminError::Status {
                    endpoint: "http://test/payout".to_string(),
                    status: 500,
                });
            }
            self.submitted.borrow_mut().push(submission.clone());
            Ok(())
        }
    }

    fn supplier_invoice(no: &str, net: Decimal, cash: Option<Decimal>) -> SupplierInvoice {
        SupplierInvoice {
            invoice_no: no.to_string(),
            net_amount: net,
            cash: cash.map(|balance| ChannelBalance { balance }),
            bank: None,
        }
    }

    /// rows [{paid 100, received 30}, {paid 50, received 50}]
    fn two_row_ledger() -> PayoutLedger {
        let invoices = vec![
            supplier_invoice("PI-1", dec!(120), Some(dec!(100))),
            supplier_invoice("PI-2", dec!(50), Some(dec!(50))),
        ];
        let mut ledger = PayoutLedger::new();
        ledger.add_row();
        ledger.select_bill(0, "PI-1", &invoices).unwrap();
        ledger.select_bill(1, "PI-2", &invoices).unwrap();
        ledger.set_received_amount(0, "30").unwrap();
        ledger.set_received_amount(1, "50").unwrap();
        ledger
    }

    #[test]
    fn normal_mode_totals() {
        let ledger = two_row_ledger();
        assert_eq!(round2(ledger.grand_total().unwrap()), dec!(70.00));
        assert_eq!(round2(ledger.total_received().unwrap()), dec!(80.00));
        assert_eq!(
            ledger.rows()[0].balance_amount(false).unwrap(),
            Some(Balance::Amount(dec!(70)))
        );
    }

    #[test]
    fn advanced_mode_totals_received_only() {
        let mut ledger = two_row_ledger();
        ledger.set_advanced_receipt(true);

        assert_eq!(round2(ledger.grand_total().unwrap()), dec!(80.00));
        assert_eq!(ledger.grand_total().unwrap(), ledger.total_received().unwrap());
        assert!(ledger
            .rows()
            .iter()
            .all(|row| row.balance_amount(true).unwrap() == Some(Balance::NotApplicable)));
    }

    #[test]
    fn advanced_grand_total_ignores_paid_amount() {
        let mut rows = two_row_ledger().rows().to_vec();
        let before = grand_total(&rows, true).unwrap();
        rows[0].paid_amount = Some(dec!(9999));
        assert_eq!(grand_total(&rows, true).unwrap(), before);
        assert_ne!(
            grand_total(&rows, false).unwrap(),
            grand_total(&two_row_ledger().rows, false).unwrap()
        );
    }

    #[test]
    fn add_then_remove_restores_rows() {
        let mut ledger = two_row_ledger();
        let original = ledger.rows().to_vec();

        let id = ledger.add_row();
        assert_eq!(id, 3);
        assert!(ledger.remove_row(id));
        assert_eq!(ledger.rows(), original.as_slice());
    }

    #[test]
    fn new_row_id_follows_current_maximum() {
        let mut ledger = PayoutLedger::new();
        ledger.add_row();
        ledger.add_row();
        assert!(ledger.remove_row(2));
        assert_eq!(ledger.add_row(), 4);
    }

    #[test]
    fn sole_row_is_never_removed() {
        let mut ledger = PayoutLedger::new();
        assert!(!ledger.remove_row(1));
        assert_eq!(ledger.rows().len(), 1);
    }

    #[test]
    fn unknown_bill_leaves_row_unchanged() {
        let mut ledger = two_row_ledger();
        let before = ledger.rows()[0].clone();
        let outcome = ledger.select_bill(0, "PI-404", &[]).unwrap();
        assert_eq!(outcome, BillSelection::NotFound);
        assert_eq!(ledger.rows()[0], before);
    }

    #[test]
    fn row_index_out_of_range_is_an_error() {
        let mut ledger = PayoutLedger::new();
        assert!(matches!(
            ledger.set_received_amount(3, "10"),
            Err(AdminError::RowOutOfRange { index: 4, count: 1 })
        ));
    }

    #[test]
    fn loaded_supplier_invoices_feed_bill_selection() {
        let backend = FakeBackend {
            invoices: vec![supplier_invoice("PI-9", dec!(300), None)],
            ..Default::default()
        };
        let mut ledger = PayoutLedger::new();
        assert_eq!(ledger.load_supplier(&backend, "Acme").unwrap(), 1);
        assert_eq!(ledger.header.supplier.as_deref(), Some("Acme"));

        assert_eq!(ledger.select_loaded_bill(0, "PI-9").unwrap(), BillSelection::Selected);
        let row = &ledger.rows()[0];
        assert_eq!(row.bill_amount, Some(dec!(300)));
        assert_eq!(row.paid_amount, Some(Decimal::ZERO));
        assert_eq!(ledger.supplier_invoices().len(), 1);
    }

    #[test]
    fn failed_supplier_fetch_keeps_previous_supplier() {
        let acme = FakeBackend {
            invoices: vec![supplier_invoice("ACME-1", dec!(80), Some(dec!(80)))],
            ..Default::default()
        };
        let mut ledger = PayoutLedger::new();
        ledger.load_supplier(&acme, "Acme").unwrap();
        let before = ledger.clone();

        let down = FakeBackend {
            fail_fetch: true,
            ..Default::default()
        };
        assert!(ledger.load_supplier(&down, "Globex").is_err());
        assert_eq!(ledger, before);
        assert_eq!(ledger.header.supplier.as_deref(), Some("Acme"));
        assert_eq!(ledger.supplier_invoices()[0].invoice_no, "ACME-1");
    }

    #[test]
    fn stale_supplier_invoices_are_discarded() {
        let mut ledger = PayoutLedger::new();
        let first = ledger.begin_supplier_load();
        let second = ledger.begin_supplier_load();

        let newer = vec![supplier_invoice("NEW-1", dec!(1), None)];
        let older = vec![supplier_invoice("OLD-1", dec!(1), None)];
        assert!(ledger.apply_supplier_invoices(second, "New Supplier", newer));
        assert!(!ledger.apply_supplier_invoices(first, "Old Supplier", older));
        assert_eq!(ledger.supplier_invoices()[0].invoice_no, "NEW-1");
        assert_eq!(ledger.header.supplier.as_deref(), Some("New Supplier"));
    }

    #[test]
    fn successful_submit_resets_ledger() {
        let backend = FakeBackend::default();
        let mut ledger = two_row_ledger();
        ledger.header.payment_no = "PAY-7".to_string();
        ledger.header.payment_mode = PaymentMode::Bank;

        ledger.submit(&backend).unwrap();

        let sent = backend.submitted.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].payment_no, "PAY-7");
        assert_eq!(sent[0].grand_total, dec!(70.00));
        assert_eq!(sent[0].rows[1].balance_amount, Some(Decimal::ZERO));

        assert_eq!(ledger.header, PayoutHeader::default());
        assert_eq!(ledger.rows(), [PayoutRow::blank(1)].as_slice());
    }

    #[test]
    fn failed_submit_keeps_everything() {
        let backend = FakeBackend {
            fail_submit: true,
            ..Default::default()
        };
        let mut ledger = two_row_ledger();
        ledger.header.narration = "retry me".to_string();
        let before = ledger.clone();

        assert!(ledger.submit(&backend).is_err());
        assert_eq!(ledger, before);
    }

    #[test]
    fn submission_passes_raw_input_through() {
        let mut ledger = PayoutLedger::new();
        ledger.set_received_amount(0, "-5x").unwrap();
        let submission = ledger.to_submission().unwrap();
        assert_eq!(submission.rows[0].received_amount, "-5x");
        assert_eq!(submission.rows[0].balance_amount, Some(Decimal::ZERO));
        assert_eq!(submission.grand_total, Decimal::ZERO);
    }

    #[test]
    fn cash_submission_drops_bank_details() {
        let mut ledger = PayoutLedger::new();
        ledger.header.payment_mode = PaymentMode::Bank;
        ledger.header.bank = Some("City Bank".to_string());
        ledger.header.method = Some(PaymentMethod::Online);
        ledger.header.transaction_check_no = Some("TX-1".to_string());

        let bank = ledger.to_submission().unwrap();
        assert_eq!(bank.bank_name.as_deref(), Some("City Bank"));
        assert_eq!(bank.method, Some(PaymentMethod::Online));

        ledger.header.payment_mode = PaymentMode::Cash;
        let cash = ledger.to_submission().unwrap();
        assert_eq!(cash.bank_name, None);
        assert_eq!(cash.method, None);
        assert_eq!(cash.transaction_check_no, None);
        assert_eq!(ledger.header.bank.as_deref(), Some("City Bank"));
    }

    #[test]
    fn oversized_amounts_do_not_panic() {
        let huge = "79228162514264337593543950335";
        let backend = FakeBackend::default();
        let mut ledger = PayoutLedger::new();
        ledger.set_received_amount(0, huge).unwrap();
        ledger.add_row();
        ledger.set_received_amount(1, huge).unwrap();

        assert!(matches!(ledger.total_received(), Err(AdminError::AmountOverflow)));
        assert!(matches!(ledger.grand_total(), Err(AdminError::AmountOverflow)));
        assert!(matches!(ledger.to_submission(), Err(AdminError::AmountOverflow)));

        let before = ledger.clone();
        assert!(matches!(ledger.submit(&backend), Err(AdminError::AmountOverflow)));
        assert!(backend.submitted.borrow().is_empty());
        assert_eq!(ledger, before);

        ledger.set_received_amount(1, "").unwrap();
        assert_eq!(ledger.total_received().unwrap(), Decimal::MAX);
    }

    #[test]
    fn parses_modes_and_methods() {
        assert_eq!("BANK".parse::<PaymentMode>().unwrap(), PaymentMode::Bank);
        assert_eq!("cheque".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cheque);
        assert!("card".parse::<PaymentMode>().is_err());
    }
}
