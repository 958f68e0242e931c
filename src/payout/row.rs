use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AdminError, Result};
use crate::models::SupplierInvoice;
use crate::money::{format_amount, parse_amount, round2};

/// Net balance of a payout line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balance {
    Amount(Decimal),
    /// Advance receipt: the payment is not reconciled against a bill balance.
    NotApplicable,
}

impl Balance {
    pub fn amount(self) -> Option<Decimal> {
        match self {
            Balance::Amount(value) => Some(value),
            Balance::NotApplicable => None,
        }
    }

    pub fn is_not_applicable(self) -> bool {
        matches!(self, Balance::NotApplicable)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Balance::Amount(value) => f.write_str(&format_amount(*value)),
            Balance::NotApplicable => f.write_str("NA"),
        }
    }
}

/// `round2(paid - received)`, or not applicable for an advance receipt
pub fn compute_balance(
    paid_amount: Decimal,
    received_amount: Decimal,
    advanced_receipt: bool,
) -> Result<Balance> {
    if advanced_receipt {
        return Ok(Balance::NotApplicable);
    }
    paid_amount
        .checked_sub(received_amount)
        .map(|net| Balance::Amount(round2(net)))
        .ok_or(AdminError::AmountOverflow)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStage {
    #[default]
    Empty,
    BillSelected,
    AmountEntered,
}

/// One line of a payout: a supplier bill and the amount received against it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRow {
    pub id: u32,
    #[serde(default)]
    pub stage: RowStage,
    #[serde(default)]
    pub bill_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<Decimal>,
    /// Exactly what the operator typed
    #[serde(default)]
    pub received_amount: String,
}

impl PayoutRow {
    pub fn blank(id: u32) -> Self {
        Self {
            id,
            stage: RowStage::Empty,
            bill_no: String::new(),
            bill_amount: None,
            paid_amount: None,
            received_amount: String::new(),
        }
    }

    pub fn paid(&self) -> Decimal {
        self.paid_amount.unwrap_or(Decimal::ZERO)
    }

    pub fn received(&self) -> Decimal {
        parse_amount(&self.received_amount)
    }

    pub(crate) fn apply_bill(&mut self, invoice: &SupplierInvoice) {
        self.bill_no = invoice.invoice_no.clone();
        self.bill_amount = Some(invoice.net_amount);
        self.paid_amount = Some(invoice.outstanding_balance());
        if self.stage == RowStage::Empty {
            self.stage = RowStage::BillSelected;
        }
    }

    pub(crate) fn enter_received(&mut self, text: &str) {
        self.received_amount = text.to_string();
        self.stage = RowStage::AmountEntered;
    }

    /// `None` until a bill is selected or an amount is entered
    pub fn balance_amount(&self, advanced_receipt: bool) -> Result<Option<Balance>> {
        match self.stage {
            RowStage::Empty => Ok(None),
            RowStage::BillSelected | RowStage::AmountEntered => {
                compute_balance(self.paid(), self.received(), advanced_receipt).map(Some)
            }
        }
    }
}
