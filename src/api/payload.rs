use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Bank, Invoice, Supplier, SupplierInvoice};
use crate::payout::{PaymentMethod, PaymentMode};

/// Body of `POST /payout`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutSubmission {
    pub date: Option<NaiveDate>,
    pub payment_no: String,
    pub supplier_name: String,
    pub payment_mode: PaymentMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_check_no: Option<String>,
    pub rows: Vec<SubmittedRow>,
    pub grand_total: Decimal,
    pub narration: String,
}

/// One payout line as sent to the backend. The received amount is passed
/// through exactly as the operator typed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedRow {
    pub bill_no: String,
    pub bill_amount: Option<Decimal>,
    pub paid_amount: Option<Decimal>,
    pub received_amount: String,
    /// `null` for advance receipts and untouched rows
    pub balance_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InvoiceList {
    #[serde(rename = "posList", default)]
    pub pos_list: Vec<Invoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SupplierList {
    #[serde(default)]
    pub data: Vec<Supplier>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BankList {
    #[serde(default)]
    pub data: Vec<Bank>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SupplierInvoiceList {
    #[serde(default)]
    pub response: Vec<SupplierInvoice>,
}
