use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Supplier {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Bank {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub name: String,
}

/// Outstanding balance of a purchase invoice on one payment channel
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChannelBalance {
    #[serde(rename = "Balance", alias = "balance", default)]
    pub balance: Decimal,
}

/// A supplier's purchase invoice that payouts are allocated against
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SupplierInvoice {
    #[serde(rename = "invoiceNo", default)]
    pub invoice_no: String,
    #[serde(rename = "netAmount", default)]
    pub net_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash: Option<ChannelBalance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<ChannelBalance>,
}

impl SupplierInvoice {
    /// Balance still owed: the cash channel wins over the bank channel, zero if neither is recorded.
    pub fn outstanding_balance(&self) -> Decimal {
        self.cash
            .as_ref()
            .or(self.bank.as_ref())
            .map_or(Decimal::ZERO, |channel| channel.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn invoice(cash: Option<Decimal>, bank: Option<Decimal>) -> SupplierInvoice {
        SupplierInvoice {
            invoice_no: "PI-1".to_string(),
            net_amount: dec!(500),
            cash: cash.map(|balance| ChannelBalance { balance }),
            bank: bank.map(|balance| ChannelBalance { balance }),
        }
    }

    #[test]
    fn cash_balance_is_preferred() {
        assert_eq!(invoice(Some(dec!(120)), Some(dec!(80))).outstanding_balance(), dec!(120));
    }

    #[test]
    fn falls_back_to_bank_then_zero() {
        assert_eq!(invoice(None, Some(dec!(80))).outstanding_balance(), dec!(80));
        assert_eq!(invoice(None, None).outstanding_balance(), Decimal::ZERO);
    }

    #[test]
    fn decodes_nested_channel_balance() {
        let json = r#"{"invoiceNo": "PI-9", "netAmount": 300, "bank": {"Balance": "275.25"}}"#;
        let parsed: SupplierInvoice = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.outstanding_balance(), dec!(275.25));
        assert!(parsed.cash.is_none());
    }
}
