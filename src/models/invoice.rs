use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A sale invoice as returned by the point-of-sale backend
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Invoice {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    #[serde(rename = "invoicNo", alias = "invoiceNo")]
    pub invoice_no: String,
    #[serde(rename = "customerDetail", default)]
    pub customer_detail: String,
    #[serde(rename = "paymentType", default)]
    pub payment_type: String,
    #[serde(rename = "netAmount")]
    pub net_amount: Decimal,
}

/// Invoice dates arrive either as `YYYY-MM-DD` or as a full timestamp.
/// Only the calendar date is kept.
mod calendar_date {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let day = raw.get(..10).unwrap_or(raw.as_str());
        NaiveDate::parse_from_str(day, FORMAT)
            .map_err(|e| D::Error::custom(format!("invalid invoice date '{raw}': {e}")))
    }
}
