mod payload;
mod sequence;

pub use payload::{PayoutSubmission, SubmittedRow};
pub use sequence::{RequestSequence, Ticket};

use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use ureq::Agent;

use crate::config::ServerSettings;
use crate::error::{AdminError, Result};
use crate::models::{Bank, Invoice, Supplier, SupplierInvoice};
use crate::session::AccountScope;
use payload::{BankList, InvoiceList, SupplierInvoiceList, SupplierList};

/// The REST backend the admin panel reads from and posts payouts to
pub trait Backend {
    fn fetch_invoices(&self, scope: &AccountScope) -> Result<Vec<Invoice>>;

    fn fetch_suppliers(&self, scope: &AccountScope) -> Result<Vec<Supplier>>;

    fn fetch_banks(&self, scope: &AccountScope) -> Result<Vec<Bank>>;

    /// Outstanding purchase invoices of one supplier
    fn fetch_supplier_invoices(&self, supplier_name: &str) -> Result<Vec<SupplierInvoice>>;

    fn submit_payout(&self, submission: &PayoutSubmission) -> Result<()>;
}

/// `Backend` over HTTP/JSON
pub struct HttpBackend {
    agent: Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(settings: &ServerSettings) -> Self {
        // A zero timeout means requests may wait indefinitely.
        let timeout = (settings.timeout_secs > 0).then(|| Duration::from_secs(settings.timeout_secs));

        let agent: Agent = Agent::config_builder()
            .timeout_global(timeout)
            .build()
            .into();

        Self {
            agent,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, key: &str, value: &str) -> Result<T> {
        let endpoint = self.endpoint(path);
        debug!(%endpoint, key, value, "GET");

        let body = self
            .agent
            .get(&endpoint)
            .query(key, value)
            .call()
            .map_err(|e| request_error(&endpoint, e))?
            .body_mut()
            .read_to_string()
            .map_err(|e| request_error(&endpoint, e))?;

        serde_json::from_str(&body).map_err(|source| AdminError::Decode { endpoint, source })
    }
}

fn request_error(endpoint: &str, error: ureq::Error) -> AdminError {
    match error {
        ureq::Error::StatusCode(status) => AdminError::Status {
            endpoint: endpoint.to_string(),
            status,
        },
        source => AdminError::Http {
            endpoint: endpoint.to_string(),
            source,
        },
    }
}

impl Backend for HttpBackend {
    fn fetch_invoices(&self, scope: &AccountScope) -> Result<Vec<Invoice>> {
        let list: InvoiceList = self.get_json("invoices", "accountId", scope.as_str())?;
        Ok(list.pos_list)
    }

    fn fetch_suppliers(&self, scope: &AccountScope) -> Result<Vec<Supplier>> {
        let list: SupplierList = self.get_json("suppliers", "accountId", scope.as_str())?;
        Ok(list.data)
    }

    fn fetch_banks(&self, scope: &AccountScope) -> Result<Vec<Bank>> {
        let list: BankList = self.get_json("banks", "accountId", scope.as_str())?;
        Ok(list.data)
    }

    fn fetch_supplier_invoices(&self, supplier_name: &str) -> Result<Vec<SupplierInvoice>> {
        let list: SupplierInvoiceList =
            self.get_json("supplierInvoices", "supplierName", supplier_name)?;
        Ok(list.response)
    }

    fn submit_payout(&self, submission: &PayoutSubmission) -> Result<()> {
        let endpoint = self.endpoint("payout");
        let body = serde_json::to_string(submission).map_err(AdminError::Encode)?;
        debug!(%endpoint, rows = submission.rows.len(), "POST");

        self.agent
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .send(body)
            .map_err(|e| request_error(&endpoint, e))?;

        info!(payment_no = %submission.payment_no, "payout accepted");
        Ok(())
    }
}
