pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod money;
pub mod payout;
pub mod report;
pub mod session;

pub use api::{Backend, HttpBackend, PayoutSubmission};
pub use config::{Config, ServerSettings, SessionSettings};
pub use error::{AdminError, Result};
pub use models::{Bank, Invoice, Supplier, SupplierInvoice};
pub use payout::{Balance, BillSelection, PayoutLedger, PayoutRow};
pub use report::{filter_invoices, summarize, ReportFilter, ReportTotals, ReportView};
pub use session::{AccountScope, Session};
