//! Point-of-sale report: in-memory filtering of fetched sale invoices and
//! the totals shown under the report.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::api::{Backend, RequestSequence, Ticket};
use crate::error::{AdminError, Result};
use crate::models::Invoice;
use crate::session::AccountScope;

/// Criteria held by the report viewer. The default value filters nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub invoice_no: Option<String>,
}

impl ReportFilter {
    /// Inclusive date range, only when both ends are set
    fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start.zip(self.end)
    }

    fn search(&self) -> Option<&str> {
        self.invoice_no.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.date_range().is_none() && self.search().is_none()
    }

    pub fn matches(&self, invoice: &Invoice) -> bool {
        let in_range = self
            .date_range()
            .map_or(true, |(start, end)| start <= invoice.date && invoice.date <= end);
        let number_matches = self
            .search()
            .map_or(true, |needle| invoice.invoice_no.contains(needle));
        in_range && number_matches
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportTotals {
    pub total_value: Decimal,
    pub total_count: usize,
}

/// Apply `filter` to an already fetched list. Order is preserved.
pub fn filter_invoices(all: &[Invoice], filter: &ReportFilter) -> Vec<Invoice> {
    all.iter().filter(|inv| filter.matches(inv)).cloned().collect()
}

pub fn summarize(invoices: &[Invoice]) -> Result<ReportTotals> {
    let total_value = invoices
        .iter()
        .try_fold(Decimal::ZERO, |total, inv| total.checked_add(inv.net_amount))
        .ok_or(AdminError::AmountOverflow)?;
    Ok(ReportTotals {
        total_value,
        total_count: invoices.len(),
    })
}

/// The fetched invoice list together with the operator's current filter.
/// Filtered rows and totals are derived on every call.
#[derive(Debug, Default)]
pub struct ReportView {
    all: Vec<Invoice>,
    filter: ReportFilter,
    sequence: RequestSequence,
}

impl ReportView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&mut self) -> Ticket {
        self.sequence.issue()
    }

    /// Replace the invoice list with a fetch result, unless a newer fetch was issued since.
    pub fn apply_load(&mut self, ticket: Ticket, invoices: Vec<Invoice>) -> bool {
        if !self.sequence.accept(ticket) {
            warn!(?ticket, "discarding stale invoice list");
            return false;
        }
        debug!(count = invoices.len(), "invoice list loaded");
        self.all = invoices;
        true
    }

    pub fn load(&mut self, backend: &dyn Backend, scope: &AccountScope) -> Result<()> {
        let ticket = self.begin_load();
        let invoices = backend.fetch_invoices(scope)?;
        self.apply_load(ticket, invoices);
        Ok(())
    }

    pub fn all(&self) -> &[Invoice] {
        &self.all
    }

    pub fn filter(&self) -> &ReportFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: ReportFilter) {
        self.filter = filter;
    }

    pub fn reset(&mut self) {
        self.filter = ReportFilter::default();
    }

    pub fn filtered(&self) -> Vec<Invoice> {
        filter_invoices(&self.all, &self.filter)
    }

    pub fn totals(&self) -> Result<ReportTotals> {
        summarize(&self.filtered())
    }

    /// Look up a fetched invoice by its exact number, ignoring the filter
    pub fn find(&self, invoice_no: &str) -> Option<&Invoice> {
        self.all.iter().find(|inv| inv.invoice_no == invoice_no)
    }
}
