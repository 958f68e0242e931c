mod invoice;
mod supplier;

pub use invoice::Invoice;
pub use supplier::{Bank, ChannelBalance, Supplier, SupplierInvoice};
