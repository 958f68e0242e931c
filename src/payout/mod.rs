//! Supplier payout ledger: rows allocated against outstanding bills,
//! their balances and the totals submitted with them.

mod ledger;
mod row;

pub use ledger::{
    grand_total, total_received, BillSelection, PaymentMethod, PaymentMode, PayoutHeader,
    PayoutLedger,
};
pub use row::{compute_balance, Balance, PayoutRow, RowStage};
