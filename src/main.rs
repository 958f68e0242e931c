use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use pos_admin::config::{
    config_dir, discard_draft, load_config, load_draft, save_draft, Config, CONFIG_FILE,
    CONFIG_TEMPLATE,
};
use pos_admin::error::{AdminError, Result};
use pos_admin::models::Invoice;
use pos_admin::money::{format_amount, round2};
use pos_admin::payout::{Balance, BillSelection, PaymentMethod, PaymentMode, PayoutLedger};
use pos_admin::report::{ReportFilter, ReportView};
use pos_admin::session::Session;
use pos_admin::{Backend, HttpBackend};

#[derive(Parser)]
#[command(name = "pos-admin")]
#[command(version, about = "Point-of-sale reports and supplier payouts", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.pos-admin)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Backend base URL, overriding [server] base_url
    #[arg(long, global = true, env = "POS_ADMIN_BASE_URL")]
    base_url: Option<String>,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Show configuration, account scope and the payout draft
    Status,

    /// Point-of-sale invoice report for the signed-in account
    Report {
        /// Invoices dated on or after this day (YYYY-MM-DD, needs --to)
        #[arg(long)]
        from: Option<String>,

        /// Invoices dated on or before this day (YYYY-MM-DD, needs --from)
        #[arg(long)]
        to: Option<String>,

        /// Only invoice numbers containing this text (case-sensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Print the details of one invoice instead of the table
        #[arg(long, value_name = "INVOICE_NO")]
        show: Option<String>,
    },

    /// List suppliers of the signed-in account
    Suppliers,

    /// List banks of the signed-in account
    Banks,

    /// Build and submit a supplier payout
    Payout {
        #[command(subcommand)]
        action: PayoutAction,
    },
}

#[derive(Subcommand)]
enum PayoutAction {
    /// Show the payout draft with balances and totals
    Show,

    /// Set header fields of the draft
    Header {
        /// Payment date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        payment_no: Option<String>,

        /// cash or bank
        #[arg(long)]
        mode: Option<String>,

        /// Bank name (bank payments)
        #[arg(long)]
        bank: Option<String>,

        /// online or cheque (bank payments)
        #[arg(long)]
        method: Option<String>,

        /// Transaction or cheque number
        #[arg(long)]
        txn: Option<String>,

        #[arg(long)]
        narration: Option<String>,
    },

    /// Select the supplier and load its outstanding invoices
    Supplier {
        name: String,
    },

    /// Treat the payout as an advance receipt
    Advanced {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Append a blank row
    AddRow,

    /// Remove a row by its ID
    RemoveRow {
        id: u32,
    },

    /// Pick the bill for a row (row number as shown by 'payout show')
    Bill {
        row: usize,
        invoice: String,
    },

    /// Enter the amount received for a row
    Receive {
        row: usize,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Submit the draft to the backend
    Submit,

    /// Discard the draft
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::prelude::*;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    tracing_subscriber::registry().with(fmt_layer).init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };
    let base_url = cli.base_url;

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir, base_url),
        Commands::Report {
            from,
            to,
            search,
            show,
        } => cmd_report(&cfg_dir, base_url, from, to, search, show),
        Commands::Suppliers => cmd_suppliers(&cfg_dir, base_url),
        Commands::Banks => cmd_banks(&cfg_dir, base_url),
        Commands::Payout {
            action: PayoutAction::Reset,
        } => cmd_payout_reset(&cfg_dir),
        Commands::Payout { action } => cmd_payout(&cfg_dir, base_url, action),
    }
}

fn load_config_with(cfg_dir: &Path, base_url: Option<String>) -> Result<Config> {
    let mut config = load_config(cfg_dir)?;
    if let Some(url) = base_url {
        config.server.base_url = url;
    }
    Ok(config)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AdminError::InvalidDate(value.to_string()))
}

fn money(symbol: &str, value: Decimal) -> String {
    format!("{}{}", symbol, format_amount(value))
}

fn money_or_na(symbol: &str, value: Option<Decimal>) -> String {
    value.map_or_else(|| "NA".to_string(), |v| money(symbol, v))
}

fn money_total(symbol: &str, total: Result<Decimal>) -> String {
    total.map_or_else(|_| "too large to total".to_string(), |v| money(symbol, v))
}

fn balance_cell(balance: Result<Option<Balance>>) -> String {
    match balance {
        Ok(Some(balance)) => balance.to_string(),
        Ok(None) => "NA".to_string(),
        Err(_) => "overflow".to_string(),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(AdminError::AlreadyInitialized(cfg_dir.clone()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join(CONFIG_FILE), CONFIG_TEMPLATE)?;

    println!("Initialized pos-admin config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point it at your backend and account:  $EDITOR {}/{}",
        cfg_dir.display(),
        CONFIG_FILE
    );
    println!("  2. Check the setup:                       pos-admin status");

    Ok(())
}

fn cmd_status(cfg_dir: &PathBuf, base_url: Option<String>) -> Result<()> {
    let config = load_config_with(cfg_dir, base_url)?;
    let ledger = load_draft(cfg_dir)?;
    let session = Session::from_settings(&config.session);

    println!("POS Admin Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Backend:          {}", config.server.base_url);
    match session.account_scope() {
        Ok(scope) => println!("Account:          {scope}"),
        Err(e) => println!("Account:          unresolved ({e})"),
    }

    println!();
    println!("Payout draft:");
    println!(
        "  Supplier:    {}",
        ledger.header.supplier.as_deref().unwrap_or("-")
    );
    println!("  Rows:        {}", ledger.rows().len());
    println!(
        "  Grand total: {}",
        money_total(&config.display.currency_symbol, ledger.grand_total())
    );

    Ok(())
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "INVOICE NO")]
    number: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "PAYMENT")]
    payment_type: String,
    #[tabled(rename = "TOTAL VALUE")]
    total: String,
}

fn cmd_report(
    cfg_dir: &PathBuf,
    base_url: Option<String>,
    from: Option<String>,
    to: Option<String>,
    search: Option<String>,
    show: Option<String>,
) -> Result<()> {
    let config = load_config_with(cfg_dir, base_url)?;
    let symbol = &config.display.currency_symbol;

    let filter = ReportFilter {
        start: from.as_deref().map(parse_date).transpose()?,
        end: to.as_deref().map(parse_date).transpose()?,
        invoice_no: search,
    };
    if filter.start.is_some() != filter.end.is_some() {
        eprintln!("Note: date filtering needs both --from and --to; showing all dates.");
    }

    let scope = Session::from_settings(&config.session).account_scope()?;
    let backend = HttpBackend::new(&config.server);

    let mut view = ReportView::new();
    view.load(&backend, &scope)?;

    if let Some(invoice_no) = show {
        let invoice = view
            .find(&invoice_no)
            .ok_or(AdminError::InvoiceNotFound(invoice_no))?;
        print_invoice(invoice, symbol);
        return Ok(());
    }

    view.set_filter(filter);

    let invoices = view.filtered();
    let totals = view.totals()?;

    println!("Point of Sales Report");
    if invoices.is_empty() {
        println!("No data");
    } else {
        let rows: Vec<ReportRow> = invoices
            .iter()
            .enumerate()
            .map(|(idx, inv)| ReportRow {
                index: idx + 1,
                date: inv.date.to_string(),
                number: inv.invoice_no.clone(),
                customer: inv.customer_detail.clone(),
                payment_type: inv.payment_type.clone(),
                total: money(symbol, inv.net_amount),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    println!();
    println!("Total invoices: {}", totals.total_count);
    println!("Total value:    {}", money(symbol, totals.total_value));

    Ok(())
}

fn print_invoice(invoice: &Invoice, symbol: &str) {
    println!("Invoice {}", invoice.invoice_no);
    println!("{}", "-".repeat(50));
    println!("ID:          {}", invoice.id);
    println!("Date:        {}", invoice.date);
    println!("Customer:    {}", invoice.customer_detail);
    println!("Payment:     {}", invoice.payment_type);
    println!("Net amount:  {}", money(symbol, invoice.net_amount));
}

#[derive(Tabled)]
struct NameRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NAME")]
    name: String,
}

fn print_names(kind: &str, names: Vec<String>) {
    if names.is_empty() {
        println!("No {kind} found.");
        return;
    }

    let rows: Vec<NameRow> = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| NameRow {
            index: idx + 1,
            name,
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}

fn cmd_suppliers(cfg_dir: &PathBuf, base_url: Option<String>) -> Result<()> {
    let config = load_config_with(cfg_dir, base_url)?;
    let scope = Session::from_settings(&config.session).account_scope()?;
    let suppliers = HttpBackend::new(&config.server).fetch_suppliers(&scope)?;

    print_names("suppliers", suppliers.into_iter().map(|s| s.name).collect());
    Ok(())
}

fn cmd_banks(cfg_dir: &PathBuf, base_url: Option<String>) -> Result<()> {
    let config = load_config_with(cfg_dir, base_url)?;
    let scope = Session::from_settings(&config.session).account_scope()?;
    let banks = HttpBackend::new(&config.server).fetch_banks(&scope)?;

    print_names("banks", banks.into_iter().map(|b| b.name).collect());
    Ok(())
}

#[derive(Tabled)]
struct PayoutRowView {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "BILL NO")]
    bill_no: String,
    #[tabled(rename = "BILL AMOUNT")]
    bill_amount: String,
    #[tabled(rename = "BALANCE")]
    paid_amount: String,
    #[tabled(rename = "RECEIVED")]
    received: String,
    #[tabled(rename = "NET BALANCE")]
    balance: String,
}

#[derive(Tabled)]
struct BillView {
    #[tabled(rename = "INVOICE NO")]
    number: String,
    #[tabled(rename = "NET AMOUNT")]
    net_amount: String,
    #[tabled(rename = "OUTSTANDING")]
    outstanding: String,
}

fn print_ledger(ledger: &PayoutLedger, symbol: &str) {
    let header = &ledger.header;

    println!("Payout Draft");
    println!("{}", "-".repeat(50));
    println!(
        "Date:            {}",
        header.date.map_or_else(|| "-".to_string(), |d| d.to_string())
    );
    println!("Payment no:      {}", header.payment_no);
    println!(
        "Supplier:        {}",
        header.supplier.as_deref().unwrap_or("-")
    );
    println!("Payment mode:    {}", header.payment_mode);
    if header.payment_mode == PaymentMode::Bank {
        println!("Bank:            {}", header.bank.as_deref().unwrap_or("-"));
        println!(
            "Method:          {}",
            header.method.map_or_else(|| "-".to_string(), |m| m.to_string())
        );
        println!(
            "Txn / cheque no: {}",
            header.transaction_check_no.as_deref().unwrap_or("-")
        );
    }
    println!(
        "Advance receipt: {}",
        if ledger.advanced_receipt { "yes" } else { "no" }
    );
    println!("Narration:       {}", header.narration);
    println!();

    let rows: Vec<PayoutRowView> = ledger
        .rows()
        .iter()
        .enumerate()
        .map(|(idx, row)| PayoutRowView {
            index: idx + 1,
            id: row.id,
            bill_no: if row.bill_no.is_empty() {
                "-".to_string()
            } else {
                row.bill_no.clone()
            },
            bill_amount: money_or_na(symbol, row.bill_amount),
            paid_amount: money_or_na(symbol, row.paid_amount),
            received: row.received_amount.clone(),
            balance: balance_cell(row.balance_amount(ledger.advanced_receipt)),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Grand total:     {}", money_total(symbol, ledger.grand_total()));
    println!("Total received:  {}", money_total(symbol, ledger.total_received()));
}

/// Discard the draft without parsing it
fn cmd_payout_reset(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(AdminError::ConfigNotFound(cfg_dir.clone()));
    }

    if discard_draft(cfg_dir)? {
        println!("Discarded payout draft.");
    } else {
        println!("No payout draft to discard.");
    }
    Ok(())
}

/// Convert a 1-based row number from the command line
fn row_index(row: usize, ledger: &PayoutLedger) -> Result<usize> {
    row.checked_sub(1).ok_or(AdminError::RowOutOfRange {
        index: row,
        count: ledger.rows().len(),
    })
}

fn cmd_payout(cfg_dir: &PathBuf, base_url: Option<String>, action: PayoutAction) -> Result<()> {
    let config = load_config_with(cfg_dir, base_url)?;
    let symbol = config.display.currency_symbol.clone();

    let mut ledger = load_draft(cfg_dir)?;

    match action {
        PayoutAction::Show => {
            print_ledger(&ledger, &symbol);
            return Ok(());
        }
        PayoutAction::Header {
            date,
            payment_no,
            mode,
            bank,
            method,
            txn,
            narration,
        } => {
            let header = &mut ledger.header;
            if let Some(date) = date {
                header.date = Some(parse_date(&date)?);
            }
            if let Some(no) = payment_no {
                header.payment_no = no;
            }
            if let Some(mode) = mode {
                header.payment_mode = mode.parse::<PaymentMode>()?;
            }
            if let Some(bank) = bank {
                header.bank = Some(bank);
            }
            if let Some(method) = method {
                header.method = Some(method.parse::<PaymentMethod>()?);
            }
            if let Some(txn) = txn {
                header.transaction_check_no = Some(txn);
            }
            if let Some(narration) = narration {
                header.narration = narration;
            }
            println!("Updated payout header.");
        }
        PayoutAction::Supplier { name } => {
            let backend = HttpBackend::new(&config.server);
            let count = ledger.load_supplier(&backend, &name)?;
            println!("Selected supplier '{name}' ({count} outstanding invoice(s))");

            if count > 0 {
                let rows: Vec<BillView> = ledger
                    .supplier_invoices()
                    .iter()
                    .map(|inv| BillView {
                        number: inv.invoice_no.clone(),
                        net_amount: money(&symbol, inv.net_amount),
                        outstanding: money(&symbol, inv.outstanding_balance()),
                    })
                    .collect();
                let table = Table::new(rows).with(Style::rounded()).to_string();
                println!("{table}");
            }
        }
        PayoutAction::Advanced { state } => {
            let enabled = matches!(state, Toggle::On);
            ledger.set_advanced_receipt(enabled);
            println!(
                "Advance receipt {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        PayoutAction::AddRow => {
            let id = ledger.add_row();
            println!("Added row {} (ID {id})", ledger.rows().len());
        }
        PayoutAction::RemoveRow { id } => {
            if ledger.remove_row(id) {
                println!("Removed row ID {id}");
            } else if ledger.rows().len() == 1 {
                println!("At least one row must remain; nothing removed.");
            } else {
                println!("No row with ID {id}; nothing removed.");
            }
        }
        PayoutAction::Bill { row, invoice } => {
            let index = row_index(row, &ledger)?;
            match ledger.select_loaded_bill(index, &invoice)? {
                BillSelection::Selected => {
                    let selected = &ledger.rows()[index];
                    println!(
                        "Row {row}: bill {} (amount {}, balance {})",
                        selected.bill_no,
                        money_or_na(&symbol, selected.bill_amount),
                        money_or_na(&symbol, selected.paid_amount)
                    );
                }
                BillSelection::NotFound => {
                    eprintln!(
                        "Warning: no outstanding invoice '{invoice}' for the selected supplier; row {row} unchanged."
                    );
                }
            }
        }
        PayoutAction::Receive { row, amount } => {
            let index = row_index(row, &ledger)?;
            ledger.set_received_amount(index, &amount)?;
            let balance = balance_cell(ledger.rows()[index].balance_amount(ledger.advanced_receipt));
            println!("Row {row}: received '{amount}', net balance {balance}");
        }
        PayoutAction::Submit => {
            let backend = HttpBackend::new(&config.server);
            let total = round2(ledger.grand_total()?);
            if let Err(e) = ledger.submit(&backend) {
                eprintln!("Payout not saved; the draft is unchanged. Run 'pos-admin payout submit' to retry.");
                return Err(e);
            }
            println!("Payout submitted (grand total {})", money(&symbol, total));
        }
        PayoutAction::Reset => return cmd_payout_reset(cfg_dir),
    }

    save_draft(cfg_dir, &ledger)?;
    Ok(())
}
