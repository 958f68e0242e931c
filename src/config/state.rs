use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{AdminError, Result};
use crate::payout::PayoutLedger;

pub const DRAFT_FILE: &str = "draft.toml";

/// Load the payout being built (a fresh one if none was saved)
pub fn load_draft(config_dir: &Path) -> Result<PayoutLedger> {
    let path = config_dir.join(DRAFT_FILE);
    if !path.exists() {
        return Ok(PayoutLedger::new());
    }
    let content = fs::read_to_string(&path)?;
    let mut ledger: PayoutLedger =
        toml::from_str(&content).map_err(|e| AdminError::ConfigParse { path, source: e })?;
    ledger.normalize();
    Ok(ledger)
}

pub fn save_draft(config_dir: &Path, ledger: &PayoutLedger) -> Result<()> {
    let path = config_dir.join(DRAFT_FILE);
    let content = toml::to_string_pretty(ledger)?;
    fs::write(&path, content)?;
    debug!(path = %path.display(), "draft saved");
    Ok(())
}

/// Delete the saved draft. Returns false if there was none.
pub fn discard_draft(config_dir: &Path) -> Result<bool> {
    let path = config_dir.join(DRAFT_FILE);
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)?;
    Ok(true)
}
