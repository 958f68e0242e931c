mod settings;
pub mod state;

pub use settings::{Config, DisplaySettings, ServerSettings, SessionSettings};
pub use state::{discard_draft, load_draft, save_draft, DRAFT_FILE};

use crate::error::{AdminError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";

/// Get the config directory path (XDG config dir, else ~/.pos-admin/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "pos-admin") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        AdminError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".pos-admin"))
}

/// Load config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(AdminError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Err(AdminError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| AdminError::ConfigParse { path, source: e })
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[server]
base_url = "http://localhost:8080/api/v1"
timeout_secs = 0    # 0 = wait for the backend indefinitely

[session]
user_id = "your-user-id"
role = 1            # 1 = admin (own account), 0 = staff (admin's account)
# admin = "admin-user-id"   # required when role = 0

[display]
currency_symbol = "$"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.server.timeout_secs, 0);
        assert_eq!(config.session.role, 1);
        assert!(config.session.admin.is_none());
        assert_eq!(config.display.currency_symbol, "$");
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            load_config(&missing),
            Err(AdminError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn display_section_is_optional() {
        let config: Config = toml::from_str(
            "[server]\nbase_url = \"http://pos\"\n[session]\nuser_id = \"u\"\nrole = 0\nadmin = \"a\"\n",
        )
        .unwrap();
        assert_eq!(config.display.currency_symbol, "$");
        assert_eq!(config.session.admin.as_deref(), Some("a"));
    }
}
