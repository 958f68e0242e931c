use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerSettings,
    pub session: SessionSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    pub base_url: String,
    /// Seconds before a request is abandoned; 0 waits indefinitely
    #[serde(default)]
    pub timeout_secs: u64,
}

/// The operator this installation acts for
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionSettings {
    pub user_id: String,
    pub role: u8,
    #[serde(default)]
    pub admin: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplaySettings {
    pub currency_symbol: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
        }
    }
}
