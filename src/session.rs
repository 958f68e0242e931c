use std::fmt;

use crate::config::SessionSettings;
use crate::error::{AdminError, Result};

/// Role flag of an account owner; data is fetched for the user's own id.
pub const ROLE_ADMIN: u8 = 1;
/// Role flag of a staff member; data is fetched for the associated admin's id.
pub const ROLE_STAFF: u8 = 0;

/// The signed-in operator, passed explicitly to every data-fetching call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub role: u8,
    pub admin: Option<String>,
}

/// Account whose data a request is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountScope(String);

impl AccountScope {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Session {
    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self {
            user_id: settings.user_id.clone(),
            role: settings.role,
            admin: settings.admin.clone(),
        }
    }

    pub fn account_scope(&self) -> Result<AccountScope> {
        match self.role {
            ROLE_ADMIN => Ok(AccountScope(self.user_id.clone())),
            ROLE_STAFF => self
                .admin
                .clone()
                .filter(|admin| !admin.is_empty())
                .map(AccountScope)
                .ok_or_else(|| AdminError::MissingAdmin(self.user_id.clone())),
            other => Err(AdminError::UnknownRole(other)),
        }
    }
}
