//! Shared constants of the manager API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

/// Visibility scope of a resource across tenants and users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityState {
    /// Visible only to the creator
    Private,
    /// Visible to every user of the tenant
    #[default]
    Tenant,
    /// Visible across all tenants
    Global,
}

impl AvailabilityState {
    pub const ALL: [AvailabilityState; 3] = [Self::Private, Self::Tenant, Self::Global];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Tenant => "tenant",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for AvailabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AvailabilityState {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ClientError::invalid_input(format!(
                    "Invalid availability '{}', expected one of: private, tenant, global",
                    s
                ))
            })
    }
}
