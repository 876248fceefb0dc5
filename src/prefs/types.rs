//! Preference types

use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};

/// Persisted user preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Access token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Caching preference; `None` when never set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_enabled: Option<bool>,
}

impl Preferences {
    /// Create empty preferences
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored token, ignoring blank values
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    /// Caching is on unless explicitly turned off
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled != Some(false)
    }

    /// Set or clear the token; blank values clear it
    pub fn set_token(&mut self, token: Option<String>) {
        self.access_token = token.none_if_empty();
    }
}
