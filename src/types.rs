//! Common types used throughout starfetch
//!
//! Shared type aliases, defaults, and small enums used by several modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single record returned by a list endpoint
pub type Record = JsonValue;

/// An ordered collection of records
pub type Records = Vec<Record>;

// ============================================================================
// Defaults
// ============================================================================

/// GitHub v3 API root
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com";

/// Largest page size GitHub accepts
pub const DEFAULT_PER_PAGE: u32 = 100;

// ============================================================================
// Token Placement
// ============================================================================

/// Where the access token is attached to outgoing requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPlacement {
    /// `access_token=<token>` query parameter
    #[default]
    Query,
    /// `Authorization: token <token>` header
    Header,
}

// ============================================================================
// Page Order
// ============================================================================

/// Order of records in a completed collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOrder {
    /// Pages are appended as their requests complete
    #[default]
    Completion,
    /// Pages are re-sorted by page number before the collection is handed over
    PageNumber,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty or only whitespace
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.trim().is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.trim().is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
