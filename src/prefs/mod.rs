//! Preference module
//!
//! Persists the access token and the caching preference between runs.

mod store;
mod types;

pub use store::PreferenceStore;
pub use types::Preferences;
