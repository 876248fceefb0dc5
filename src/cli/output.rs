//! Result rendering

use super::commands::OutputFormat;
use crate::error::{Result, ResultExt};
use serde::Serialize;

/// Render `value` for stdout
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(value).context("Failed to serialize output"),
        OutputFormat::Pretty => {
            serde_json::to_string_pretty(value).context("Failed to serialize output")
        }
    }
}

/// Mask all but the last four characters of a token
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render() {
        let value = json!([{"login": "alice"}]);
        assert_eq!(
            render(&value, OutputFormat::Json).unwrap(),
            r#"[{"login":"alice"}]"#
        );
        assert!(render(&value, OutputFormat::Pretty).unwrap().contains('\n'));
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("ghp_abcdef1234"), "**********1234");
        assert_eq!(mask_token("abc"), "***");
        assert_eq!(mask_token(""), "");
    }
}
