//! Page-number lookup in a link table

use super::types::LinkTable;
use regex::Regex;
use std::sync::LazyLock;

static PAGE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpage=(\d+)").expect("valid page regex"));

/// Page number of relation `name`.
///
/// `None` when there is no table, no entry for `name`, or its URL has no
/// parsable `page` parameter.
pub fn relation(links: Option<&LinkTable>, name: &str) -> Option<u32> {
    let url = links?.get(name)?;
    PAGE_PARAM
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
