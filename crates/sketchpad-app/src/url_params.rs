//! Page URL parameters.

use sketchpad_core::tools::ToolKind;

/// Settings that can be passed in the page URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParams {
    /// Tool selected at startup (`?tool=rectangle` or `#tool=hand`).
    pub tool: Option<ToolKind>,
}

impl UrlParams {
    /// Fill unset fields from `other`.
    pub fn or(self, other: UrlParams) -> UrlParams {
        UrlParams {
            tool: self.tool.or(other.tool),
        }
    }
}

/// Parse parameters from a query string or hash fragment.
pub fn parse_params(s: &str) -> UrlParams {
    let s = s.trim_start_matches(['?', '#']);

    let mut params = UrlParams::default();
    for pair in s.split('&') {
        let mut parts = pair.splitn(2, '=');
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            if value.is_empty() {
                continue;
            }
            match key {
                "tool" => {
                    params.tool = ToolKind::from_name(value);
                    if params.tool.is_none() {
                        log::warn!("Unknown tool in URL: {}", value);
                    }
                }
                _ => {}
            }
        }
    }
    params
}
