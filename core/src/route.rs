//! # Route Patterns
//!
//! Parses route templates such as `/items/{id}` and answers whether a name
//! is one of their path parameters.

use regex::Regex;
use std::sync::OnceLock;

/// Parsed route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    parameters: Vec<String>,
}

impl RoutePattern {
    /// Parses `{name}`, `{name:constraint}`, `{name?}`, `{*name}` and `{name:.*}` tokens.
    pub fn parse(template: &str) -> Self {
        static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
        let token_re =
            TOKEN_RE.get_or_init(|| Regex::new(r"\{([^}]+)}").expect("Invalid regex constant"));

        let parameters = token_re
            .captures_iter(template)
            .filter_map(|c| {
                let token = c[1].trim_start_matches('*');
                let name = token.split(':').next().unwrap_or(token);
                let name = name.trim_end_matches('?').trim();
                (!name.is_empty()).then(|| name.to_string())
            })
            .collect();

        Self {
            raw: template.to_string(),
            parameters,
        }
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Path parameter names in template order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Route values are matched case-insensitively.
    pub fn has_path_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens() {
        let route = RoutePattern::parse("/shops/{shop_id:int}/items/{id?}/{*rest}");
        assert_eq!(route.parameters(), &["shop_id", "id", "rest"]);
        assert_eq!(route.as_str(), "/shops/{shop_id:int}/items/{id?}/{*rest}");
    }

    #[test]
    fn test_membership() {
        let route = RoutePattern::parse("/items/{itemId}");
        assert!(route.has_path_parameter("itemId"));
        assert!(route.has_path_parameter("itemid"));
        assert!(!route.has_path_parameter("id"));
        assert!(!RoutePattern::parse("/").has_path_parameter("id"));
    }

    #[test]
    fn test_actix_regex_tail() {
        let route = RoutePattern::parse("/static/{tail:.*}");
        assert_eq!(route.parameters(), &["tail"]);
    }
}
