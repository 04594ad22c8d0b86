//! # Attribute Operations
//!
//! Turns routing and documentation attributes on a handler into endpoint metadata.

use crate::error::{AppError, AppResult};
use crate::metadata::{
    AcceptsMetadata, EndpointAnnotation, EndpointMetadata, HttpMethod, HttpMethodMetadata,
    ProducesResponseType, ProvidedResponse,
};
use crate::signature::TypeDescriptor;
use crate::source::types::parse_type_str;
use ra_ap_syntax::ast;
use ra_ap_syntax::{AstNode, SyntaxNode};
use regex::Regex;
use std::sync::OnceLock;

/// Settings collected from one `#[oai(...)]` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OaiAttribute {
    /// `operation_id = ".."`
    pub operation_id: Option<String>,
    /// `tag = ".."`, repeatable.
    pub tags: Vec<String>,
    /// `hidden`
    pub hidden: bool,
    /// `default_error = "T"`
    pub default_error: Option<TypeDescriptor>,
    /// `accepts`, `request` and `optional_body` together.
    pub accepts: Option<AcceptsMetadata>,
}

impl EndpointAnnotation for OaiAttribute {
    fn excludes_from_description(&self) -> Option<bool> {
        self.hidden.then_some(true)
    }
    fn endpoint_name(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }
    fn tags(&self) -> Option<&[String]> {
        (!self.tags.is_empty()).then_some(self.tags.as_slice())
    }
    fn accepts(&self) -> Option<&AcceptsMetadata> {
        self.accepts.as_ref()
    }
    fn default_error_type(&self) -> Option<&TypeDescriptor> {
        self.default_error.as_ref()
    }
}

/// Route template and metadata found on a handler.
#[derive(Debug, Default)]
pub struct HandlerAttributes {
    /// Path of the first routing attribute.
    pub route: Option<String>,
    /// Metadata in attribute order.
    pub metadata: EndpointMetadata,
}

/// Analyzes the attributes of a function node.
///
/// Returns `route: None` when the function carries no routing attribute.
pub fn extract_handler_attributes(node: &SyntaxNode) -> AppResult<HandlerAttributes> {
    let mut result = HandlerAttributes::default();
    let mut methods = Vec::new();

    for attr in node.children().filter_map(ast::Attr::cast) {
        let Some(meta) = attr.meta() else { continue };
        let Some(name) = meta.path().map(|p| last_segment(&p.to_string())) else {
            continue;
        };
        let content = meta.token_tree().map(|tt| tt.to_string()).unwrap_or_default();

        match name.as_str() {
            "route" => {
                set_route(&mut result, &content);
                for method in method_args(&content) {
                    methods.push(method.parse::<HttpMethod>().map_err(AppError::General)?);
                }
            }
            "oai" => result.metadata.push(parse_oai(&content)?),
            "response" => result.metadata.push(parse_response(&content)?),
            "response_provider" => result.metadata.push(parse_provider(&content)?),
            other => {
                if let Ok(method) = other.parse::<HttpMethod>() {
                    set_route(&mut result, &content);
                    methods.push(method);
                }
            }
        }
    }

    if result.route.is_some() {
        result.metadata.push(HttpMethodMetadata(methods));
    }
    Ok(result)
}

fn last_segment(path: &str) -> String {
    path.rsplit("::").next().unwrap_or(path).trim().to_string()
}

fn set_route(result: &mut HandlerAttributes, content: &str) {
    static PATH_RE: OnceLock<Regex> = OnceLock::new();
    let path_re =
        PATH_RE.get_or_init(|| Regex::new(r#"^\(\s*"([^"]*)""#).expect("Invalid regex constant"));

    if result.route.is_none() {
        result.route = path_re
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
    }
}

fn method_args(content: &str) -> Vec<String> {
    static METHOD_RE: OnceLock<Regex> = OnceLock::new();
    let method_re = METHOD_RE
        .get_or_init(|| Regex::new(r#"\bmethod\s*=\s*"([^"]+)""#).expect("Invalid regex constant"));
    string_args(method_re, content)
}

/// All string values captured by `re` in `content`.
fn string_args(re: &Regex, content: &str) -> Vec<String> {
    re.captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn string_arg(key: &str, content: &str) -> AppResult<Option<String>> {
    let re = Regex::new(&format!(r#"\b{}\s*=\s*"([^"]*)""#, regex::escape(key)))
        .map_err(|e| AppError::General(format!("Invalid attribute key '{}': {}", key, e)))?;
    Ok(string_args(&re, content).into_iter().next())
}

fn status_arg(content: &str) -> AppResult<u16> {
    static STATUS_RE: OnceLock<Regex> = OnceLock::new();
    let status_re = STATUS_RE
        .get_or_init(|| Regex::new(r"\bstatus\s*=\s*(\d+)").expect("Invalid regex constant"));

    let raw = status_re
        .captures(content)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| AppError::General(format!("Missing status in attribute {}", content)))?;
    raw.as_str()
        .parse::<u16>()
        .map_err(|e| AppError::General(format!("Invalid status '{}': {}", raw.as_str(), e)))
}

fn flag(name: &str, content: &str) -> bool {
    // A bare identifier, not the key of a `name = value` pair.
    content
        .trim_matches(|c| c == '(' || c == ')')
        .split(',')
        .any(|part| part.trim() == name)
}

fn parse_oai(content: &str) -> AppResult<OaiAttribute> {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let tag_re =
        TAG_RE.get_or_init(|| Regex::new(r#"\btag\s*=\s*"([^"]+)""#).expect("Invalid regex constant"));

    static ACCEPTS_RE: OnceLock<Regex> = OnceLock::new();
    let accepts_re = ACCEPTS_RE
        .get_or_init(|| Regex::new(r#"\baccepts\s*=\s*"([^"]+)""#).expect("Invalid regex constant"));

    let default_error = string_arg("default_error", content)?
        .map(|ty| parse_type_str(&ty))
        .transpose()?;
    let request_type = string_arg("request", content)?
        .map(|ty| parse_type_str(&ty))
        .transpose()?;
    let content_types = string_args(accepts_re, content);

    let accepts = (!content_types.is_empty()).then(|| AcceptsMetadata {
        content_types,
        request_type,
        is_optional: flag("optional_body", content),
    });

    Ok(OaiAttribute {
        operation_id: string_arg("operation_id", content)?,
        tags: string_args(tag_re, content),
        hidden: flag("hidden", content),
        default_error,
        accepts,
    })
}

fn body_arg(content: &str) -> AppResult<Option<TypeDescriptor>> {
    string_arg("body", content)?
        .map(|ty| parse_type_str(&ty))
        .transpose()
}

fn parse_response(content: &str) -> AppResult<ProducesResponseType> {
    static CONTENT_TYPE_RE: OnceLock<Regex> = OnceLock::new();
    let content_type_re = CONTENT_TYPE_RE.get_or_init(|| {
        Regex::new(r#"\bcontent_type\s*=\s*"([^"]+)""#).expect("Invalid regex constant")
    });

    Ok(ProducesResponseType {
        status: status_arg(content)?,
        ty: body_arg(content)?,
        content_types: string_args(content_type_re, content),
    })
}

fn parse_provider(content: &str) -> AppResult<ProvidedResponse> {
    Ok(ProvidedResponse {
        status: status_arg(content)?,
        ty: body_arg(content)?,
        is_default_error: flag("default_error", content),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ra_ap_edition::Edition;
    use ra_ap_syntax::SourceFile;

    fn attrs_of(code: &str) -> AppResult<HandlerAttributes> {
        let parse = SourceFile::parse(code, Edition::Edition2021);
        let func = parse
            .tree()
            .syntax()
            .descendants()
            .find_map(ast::Fn::cast)
            .unwrap();
        extract_handler_attributes(func.syntax())
    }

    #[test]
    fn test_method_attribute() {
        let attrs = attrs_of(r#"#[actix_web::get("/items/{id}")] async fn get_item() {}"#).unwrap();
        assert_eq!(attrs.route.as_deref(), Some("/items/{id}"));
        assert_eq!(attrs.metadata.http_methods(), &[HttpMethod::Get]);
    }

    #[test]
    fn test_route_attribute_with_methods() {
        let attrs = attrs_of(
            r#"#[route("/items", method = "GET", method = "HEAD")] async fn list() {}"#,
        )
        .unwrap();
        assert_eq!(attrs.route.as_deref(), Some("/items"));
        assert_eq!(
            attrs.metadata.http_methods(),
            &[HttpMethod::Get, HttpMethod::Head]
        );
    }

    #[test]
    fn test_unknown_route_method_fails() {
        assert!(attrs_of(r#"#[route("/x", method = "BREW")] fn brew() {}"#).is_err());
    }

    #[test]
    fn test_non_handler_has_no_route() {
        let attrs = attrs_of("#[inline] fn helper() {}").unwrap();
        assert!(attrs.route.is_none());
        assert!(attrs.metadata.is_empty());
    }

    #[test]
    fn test_oai_attribute() {
        let attrs = attrs_of(
            r#"
            #[post("/widgets")]
            #[oai(operation_id = "createWidget", tag = "widgets", tag = "admin", default_error = "ApiError",
                  accepts = "application/xml", request = "WidgetXml", optional_body)]
            async fn create() {}
            "#,
        )
        .unwrap();

        let meta = &attrs.metadata;
        assert_eq!(meta.last(|a| a.endpoint_name()), Some("createWidget"));
        assert_eq!(
            meta.last(|a| a.tags()),
            Some(&["widgets".to_string(), "admin".to_string()][..])
        );
        assert_eq!(meta.last(|a| a.default_error_type()).map(|t| t.name()), Some("ApiError"));
        assert!(!meta.is_excluded());

        let accepts = meta.last(|a| a.accepts()).unwrap();
        assert_eq!(accepts.content_types, vec!["application/xml"]);
        assert_eq!(accepts.request_type.as_ref().map(|t| t.name()), Some("WidgetXml"));
        assert!(accepts.is_optional);
    }

    #[test]
    fn test_hidden_flag() {
        let attrs = attrs_of(r#"#[get("/internal")] #[oai(hidden)] fn internal() {}"#).unwrap();
        assert!(attrs.metadata.is_excluded());
    }

    #[test]
    fn test_response_attributes() {
        let attrs = attrs_of(
            r#"
            #[get("/items/{id}")]
            #[response(status = 200, content_type = "application/json", content_type = "text/csv")]
            #[response(status = 404, body = "ProblemDetails")]
            #[response_provider(status = 500, default_error)]
            fn get_item() {}
            "#,
        )
        .unwrap();

        let produces = attrs.metadata.all(|a| a.produces());
        assert_eq!(produces.len(), 2);
        assert_eq!(produces[0].status, 200);
        assert_eq!(produces[0].ty, None);
        assert_eq!(produces[0].content_types, vec!["application/json", "text/csv"]);
        assert_eq!(produces[1].ty.as_ref().map(|t| t.name()), Some("ProblemDetails"));

        let provided = attrs.metadata.all(|a| a.response_provider());
        assert_eq!(
            provided,
            vec![&ProvidedResponse {
                status: 500,
                ty: None,
                is_default_error: true,
            }]
        );
    }

    #[test]
    fn test_response_without_status_fails() {
        assert!(attrs_of(r#"#[get("/x")] #[response(body = "X")] fn x() {}"#).is_err());
    }
}
