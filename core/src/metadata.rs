#![deny(missing_docs)]

//! # Endpoint Metadata
//!
//! Ordered collection of declarative annotations attached to an endpoint.
//!
//! Every annotation object implements [`EndpointAnnotation`] and overrides the
//! capability accessors it supports; one object may expose several. Lookups
//! come in two flavours:
//! - [`EndpointMetadata::last`]: the last matching annotation wins.
//! - [`EndpointMetadata::all`]: every match, in declaration order.

use crate::signature::TypeDescriptor;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// HTTP verbs an endpoint can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// PATCH
    Patch,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
    /// TRACE
    Trace,
    /// CONNECT
    Connect,
}

impl HttpMethod {
    /// Verbs that conventionally carry no request body.
    pub fn disables_inferred_body(self) -> bool {
        matches!(
            self,
            Self::Get | Self::Delete | Self::Head | Self::Options | Self::Trace | Self::Connect
        )
    }

    /// Upper-case verb.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "TRACE" => Ok(Self::Trace),
            "CONNECT" => Ok(Self::Connect),
            other => Err(format!("Unknown HTTP method '{}'", other)),
        }
    }
}

/// Explicit request content declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcceptsMetadata {
    /// Accepted content types, in order.
    pub content_types: Vec<String>,
    /// Request type overriding the one inferred from parameters.
    pub request_type: Option<TypeDescriptor>,
    /// The body may be omitted.
    pub is_optional: bool,
}

/// Explicit response declaration (status, optional type, content types).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducesResponseType {
    /// HTTP status code.
    pub status: u16,
    /// Body type; `None` stands for void.
    pub ty: Option<TypeDescriptor>,
    /// Explicit content types; empty means "synthesize".
    pub content_types: Vec<String>,
}

impl ProducesResponseType {
    /// A response without a declared body type.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            ty: None,
            content_types: Vec::new(),
        }
    }

    /// A response carrying `ty`.
    pub fn typed(status: u16, ty: TypeDescriptor) -> Self {
        Self {
            status,
            ty: Some(ty),
            content_types: Vec::new(),
        }
    }

    /// Adds an explicit content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_types.push(content_type.into());
        self
    }
}

/// Response reported by a provider-style metadata object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body type, if the provider knows it.
    pub ty: Option<TypeDescriptor>,
    /// The provider describes the catch-all error response.
    pub is_default_error: bool,
}

/// Capabilities a metadata object may expose. Every accessor defaults to
/// "not supported".
pub trait EndpointAnnotation: fmt::Debug + Send + Sync {
    /// HTTP verbs the endpoint answers.
    fn http_methods(&self) -> Option<&[HttpMethod]> {
        None
    }
    /// `Some(true)` hides the endpoint from the description.
    fn excludes_from_description(&self) -> Option<bool> {
        None
    }
    /// Explicit operation id.
    fn endpoint_name(&self) -> Option<&str> {
        None
    }
    /// Short summary.
    fn summary(&self) -> Option<&str> {
        None
    }
    /// Long description.
    fn description(&self) -> Option<&str> {
        None
    }
    /// Grouping tags.
    fn tags(&self) -> Option<&[String]> {
        None
    }
    /// Accepted request content.
    fn accepts(&self) -> Option<&AcceptsMetadata> {
        None
    }
    /// Explicit response declaration.
    fn produces(&self) -> Option<&ProducesResponseType> {
        None
    }
    /// Provider-reported response.
    fn response_provider(&self) -> Option<&ProvidedResponse> {
        None
    }
    /// Type used for error responses without an explicit type.
    fn default_error_type(&self) -> Option<&TypeDescriptor> {
        None
    }
}

/// HTTP methods marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMethodMetadata(pub Vec<HttpMethod>);

impl EndpointAnnotation for HttpMethodMetadata {
    fn http_methods(&self) -> Option<&[HttpMethod]> {
        Some(&self.0)
    }
}

/// Exclude-from-description marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcludeFromDescription(pub bool);

impl EndpointAnnotation for ExcludeFromDescription {
    fn excludes_from_description(&self) -> Option<bool> {
        Some(self.0)
    }
}

/// Operation id marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointName(pub String);

impl EndpointAnnotation for EndpointName {
    fn endpoint_name(&self) -> Option<&str> {
        Some(&self.0)
    }
}

/// Summary marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSummary(pub String);

impl EndpointAnnotation for EndpointSummary {
    fn summary(&self) -> Option<&str> {
        Some(&self.0)
    }
}

/// Description marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescription(pub String);

impl EndpointAnnotation for EndpointDescription {
    fn description(&self) -> Option<&str> {
        Some(&self.0)
    }
}

/// Tags marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagsMetadata(pub Vec<String>);

impl EndpointAnnotation for TagsMetadata {
    fn tags(&self) -> Option<&[String]> {
        Some(&self.0)
    }
}

impl EndpointAnnotation for AcceptsMetadata {
    fn accepts(&self) -> Option<&AcceptsMetadata> {
        Some(self)
    }
}

impl EndpointAnnotation for ProducesResponseType {
    fn produces(&self) -> Option<&ProducesResponseType> {
        Some(self)
    }
}

impl EndpointAnnotation for ProvidedResponse {
    fn response_provider(&self) -> Option<&ProvidedResponse> {
        Some(self)
    }
}

/// Default error type marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultErrorType(pub TypeDescriptor);

impl EndpointAnnotation for DefaultErrorType {
    fn default_error_type(&self) -> Option<&TypeDescriptor> {
        Some(&self.0)
    }
}

/// Ordered, append-only annotation list.
#[derive(Debug, Clone, Default)]
pub struct EndpointMetadata {
    items: Vec<Arc<dyn EndpointAnnotation>>,
}

impl EndpointMetadata {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an annotation.
    pub fn push(&mut self, annotation: impl EndpointAnnotation + 'static) {
        self.items.push(Arc::new(annotation));
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, annotation: impl EndpointAnnotation + 'static) -> Self {
        self.push(annotation);
        self
    }

    /// Appends every annotation of `other`, keeping their order.
    pub fn extend(&mut self, other: EndpointMetadata) {
        self.items.extend(other.items);
    }

    /// Number of annotations.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when no annotation is attached.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Last annotation exposing the selected capability.
    pub fn last<'a, T: ?Sized>(
        &'a self,
        select: impl Fn(&'a dyn EndpointAnnotation) -> Option<&'a T>,
    ) -> Option<&'a T> {
        self.items.iter().rev().find_map(|a| select(a.as_ref()))
    }

    /// Every annotation exposing the selected capability, in declaration order.
    pub fn all<'a, T: ?Sized>(
        &'a self,
        select: impl Fn(&'a dyn EndpointAnnotation) -> Option<&'a T>,
    ) -> Vec<&'a T> {
        self.items.iter().filter_map(|a| select(a.as_ref())).collect()
    }

    /// HTTP methods of the last method marker.
    pub fn http_methods(&self) -> &[HttpMethod] {
        self.last(|a| a.http_methods()).unwrap_or(&[])
    }

    /// Whether the last exclusion marker hides the endpoint.
    pub fn is_excluded(&self) -> bool {
        self.items
            .iter()
            .rev()
            .find_map(|a| a.excludes_from_description())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One object exposing several capabilities.
    #[derive(Debug)]
    struct RouteAttr {
        name: String,
        methods: Vec<HttpMethod>,
    }

    impl EndpointAnnotation for RouteAttr {
        fn http_methods(&self) -> Option<&[HttpMethod]> {
            Some(&self.methods)
        }
        fn endpoint_name(&self) -> Option<&str> {
            Some(&self.name)
        }
    }

    #[test]
    fn test_last_wins() {
        let meta = EndpointMetadata::new()
            .with(EndpointName("first".into()))
            .with(EndpointSummary("ignored".into()))
            .with(EndpointName("second".into()));

        assert_eq!(meta.last(|a| a.endpoint_name()), Some("second"));
        assert_eq!(meta.last(|a| a.description()), None);
    }

    #[test]
    fn test_all_keeps_declaration_order() {
        let meta = EndpointMetadata::new()
            .with(ProducesResponseType::status(404))
            .with(EndpointName("x".into()))
            .with(ProducesResponseType::status(200));

        let statuses: Vec<u16> = meta.all(|a| a.produces()).iter().map(|p| p.status).collect();
        assert_eq!(statuses, vec![404, 200]);
    }

    #[test]
    fn test_multi_capability_object() {
        let meta = EndpointMetadata::new().with(RouteAttr {
            name: "listItems".into(),
            methods: vec![HttpMethod::Get],
        });

        assert_eq!(meta.http_methods(), &[HttpMethod::Get]);
        assert_eq!(meta.last(|a| a.endpoint_name()), Some("listItems"));
    }

    #[test]
    fn test_exclusion_last_marker_decides() {
        let meta = EndpointMetadata::new()
            .with(ExcludeFromDescription(true))
            .with(ExcludeFromDescription(false));
        assert!(!meta.is_excluded());
        assert!(!EndpointMetadata::new().is_excluded());
    }

    #[test]
    fn test_http_method_parsing() {
        assert_eq!("delete".parse::<HttpMethod>(), Ok(HttpMethod::Delete));
        assert!("BREW".parse::<HttpMethod>().is_err());
        assert!(HttpMethod::Connect.disables_inferred_body());
        assert!(!HttpMethod::Patch.disables_inferred_body());
    }
}
