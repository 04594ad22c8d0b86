#![deny(missing_docs)]

//! # Operation Models
//!
//! The immutable operation description produced for one endpoint, and its
//! conversion into `utoipa` definitions for document assembly.

use crate::type_mapping::SchemaHandle;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use utoipa::openapi::path::{
    Operation as OpenApiOperation, OperationBuilder, Parameter as OpenApiParameter,
    ParameterBuilder, ParameterIn,
};
use utoipa::openapi::request_body::{RequestBody as OpenApiRequestBody, RequestBodyBuilder};
use utoipa::openapi::{Content, RefOr, Required, ResponseBuilder};

/// Where a non-body parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    /// Route segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
}

impl From<ParameterLocation> for ParameterIn {
    fn from(location: ParameterLocation) -> Self {
        match location {
            ParameterLocation::Path => ParameterIn::Path,
            ParameterLocation::Query => ParameterIn::Query,
            ParameterLocation::Header => ParameterIn::Header,
        }
    }
}

/// Grouping tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag name.
    pub name: String,
}

/// A described path/query/header parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Wire name.
    pub name: String,
    /// Location.
    pub location: ParameterLocation,
    /// Required flag.
    pub required: bool,
    /// Schema of the value.
    pub schema: SchemaHandle,
    /// Content-type map, empty for simple values.
    pub content: IndexMap<String, SchemaHandle>,
}

/// A described request body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    /// Required flag.
    pub required: bool,
    /// Content type -> schema.
    pub content: IndexMap<String, SchemaHandle>,
}

/// A described response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    /// Content type -> schema. Empty for responses without a body.
    pub content: IndexMap<String, SchemaHandle>,
}

/// The operation description of one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Explicit operation id.
    pub operation_id: Option<String>,
    /// Summary.
    pub summary: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Tags, in order.
    pub tags: Vec<Tag>,
    /// Parameters, in declaration order.
    pub parameters: Vec<Parameter>,
    /// Request body, if any.
    pub request_body: Option<RequestBody>,
    /// Status code -> response.
    pub responses: BTreeMap<u16, Response>,
}

impl Operation {
    /// Converts into a `utoipa` operation ready for a `paths` map.
    pub fn to_openapi(&self) -> OpenApiOperation {
        let tags = (!self.tags.is_empty())
            .then(|| self.tags.iter().map(|t| t.name.clone()).collect::<Vec<_>>());

        let mut builder = OperationBuilder::new()
            .operation_id(self.operation_id.clone())
            .summary(self.summary.clone())
            .description(self.description.clone())
            .tags(tags)
            .parameters(Some(self.parameters.iter().map(Parameter::to_openapi)))
            .request_body(self.request_body.as_ref().map(RequestBody::to_openapi));

        for (status, response) in &self.responses {
            builder = builder.response(status.to_string(), RefOr::T(response.to_openapi(*status)));
        }

        builder.build()
    }
}

impl Parameter {
    /// Converts into a `utoipa` parameter. The content map has no counterpart there.
    pub fn to_openapi(&self) -> OpenApiParameter {
        ParameterBuilder::new()
            .name(self.name.clone())
            .parameter_in(self.location.into())
            .required(required(self.required))
            .schema(Some(self.schema.clone()))
            .build()
    }
}

impl RequestBody {
    /// Converts into a `utoipa` request body.
    pub fn to_openapi(&self) -> OpenApiRequestBody {
        let mut builder = RequestBodyBuilder::new().required(Some(required(self.required)));
        for (content_type, schema) in &self.content {
            builder = builder.content(content_type.clone(), Content::new(Some(schema.clone())));
        }
        builder.build()
    }
}

impl Response {
    /// Converts into a `utoipa` response described by the status reason phrase.
    pub fn to_openapi(&self, status: u16) -> utoipa::openapi::Response {
        let mut builder = ResponseBuilder::new().description(reason_phrase(status));
        for (content_type, schema) in &self.content {
            builder = builder.content(content_type.clone(), Content::new(Some(schema.clone())));
        }
        builder.build()
    }
}

fn required(flag: bool) -> Required {
    if flag {
        Required::True
    } else {
        Required::False
    }
}

/// Canonical reason phrase for common status codes.
///
/// Unlisted codes fall back to the name of their status class.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        412 => "Precondition Failed",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        100..=199 => "Informational",
        200..=299 => "Success",
        300..=399 => "Redirection",
        400..=499 => "Client Error",
        500..=599 => "Server Error",
        _ => "Response",
    }
}
