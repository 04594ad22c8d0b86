#![deny(missing_docs)]

//! # Body Resolution
//!
//! Picks the parameter that represents the request payload and describes it,
//! letting explicit "accepts" metadata override the inferred content.

use crate::describe::models::RequestBody;
use crate::describe::params::ParameterClassifier;
use crate::error::AppResult;
use crate::metadata::EndpointMetadata;
use crate::route::RoutePattern;
use crate::signature::{HandlerSignature, ParameterAnnotation, ParameterDescriptor};
use crate::type_mapping::{unconstrained_schema, SchemaResolver};
use indexmap::IndexMap;

const JSON: &str = "application/json";
const MULTIPART: &str = "multipart/form-data";

/// Describes the request body, or `None` when nothing feeds one.
///
/// Only the first body/form candidate is modeled.
pub fn resolve_request_body(
    signature: &HandlerSignature,
    metadata: &EndpointMetadata,
    route: &RoutePattern,
    classifier: &ParameterClassifier<'_>,
    schemas: &dyn SchemaResolver,
    disable_inferred_body: bool,
) -> AppResult<Option<RequestBody>> {
    let body_param = signature
        .parameters
        .iter()
        .find(|p| classifier.classify(p, route, disable_inferred_body).is_body_or_form);
    let accepts = metadata.last(|a| a.accepts());

    if let Some(accepts) = accepts {
        let ty = accepts
            .request_type
            .as_ref()
            .or(body_param.map(|p| &p.ty));
        let schema = match ty {
            Some(ty) => schemas.schema_type_for(ty)?,
            None => unconstrained_schema(),
        };

        let content: IndexMap<String, _> = accepts
            .content_types
            .iter()
            .map(|ct| (ct.clone(), schema.clone()))
            .collect();

        let required = match body_param {
            Some(param) => is_required(param),
            None => !accepts.is_optional,
        };

        return Ok(Some(RequestBody { required, content }));
    }

    let Some(param) = body_param else {
        return Ok(None);
    };

    let content_type = if is_form(param) { MULTIPART } else { JSON };
    let mut content = IndexMap::new();
    content.insert(content_type.to_string(), schemas.schema_type_for(&param.ty)?);

    Ok(Some(RequestBody {
        required: is_required(param),
        content,
    }))
}

fn is_form(param: &ParameterDescriptor) -> bool {
    param.ty.without_nullable().is_file()
        || param.annotations.contains(&ParameterAnnotation::FromForm)
}

fn is_required(param: &ParameterDescriptor) -> bool {
    let allow_empty = param
        .annotations
        .iter()
        .any(|a| matches!(a, ParameterAnnotation::FromBody { allow_empty: true }));
    !param.has_default && !param.is_nullable() && !allow_empty
}
