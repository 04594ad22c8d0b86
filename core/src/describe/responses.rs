#![deny(missing_docs)]

//! # Response Resolution
//!
//! Merges explicit response declarations and provider-reported responses with
//! the handler's return type into a complete status -> content map.

use crate::describe::models::Response;
use crate::error::{AppError, AppResult};
use crate::metadata::EndpointMetadata;
use crate::signature::{TypeDescriptor, TypeShape};
use crate::type_mapping::SchemaResolver;
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// A response entry before schemas are attached.
#[derive(Debug, Clone, PartialEq)]
struct EligibleResponse {
    ty: TypeDescriptor,
    content_types: Vec<String>,
}

/// Unwraps one awaitable layer; framework result markers become void.
pub fn logical_response_type(return_type: &TypeDescriptor) -> TypeDescriptor {
    let unwrapped = match return_type.shape() {
        TypeShape::Awaitable(inner) => inner.as_ref(),
        _ => return_type,
    };

    match unwrapped.shape() {
        TypeShape::ResultMarker => TypeDescriptor::unit(),
        _ => unwrapped.clone(),
    }
}

/// Content types synthesized for a body type without explicit ones.
pub fn default_content_types(ty: &TypeDescriptor) -> Vec<String> {
    match ty.shape() {
        TypeShape::Unit => Vec::new(),
        TypeShape::Text => vec!["text/plain".to_string()],
        _ => vec!["application/json".to_string()],
    }
}

/// Builds the response map of one operation.
///
/// `operation` names the endpoint in the duplicate status code error.
pub fn resolve_responses(
    return_type: &TypeDescriptor,
    metadata: &EndpointMetadata,
    default_error_type: Option<&TypeDescriptor>,
    schemas: &dyn SchemaResolver,
    operation: &str,
) -> AppResult<BTreeMap<u16, Response>> {
    let logical = logical_response_type(return_type);
    let mut eligible: IndexMap<u16, EligibleResponse> = IndexMap::new();

    for produces in metadata.all(|a| a.produces()) {
        let ty = substitute_success(produces.status, produces.ty.as_ref(), &logical);
        insert_unique(
            &mut eligible,
            produces.status,
            EligibleResponse {
                ty,
                content_types: produces.content_types.clone(),
            },
            operation,
        )?;
    }

    for provided in metadata.all(|a| a.response_provider()) {
        let mut ty = substitute_success(provided.status, provided.ty.as_ref(), &logical);
        if let Some(error_ty) = default_error_type {
            let unset_client_error = (400..500).contains(&provided.status) && provided.ty.is_none();
            if unset_client_error || provided.is_default_error {
                ty = error_ty.clone();
            }
        }
        insert_unique(
            &mut eligible,
            provided.status,
            EligibleResponse {
                ty,
                content_types: Vec::new(),
            },
            operation,
        )?;
    }

    // A non-void return type always documents the success response.
    if eligible.is_empty() || (!logical.is_void() && !eligible.contains_key(&200)) {
        eligible.insert(
            200,
            EligibleResponse {
                ty: logical,
                content_types: Vec::new(),
            },
        );
    }

    let mut responses = BTreeMap::new();
    for (status, entry) in eligible {
        let content_types = if entry.content_types.is_empty() {
            default_content_types(&entry.ty)
        } else {
            entry.content_types
        };

        let mut content = IndexMap::new();
        if !content_types.is_empty() {
            let schema = schemas.schema_type_for(&entry.ty)?;
            for content_type in content_types {
                content.insert(content_type, schema.clone());
            }
        }
        responses.insert(status, Response { content });
    }

    Ok(responses)
}

/// Void (or unset) 200/201 responses carry the handler's own return type.
fn substitute_success(
    status: u16,
    declared: Option<&TypeDescriptor>,
    logical: &TypeDescriptor,
) -> TypeDescriptor {
    match declared {
        Some(ty) if !ty.is_void() => ty.clone(),
        _ if status == 200 || status == 201 => logical.clone(),
        _ => TypeDescriptor::unit(),
    }
}

fn insert_unique(
    eligible: &mut IndexMap<u16, EligibleResponse>,
    status: u16,
    entry: EligibleResponse,
    operation: &str,
) -> AppResult<()> {
    if eligible.contains_key(&status) {
        return Err(AppError::DuplicateStatusCode {
            status,
            operation: operation.to_string(),
        });
    }
    eligible.insert(status, entry);
    Ok(())
}
