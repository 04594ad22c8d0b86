//! # Tag Resolution

use crate::describe::models::Tag;
use crate::metadata::EndpointMetadata;
use crate::signature::HandlerSignature;

/// Explicit tags verbatim; otherwise the declaring type, falling back to the application name.
pub fn resolve_tags(
    signature: &HandlerSignature,
    metadata: &EndpointMetadata,
    application_name: Option<&str>,
) -> Vec<Tag> {
    if let Some(tags) = metadata.last(|a| a.tags()) {
        return tags.iter().map(|name| Tag { name: name.clone() }).collect();
    }

    let name = match &signature.declaring_type {
        Some(declaring) if !declaring.compiler_generated => declaring.name.clone(),
        _ => application_name.unwrap_or_default().to_string(),
    };
    vec![Tag { name }]
}
