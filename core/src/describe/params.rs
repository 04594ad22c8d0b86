#![deny(missing_docs)]

//! # Parameter Classification
//!
//! Decides where each handler parameter comes from.
//!
//! Rules are evaluated in order and the first match wins:
//! 1. `FromRoute` / `FromQuery` / `FromHeader` annotations give the location.
//! 2. `FromBody` / `FromForm` annotations make a body candidate.
//! 3. Services, framework context, principals, cancellation tokens and
//!    self-binding types are ignored.
//! 4. Text and `FromStr` types are Path when the route names them, else Query.
//! 5. Files are form body candidates.
//! 6. For verbs without a body, sequences of parseable values become Query.
//! 7. Everything else is assumed to be the body.

use crate::capabilities::{CapabilityCache, ServiceRegistry};
use crate::describe::models::{Parameter, ParameterLocation};
use crate::error::AppResult;
use crate::metadata::AcceptsMetadata;
use crate::route::RoutePattern;
use crate::signature::{
    Capability, ParameterAnnotation, ParameterDescriptor, TypeDescriptor, TypeShape,
};
use crate::type_mapping::SchemaResolver;
use indexmap::IndexMap;

/// Outcome of classifying one parameter.
///
/// At most one of the two fields is set; neither means the parameter is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Belongs to the request body or form.
    pub is_body_or_form: bool,
    /// Location for path/query/header parameters.
    pub location: Option<ParameterLocation>,
}

impl Classification {
    /// Not described at all.
    pub const IGNORED: Self = Self {
        is_body_or_form: false,
        location: None,
    };

    /// Part of the request payload.
    pub const BODY: Self = Self {
        is_body_or_form: true,
        location: None,
    };

    /// A located parameter.
    pub const fn at(location: ParameterLocation) -> Self {
        Self {
            is_body_or_form: false,
            location: Some(location),
        }
    }

    /// Neither body nor located.
    pub fn is_ignored(&self) -> bool {
        !self.is_body_or_form && self.location.is_none()
    }
}

/// Classifies parameters against a route, using shared capability lookups.
pub struct ParameterClassifier<'a> {
    cache: &'a CapabilityCache,
    services: &'a dyn ServiceRegistry,
}

impl<'a> ParameterClassifier<'a> {
    /// Creates a classifier over the shared cache and service registry.
    pub fn new(cache: &'a CapabilityCache, services: &'a dyn ServiceRegistry) -> Self {
        Self { cache, services }
    }

    /// Applies the precedence rules to one parameter.
    pub fn classify(
        &self,
        param: &ParameterDescriptor,
        route: &RoutePattern,
        disable_inferred_body: bool,
    ) -> Classification {
        for annotation in &param.annotations {
            let explicit = match annotation {
                ParameterAnnotation::FromRoute { .. } => {
                    Some(Classification::at(ParameterLocation::Path))
                }
                ParameterAnnotation::FromQuery { .. } => {
                    Some(Classification::at(ParameterLocation::Query))
                }
                ParameterAnnotation::FromHeader { .. } => {
                    Some(Classification::at(ParameterLocation::Header))
                }
                ParameterAnnotation::FromBody { .. } | ParameterAnnotation::FromForm => {
                    Some(Classification::BODY)
                }
                ParameterAnnotation::FromServices => None,
            };
            if let Some(found) = explicit {
                tracing::debug!(param = %param.name, ?found, "explicit parameter annotation");
                return found;
            }
        }

        if self.is_infrastructure(param) {
            tracing::debug!(param = %param.name, ty = param.ty.name(), "ignoring service parameter");
            return Classification::IGNORED;
        }

        let ty = &param.ty;
        if ty.is_text() || self.cache.has_parse_capability(ty) {
            return if route.has_path_parameter(&param.name) {
                Classification::at(ParameterLocation::Path)
            } else {
                Classification::at(ParameterLocation::Query)
            };
        }

        if ty.without_nullable().is_file() {
            return Classification::BODY;
        }

        if disable_inferred_body && self.is_query_collection(ty.without_nullable()) {
            return Classification::at(ParameterLocation::Query);
        }

        Classification::BODY
    }

    /// Builds the described parameter for a located classification.
    ///
    /// With explicit accepts metadata, every accepted content type maps to the
    /// parameter's schema; otherwise the content map stays empty.
    pub fn describe(
        &self,
        param: &ParameterDescriptor,
        location: ParameterLocation,
        schemas: &dyn SchemaResolver,
        accepts: Option<&AcceptsMetadata>,
    ) -> AppResult<Parameter> {
        let name = param
            .annotations
            .iter()
            .find_map(ParameterAnnotation::name_override)
            .unwrap_or(param.name.as_str())
            .to_string();

        let required = match location {
            ParameterLocation::Path => true,
            _ => !param.has_default && !param.is_nullable(),
        };

        let display_ty = self.display_type(&param.ty);
        let schema = schemas.schema_type_for(display_ty.as_ref().unwrap_or(&param.ty))?;
        let content: IndexMap<String, _> = accepts
            .map(|a| {
                a.content_types
                    .iter()
                    .map(|ct| (ct.clone(), schema.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Parameter {
            name,
            location,
            required,
            schema,
            content,
        })
    }

    /// Parseable non-primitive types are shown as strings, except `Option<primitive>`.
    fn display_type(&self, ty: &TypeDescriptor) -> Option<TypeDescriptor> {
        let keeps_own_schema = ty.is_text()
            || ty.is_primitive()
            || (ty.is_nullable() && ty.without_nullable().is_primitive());

        (!keeps_own_schema && self.cache.has_parse_capability(ty)).then(TypeDescriptor::text)
    }

    fn is_infrastructure(&self, param: &ParameterDescriptor) -> bool {
        let ty = param.ty.without_nullable();
        param
            .annotations
            .contains(&ParameterAnnotation::FromServices)
            || ty.has_capability(Capability::FrameworkContext)
            || ty.has_capability(Capability::ClaimsPrincipal)
            || ty.has_capability(Capability::Cancellation)
            || self.cache.has_async_bind_capability(param)
            || self.services.is_registered_service(ty)
    }

    fn is_query_collection(&self, ty: &TypeDescriptor) -> bool {
        match ty.shape() {
            TypeShape::StringValues => true,
            TypeShape::Sequence(element) => {
                element.is_text() || self.cache.has_parse_capability(element)
            }
            _ => false,
        }
    }
}
