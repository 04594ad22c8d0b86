#![deny(missing_docs)]

//! # Operation Builder
//!
//! Gates an endpoint on applicability and assembles its operation from the
//! tag, parameter, body and response resolvers.

use crate::capabilities::{CapabilityCache, ServiceRegistry};
use crate::config::DescribeOptions;
use crate::describe::body::resolve_request_body;
use crate::describe::models::Operation;
use crate::describe::params::ParameterClassifier;
use crate::describe::responses::resolve_responses;
use crate::describe::tags::resolve_tags;
use crate::error::AppResult;
use crate::metadata::{EndpointMetadata, HttpMethod};
use crate::route::RoutePattern;
use crate::signature::{HandlerSignature, TypeDescriptor};
use crate::type_mapping::SchemaResolver;
use rayon::prelude::*;

/// Everything known about one registered endpoint.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    /// Handler signature.
    pub signature: HandlerSignature,
    /// Attached metadata, in declaration order.
    pub metadata: EndpointMetadata,
    /// Route template.
    pub route: RoutePattern,
}

impl EndpointDescriptor {
    /// Bundles the three inputs.
    pub fn new(signature: HandlerSignature, metadata: EndpointMetadata, route: RoutePattern) -> Self {
        Self {
            signature,
            metadata,
            route,
        }
    }

    /// The single HTTP method, if exactly one is declared.
    pub fn single_method(&self) -> Option<HttpMethod> {
        match self.metadata.http_methods() {
            [method] => Some(*method),
            _ => None,
        }
    }
}

/// Produces operations for endpoints of one application.
pub struct OperationGenerator<'a> {
    options: &'a DescribeOptions,
    schemas: &'a dyn SchemaResolver,
    services: &'a dyn ServiceRegistry,
    cache: &'a CapabilityCache,
    default_error_type: Option<TypeDescriptor>,
}

impl<'a> OperationGenerator<'a> {
    /// Creates a generator; fails if the configured default error type does not parse.
    pub fn new(
        options: &'a DescribeOptions,
        schemas: &'a dyn SchemaResolver,
        services: &'a dyn ServiceRegistry,
        cache: &'a CapabilityCache,
    ) -> AppResult<Self> {
        Ok(Self {
            options,
            schemas,
            services,
            cache,
            default_error_type: options.default_error_descriptor()?,
        })
    }

    /// Describes one endpoint. `Ok(None)` when it is not describable.
    pub fn describe(&self, endpoint: &EndpointDescriptor) -> AppResult<Option<Operation>> {
        let signature = &endpoint.signature;
        let metadata = &endpoint.metadata;
        let route = &endpoint.route;

        let Some(method) = endpoint.single_method() else {
            tracing::debug!(
                handler = %signature.name,
                methods = metadata.http_methods().len(),
                "skipping endpoint without a single HTTP method"
            );
            return Ok(None);
        };
        if metadata.is_excluded() {
            tracing::debug!(handler = %signature.name, "endpoint excluded from description");
            return Ok(None);
        }

        let disable_inferred_body = method.disables_inferred_body();
        let operation_id = metadata.last(|a| a.endpoint_name()).map(str::to_string);
        let label = operation_id
            .clone()
            .unwrap_or_else(|| format!("{} {}", method, route.as_str()));

        let tags = resolve_tags(signature, metadata, self.options.application_name.as_deref());

        let classifier = ParameterClassifier::new(self.cache, self.services);
        let accepts = metadata.last(|a| a.accepts());
        let mut parameters = Vec::new();
        for param in &signature.parameters {
            let classification = classifier.classify(param, route, disable_inferred_body);
            if let Some(location) = classification.location {
                parameters.push(classifier.describe(param, location, self.schemas, accepts)?);
            }
        }

        let request_body = resolve_request_body(
            signature,
            metadata,
            route,
            &classifier,
            self.schemas,
            disable_inferred_body,
        )?;
        if disable_inferred_body && request_body.is_some() {
            tracing::warn!(operation = %label, "inferred a request body for a {} endpoint", method);
        }

        let default_error_type = metadata
            .last(|a| a.default_error_type())
            .or(self.default_error_type.as_ref());
        let responses = resolve_responses(
            &signature.return_type,
            metadata,
            default_error_type,
            self.schemas,
            &label,
        )?;

        Ok(Some(Operation {
            operation_id,
            summary: metadata.last(|a| a.summary()).map(str::to_string),
            description: metadata.last(|a| a.description()).map(str::to_string),
            tags,
            parameters,
            request_body,
            responses,
        }))
    }

    /// Describes endpoints in parallel; results keep the input order.
    pub fn describe_all(&self, endpoints: &[EndpointDescriptor]) -> AppResult<Vec<Option<Operation>>> {
        endpoints.par_iter().map(|e| self.describe(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::NoServices;
    use crate::metadata::{
        AcceptsMetadata, DefaultErrorType, EndpointName, EndpointSummary, ExcludeFromDescription,
        HttpMethodMetadata, ProvidedResponse,
    };
    use crate::signature::{ParameterDescriptor, PrimitiveKind};
    use crate::type_mapping::RustTypeSchemaResolver;

    fn endpoint(method: &[HttpMethod], route: &str, sig: HandlerSignature) -> EndpointDescriptor {
        EndpointDescriptor::new(
            sig,
            EndpointMetadata::new().with(HttpMethodMetadata(method.to_vec())),
            RoutePattern::parse(route),
        )
    }

    fn get_item() -> HandlerSignature {
        HandlerSignature::new("get_item", TypeDescriptor::text()).param(ParameterDescriptor::new(
            "id",
            TypeDescriptor::primitive("i32", PrimitiveKind::Int32),
        ))
    }

    #[test]
    fn test_requires_single_method() {
        let options = DescribeOptions::default();
        let cache = CapabilityCache::new();
        let gen = OperationGenerator::new(&options, &RustTypeSchemaResolver, &NoServices, &cache)
            .unwrap();

        let none = endpoint(&[], "/items/{id}", get_item());
        let many = endpoint(&[HttpMethod::Get, HttpMethod::Head], "/items/{id}", get_item());
        let one = endpoint(&[HttpMethod::Get], "/items/{id}", get_item());

        assert!(gen.describe(&none).unwrap().is_none());
        assert!(gen.describe(&many).unwrap().is_none());
        assert!(gen.describe(&one).unwrap().is_some());
    }

    #[test]
    fn test_excluded_endpoint() {
        let options = DescribeOptions::default();
        let cache = CapabilityCache::new();
        let gen = OperationGenerator::new(&options, &RustTypeSchemaResolver, &NoServices, &cache)
            .unwrap();

        let mut hidden = endpoint(&[HttpMethod::Get], "/items/{id}", get_item());
        hidden.metadata.push(ExcludeFromDescription(true));
        assert!(gen.describe(&hidden).unwrap().is_none());
    }

    #[test]
    fn test_explicit_naming_metadata() {
        let options = DescribeOptions::default();
        let cache = CapabilityCache::new();
        let gen = OperationGenerator::new(&options, &RustTypeSchemaResolver, &NoServices, &cache)
            .unwrap();

        let mut ep = endpoint(&[HttpMethod::Get], "/items/{id}", get_item());
        ep.metadata.push(EndpointName("getItem".into()));
        ep.metadata.push(EndpointSummary("Fetch one item".into()));

        let op = gen.describe(&ep).unwrap().unwrap();
        assert_eq!(op.operation_id.as_deref(), Some("getItem"));
        assert_eq!(op.summary.as_deref(), Some("Fetch one item"));
        assert_eq!(op.description, None);
    }

    #[test]
    fn test_accepts_reaches_parameter_content() {
        let options = DescribeOptions::default();
        let cache = CapabilityCache::new();
        let gen = OperationGenerator::new(&options, &RustTypeSchemaResolver, &NoServices, &cache)
            .unwrap();

        let sig = get_item().param(ParameterDescriptor::new("w", TypeDescriptor::named("Widget")));
        let mut ep = endpoint(&[HttpMethod::Post], "/items/{id}", sig);
        ep.metadata.push(AcceptsMetadata {
            content_types: vec!["application/xml".into()],
            request_type: None,
            is_optional: false,
        });

        let op = gen.describe(&ep).unwrap().unwrap();
        assert_eq!(op.parameters.len(), 1);
        assert_eq!(
            op.parameters[0].content.keys().collect::<Vec<_>>(),
            vec!["application/xml"]
        );
        assert!(op
            .request_body
            .as_ref()
            .is_some_and(|b| b.content.contains_key("application/xml")));
    }

    #[test]
    fn test_metadata_default_error_beats_options() {
        let options = DescribeOptions {
            default_error_type: Some("ConfiguredError".into()),
            ..DescribeOptions::default()
        };
        let cache = CapabilityCache::new();
        let gen = OperationGenerator::new(&options, &RustTypeSchemaResolver, &NoServices, &cache)
            .unwrap();

        let provider = ProvidedResponse {
            status: 400,
            ty: None,
            is_default_error: false,
        };

        let mut configured = endpoint(&[HttpMethod::Get], "/items/{id}", get_item());
        configured.metadata.push(provider.clone());
        let op = gen.describe(&configured).unwrap().unwrap();
        assert_eq!(
            op.responses[&400].content["application/json"],
            RustTypeSchemaResolver
                .schema_type_for(&TypeDescriptor::named("ConfiguredError"))
                .unwrap()
        );

        let mut overridden = endpoint(&[HttpMethod::Get], "/items/{id}", get_item());
        overridden.metadata.push(DefaultErrorType(TypeDescriptor::named("ApiError")));
        overridden.metadata.push(provider);
        let op = gen.describe(&overridden).unwrap().unwrap();
        assert_eq!(
            op.responses[&400].content["application/json"],
            RustTypeSchemaResolver
                .schema_type_for(&TypeDescriptor::named("ApiError"))
                .unwrap()
        );
    }

    #[test]
    fn test_describe_all_keeps_order() {
        let options = DescribeOptions::default();
        let cache = CapabilityCache::new();
        let gen = OperationGenerator::new(&options, &RustTypeSchemaResolver, &NoServices, &cache)
            .unwrap();

        let endpoints: Vec<_> = (0..64)
            .map(|i| {
                let mut ep = endpoint(&[HttpMethod::Get], "/items/{id}", get_item());
                ep.metadata.push(EndpointName(format!("op{}", i)));
                if i % 3 == 0 {
                    ep.metadata.push(ExcludeFromDescription(true));
                }
                ep
            })
            .collect();

        let ops = gen.describe_all(&endpoints).unwrap();
        assert_eq!(ops.len(), 64);
        for (i, op) in ops.iter().enumerate() {
            match op {
                Some(op) => assert_eq!(op.operation_id, Some(format!("op{}", i))),
                None => assert_eq!(i % 3, 0),
            }
        }
    }
}
