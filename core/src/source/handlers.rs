//! # Handler Extraction
//!
//! Walks a source file and builds an [`EndpointDescriptor`] for every routed
//! handler function.

use crate::describe::EndpointDescriptor;
use crate::error::{AppError, AppResult};
use crate::metadata::{EndpointDescription, EndpointMetadata, EndpointSummary};
use crate::route::RoutePattern;
use crate::signature::{HandlerSignature, ParameterAnnotation, ParameterDescriptor, TypeDescriptor};
use crate::source::attributes::extract_handler_attributes;
use crate::source::types::{describe_type, path_head};
use ra_ap_edition::Edition;
use ra_ap_syntax::ast::{self, HasName};
use ra_ap_syntax::{AstNode, SourceFile, SyntaxKind, SyntaxNode};

/// Parses every routed handler in `code`, in source order.
pub fn parse_handlers(code: &str) -> AppResult<Vec<EndpointDescriptor>> {
    let parse = SourceFile::parse(code, Edition::Edition2021);
    let file = parse.tree();
    let mut endpoints = Vec::new();

    for func in file.syntax().descendants().filter_map(ast::Fn::cast) {
        if let Some(endpoint) = parse_handler(&func)? {
            endpoints.push(endpoint);
        }
    }

    Ok(endpoints)
}

fn parse_handler(func: &ast::Fn) -> AppResult<Option<EndpointDescriptor>> {
    let attrs = extract_handler_attributes(func.syntax())?;
    let Some(route) = attrs.route else {
        return Ok(None);
    };
    let route = RoutePattern::parse(&route);

    let name = func
        .name()
        .map(|n| n.text().to_string())
        .ok_or_else(|| AppError::General("Handler function without a name".into()))?;

    let mut return_type = func
        .ret_type()
        .and_then(|ret| ret.ty())
        .map(|ty| describe_type(&ty))
        .unwrap_or_else(TypeDescriptor::unit);
    if func.async_token().is_some() {
        return_type = TypeDescriptor::awaitable(return_type);
    }

    let mut signature = HandlerSignature::new(name, return_type);
    if let Some(owner) = declaring_type(func) {
        signature = signature.declared_on(owner, false);
    }

    if let Some(params) = func.param_list() {
        for (index, param) in params.params().enumerate() {
            let Some(ty) = param.ty() else { continue };
            let binding = param
                .pat()
                .and_then(|pat| binding_name(&pat))
                .unwrap_or_else(|| format!("arg{}", index));
            signature.parameters.extend(extractor_parameters(&binding, &ty, &route));
        }
    }

    let mut metadata = EndpointMetadata::new();
    if let Some(doc) = extract_doc_comment(func.syntax()) {
        let (summary, description) = split_doc(&doc);
        metadata.push(EndpointSummary(summary));
        if let Some(description) = description {
            metadata.push(EndpointDescription(description));
        }
    }
    // Explicit attributes come after the doc comment so they win lookups.
    metadata.extend(attrs.metadata);

    Ok(Some(EndpointDescriptor::new(signature, metadata, route)))
}

fn declaring_type(func: &ast::Fn) -> Option<String> {
    let owner = func
        .syntax()
        .parent()
        .and_then(|list| list.parent())
        .and_then(ast::Impl::cast)?;
    let self_ty = owner.self_ty()?;
    path_head(&self_ty).map(|(name, _)| name)
}

/// Name bound by a parameter pattern; `web::Path(id)` style destructuring yields `id`.
fn binding_name(pat: &ast::Pat) -> Option<String> {
    match pat {
        ast::Pat::IdentPat(ident) => ident.name().map(|n| n.text().to_string()),
        ast::Pat::TupleStructPat(tuple) => {
            let fields: Vec<_> = tuple.fields().collect();
            match fields.as_slice() {
                [single] => binding_name(single),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Expands one handler argument into the parameters it binds.
fn extractor_parameters(
    binding: &str,
    ty: &ast::Type,
    route: &RoutePattern,
) -> Vec<ParameterDescriptor> {
    let Some((extractor, inner)) = path_head(ty) else {
        return vec![ParameterDescriptor::new(binding, describe_type(ty))];
    };
    let inner_ty = || {
        inner
            .as_ref()
            .map(describe_type)
            .unwrap_or_else(|| describe_type(ty))
    };

    match (extractor.as_str(), inner.as_ref()) {
        ("Option", Some(inner_node)) if path_head(inner_node).is_some_and(|(n, _)| is_extractor(&n)) => {
            extractor_parameters(binding, inner_node, route)
                .into_iter()
                .map(|mut p| {
                    p.ty = TypeDescriptor::nullable(p.ty);
                    p
                })
                .collect()
        }
        ("Path", Some(ast::Type::TupleType(tuple))) => tuple
            .fields()
            .enumerate()
            .map(|(i, field)| {
                let name = route
                    .parameters()
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("{}{}", binding, i));
                ParameterDescriptor::new(name, describe_type(&field))
                    .annotated(ParameterAnnotation::FromRoute { name: None })
            })
            .collect(),
        ("Path", _) => {
            let name = match route.parameters() {
                [only] => only.clone(),
                _ => binding.to_string(),
            };
            vec![ParameterDescriptor::new(name, inner_ty())
                .annotated(ParameterAnnotation::FromRoute { name: None })]
        }
        ("Query", _) => vec![ParameterDescriptor::new(binding, inner_ty())
            .annotated(ParameterAnnotation::FromQuery { name: None })],
        ("Header", _) => vec![ParameterDescriptor::new(binding, inner_ty())
            .annotated(ParameterAnnotation::FromHeader { name: None })],
        ("Json", _) => vec![ParameterDescriptor::new(binding, inner_ty())
            .annotated(ParameterAnnotation::FromBody { allow_empty: false })],
        ("Form" | "MultipartForm", _) => vec![ParameterDescriptor::new(binding, inner_ty())
            .annotated(ParameterAnnotation::FromForm)],
        ("Data" | "ThinData", _) => vec![ParameterDescriptor::new(binding, inner_ty())
            .annotated(ParameterAnnotation::FromServices)],
        _ => vec![ParameterDescriptor::new(binding, describe_type(ty))],
    }
}

fn is_extractor(name: &str) -> bool {
    matches!(
        name,
        "Path" | "Query" | "Header" | "Json" | "Form" | "MultipartForm" | "Data" | "ThinData"
    )
}

/// Collects `///` lines attached to a node.
pub(crate) fn extract_doc_comment(node: &SyntaxNode) -> Option<String> {
    let mut lines = Vec::new();

    for child in node.children_with_tokens() {
        if child.kind() == SyntaxKind::COMMENT {
            let text = child.to_string();
            if let Some(content) = text.strip_prefix("///") {
                lines.push(content.strip_prefix(' ').unwrap_or(content).trim_end().to_owned());
            }
        }
    }

    let joined = lines.join("\n");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// First paragraph becomes the summary, the rest the description.
fn split_doc(doc: &str) -> (String, Option<String>) {
    let mut paragraphs = doc.splitn(2, "\n\n");
    let summary = paragraphs
        .next()
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ");
    let description = paragraphs
        .next()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    (summary, description)
}
