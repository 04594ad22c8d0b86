#![deny(missing_docs)]

//! # Type Descriptors from Syntax
//!
//! Maps Rust type syntax onto [`TypeDescriptor`]s, attaching the capabilities
//! well-known library types are known to have.

use crate::error::{AppError, AppResult};
use crate::signature::{Capability, PrimitiveKind, TypeDescriptor};
use ra_ap_edition::Edition;
use ra_ap_syntax::ast::{self, HasGenericArgs};
use ra_ap_syntax::{AstNode, SourceFile};

/// Parses a type written as a string (e.g. `Option<Vec<Uuid>>`).
pub fn parse_type_str(rust_type: &str) -> AppResult<TypeDescriptor> {
    let ty = parse_type_node(rust_type)?;
    Ok(describe_type(&ty))
}

/// Parses a type string into its syntax node.
pub(crate) fn parse_type_node(rust_type: &str) -> AppResult<ast::Type> {
    // Wrap in a type alias so the parser sees a complete item.
    let code = format!("type _Wrapper = {};", rust_type);
    let parse = SourceFile::parse(&code, Edition::Edition2021);
    let file = parse.tree();

    let type_alias = file
        .syntax()
        .descendants()
        .find_map(ast::TypeAlias::cast)
        .ok_or_else(|| AppError::General(format!("Failed to parse type string: {}", rust_type)))?;

    type_alias
        .ty()
        .ok_or_else(|| AppError::General(format!("Invalid type syntax: {}", rust_type)))
}

/// Last path segment name and its first type argument, if any.
pub(crate) fn path_head(ty: &ast::Type) -> Option<(String, Option<ast::Type>)> {
    let ast::Type::PathType(path_type) = ty else {
        return None;
    };
    let segment = path_type.path()?.segment()?;
    let name = segment.name_ref()?.text().to_string();
    let first_arg = segment.generic_arg_list().and_then(|args| {
        args.generic_args().find_map(|arg| match arg {
            ast::GenericArg::TypeArg(type_arg) => type_arg.ty(),
            _ => None,
        })
    });
    Some((name, first_arg))
}

/// Maps a type node. Unknown shapes degrade to named types rather than failing.
pub fn describe_type(ty: &ast::Type) -> TypeDescriptor {
    match ty {
        ast::Type::PathType(_) => describe_path_type(ty),
        ast::Type::RefType(ref_type) => ref_type
            .ty()
            .map(|inner| describe_type(&inner))
            .unwrap_or_else(|| TypeDescriptor::named(ty.syntax().text().to_string())),
        ast::Type::ParenType(paren) => paren
            .ty()
            .map(|inner| describe_type(&inner))
            .unwrap_or_else(TypeDescriptor::unit),
        ast::Type::TupleType(tuple) if tuple.fields().next().is_none() => TypeDescriptor::unit(),
        ast::Type::SliceType(slice) => slice
            .ty()
            .map(|inner| sequence_of(describe_type(&inner)))
            .unwrap_or_else(|| TypeDescriptor::named(ty.syntax().text().to_string())),
        ast::Type::ArrayType(array) => array
            .ty()
            .map(|inner| sequence_of(describe_type(&inner)))
            .unwrap_or_else(|| TypeDescriptor::named(ty.syntax().text().to_string())),
        ast::Type::ImplTraitType(_) => {
            let text = ty.syntax().text().to_string();
            if text.contains("Responder") {
                TypeDescriptor::result_marker(text)
            } else {
                TypeDescriptor::named(text)
            }
        }
        other => TypeDescriptor::named(other.syntax().text().to_string()),
    }
}

fn describe_path_type(ty: &ast::Type) -> TypeDescriptor {
    let full_name = ty.syntax().text().to_string();
    let Some((name, first_arg)) = path_head(ty) else {
        return TypeDescriptor::named(full_name);
    };
    let inner = || first_arg.as_ref().map(describe_type);

    match name.as_str() {
        // Primitives
        "String" | "str" | "Cow" => TypeDescriptor::text(),
        "bool" => TypeDescriptor::primitive(name, PrimitiveKind::Bool),
        "char" => TypeDescriptor::primitive(name, PrimitiveKind::Char),
        "i8" | "i16" | "i32" | "u8" | "u16" | "u32" => {
            TypeDescriptor::primitive(name, PrimitiveKind::Int32)
        }
        "i64" | "i128" | "isize" | "u64" | "u128" | "usize" => {
            TypeDescriptor::primitive(name, PrimitiveKind::Int64)
        }
        "f32" => TypeDescriptor::primitive(name, PrimitiveKind::Float),
        "f64" => TypeDescriptor::primitive(name, PrimitiveKind::Double),

        // Parseable library types
        "Uuid" | "NaiveDate" | "NaiveDateTime" | "NaiveTime" | "DateTime" | "OffsetDateTime"
        | "IpAddr" | "Ipv4Addr" | "Ipv6Addr" | "Url" | "Decimal" => {
            TypeDescriptor::named(name).with_capability(Capability::ParseFromStr)
        }

        // Containers
        "Option" => inner()
            .map(TypeDescriptor::nullable)
            .unwrap_or_else(|| TypeDescriptor::named(full_name)),
        "Vec" | "VecDeque" | "HashSet" | "BTreeSet" => inner()
            .map(sequence_of)
            .unwrap_or_else(|| TypeDescriptor::named(full_name)),
        "Box" | "Arc" | "Rc" | "Json" | "Result" => {
            inner().unwrap_or_else(|| TypeDescriptor::named(full_name))
        }

        // Files
        "TempFile" | "NamedTempFile" | "Bytes" => TypeDescriptor::file(name),
        "Multipart" => TypeDescriptor::file_collection(name),

        // Framework plumbing
        "HttpRequest" | "Payload" | "ConnectionInfo" => {
            TypeDescriptor::named(name).with_capability(Capability::FrameworkContext)
        }
        "Identity" | "BearerAuth" | "BasicAuth" | "Claims" => {
            TypeDescriptor::named(name).with_capability(Capability::ClaimsPrincipal)
        }
        "CancellationToken" => TypeDescriptor::named(name).with_capability(Capability::Cancellation),
        "HttpResponse" | "Response" | "Either" => TypeDescriptor::result_marker(full_name),

        _ => TypeDescriptor::named(full_name),
    }
}

fn sequence_of(element: TypeDescriptor) -> TypeDescriptor {
    if element.is_file() {
        TypeDescriptor::file_collection(format!("Vec<{}>", element.name()))
    } else {
        TypeDescriptor::sequence(element)
    }
}
