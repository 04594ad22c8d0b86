#![deny(missing_docs)]

//! # Type Mapping
//!
//! Converts type descriptors into JSON Schema handles.
//! Handles primitives, collections (Vec), files and nullability (Option).
//! Named types that are not well-known become `$ref`s into `components/schemas`.

use crate::error::{AppError, AppResult};
use crate::signature::{PrimitiveKind, TypeDescriptor, TypeShape};
use utoipa::openapi::schema::{
    ArrayBuilder, KnownFormat, ObjectBuilder, OneOfBuilder, Schema, SchemaFormat, SchemaType, Type,
};
use utoipa::openapi::{Ref, RefOr};

/// Opaque reference to a generated schema.
pub type SchemaHandle = RefOr<Schema>;

/// Produces schema handles for declared types.
pub trait SchemaResolver: Send + Sync {
    /// Maps a type to its schema. Void and result markers have no schema.
    fn schema_type_for(&self, ty: &TypeDescriptor) -> AppResult<SchemaHandle>;
}

/// The default resolver for Rust types.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustTypeSchemaResolver;

impl SchemaResolver for RustTypeSchemaResolver {
    fn schema_type_for(&self, ty: &TypeDescriptor) -> AppResult<SchemaHandle> {
        match ty.shape() {
            TypeShape::Unit | TypeShape::ResultMarker => Err(AppError::Schema(format!(
                "'{}' has no body schema",
                ty.name()
            ))),
            TypeShape::Text => Ok(simple(Type::String)),
            TypeShape::Primitive(kind) => Ok(primitive(*kind)),
            TypeShape::Nullable(inner) => Ok(make_nullable(self.schema_type_for(inner)?)),
            TypeShape::Sequence(inner) => Ok(array(self.schema_type_for(inner)?)),
            TypeShape::StringValues => Ok(array(simple(Type::String))),
            TypeShape::File => Ok(formatted(Type::String, KnownFormat::Binary)),
            TypeShape::FileCollection => Ok(array(formatted(Type::String, KnownFormat::Binary))),
            TypeShape::Awaitable(inner) => self.schema_type_for(inner),
            TypeShape::Named => Ok(named(ty.name())),
        }
    }
}

/// Schema accepting any value, used when a body has no declared type.
pub fn unconstrained_schema() -> SchemaHandle {
    RefOr::T(Schema::Object(ObjectBuilder::new().build()))
}

fn named(name: &str) -> SchemaHandle {
    // Strip module paths (`models::Widget`) and generic arguments for the component name.
    let simple_name = name
        .split('<')
        .next()
        .unwrap_or(name)
        .rsplit("::")
        .next()
        .unwrap_or(name);

    match simple_name {
        "Uuid" => formatted(Type::String, KnownFormat::Uuid),
        "NaiveDateTime" | "DateTime" | "OffsetDateTime" => {
            formatted(Type::String, KnownFormat::DateTime)
        }
        "NaiveDate" | "Date" => formatted(Type::String, KnownFormat::Date),
        "Url" | "Uri" | "Decimal" => simple(Type::String),
        "Value" => unconstrained_schema(),
        other => RefOr::Ref(Ref::from_schema_name(other)),
    }
}

fn primitive(kind: PrimitiveKind) -> SchemaHandle {
    match kind {
        PrimitiveKind::Bool => simple(Type::Boolean),
        PrimitiveKind::Char => simple(Type::String),
        PrimitiveKind::Int32 => formatted(Type::Integer, KnownFormat::Int32),
        PrimitiveKind::Int64 => formatted(Type::Integer, KnownFormat::Int64),
        PrimitiveKind::Float => formatted(Type::Number, KnownFormat::Float),
        PrimitiveKind::Double => formatted(Type::Number, KnownFormat::Double),
    }
}

fn array(items: SchemaHandle) -> SchemaHandle {
    RefOr::T(Schema::Array(ArrayBuilder::new().items(items).build()))
}

/// Inline objects get `null` added to their type; refs are wrapped in `oneOf`.
fn make_nullable(schema: SchemaHandle) -> SchemaHandle {
    match schema {
        RefOr::T(Schema::Object(mut obj)) => {
            if let SchemaType::Type(t) = obj.schema_type.clone() {
                obj.schema_type = SchemaType::from_iter([t, Type::Null]);
            }
            RefOr::T(Schema::Object(obj))
        }
        other => RefOr::T(Schema::OneOf(
            OneOfBuilder::new()
                .item(other)
                .item(simple(Type::Null))
                .build(),
        )),
    }
}

// Helpers for cleaner construction
fn simple(t: Type) -> SchemaHandle {
    RefOr::T(Schema::Object(ObjectBuilder::new().schema_type(t).build()))
}

fn formatted(t: Type, format: KnownFormat) -> SchemaHandle {
    RefOr::T(Schema::Object(
        ObjectBuilder::new()
            .schema_type(t)
            .format(Some(SchemaFormat::KnownFormat(format)))
            .build(),
    ))
}
