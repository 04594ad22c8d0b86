#![deny(missing_docs)]

//! # Handler Signatures
//!
//! Static descriptors of a handler's parameters and return type.
//!
//! Types are described once (by hand or by the `source` parser) and then
//! queried through their shape and declared capabilities, never through
//! runtime type tests.

use std::collections::BTreeSet;

/// Built-in scalar kinds that map directly onto JSON primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// 32-bit (or narrower) integers.
    Int32,
    /// 64-bit (or wider) integers.
    Int64,
    /// `f32`
    Float,
    /// `f64`
    Double,
}

/// Structural shape of a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// No value (`()`), the void/no-body marker.
    Unit,
    /// Textual value (`String`, `&str`).
    Text,
    /// A primitive scalar.
    Primitive(PrimitiveKind),
    /// Nullable wrapper (`Option<T>`).
    Nullable(Box<TypeDescriptor>),
    /// Homogeneous sequence (`Vec<T>`, `[T]`).
    Sequence(Box<TypeDescriptor>),
    /// Multi-value string collection.
    StringValues,
    /// A single uploaded file.
    File,
    /// A collection of uploaded files.
    FileCollection,
    /// Awaitable wrapper around the eventual value.
    Awaitable(Box<TypeDescriptor>),
    /// Polymorphic framework result whose body shape is not statically known.
    ResultMarker,
    /// Any other named type (structs, enums, well-known library types).
    Named,
}

/// Capabilities a type can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Can be parsed from a single string (`FromStr`).
    ParseFromStr,
    /// Binds itself asynchronously from the request (custom extractor).
    AsyncBind,
    /// Well-known framework context type (request, payload).
    FrameworkContext,
    /// Authenticated principal / claims.
    ClaimsPrincipal,
    /// Cancellation token.
    Cancellation,
}

/// Static description of a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: String,
    shape: TypeShape,
    capabilities: BTreeSet<Capability>,
}

impl TypeDescriptor {
    fn new(name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            shape,
            capabilities: BTreeSet::new(),
        }
    }

    /// The void marker.
    pub fn unit() -> Self {
        Self::new("()", TypeShape::Unit)
    }

    /// `String`.
    pub fn text() -> Self {
        Self::new("String", TypeShape::Text)
    }

    /// A primitive scalar under its Rust name.
    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, TypeShape::Primitive(kind))
    }

    /// A user-defined or library type known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, TypeShape::Named)
    }

    /// `Option<inner>`.
    pub fn nullable(inner: TypeDescriptor) -> Self {
        Self::new(
            format!("Option<{}>", inner.name),
            TypeShape::Nullable(Box::new(inner)),
        )
    }

    /// `Vec<inner>`.
    pub fn sequence(inner: TypeDescriptor) -> Self {
        Self::new(
            format!("Vec<{}>", inner.name),
            TypeShape::Sequence(Box::new(inner)),
        )
    }

    /// Multi-value string collection.
    pub fn string_values(name: impl Into<String>) -> Self {
        Self::new(name, TypeShape::StringValues)
    }

    /// Single uploaded file.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, TypeShape::File)
    }

    /// Collection of uploaded files.
    pub fn file_collection(name: impl Into<String>) -> Self {
        Self::new(name, TypeShape::FileCollection)
    }

    /// A value produced asynchronously.
    pub fn awaitable(inner: TypeDescriptor) -> Self {
        Self::new(
            format!("impl Future<Output = {}>", inner.name),
            TypeShape::Awaitable(Box::new(inner)),
        )
    }

    /// A framework result abstraction (`impl Responder`, `HttpResponse`).
    pub fn result_marker(name: impl Into<String>) -> Self {
        Self::new(name, TypeShape::ResultMarker)
    }

    /// Declares an additional capability.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Display name, also used as the type's identity in caches.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Structural shape.
    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    /// Whether the capability was declared on this exact type.
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// `true` for the void marker.
    pub fn is_void(&self) -> bool {
        matches!(self.shape, TypeShape::Unit)
    }

    /// `true` for textual types.
    pub fn is_text(&self) -> bool {
        matches!(self.shape, TypeShape::Text)
    }

    /// `true` for primitive scalars.
    pub fn is_primitive(&self) -> bool {
        matches!(self.shape, TypeShape::Primitive(_))
    }

    /// `true` for single files and file collections.
    pub fn is_file(&self) -> bool {
        matches!(self.shape, TypeShape::File | TypeShape::FileCollection)
    }

    /// `true` for `Option<_>`.
    pub fn is_nullable(&self) -> bool {
        matches!(self.shape, TypeShape::Nullable(_))
    }

    /// Strips one `Option<_>` layer if present.
    pub fn without_nullable(&self) -> &TypeDescriptor {
        match &self.shape {
            TypeShape::Nullable(inner) => inner,
            _ => self,
        }
    }
}

/// Nullability of a parameter as declared in the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nullability {
    /// Declared non-null.
    NotNull,
    /// Declared nullable.
    Nullable,
    /// No nullability information.
    #[default]
    Unknown,
}

/// Explicit markers attached to a single parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterAnnotation {
    /// Bound from a route segment, optionally under another name.
    FromRoute {
        /// Wire name override.
        name: Option<String>,
    },
    /// Bound from the query string.
    FromQuery {
        /// Wire name override.
        name: Option<String>,
    },
    /// Bound from a request header.
    FromHeader {
        /// Wire name override.
        name: Option<String>,
    },
    /// Bound from the request body.
    FromBody {
        /// An empty body is accepted.
        allow_empty: bool,
    },
    /// Bound from form fields.
    FromForm,
    /// Resolved from the service container.
    FromServices,
}

impl ParameterAnnotation {
    /// Wire name override carried by location annotations.
    pub fn name_override(&self) -> Option<&str> {
        match self {
            Self::FromRoute { name } | Self::FromQuery { name } | Self::FromHeader { name } => {
                name.as_deref()
            }
            _ => None,
        }
    }
}

/// One handler parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    /// Binding name, used for route matching.
    pub name: String,
    /// Declared type.
    pub ty: TypeDescriptor,
    /// Attached annotations in declaration order.
    pub annotations: Vec<ParameterAnnotation>,
    /// The parameter declares a default value.
    pub has_default: bool,
    /// Declared nullability.
    pub nullability: Nullability,
}

impl ParameterDescriptor {
    /// A parameter with no annotations and unknown nullability.
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
            has_default: false,
            nullability: Nullability::Unknown,
        }
    }

    /// Adds an annotation.
    pub fn annotated(mut self, annotation: ParameterAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Marks the parameter as having a default value.
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Sets the declared nullability.
    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullability = nullability;
        self
    }

    /// First annotation matching the predicate.
    pub fn find_annotation(
        &self,
        pred: impl Fn(&ParameterAnnotation) -> bool,
    ) -> Option<&ParameterAnnotation> {
        self.annotations.iter().find(|a| pred(a))
    }

    /// Declared nullable, either by flag or by an `Option<_>` type.
    pub fn is_nullable(&self) -> bool {
        self.nullability == Nullability::Nullable || self.ty.is_nullable()
    }
}

/// The type a handler is declared on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaringType {
    /// Simple name (no module path).
    pub name: String,
    /// Synthesized by the compiler (closures, anonymous constructs).
    pub compiler_generated: bool,
}

/// Parameter list and return type of a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSignature {
    /// Handler name, used in diagnostics.
    pub name: String,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterDescriptor>,
    /// Declared return type, possibly awaitable.
    pub return_type: TypeDescriptor,
    /// Declaring type, absent for free functions.
    pub declaring_type: Option<DeclaringType>,
}

impl HandlerSignature {
    /// A free function returning `return_type`.
    pub fn new(name: impl Into<String>, return_type: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type,
            declaring_type: None,
        }
    }

    /// Appends a parameter.
    pub fn param(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets the declaring type.
    pub fn declared_on(mut self, name: impl Into<String>, compiler_generated: bool) -> Self {
        self.declaring_type = Some(DeclaringType {
            name: name.into(),
            compiler_generated,
        });
        self
    }
}
