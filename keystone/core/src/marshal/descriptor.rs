// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Type Descriptors
//!
//! Static layout metadata that stands in for runtime reflection. Every type
//! the marshaller can handle implements [`Describe`], returning a
//! [`TypeDescriptor`] whose [`Shape`] is one of a closed set:
//!
//! | Shape | Meaning | Provided by |
//! |-------|---------|-------------|
//! | `Scalar` | indivisible leaf (text, number, flag, enum member) | built-in impls, [`TypeDescriptor::enumeration`] |
//! | `Sequence` | homogeneous ordered collection | `Vec<T>` |
//! | `Complex` | named properties plus constructors | [`ObjectLayout::builder`] |
//!
//! Descriptors reference other types through [`TypeRef`], which builds the
//! target descriptor lazily. Self-referential layouts (a node holding a
//! `Vec` of nodes) therefore never recurse while being described.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use crate::marshal::error::MarshalError;
use crate::marshal::layout::ObjectLayout;

/// Owned, type-erased domain value produced by decoding.
pub type AnyBox = Box<dyn Any + Send>;

/// Supplies the static layout of a type to the marshaller.
pub trait Describe: Any + Send + Sized {
    fn describe() -> TypeDescriptor;
}

/// Enumerations stored by symbolic member name.
///
/// Renaming a member breaks decoding of values written under the old name;
/// renumbering does not matter since ordinals never reach the wire.
pub trait WireEnum: Describe {
    /// Every member name, in declaration order.
    const MEMBERS: &'static [&'static str];

    fn name(&self) -> &'static str;

    fn from_name(name: &str) -> Option<Self>;
}

// -----------------------------------------------------------------------------
// TypeRef

/// Cheap handle to a describable type.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    // Descriptor is built on demand; keeps recursive layouts finite.
    describe: fn() -> TypeDescriptor,
}

impl TypeRef {
    pub fn of<T: Describe>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            describe: T::describe,
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Builds a fresh descriptor. Prefer [`DescriptorCache::descriptor`],
    /// which memoizes per type.
    ///
    /// [`DescriptorCache::descriptor`]: crate::marshal::DescriptorCache::descriptor
    pub fn describe(&self) -> TypeDescriptor {
        (self.describe)()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.name).finish()
    }
}

// -----------------------------------------------------------------------------
// TypeDescriptor

#[derive(Debug)]
pub struct TypeDescriptor {
    ty: TypeRef,
    shape: Shape,
}

#[derive(Debug)]
pub enum Shape {
    Scalar(ScalarKind),
    Sequence(SequenceLayout),
    Complex(ObjectLayout),
}

impl TypeDescriptor {
    /// Scalars are fixed by the built-in impls; the codec downcasts to the
    /// concrete Rust type matching `kind`.
    pub(crate) fn scalar<T: Describe>(kind: ScalarKind) -> Self {
        Self {
            ty: TypeRef::of::<T>(),
            shape: Shape::Scalar(kind),
        }
    }

    pub fn enumeration<E: WireEnum>() -> Self {
        Self {
            ty: TypeRef::of::<E>(),
            shape: Shape::Scalar(ScalarKind::Enum(EnumDescriptor::of::<E>())),
        }
    }

    pub fn sequence<T: Describe>() -> Self {
        Self {
            ty: TypeRef::of::<Vec<T>>(),
            shape: Shape::Sequence(SequenceLayout::of::<T>()),
        }
    }

    pub fn complex(layout: ObjectLayout) -> Self {
        Self {
            ty: layout.ty(),
            shape: Shape::Complex(layout),
        }
    }

    #[inline]
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.ty.name()
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn as_sequence(&self) -> Option<&SequenceLayout> {
        match &self.shape {
            Shape::Sequence(layout) => Some(layout),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&ObjectLayout> {
        match &self.shape {
            Shape::Complex(layout) => Some(layout),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// ScalarKind

/// Scalar subtypes understood by the scalar codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Text,
    Bool,
    DateTime,
    Uuid,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Byte,
    Char,
    Enum(EnumDescriptor),
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Text => "text",
            ScalarKind::Bool => "bool",
            ScalarKind::DateTime => "datetime",
            ScalarKind::Uuid => "uuid",
            ScalarKind::Int8 => "int8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt16 => "uint16",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
            ScalarKind::Decimal => "decimal",
            ScalarKind::Byte => "byte",
            ScalarKind::Char => "char",
            ScalarKind::Enum(descriptor) => descriptor.name(),
        }
    }

    /// Numeric kinds travel as `N` / `NS`; everything else as text.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarKind::Int8
                | ScalarKind::Int16
                | ScalarKind::Int32
                | ScalarKind::Int64
                | ScalarKind::UInt16
                | ScalarKind::UInt32
                | ScalarKind::UInt64
                | ScalarKind::Float32
                | ScalarKind::Float64
                | ScalarKind::Decimal
                | ScalarKind::Byte
        )
    }
}

// -----------------------------------------------------------------------------
// EnumDescriptor

#[derive(Clone, Copy)]
pub struct EnumDescriptor {
    name: &'static str,
    members: &'static [&'static str],
    name_of: fn(&dyn Any) -> Option<&'static str>,
    parse: fn(&str) -> Option<AnyBox>,
}

impl EnumDescriptor {
    pub fn of<E: WireEnum>() -> Self {
        Self {
            name: type_name::<E>(),
            members: E::MEMBERS,
            name_of: enum_name_of::<E>,
            parse: enum_parse::<E>,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn members(&self) -> &'static [&'static str] {
        self.members
    }

    pub fn member_name(&self, value: &dyn Any) -> Result<&'static str, MarshalError> {
        (self.name_of)(value).ok_or(MarshalError::TypeMismatch {
            expected: self.name,
        })
    }

    pub fn parse(&self, member: &str) -> Result<AnyBox, MarshalError> {
        (self.parse)(member).ok_or_else(|| MarshalError::UnknownEnumMember {
            member: member.to_string(),
            enum_name: self.name,
        })
    }
}

impl PartialEq for EnumDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.members == other.members
    }
}

impl Eq for EnumDescriptor {}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumDescriptor")
            .field("name", &self.name)
            .field("members", &self.members)
            .finish()
    }
}

fn enum_name_of<E: WireEnum>(value: &dyn Any) -> Option<&'static str> {
    value.downcast_ref::<E>().map(E::name)
}

fn enum_parse<E: WireEnum>(member: &str) -> Option<AnyBox> {
    E::from_name(member).map(|value| Box::new(value) as AnyBox)
}

// -----------------------------------------------------------------------------
// SequenceLayout

/// Element type plus the functions that take a `Vec<T>` apart and put one
/// back together.
#[derive(Clone, Copy)]
pub struct SequenceLayout {
    element: TypeRef,
    items: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
    collect: fn(Vec<AnyBox>) -> Option<AnyBox>,
}

impl SequenceLayout {
    pub fn of<T: Describe>() -> Self {
        Self {
            element: TypeRef::of::<T>(),
            items: vec_items::<T>,
            collect: vec_collect::<T>,
        }
    }

    #[inline]
    pub fn element(&self) -> TypeRef {
        self.element
    }

    pub fn items<'a>(&self, value: &'a dyn Any) -> Result<Vec<&'a dyn Any>, MarshalError> {
        (self.items)(value).ok_or(MarshalError::TypeMismatch {
            expected: self.element.name(),
        })
    }

    pub fn collect(&self, items: Vec<AnyBox>) -> Result<AnyBox, MarshalError> {
        (self.collect)(items).ok_or(MarshalError::TypeMismatch {
            expected: self.element.name(),
        })
    }
}

impl fmt::Debug for SequenceLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceLayout")
            .field("element", &self.element)
            .finish()
    }
}

fn vec_items<T: Describe>(value: &dyn Any) -> Option<Vec<&dyn Any>> {
    value
        .downcast_ref::<Vec<T>>()
        .map(|items| items.iter().map(|item| item as &dyn Any).collect())
}

fn vec_collect<T: Describe>(items: Vec<AnyBox>) -> Option<AnyBox> {
    let mut collected = Vec::with_capacity(items.len());
    for item in items {
        collected.push(*item.downcast::<T>().ok()?);
    }
    Some(Box::new(collected))
}
