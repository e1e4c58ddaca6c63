// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Object Layout
//!
//! Constructor and property metadata for complex types. A layout is the
//! explicit replacement for constructor/property reflection: an ordered list
//! of constructors (each with ordered, named parameters) and an ordered list
//! of properties with getters and optional setters.
//!
//! ```
//! use keystone_core::marshal::{param, Describe, ObjectLayout, TypeDescriptor};
//!
//! struct Customer {
//!     name: String,
//!     email: Option<String>,
//! }
//!
//! impl Describe for Customer {
//!     fn describe() -> TypeDescriptor {
//!         ObjectLayout::builder::<Self>()
//!             .constructor(&[param::<String>("name")], |args| {
//!                 Ok(Customer { name: args.next()?, email: None })
//!             })
//!             .property("Name", |c: &Customer| &c.name)
//!             .settable_optional(
//!                 "Email",
//!                 |c: &Customer| c.email.as_ref(),
//!                 |c: &mut Customer, email: String| c.email = Some(email),
//!             )
//!             .build()
//!     }
//! }
//! ```

use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;

use crate::marshal::descriptor::{AnyBox, Describe, TypeDescriptor, TypeRef};
use crate::marshal::error::MarshalError;

type Factory = Box<dyn Fn(&mut Arguments) -> Result<AnyBox, MarshalError> + Send + Sync>;

pub struct ObjectLayout {
    ty: TypeRef,
    constructors: Vec<Constructor>,
    properties: Vec<Property>,
}

impl ObjectLayout {
    pub fn builder<T: Describe>() -> ObjectLayoutBuilder<T> {
        ObjectLayoutBuilder {
            layout: ObjectLayout {
                ty: TypeRef::of::<T>(),
                constructors: Vec::new(),
                properties: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    /// Constructors in declaration order.
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// Properties in declaration order; this is also the encode order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Constructor with the most parameters. Ties go to the one declared first.
    pub fn select_constructor(&self) -> Option<&Constructor> {
        self.constructors
            .iter()
            .fold(None, |best: Option<&Constructor>, candidate| match best {
                Some(current) if current.arity() >= candidate.arity() => Some(current),
                _ => Some(candidate),
            })
    }
}

impl fmt::Debug for ObjectLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectLayout")
            .field("ty", &self.ty)
            .field("constructors", &self.constructors)
            .field("properties", &self.properties)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Constructors

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    name: &'static str,
    ty: TypeRef,
}

impl Parameter {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn ty(&self) -> TypeRef {
        self.ty
    }
}

/// Declares a constructor parameter named `name` of type `V`.
pub fn param<V: Describe>(name: &'static str) -> Parameter {
    Parameter {
        name,
        ty: TypeRef::of::<V>(),
    }
}

pub struct Constructor {
    parameters: Vec<Parameter>,
    factory: Factory,
}

impl Constructor {
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn invoke(&self, arguments: &mut Arguments) -> Result<AnyBox, MarshalError> {
        (self.factory)(arguments)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Decoded constructor arguments, in parameter order.
pub struct Arguments {
    type_name: &'static str,
    names: Vec<&'static str>,
    values: Vec<Option<AnyBox>>,
    cursor: usize,
}

impl Arguments {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            names: Vec::new(),
            values: Vec::new(),
            cursor: 0,
        }
    }

    pub fn push(&mut self, name: &'static str, value: AnyBox) {
        self.names.push(name);
        self.values.push(Some(value));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Takes the argument at `index` out of the list.
    pub fn take<V: Describe>(&mut self, index: usize) -> Result<V, MarshalError> {
        let value = self
            .values
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(MarshalError::MissingConstructorArgument {
                type_name: self.type_name,
                parameter: self.names.get(index).copied().unwrap_or("<unnamed>"),
            })?;
        value
            .downcast::<V>()
            .map(|value| *value)
            .map_err(|_| MarshalError::type_mismatch::<V>())
    }

    /// Takes the next argument in parameter order.
    pub fn next<V: Describe>(&mut self) -> Result<V, MarshalError> {
        let index = self.cursor;
        self.cursor += 1;
        self.take(index)
    }
}

// -----------------------------------------------------------------------------
// Properties

/// Type-erased access to one property of a complex value.
pub trait PropertyAccess: Send + Sync {
    /// Current value, `None` when the property is null.
    fn get<'a>(&self, target: &'a dyn Any) -> Result<Option<&'a dyn Any>, MarshalError>;

    fn is_settable(&self) -> bool;

    fn set(&self, target: &mut dyn Any, value: AnyBox) -> Result<(), MarshalError>;
}

pub struct Property {
    name: &'static str,
    ty: TypeRef,
    access: Box<dyn PropertyAccess>,
}

impl Property {
    pub fn new(name: &'static str, ty: TypeRef, access: Box<dyn PropertyAccess>) -> Self {
        Self { name, ty, access }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn get<'a>(&self, target: &'a dyn Any) -> Result<Option<&'a dyn Any>, MarshalError> {
        self.access.get(target)
    }

    pub fn is_settable(&self) -> bool {
        self.access.is_settable()
    }

    pub fn set(&self, target: &mut dyn Any, value: AnyBox) -> Result<(), MarshalError> {
        self.access.set(target, value)
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("settable", &self.is_settable())
            .finish()
    }
}

enum Getter<T, F> {
    Required(fn(&T) -> &F),
    Optional(fn(&T) -> Option<&F>),
}

struct FieldAccess<T, F> {
    get: Getter<T, F>,
    set: Option<fn(&mut T, F)>,
}

impl<T: Describe, F: Describe> PropertyAccess for FieldAccess<T, F> {
    fn get<'a>(&self, target: &'a dyn Any) -> Result<Option<&'a dyn Any>, MarshalError> {
        let target = target
            .downcast_ref::<T>()
            .ok_or_else(MarshalError::type_mismatch::<T>)?;
        Ok(match self.get {
            Getter::Required(get) => Some(get(target) as &dyn Any),
            Getter::Optional(get) => get(target).map(|value| value as &dyn Any),
        })
    }

    fn is_settable(&self) -> bool {
        self.set.is_some()
    }

    fn set(&self, target: &mut dyn Any, value: AnyBox) -> Result<(), MarshalError> {
        let Some(set) = self.set else {
            return Ok(());
        };
        let target = target
            .downcast_mut::<T>()
            .ok_or_else(MarshalError::type_mismatch::<T>)?;
        let value = value
            .downcast::<F>()
            .map_err(|_| MarshalError::type_mismatch::<F>())?;
        set(target, *value);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Builder

pub struct ObjectLayoutBuilder<T> {
    layout: ObjectLayout,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Describe> ObjectLayoutBuilder<T> {
    pub fn constructor<C>(mut self, parameters: &[Parameter], construct: C) -> Self
    where
        C: Fn(&mut Arguments) -> Result<T, MarshalError> + Send + Sync + 'static,
    {
        let factory: Factory = Box::new(move |arguments: &mut Arguments| {
            construct(arguments).map(|value| Box::new(value) as AnyBox)
        });
        self.layout.constructors.push(Constructor {
            parameters: parameters.to_vec(),
            factory,
        });
        self
    }

    /// Read-only property that is always present.
    pub fn property<F: Describe>(self, name: &'static str, get: fn(&T) -> &F) -> Self {
        self.push::<F>(name, Getter::Required(get), None)
    }

    /// Read-only property that may be null.
    pub fn optional<F: Describe>(self, name: &'static str, get: fn(&T) -> Option<&F>) -> Self {
        self.push::<F>(name, Getter::Optional(get), None)
    }

    pub fn settable<F: Describe>(
        self,
        name: &'static str,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Self {
        self.push::<F>(name, Getter::Required(get), Some(set))
    }

    pub fn settable_optional<F: Describe>(
        self,
        name: &'static str,
        get: fn(&T) -> Option<&F>,
        set: fn(&mut T, F),
    ) -> Self {
        self.push::<F>(name, Getter::Optional(get), Some(set))
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::complex(self.layout)
    }

    fn push<F: Describe>(
        mut self,
        name: &'static str,
        get: Getter<T, F>,
        set: Option<fn(&mut T, F)>,
    ) -> Self {
        self.layout.properties.push(Property::new(
            name,
            TypeRef::of::<F>(),
            Box::new(FieldAccess { get, set }),
        ));
        self
    }
}

impl<T> fmt::Debug for ObjectLayoutBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectLayoutBuilder")
            .field("type", &type_name::<T>())
            .field("layout", &self.layout)
            .finish()
    }
}
