//! Type system for markup materialization: dynamic values, objects with
//! property bags and collection storage, and a name-keyed registry of type
//! descriptors and value converters standing in for runtime reflection.

pub mod descriptor;
pub mod object;
pub mod registry;
pub mod value;

use std::fmt;

use thiserror::Error;

pub use descriptor::{PropertyDescriptor, TypeDescriptor, TypeKind, TypeRole};
pub use object::{Object, ObjectId, Storage};
pub use registry::{TypeRegistry, TypeSystem, ValueConverter};
pub use value::{Binding, DependencyProperty, TypeName, Value};

/// Error type produced by registry and object operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// No type is registered under the name.
    #[error("unknown type: {0}")]
    UnknownType(String),
    /// The type cannot be default-constructed.
    #[error("type is abstract: {0}")]
    Abstract(String),
    /// A type with the same name is already registered.
    #[error("duplicate type registration: {0}")]
    Duplicate(String),
    /// Item appended to an object without list storage.
    #[error("{0} is not a list")]
    NotAList(String),
    /// Entry added to an object without dictionary storage.
    #[error("{0} is not a dictionary")]
    NotADictionary(String),
}

/// Error type produced by text-to-value conversion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("unknown conversion target: {0}")]
    UnknownType(String),
    /// The target type has neither a converter nor a primitive parser.
    #[error("no converter for {0}")]
    NoConverter(String),
    #[error("cannot convert {text:?} to {target}: {reason}")]
    Invalid {
        text: String,
        target: String,
        reason: String,
    },
    /// A materialized value is not assignable to the declared type.
    #[error("{found} is not assignable to {target}")]
    Incompatible { found: String, target: String },
}

impl ConvertError {
    pub fn invalid(text: &str, target: &str, reason: impl fmt::Display) -> Self {
        ConvertError::Invalid {
            text: text.to_string(),
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Names of the built-in types every registry knows.
pub mod primitives {
    use crate::descriptor::TypeDescriptor;
    use crate::value::Value;

    /// Root of every hierarchy; also the "accept anything" declared type.
    pub const OBJECT: &str = "System.Object";
    pub const STRING: &str = "System.String";
    pub const INT32: &str = "System.Int32";
    pub const DOUBLE: &str = "System.Double";
    pub const BOOLEAN: &str = "System.Boolean";
    /// Type references (`{x:Type …}`, style target types).
    pub const TYPE: &str = "System.Type";
    pub const DEPENDENCY_PROPERTY: &str = "System.Windows.DependencyProperty";
    pub const BINDING: &str = "System.Windows.Data.Binding";

    pub(crate) fn descriptors() -> Vec<TypeDescriptor> {
        vec![
            TypeDescriptor::class(OBJECT),
            TypeDescriptor::primitive(STRING, Value::String(String::new())).base(OBJECT),
            TypeDescriptor::primitive(INT32, Value::Int(0)).base(OBJECT),
            TypeDescriptor::primitive(DOUBLE, Value::Float(0.0)).base(OBJECT),
            TypeDescriptor::primitive(BOOLEAN, Value::Bool(false)).base(OBJECT),
            TypeDescriptor::primitive(TYPE, Value::Null).base(OBJECT),
            TypeDescriptor::primitive(DEPENDENCY_PROPERTY, Value::Null).base(OBJECT),
            TypeDescriptor::primitive(BINDING, Value::Null).base(OBJECT),
        ]
    }
}
