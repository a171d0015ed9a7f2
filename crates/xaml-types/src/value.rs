use std::borrow::Borrow;
use std::fmt;

use crate::object::Object;
use crate::primitives;

/// Fully-qualified type name such as `System.Windows.Controls.Button`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        TypeName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part after the last `.`; the whole name when it has no namespace.
    pub fn short_name(&self) -> &str {
        self.0.rsplit_once('.').map_or(self.0.as_str(), |(_, short)| short)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(ns, _)| ns)
    }

    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        TypeName(value.to_string())
    }
}

impl From<String> for TypeName {
    fn from(value: String) -> Self {
        TypeName(value)
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Descriptor of a dependency property, the value of a `<Name>Property`
/// static field. Setters and triggers carry one to name their target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DependencyProperty {
    pub owner: TypeName,
    pub name: String,
    pub value_type: TypeName,
}

impl fmt::Display for DependencyProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner.short_name(), self.name)
    }
}

/// Unevaluated `{Binding …}` expression. Bindings are recorded, never resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Binding {
    pub path: Option<String>,
    pub parameters: Vec<(String, String)>,
}

impl Binding {
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Dynamic value produced while materializing a document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "kind", content = "value", rename_all = "snake_case")
)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// A type reference, e.g. from `{x:Type Button}`.
    Type(TypeName),
    Property(DependencyProperty),
    Enum {
        type_name: TypeName,
        name: String,
    },
    Binding(Binding),
    Object(Box<Object>),
}

impl Value {
    /// Runtime type of the value; `None` for null.
    pub fn type_name(&self) -> Option<TypeName> {
        let name = match self {
            Value::Null => return None,
            Value::Bool(_) => primitives::BOOLEAN,
            Value::Int(_) => primitives::INT32,
            Value::Float(_) => primitives::DOUBLE,
            Value::String(_) => primitives::STRING,
            Value::Type(_) => primitives::TYPE,
            Value::Property(_) => primitives::DEPENDENCY_PROPERTY,
            Value::Binding(_) => primitives::BINDING,
            Value::Enum { type_name, .. } => return Some(type_name.clone()),
            Value::Object(object) => return Some(object.type_name().clone()),
        };
        Some(TypeName::from(name))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeName> {
        match self {
            Value::Type(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<Object> {
        match self {
            Value::Object(object) => Some(*object),
            _ => None,
        }
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(Box::new(object))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value:?}"),
            Value::Type(name) => write!(f, "{{Type {name}}}"),
            Value::Property(property) => write!(f, "{property}"),
            Value::Enum { name, .. } => f.write_str(name),
            Value::Binding(binding) => match &binding.path {
                Some(path) => write!(f, "{{Binding {path}}}"),
                None => f.write_str("{Binding}"),
            },
            Value::Object(object) => write!(f, "{}#{}", object.type_name().short_name(), object.id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Storage;

    #[test]
    fn type_name_parts() {
        let name = TypeName::new("System.Windows.Controls.Button");
        assert_eq!(name.short_name(), "Button");
        assert_eq!(name.namespace(), Some("System.Windows.Controls"));
        let bare = TypeName::new("Root");
        assert_eq!(bare.short_name(), "Root");
        assert_eq!(bare.namespace(), None);
    }

    #[test]
    fn runtime_types() {
        assert_eq!(Value::Null.type_name(), None);
        assert_eq!(Value::Int(3).type_name(), Some(TypeName::from(primitives::INT32)));
        let object = Object::new(TypeName::from("Demo.Widget"), Storage::Plain);
        assert_eq!(Value::from(object).type_name(), Some(TypeName::from("Demo.Widget")));
        let value = Value::Enum {
            type_name: TypeName::from("Demo.Mode"),
            name: "Fast".into(),
        };
        assert_eq!(value.type_name(), Some(TypeName::from("Demo.Mode")));
        assert_eq!(value.to_string(), "Fast");
    }
}
