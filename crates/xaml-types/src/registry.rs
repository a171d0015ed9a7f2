use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::descriptor::{PropertyDescriptor, TypeDescriptor, TypeKind, TypeRole};
use crate::object::{Object, Storage};
use crate::primitives;
use crate::value::{DependencyProperty, TypeName, Value};
use crate::{ConvertError, TypeError};

/// Guard against cyclic base-type declarations.
const MAX_HIERARCHY_DEPTH: usize = 64;

/// Text-to-value conversion for one target type.
pub trait ValueConverter: Send + Sync {
    fn convert_from(&self, text: &str) -> Result<Value, ConvertError>;
}

impl<F> ValueConverter for F
where
    F: Fn(&str) -> Result<Value, ConvertError> + Send + Sync,
{
    fn convert_from(&self, text: &str) -> Result<Value, ConvertError> {
        self(text)
    }
}

/// Type system capability consumed by the markup reader.
///
/// Implementors provide descriptor lookup and converters; hierarchy-aware
/// queries are derived from those.
pub trait TypeSystem {
    /// Descriptor registered under a fully-qualified name.
    fn lookup(&self, name: &str) -> Option<&TypeDescriptor>;

    /// All visible types, in registration order.
    fn types(&self) -> Box<dyn Iterator<Item = &TypeDescriptor> + '_>;

    /// Converter declared for exactly this type.
    fn own_converter(&self, name: &str) -> Option<&dyn ValueConverter>;

    /// First descriptor in the base-type chain of `name` (itself included)
    /// that satisfies `pred`.
    fn find_ancestor(
        &self,
        name: &str,
        pred: &dyn Fn(&TypeDescriptor) -> bool,
    ) -> Option<&TypeDescriptor> {
        let mut current = self.lookup(name);
        let mut depth = 0;
        while let Some(desc) = current {
            if pred(desc) {
                return Some(desc);
            }
            depth += 1;
            if depth > MAX_HIERARCHY_DEPTH {
                break;
            }
            current = desc.base_type().and_then(|base| self.lookup(base.as_str()));
        }
        None
    }

    /// Public settable property, inherited ones included.
    fn property(&self, type_name: &str, name: &str) -> Option<&PropertyDescriptor> {
        self.find_ancestor(type_name, &|desc| desc.own_property(name).is_some())
            .and_then(|desc| desc.own_property(name))
    }

    /// Static dependency-property field, inherited ones included.
    fn static_field(&self, type_name: &str, field: &str) -> Option<&DependencyProperty> {
        self.find_ancestor(type_name, &|desc| desc.own_field(field).is_some())
            .and_then(|desc| desc.own_field(field))
    }

    /// Content property designation, inherited ones included.
    fn content_property(&self, type_name: &str) -> Option<&PropertyDescriptor> {
        let owner = self.find_ancestor(type_name, &|desc| desc.own_content_property().is_some())?;
        let name = owner.own_content_property()?;
        self.property(type_name, name)
    }

    /// Role of the type or of its nearest ancestor declaring one.
    fn role(&self, type_name: &str) -> Option<&TypeRole> {
        self.find_ancestor(type_name, &|desc| *desc.own_role() != TypeRole::Plain)
            .map(TypeDescriptor::own_role)
    }

    /// Converter of the type or of its nearest ancestor declaring one.
    fn converter(&self, type_name: &str) -> Option<&dyn ValueConverter> {
        let owner = self.find_ancestor(type_name, &|desc| {
            self.own_converter(desc.name().as_str()).is_some()
        })?;
        self.own_converter(owner.name().as_str())
    }

    fn is_subtype(&self, type_name: &str, ancestor: &str) -> bool {
        self.find_ancestor(type_name, &|desc| desc.name().is(ancestor))
            .is_some()
    }

    /// Whether `value` may be stored in a slot declared as `declared`.
    ///
    /// Null and unevaluated bindings are accepted everywhere.
    fn is_assignable(&self, declared: &str, value: &Value) -> bool {
        if declared == primitives::OBJECT {
            return true;
        }
        match value {
            Value::Null | Value::Binding(_) => true,
            other => other
                .type_name()
                .is_some_and(|runtime| self.is_subtype(runtime.as_str(), declared)),
        }
    }

    /// Default instance of a registered type.
    fn construct_default(&self, name: &str) -> Result<Value, TypeError> {
        let desc = self
            .lookup(name)
            .ok_or_else(|| TypeError::UnknownType(name.to_string()))?;
        if desc.is_abstract() {
            return Err(TypeError::Abstract(name.to_string()));
        }
        let type_name = desc.name().clone();
        let value = match desc.kind() {
            TypeKind::Primitive { default } => default.clone(),
            TypeKind::Enum { members } => match members.first() {
                Some(first) => Value::Enum {
                    type_name,
                    name: first.clone(),
                },
                None => Value::Null,
            },
            TypeKind::Class => Object::new(type_name, Storage::Plain).into(),
            TypeKind::List { .. } => Object::new(type_name, Storage::List(Vec::new())).into(),
            TypeKind::Dictionary => Object::new(type_name, Storage::Dictionary(Vec::new())).into(),
        };
        Ok(value)
    }

    /// Convert text through the type's converter, falling back to
    /// locale-invariant primitive and enum parsing.
    fn convert_text(&self, text: &str, target: &str) -> Result<Value, ConvertError> {
        if let Some(converter) = self.converter(target) {
            return converter.convert_from(text);
        }
        let desc = self
            .lookup(target)
            .ok_or_else(|| ConvertError::UnknownType(target.to_string()))?;
        match desc.kind() {
            TypeKind::Primitive { .. } => parse_primitive(text, target),
            TypeKind::Enum { members } => {
                let trimmed = text.trim();
                members
                    .iter()
                    .find(|member| member.eq_ignore_ascii_case(trimmed))
                    .map(|member| Value::Enum {
                        type_name: desc.name().clone(),
                        name: member.clone(),
                    })
                    .ok_or_else(|| ConvertError::invalid(text, target, "not a member of the enumeration"))
            }
            _ => Err(ConvertError::NoConverter(target.to_string())),
        }
    }
}

fn parse_primitive(text: &str, target: &str) -> Result<Value, ConvertError> {
    match target {
        primitives::STRING => Ok(Value::String(text.to_string())),
        primitives::INT32 => text
            .trim()
            .parse::<i32>()
            .map(|value| Value::Int(i64::from(value)))
            .map_err(|err| ConvertError::invalid(text, target, err)),
        primitives::DOUBLE => parse_double(text).map(Value::Float).ok_or_else(|| {
            ConvertError::invalid(text, target, "not a floating point number")
        }),
        primitives::BOOLEAN => {
            let trimmed = text.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(ConvertError::invalid(text, target, "expected True or False"))
            }
        }
        _ => Err(ConvertError::NoConverter(target.to_string())),
    }
}

/// Invariant-culture double: `.` decimal separator, `Auto` and `NaN` map to NaN.
fn parse_double(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("auto") || trimmed.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    match trimmed {
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => trimmed.parse::<f64>().ok().filter(|value| value.is_finite()),
    }
}

/// Name → descriptor registry built at startup.
///
/// A fresh registry already knows the primitive types every document relies
/// on (`System.Object`, `System.String`, …).
pub struct TypeRegistry {
    types: Vec<TypeDescriptor>,
    index: HashMap<TypeName, usize>,
    converters: HashMap<TypeName, Arc<dyn ValueConverter>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            types: Vec::new(),
            index: HashMap::new(),
            converters: HashMap::new(),
        };
        for desc in primitives::descriptors() {
            registry.insert(desc);
        }
        registry
    }

    /// Register a type. Names must be unique.
    pub fn register(&mut self, desc: TypeDescriptor) -> Result<(), TypeError> {
        if self.index.contains_key(desc.name()) {
            return Err(TypeError::Duplicate(desc.name().to_string()));
        }
        debug!(type_name = %desc.name(), "register type");
        self.insert(desc);
        Ok(())
    }

    /// Register several types, stopping at the first duplicate.
    pub fn register_all(
        &mut self,
        descs: impl IntoIterator<Item = TypeDescriptor>,
    ) -> Result<(), TypeError> {
        for desc in descs {
            self.register(desc)?;
        }
        Ok(())
    }

    /// Attach a converter to a type; it also serves derived types.
    pub fn register_converter(
        &mut self,
        type_name: impl Into<TypeName>,
        converter: impl ValueConverter + 'static,
    ) {
        self.converters.insert(type_name.into(), Arc::new(converter));
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn insert(&mut self, desc: TypeDescriptor) {
        self.index.insert(desc.name().clone(), self.types.len());
        self.types.push(desc);
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.len())
            .field("converters", &self.converters.len())
            .finish()
    }
}

impl TypeSystem for TypeRegistry {
    fn lookup(&self, name: &str) -> Option<&TypeDescriptor> {
        self.index.get(name).map(|&idx| &self.types[idx])
    }

    fn types(&self) -> Box<dyn Iterator<Item = &TypeDescriptor> + '_> {
        Box::new(self.types.iter())
    }

    fn own_converter(&self, name: &str) -> Option<&dyn ValueConverter> {
        self.converters.get(name).map(|converter| converter.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register_all([
                TypeDescriptor::class("Demo.Element")
                    .dependency_property("Width", primitives::DOUBLE)
                    .property("Tag", primitives::OBJECT),
                TypeDescriptor::class("Demo.Brush").abstract_type(),
                TypeDescriptor::class("Demo.SolidBrush")
                    .base("Demo.Brush")
                    .property("Color", primitives::STRING),
                TypeDescriptor::class("Demo.Panel")
                    .base("Demo.Element")
                    .dependency_property("Background", "Demo.Brush")
                    .property("Children", "Demo.ElementList")
                    .content_property("Children"),
                TypeDescriptor::class("Demo.Stack").base("Demo.Panel"),
                TypeDescriptor::list("Demo.ElementList", "Demo.Element"),
                TypeDescriptor::enumeration("Demo.Mode", ["Fast", "Slow"]),
            ])
            .expect("register demo types");
        registry.register_converter("Demo.Brush", |text: &str| -> Result<Value, ConvertError> {
            let mut brush = Object::new(TypeName::from("Demo.SolidBrush"), Storage::Plain);
            brush.set("Color", Value::from(text));
            Ok(Value::from(brush))
        });
        registry
    }

    #[test]
    fn inherited_lookups() {
        let registry = registry();
        let width = registry.property("Demo.Stack", "Width").expect("inherited property");
        assert_eq!(width.owner().as_str(), "Demo.Element");
        assert!(registry.property("Demo.Stack", "width").is_none(), "lookup is case-sensitive");
        let field = registry
            .static_field("Demo.Stack", "BackgroundProperty")
            .expect("inherited field");
        assert_eq!(field.owner.as_str(), "Demo.Panel");
        let content = registry.content_property("Demo.Stack").expect("content property");
        assert_eq!(content.name(), "Children");
        assert!(registry.is_subtype("Demo.Stack", "Demo.Element"));
        assert!(!registry.is_subtype("Demo.Element", "Demo.Stack"));
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = registry();
        let err = registry
            .register(TypeDescriptor::class("Demo.Element"))
            .unwrap_err();
        assert!(matches!(err, TypeError::Duplicate(_)));
    }

    #[test]
    fn construct_defaults() {
        let registry = registry();
        let stack = registry.construct_default("Demo.Stack").expect("construct");
        assert_eq!(stack.type_name().map(|t| t.to_string()).as_deref(), Some("Demo.Stack"));
        let list = registry.construct_default("Demo.ElementList").expect("construct");
        assert!(list.as_object().is_some_and(Object::is_list));
        assert_eq!(
            registry.construct_default(primitives::INT32).expect("int"),
            Value::Int(0)
        );
        let mode = registry.construct_default("Demo.Mode").expect("enum");
        assert_eq!(mode.to_string(), "Fast");
        assert!(matches!(
            registry.construct_default("Demo.Brush"),
            Err(TypeError::Abstract(_))
        ));
        assert!(matches!(
            registry.construct_default("Demo.Missing"),
            Err(TypeError::UnknownType(_))
        ));
    }

    #[test]
    fn primitive_and_enum_conversion() {
        let registry = registry();
        assert_eq!(
            registry.convert_text(" 42 ", primitives::INT32).expect("int"),
            Value::Int(42)
        );
        assert_eq!(
            registry.convert_text("1.5", primitives::DOUBLE).expect("double"),
            Value::Float(1.5)
        );
        assert!(registry
            .convert_text("Auto", primitives::DOUBLE)
            .expect("auto")
            .as_float()
            .is_some_and(f64::is_nan));
        assert_eq!(
            registry.convert_text("TRUE", primitives::BOOLEAN).expect("bool"),
            Value::Bool(true)
        );
        assert_eq!(registry.convert_text("slow", "Demo.Mode").expect("enum").to_string(), "Slow");
        assert!(matches!(
            registry.convert_text("1,5", primitives::DOUBLE),
            Err(ConvertError::Invalid { .. })
        ));
        assert!(matches!(
            registry.convert_text("x", "Demo.Element"),
            Err(ConvertError::NoConverter(_))
        ));
    }

    #[test]
    fn converters_serve_derived_types() {
        let registry = registry();
        let brush = registry.convert_text("Red", "Demo.SolidBrush").expect("converted");
        assert!(registry.is_assignable("Demo.Brush", &brush));
        assert!(!registry.is_assignable("Demo.Element", &brush));
        assert!(registry.is_assignable(primitives::OBJECT, &brush));
        assert!(registry.is_assignable("Demo.Element", &Value::Null));
    }
}
