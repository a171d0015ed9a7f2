use crate::value::{DependencyProperty, TypeName, Value};

/// Shape of a registered type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Built-in scalar constructed with a default value.
    Primitive { default: Value },
    /// Enumeration with its member names in declaration order.
    Enum { members: Vec<String> },
    /// Ordinary object with a property bag.
    Class,
    /// List-like collection accepting appended items.
    List { item_type: TypeName },
    /// Keyed resource dictionary.
    Dictionary,
}

/// Special meaning the materializer attaches to a type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeRole {
    #[default]
    Plain,
    /// Style-like: `target_property` names the property holding the target type.
    Style { target_property: String },
    /// Setter- or trigger-like: a dependency property reference and the value
    /// to apply to it.
    ValueCarrier { property: String, value: String },
}

/// Settable slot on a type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    owner: TypeName,
    name: String,
    value_type: TypeName,
    default: Value,
}

impl PropertyDescriptor {
    pub fn owner(&self) -> &TypeName {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> &TypeName {
        &self.value_type
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }
}

/// Registered type metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    name: TypeName,
    base: Option<TypeName>,
    kind: TypeKind,
    is_abstract: bool,
    properties: Vec<PropertyDescriptor>,
    fields: Vec<(String, DependencyProperty)>,
    content_property: Option<String>,
    role: TypeRole,
}

impl TypeDescriptor {
    fn with_kind(name: impl Into<TypeName>, kind: TypeKind) -> Self {
        TypeDescriptor {
            name: name.into(),
            base: None,
            kind,
            is_abstract: false,
            properties: Vec::new(),
            fields: Vec::new(),
            content_property: None,
            role: TypeRole::Plain,
        }
    }

    pub fn class(name: impl Into<TypeName>) -> Self {
        Self::with_kind(name, TypeKind::Class)
    }

    pub fn primitive(name: impl Into<TypeName>, default: Value) -> Self {
        Self::with_kind(name, TypeKind::Primitive { default })
    }

    pub fn enumeration<I, S>(name: impl Into<TypeName>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = members.into_iter().map(Into::into).collect();
        Self::with_kind(name, TypeKind::Enum { members })
    }

    pub fn list(name: impl Into<TypeName>, item_type: impl Into<TypeName>) -> Self {
        Self::with_kind(
            name,
            TypeKind::List {
                item_type: item_type.into(),
            },
        )
    }

    pub fn dictionary(name: impl Into<TypeName>) -> Self {
        Self::with_kind(name, TypeKind::Dictionary)
    }

    pub fn base(mut self, base: impl Into<TypeName>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Plain CLR-style property without a dependency-property field.
    pub fn property(self, name: &str, value_type: impl Into<TypeName>) -> Self {
        self.property_with_default(name, value_type, Value::Null)
    }

    pub fn property_with_default(
        mut self,
        name: &str,
        value_type: impl Into<TypeName>,
        default: Value,
    ) -> Self {
        self.properties.push(PropertyDescriptor {
            owner: self.name.clone(),
            name: name.to_string(),
            value_type: value_type.into(),
            default,
        });
        self
    }

    /// Property backed by a static `<Name>Property` field, addressable from
    /// style setters and triggers.
    pub fn dependency_property(self, name: &str, value_type: impl Into<TypeName>) -> Self {
        self.dependency_property_with_default(name, value_type, Value::Null)
    }

    pub fn dependency_property_with_default(
        self,
        name: &str,
        value_type: impl Into<TypeName>,
        default: Value,
    ) -> Self {
        let value_type = value_type.into();
        let mut this = self.property_with_default(name, value_type.clone(), default);
        this.fields.push((
            format!("{name}Property"),
            DependencyProperty {
                owner: this.name.clone(),
                name: name.to_string(),
                value_type,
            },
        ));
        this
    }

    pub fn content_property(mut self, name: &str) -> Self {
        self.content_property = Some(name.to_string());
        self
    }

    pub fn role(mut self, role: TypeRole) -> Self {
        self.role = role;
        self
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn base_type(&self) -> Option<&TypeName> {
        self.base.as_ref()
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, TypeKind::List { .. } | TypeKind::Dictionary)
    }

    /// Properties declared on this type only (no inherited ones).
    pub fn own_properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn own_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn own_field(&self, name: &str) -> Option<&DependencyProperty> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, property)| property)
    }

    pub fn own_content_property(&self) -> Option<&str> {
        self.content_property.as_deref()
    }

    pub fn own_role(&self) -> &TypeRole {
        &self.role
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    #[test]
    fn dependency_properties_register_fields() {
        let desc = TypeDescriptor::class("Demo.Widget")
            .dependency_property("Background", "Demo.Brush")
            .property("Tag", primitives::OBJECT);
        let field = desc.own_field("BackgroundProperty").expect("field");
        assert_eq!(field.name, "Background");
        assert_eq!(field.owner.as_str(), "Demo.Widget");
        assert!(desc.own_field("TagProperty").is_none());
        assert_eq!(desc.own_properties().len(), 2);
        assert_eq!(
            desc.own_property("Background").map(|p| p.value_type().as_str()),
            Some("Demo.Brush")
        );
    }
}
