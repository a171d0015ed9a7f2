//! Element and attribute names → constructible types and settable properties.

use tracing::trace;
use xaml_dom::MarkupNode;
use xaml_types::primitives::OBJECT;
use xaml_types::{PropertyDescriptor, TypeDescriptor, TypeName, TypeSystem, Value};

use crate::namespaces::NamespaceTable;
use crate::ReadError;

#[derive(Clone, Copy)]
pub struct Locator<'a> {
    types: &'a dyn TypeSystem,
    namespaces: &'a NamespaceTable,
}

impl<'a> Locator<'a> {
    pub fn new(types: &'a dyn TypeSystem, namespaces: &'a NamespaceTable) -> Self {
        Locator { types, namespaces }
    }

    pub fn types(&self) -> &'a dyn TypeSystem {
        self.types
    }

    pub fn namespaces(&self) -> &'a NamespaceTable {
        self.namespaces
    }

    /// Resolve a possibly prefixed type name to its registered descriptor.
    pub fn resolve_type(&self, raw: &str) -> Result<&'a TypeDescriptor, ReadError> {
        let qualified = self.namespaces.resolve_qualified_name(raw, self.types)?;
        self.types
            .lookup(&qualified)
            .ok_or(ReadError::TypeResolution(qualified))
    }

    /// Default instance of the type named by the element itself.
    pub fn construct_root(&self, node: MarkupNode<'_>) -> Result<Value, ReadError> {
        let desc = self.resolve_type(&node.name().to_string())?;
        trace!(element = %node.name(), type_name = %desc.name(), "construct");
        Ok(self.types.construct_default(desc.name().as_str())?)
    }

    /// Default instance for a child element of `parent`.
    ///
    /// Children of generic objects, collections and content-property owners
    /// name their own type; otherwise the element names a property of the
    /// parent and the property's declared type is constructed.
    pub fn construct_for_property(
        &self,
        node: MarkupNode<'_>,
        parent: &Value,
    ) -> Result<Value, ReadError> {
        let Some(parent_type) = parent.type_name() else {
            return self.construct_root(node);
        };
        if self.names_own_type(&parent_type) {
            return self.construct_root(node);
        }
        let property = self
            .lookup_property(parent_type.as_str(), node.local_name())
            .ok_or_else(|| ReadError::PropertyNotFound {
                type_name: parent_type.to_string(),
                property: node.local_name().to_string(),
            })?;
        trace!(
            element = %node.name(),
            property = property.name(),
            type_name = %property.value_type(),
            "construct for property"
        );
        Ok(self.types.construct_default(property.value_type().as_str())?)
    }

    fn names_own_type(&self, parent_type: &TypeName) -> bool {
        parent_type.is(OBJECT)
            || self
                .types
                .lookup(parent_type.as_str())
                .is_some_and(TypeDescriptor::is_collection)
            || self.types.content_property(parent_type.as_str()).is_some()
    }

    /// Case-sensitive property lookup through the base-type chain. `None`
    /// tells the caller to skip the name.
    pub fn lookup_property(&self, type_name: &str, name: &str) -> Option<&'a PropertyDescriptor> {
        self.types.property(type_name, name)
    }

    /// Resolve a property-name-only reference in a setter or trigger to the
    /// `<Name>Property` dependency-property field.
    ///
    /// `Owner.Name` is resolved against `Owner`. A bare name resolves against
    /// the style target type and yields null when there is none.
    pub fn lookup_style_target_property(
        &self,
        raw: &str,
        target: Option<&TypeName>,
    ) -> Result<Value, ReadError> {
        let raw = raw.trim();
        if let Some((owner, name)) = raw.rsplit_once('.') {
            let owner = self.resolve_type(owner)?;
            return self.dependency_property(owner.name(), name);
        }
        match target {
            Some(target) => self.dependency_property(target, raw),
            None => {
                trace!(property = raw, "no style target type, property reference left empty");
                Ok(Value::Null)
            }
        }
    }

    fn dependency_property(&self, owner: &TypeName, name: &str) -> Result<Value, ReadError> {
        self.types
            .static_field(owner.as_str(), &format!("{name}Property"))
            .map(|property| Value::Property(property.clone()))
            .ok_or_else(|| ReadError::PropertyResolution {
                type_name: owner.to_string(),
                property: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::SCHEMA_PRESENTATION;
    use xaml_dom::MarkupDocument;
    use xaml_presentation as wpf;
    use xaml_types::TypeError;

    fn with_locator(xml: &str, check: impl FnOnce(&Locator<'_>, &MarkupDocument)) {
        let registry = wpf::registry().expect("vocabulary");
        let doc = MarkupDocument::parse(xml).expect("parse");
        let namespaces = NamespaceTable::from_root(doc.root());
        let locator = Locator::new(&registry, &namespaces);
        check(&locator, &doc);
    }

    #[test]
    fn root_construction() {
        let xml = format!(r#"<Button xmlns="{SCHEMA_PRESENTATION}"/>"#);
        with_locator(&xml, |locator, doc| {
            let button = locator.construct_root(doc.root()).expect("button");
            assert_eq!(button.type_name().map(|t| t.to_string()).as_deref(), Some(wpf::BUTTON));
        });
        with_locator("<Button/>", |locator, doc| {
            let err = locator.construct_root(doc.root()).unwrap_err();
            assert!(matches!(err, ReadError::TypeResolution(ref name) if name == "Button"));
        });
        let xml = format!(r#"<Brush xmlns="{SCHEMA_PRESENTATION}"/>"#);
        with_locator(&xml, |locator, doc| {
            let err = locator.construct_root(doc.root()).unwrap_err();
            assert!(matches!(err, ReadError::Type(TypeError::Abstract(_))));
        });
    }

    #[test]
    fn property_construction() {
        let xml = format!(r#"<Setter xmlns="{SCHEMA_PRESENTATION}"><Margin/><Button/></Setter>"#);
        with_locator(&xml, |locator, doc| {
            let setter = locator.construct_root(doc.root()).expect("setter");
            let mut children = doc.root().children();
            let margin = children.next().expect("margin node");
            let err = locator.construct_for_property(margin, &setter).unwrap_err();
            assert!(matches!(err, ReadError::PropertyNotFound { .. }));

            let border = locator
                .types()
                .construct_default(wpf::BORDER)
                .expect("border");
            let button = children.next().expect("button node");
            let child = locator
                .construct_for_property(button, &border)
                .expect("content owners name their child type");
            assert!(child.type_name().is_some_and(|t| t.is(wpf::BUTTON)));
        });
    }

    #[test]
    fn style_target_properties() {
        let xml = format!(r#"<Style xmlns="{SCHEMA_PRESENTATION}"/>"#);
        with_locator(&xml, |locator, _| {
            let button = TypeName::from(wpf::BUTTON);
            let background = locator
                .lookup_style_target_property("Background", Some(&button))
                .expect("inherited field");
            assert!(matches!(background, Value::Property(ref dp) if dp.name == "Background"));

            let err = locator
                .lookup_style_target_property("Nope", Some(&button))
                .unwrap_err();
            assert!(matches!(err, ReadError::PropertyResolution { .. }));

            assert_eq!(
                locator.lookup_style_target_property("Background", None).expect("no target"),
                Value::Null
            );
            let qualified = locator
                .lookup_style_target_property("Button.Background", None)
                .expect("owner-qualified");
            assert!(matches!(qualified, Value::Property(ref dp) if dp.owner.is(wpf::CONTROL)));
        });
    }
}
