//! Depth-first walk of a markup tree producing the object graph.

use tracing::{debug, trace};
use xaml_dom::MarkupNode;
use xaml_types::primitives::{DEPENDENCY_PROPERTY, OBJECT};
use xaml_types::{
    Object, PropertyDescriptor, Storage, TypeKind, TypeName, TypeRole, TypeSystem, Value,
};

use crate::convert::Converter;
use crate::locator::Locator;
use crate::{MissingKeyPolicy, ReadError, ReaderOptions};

/// A materialized node together with the resource key read from its
/// `x:Key` attribute, which the parent dictionary registers it under.
#[derive(Debug)]
pub(crate) struct Element {
    pub value: Value,
    pub key: Option<Value>,
}

pub(crate) struct Materializer<'a> {
    locator: Locator<'a>,
    converter: Converter<'a>,
    options: &'a ReaderOptions,
}

impl<'a> Materializer<'a> {
    pub fn new(locator: Locator<'a>, options: &'a ReaderOptions) -> Self {
        Materializer {
            locator,
            converter: Converter::new(locator),
            options,
        }
    }

    fn types(&self) -> &'a dyn TypeSystem {
        self.locator.types()
    }

    pub fn read_document(&self, root: MarkupNode<'_>) -> Result<Value, ReadError> {
        Ok(self.read_element(root, None, None, None)?.value)
    }

    /// Materialize `node` and its subtree.
    ///
    /// `explicit_type` is set for property-elements (`<Owner.Property>`) and
    /// carries the declared type of the property. When that type is not a
    /// constructible collection, a generic placeholder stands in for the
    /// node and the first child value is returned in its place.
    fn read_element(
        &self,
        node: MarkupNode<'_>,
        explicit_type: Option<&TypeName>,
        style_target: Option<&TypeName>,
        parent: Option<&Value>,
    ) -> Result<Element, ReadError> {
        let (mut item, placeholder) = self.instantiate(node, explicit_type, parent)?;
        let item_type = item.type_name();
        let content = item_type
            .as_ref()
            .and_then(|name| self.types().content_property(name.as_str()));

        let key = self.apply_attributes(node, &mut item, item_type.as_ref(), style_target)?;
        let style_target = self.style_target(&mut item, style_target)?;

        if let Some(text) = node.text() {
            self.apply_text(node, &mut item, content, text)?;
        }

        for child in node.children() {
            if let Some(property) = self.property_element_name(node, child, item_type.as_ref()) {
                self.read_property_element(child, property, &mut item, style_target.as_ref())?;
                continue;
            }
            let Element {
                value: mut child_value,
                key: child_key,
            } = self.read_element(child, None, style_target.as_ref(), Some(&item))?;
            self.fix_carried_value(&mut child_value)?;
            if placeholder {
                trace!(element = %node.name(), "property element resolved to its child");
                return Ok(Element {
                    value: child_value,
                    key,
                });
            }
            self.add_child(node, &mut item, content, child, child_value, child_key)?;
        }

        if placeholder {
            trace!(element = %node.name(), "empty property element");
            item = Value::Null;
        }
        Ok(Element { value: item, key })
    }

    fn instantiate(
        &self,
        node: MarkupNode<'_>,
        explicit_type: Option<&TypeName>,
        parent: Option<&Value>,
    ) -> Result<(Value, bool), ReadError> {
        if let Some(explicit) = explicit_type {
            let constructible = self
                .types()
                .lookup(explicit.as_str())
                .is_some_and(|desc| desc.is_collection() && !desc.is_abstract());
            if constructible {
                return Ok((self.types().construct_default(explicit.as_str())?, false));
            }
            let placeholder = Object::new(TypeName::from(OBJECT), Storage::Plain);
            return Ok((placeholder.into(), true));
        }
        let value = match parent {
            Some(parent) if !is_dictionary(parent) => {
                self.locator.construct_for_property(node, parent)?
            }
            _ => self.locator.construct_root(node)?,
        };
        Ok((value, false))
    }

    /// Attribute pass in document order. Returns the `x:Key` value, if any.
    fn apply_attributes(
        &self,
        node: MarkupNode<'_>,
        item: &mut Value,
        item_type: Option<&TypeName>,
        style_target: Option<&TypeName>,
    ) -> Result<Option<Value>, ReadError> {
        let namespaces = self.locator.namespaces();
        let mut key = None;
        for attr in node.attributes() {
            if attr.is_namespace_declaration() {
                continue;
            }
            if namespaces.is_xaml_directive(&attr.name, "Key") {
                key = Some(self.converter.convert(&attr.value, OBJECT)?);
                continue;
            }
            let name = if namespaces.is_xaml_directive(&attr.name, "Name") {
                "Name"
            } else if attr.name.prefix().is_some() {
                trace!(element = %node.name(), attribute = %attr.name, "prefixed attribute skipped");
                continue;
            } else {
                attr.name.local()
            };
            let Some(item_type) = item_type else {
                continue;
            };
            let Some(property) = self.locator.lookup_property(item_type.as_str(), name) else {
                trace!(element = %node.name(), property = name, "unknown property skipped");
                continue;
            };
            let value = if property.value_type().is(DEPENDENCY_PROPERTY) {
                self.locator
                    .lookup_style_target_property(&attr.value, style_target)?
            } else {
                self.converter
                    .convert(&attr.value, property.value_type().as_str())?
            };
            assign(node, item, property, value);
        }
        Ok(key)
    }

    /// Style-like items switch the context for their subtree to their
    /// declared target type. A textual target type is resolved in place.
    fn style_target(
        &self,
        item: &mut Value,
        inherited: Option<&TypeName>,
    ) -> Result<Option<TypeName>, ReadError> {
        let inherited = inherited.cloned();
        let Some(type_name) = item.type_name() else {
            return Ok(inherited);
        };
        let Some(TypeRole::Style { target_property }) = self.types().role(type_name.as_str())
        else {
            return Ok(inherited);
        };
        let Some(style) = item.as_object_mut() else {
            return Ok(inherited);
        };
        let target = match style.get(target_property).cloned() {
            Some(Value::Type(target)) => target,
            Some(Value::String(raw)) => {
                let target = self.locator.resolve_type(&raw)?.name().clone();
                style.set(target_property.as_str(), Value::Type(target.clone()));
                target
            }
            _ => return Ok(inherited),
        };
        debug!(style = %type_name, target = %target, "style target type");
        Ok(Some(target))
    }

    /// Non-whitespace text content: converted for primitive items, appended
    /// to collections, assigned to a non-collection content property
    /// otherwise.
    fn apply_text(
        &self,
        node: MarkupNode<'_>,
        item: &mut Value,
        content: Option<&PropertyDescriptor>,
        text: &str,
    ) -> Result<(), ReadError> {
        if item.as_object().is_some_and(Object::is_list) {
            return self.append_text(node, item, text);
        }
        if item.as_object().is_some() {
            match content {
                Some(content) if !self.is_list_type(content.value_type()) => {
                    let value = self.converter.convert(text, content.value_type().as_str())?;
                    assign(node, item, content, value);
                }
                _ => trace!(element = %node.name(), "text content ignored"),
            }
            return Ok(());
        }
        match item.type_name() {
            Some(type_name) => *item = self.converter.convert(text, type_name.as_str())?,
            None => trace!(element = %node.name(), "text content ignored"),
        }
        Ok(())
    }

    /// Text directly inside a collection becomes an item when the
    /// collection accepts strings.
    fn append_text(
        &self,
        node: MarkupNode<'_>,
        item: &mut Value,
        text: &str,
    ) -> Result<(), ReadError> {
        let Some(list) = item.as_object_mut() else {
            return Ok(());
        };
        let text = Value::from(text);
        let kind = self
            .types()
            .lookup(list.type_name().as_str())
            .map(|desc| desc.kind());
        let accepts_text = match kind {
            Some(TypeKind::List { item_type }) => {
                self.types().is_assignable(item_type.as_str(), &text)
            }
            _ => false,
        };
        if accepts_text {
            list.push(text)?;
        } else {
            trace!(element = %node.name(), "text content ignored");
        }
        Ok(())
    }

    /// Property part of `<Owner.Property>` when `Owner` is the enclosing
    /// element's name or a type the item derives from.
    fn property_element_name<'n>(
        &self,
        node: MarkupNode<'_>,
        child: MarkupNode<'n>,
        item_type: Option<&TypeName>,
    ) -> Option<&'n str> {
        let (owner, property) = child.local_name().split_once('.')?;
        if owner == node.local_name() {
            return Some(property);
        }
        let item_type = item_type?;
        let raw_owner = match child.prefix() {
            Some(prefix) => format!("{prefix}:{owner}"),
            None => owner.to_string(),
        };
        let owner = self
            .locator
            .namespaces()
            .resolve_qualified_name(&raw_owner, self.types())
            .ok()?;
        self.types()
            .is_subtype(item_type.as_str(), &owner)
            .then_some(property)
    }

    fn read_property_element(
        &self,
        child: MarkupNode<'_>,
        name: &str,
        item: &mut Value,
        style_target: Option<&TypeName>,
    ) -> Result<(), ReadError> {
        let Some(item_type) = item.type_name() else {
            return Ok(());
        };
        let Some(property) = self.locator.lookup_property(item_type.as_str(), name) else {
            trace!(element = %child.name(), property = name, "unknown property element skipped");
            return Ok(());
        };
        let declared = property.value_type();
        let value = match child.text() {
            Some(text) if !child.has_children() && !self.is_collection_type(declared) => {
                if declared.is(DEPENDENCY_PROPERTY) {
                    self.locator.lookup_style_target_property(text, style_target)?
                } else {
                    self.converter.convert(text, declared.as_str())?
                }
            }
            _ => {
                self.read_element(child, Some(declared), style_target, Some(&*item))?
                    .value
            }
        };
        let value = if value.is_null() {
            value
        } else {
            self.converter.convert_value(value, declared.as_str())?
        };
        assign(child, item, property, value);
        Ok(())
    }

    /// Merge a materialized child into its parent item.
    fn add_child(
        &self,
        node: MarkupNode<'_>,
        item: &mut Value,
        content: Option<&PropertyDescriptor>,
        child: MarkupNode<'_>,
        value: Value,
        key: Option<Value>,
    ) -> Result<(), ReadError> {
        let Some(object) = item.as_object_mut() else {
            trace!(element = %node.name(), child = %child.name(), "child of a value ignored");
            return Ok(());
        };
        if object.is_dictionary() {
            return self.add_resource(object, child, value, key);
        }
        if object.is_list() {
            object.push(value)?;
            return Ok(());
        }
        match content {
            Some(content) => self.add_content(object, content, value),
            None => {
                trace!(element = %node.name(), child = %child.name(), "no content property, child ignored");
                Ok(())
            }
        }
    }

    fn add_resource(
        &self,
        dictionary: &mut Object,
        child: MarkupNode<'_>,
        value: Value,
        key: Option<Value>,
    ) -> Result<(), ReadError> {
        let key = key
            .filter(|key| !key.is_null())
            .or_else(|| self.implicit_key(&value));
        if let Some(key) = key {
            trace!(key = %key, "resource registered");
            if dictionary.add_entry(key.clone(), value)?.is_some() {
                debug!(key = %key, "duplicate resource key, last definition wins");
            }
            return Ok(());
        }
        if value.as_object().is_some_and(Object::is_dictionary) {
            if let Some(nested) = value.into_object() {
                for (key, value) in nested.into_entries() {
                    dictionary.add_entry(key, value)?;
                }
            }
            return Ok(());
        }
        match self.options.missing_key {
            MissingKeyPolicy::Error => Err(ReadError::MissingKey(child.name().to_string())),
            MissingKeyPolicy::Skip => {
                trace!(element = %child.name(), "resource without key skipped");
                Ok(())
            }
        }
    }

    /// Keyless styles are registered under their target type.
    fn implicit_key(&self, value: &Value) -> Option<Value> {
        let object = value.as_object()?;
        match self.types().role(object.type_name().as_str())? {
            TypeRole::Style { target_property } => match object.get(target_property) {
                Some(target @ Value::Type(_)) => Some(target.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Append to the content collection, creating it on first use, or
    /// assign directly when the content property holds a single value.
    fn add_content(
        &self,
        object: &mut Object,
        content: &PropertyDescriptor,
        value: Value,
    ) -> Result<(), ReadError> {
        let declared = content.value_type();
        if !self.is_list_type(declared) {
            let value = if value.is_null() {
                value
            } else {
                self.converter.convert_value(value, declared.as_str())?
            };
            object.set(content.name(), value);
            return Ok(());
        }
        match object.get_mut(content.name()) {
            Some(Value::Object(collection)) if collection.is_list() => {
                if value.type_name().as_ref() == Some(collection.type_name()) {
                    let items = value.into_object().map(Object::into_items).unwrap_or_default();
                    collection.extend(items)?;
                } else {
                    collection.push(value)?;
                }
            }
            _ => {
                let mut created = self.types().construct_default(declared.as_str())?;
                if let Some(collection) = created.as_object_mut() {
                    collection.push(value)?;
                }
                object.set(content.name(), created);
            }
        }
        Ok(())
    }

    /// Setter/trigger fixup: a carried value that does not fit the declared
    /// type of the referenced dependency property is converted to it.
    fn fix_carried_value(&self, value: &mut Value) -> Result<(), ReadError> {
        let Some(type_name) = value.type_name() else {
            return Ok(());
        };
        let Some(TypeRole::ValueCarrier {
            property,
            value: slot_name,
        }) = self.types().role(type_name.as_str())
        else {
            return Ok(());
        };
        let Some(carrier) = value.as_object_mut() else {
            return Ok(());
        };
        let Some(Value::Property(target)) = carrier.get(property).cloned() else {
            return Ok(());
        };
        let Some(slot) = carrier.get_mut(slot_name) else {
            return Ok(());
        };
        if self.types().is_assignable(target.value_type.as_str(), slot) {
            return Ok(());
        }
        let current = std::mem::replace(slot, Value::Null);
        *slot = self
            .converter
            .convert_value(current, target.value_type.as_str())?;
        trace!(carrier = %type_name, property = %target, "carried value converted");
        Ok(())
    }

    fn is_collection_type(&self, name: &TypeName) -> bool {
        self.types()
            .lookup(name.as_str())
            .is_some_and(|desc| desc.is_collection())
    }

    fn is_list_type(&self, name: &TypeName) -> bool {
        self.types()
            .lookup(name.as_str())
            .is_some_and(|desc| matches!(desc.kind(), TypeKind::List { .. }))
    }
}

fn is_dictionary(value: &Value) -> bool {
    value.as_object().is_some_and(Object::is_dictionary)
}

fn assign(node: MarkupNode<'_>, item: &mut Value, property: &PropertyDescriptor, value: Value) {
    match item.as_object_mut() {
        Some(object) => {
            trace!(element = %node.name(), property = property.name(), "assign");
            object.set(property.name(), value);
        }
        None => trace!(element = %node.name(), property = property.name(), "property on a value skipped"),
    }
}
