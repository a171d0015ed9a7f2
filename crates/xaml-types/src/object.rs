use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::value::{TypeName, Value};
use crate::TypeError;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a materialized object. Clones share the identity of their source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backing storage of an object beyond its property bag.
#[derive(Debug, Clone, PartialEq)]
pub enum Storage {
    Plain,
    /// Ordered items of a list-like collection.
    List(Vec<Value>),
    /// Keyed entries of a resource dictionary, in insertion order.
    Dictionary(Vec<(Value, Value)>),
}

/// Instance of a registered type: a property bag plus optional collection storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    id: ObjectId,
    type_name: TypeName,
    properties: Vec<(String, Value)>,
    storage: Storage,
}

impl Object {
    pub fn new(type_name: TypeName, storage: Storage) -> Self {
        Object {
            id: ObjectId::next(),
            type_name,
            properties: Vec::new(),
            storage,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Explicitly assigned value of a property.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.properties
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Assign a property, replacing an earlier value in place. Returns the
    /// replaced value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let name = name.into();
        match self.get_mut(&name) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.properties.push((name, value));
                None
            }
        }
    }

    /// Assigned properties in first-assignment order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn is_list(&self) -> bool {
        matches!(self.storage, Storage::List(_))
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self.storage, Storage::Dictionary(_))
    }

    /// Items of a list-like object; empty for other objects.
    pub fn items(&self) -> &[Value] {
        match &self.storage {
            Storage::List(items) => items,
            _ => &[],
        }
    }

    pub fn push(&mut self, value: Value) -> Result<(), TypeError> {
        match &mut self.storage {
            Storage::List(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(TypeError::NotAList(self.type_name.to_string())),
        }
    }

    /// Append all items of another list.
    pub fn extend(&mut self, values: impl IntoIterator<Item = Value>) -> Result<(), TypeError> {
        match &mut self.storage {
            Storage::List(items) => {
                items.extend(values);
                Ok(())
            }
            _ => Err(TypeError::NotAList(self.type_name.to_string())),
        }
    }

    /// Consume a list object and return its items.
    pub fn into_items(self) -> Vec<Value> {
        match self.storage {
            Storage::List(items) => items,
            _ => Vec::new(),
        }
    }

    /// Register a keyed entry. A duplicate key replaces the earlier value in
    /// place (last write wins) and the replaced value is returned.
    pub fn add_entry(&mut self, key: Value, value: Value) -> Result<Option<Value>, TypeError> {
        match &mut self.storage {
            Storage::Dictionary(entries) => {
                if let Some((_, slot)) = entries.iter_mut().find(|(existing, _)| *existing == key) {
                    return Ok(Some(std::mem::replace(slot, value)));
                }
                entries.push((key, value));
                Ok(None)
            }
            _ => Err(TypeError::NotADictionary(self.type_name.to_string())),
        }
    }

    pub fn entry(&self, key: &Value) -> Option<&Value> {
        self.entries()
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Convenience lookup for the common string-keyed case.
    pub fn resource(&self, key: &str) -> Option<&Value> {
        self.entries()
            .iter()
            .find(|(existing, _)| existing.as_str() == Some(key))
            .map(|(_, value)| value)
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        match &self.storage {
            Storage::Dictionary(entries) => entries,
            _ => &[],
        }
    }

    /// Consume a dictionary object and return its entries.
    pub fn into_entries(self) -> Vec<(Value, Value)> {
        match self.storage {
            Storage::Dictionary(entries) => entries,
            _ => Vec::new(),
        }
    }
}

#[cfg(feature = "serde")]
mod serialize {
    use serde::ser::{SerializeMap, SerializeStruct};
    use serde::{Serialize, Serializer};

    use super::{Object, Storage};
    use crate::value::Value;

    struct PropertyMap<'a>(&'a [(String, Value)]);

    impl Serialize for PropertyMap<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.0.len()))?;
            for (name, value) in self.0 {
                map.serialize_entry(name, value)?;
            }
            map.end()
        }
    }

    #[derive(Serialize)]
    struct Entry<'a> {
        key: &'a Value,
        value: &'a Value,
    }

    impl Serialize for Object {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_struct("Object", 4)?;
            state.serialize_field("id", &self.id)?;
            state.serialize_field("type", &self.type_name)?;
            state.serialize_field("properties", &PropertyMap(&self.properties))?;
            match &self.storage {
                Storage::Plain => state.skip_field("items")?,
                Storage::List(items) => state.serialize_field("items", items)?,
                Storage::Dictionary(entries) => {
                    let entries: Vec<Entry<'_>> = entries
                        .iter()
                        .map(|(key, value)| Entry { key, value })
                        .collect();
                    state.serialize_field("entries", &entries)?;
                }
            }
            state.end()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> Object {
        Object::new(TypeName::from("Demo.Resources"), Storage::Dictionary(Vec::new()))
    }

    #[test]
    fn properties_replace_in_place() {
        let mut object = Object::new(TypeName::from("Demo.Widget"), Storage::Plain);
        assert!(object.set("Width", Value::Int(1)).is_none());
        object.set("Height", Value::Int(2));
        let previous = object.set("Width", Value::Int(3));
        assert_eq!(previous, Some(Value::Int(1)));
        let names: Vec<_> = object.properties().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Width", "Height"]);
        assert_eq!(object.get("Width"), Some(&Value::Int(3)));
    }

    #[test]
    fn ids_are_unique() {
        let a = Object::new(TypeName::from("Demo.Widget"), Storage::Plain);
        let b = Object::new(TypeName::from("Demo.Widget"), Storage::Plain);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn list_storage() {
        let mut list = Object::new(TypeName::from("Demo.Items"), Storage::List(Vec::new()));
        list.push(Value::Int(1)).expect("push");
        list.extend(vec![Value::Int(2), Value::Int(3)]).expect("extend");
        assert_eq!(list.items().len(), 3);

        let mut plain = Object::new(TypeName::from("Demo.Widget"), Storage::Plain);
        assert!(matches!(plain.push(Value::Null), Err(TypeError::NotAList(_))));
    }

    #[test]
    fn duplicate_keys_last_write_wins() {
        let mut dict = dictionary();
        assert_eq!(dict.add_entry("a".into(), Value::Int(1)).expect("add"), None);
        dict.add_entry("b".into(), Value::Int(2)).expect("add");
        let replaced = dict.add_entry("a".into(), Value::Int(3)).expect("add");
        assert_eq!(replaced, Some(Value::Int(1)));
        assert_eq!(dict.entries().len(), 2);
        assert_eq!(dict.resource("a"), Some(&Value::Int(3)));
        assert_eq!(dict.entry(&Value::from("b")), Some(&Value::Int(2)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_to_json() {
        let mut dict = dictionary();
        dict.add_entry("a".into(), Value::Bool(true)).expect("add");
        let json = serde_json::to_value(&dict).expect("serialize");
        assert_eq!(json["type"], "Demo.Resources");
        assert_eq!(json["entries"][0]["key"]["value"], "a");
        assert_eq!(json["entries"][0]["value"]["kind"], "bool");
    }
}
