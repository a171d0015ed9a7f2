use anyhow::Result;
use serde::Serialize;

use xaml::types::{TypeDescriptor, TypeKind, TypeSystem};

use crate::common;

#[derive(Serialize)]
struct TypeEntry {
    name: String,
    base: Option<String>,
    kind: &'static str,
    #[serde(rename = "abstract")]
    is_abstract: bool,
    content: Option<String>,
    properties: Vec<PropertyEntry>,
}

#[derive(Serialize)]
struct PropertyEntry {
    name: String,
    #[serde(rename = "type")]
    value_type: String,
}

pub fn run(filter: Option<&str>, json: bool) -> Result<()> {
    let loader = common::open_loader(false)?;
    let entries = collect(loader.registry(), filter);

    if json {
        common::print_json(&entries)?;
        return Ok(());
    }

    println!("{:<52} {:<10} {}", "TYPE", "KIND", "BASE");
    for entry in &entries {
        let kind = if entry.is_abstract {
            format!("{}*", entry.kind)
        } else {
            entry.kind.to_string()
        };
        println!(
            "{:<52} {:<10} {}",
            entry.name,
            kind,
            entry.base.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Registered types whose full name contains `filter` (case-insensitive),
/// sorted by name.
fn collect(types: &dyn TypeSystem, filter: Option<&str>) -> Vec<TypeEntry> {
    let filter = filter.map(str::to_ascii_lowercase);
    let mut entries: Vec<TypeEntry> = types
        .types()
        .filter(|desc| match &filter {
            Some(filter) => desc.name().as_str().to_ascii_lowercase().contains(filter),
            None => true,
        })
        .map(describe)
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

fn describe(desc: &TypeDescriptor) -> TypeEntry {
    TypeEntry {
        name: desc.name().to_string(),
        base: desc.base_type().map(|base| base.to_string()),
        kind: match desc.kind() {
            TypeKind::Primitive { .. } => "primitive",
            TypeKind::Enum { .. } => "enum",
            TypeKind::Class => "class",
            TypeKind::List { .. } => "list",
            TypeKind::Dictionary => "dictionary",
        },
        is_abstract: desc.is_abstract(),
        content: desc.own_content_property().map(str::to_string),
        properties: desc
            .own_properties()
            .iter()
            .map(|property| PropertyEntry {
                name: property.name().to_string(),
                value_type: property.value_type().to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_case_insensitively() {
        let loader = common::open_loader(false).expect("loader");
        let entries = collect(loader.registry(), Some("combobox"));
        let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "System.Windows.Controls.ComboBox",
                "System.Windows.Controls.ComboBoxItem"
            ]
        );
        let combo = &entries[0];
        assert_eq!(combo.kind, "class");
        assert!(combo.properties.iter().any(|p| p.name == "IsDropDownOpen"));
    }

    #[test]
    fn primitives_are_listed() {
        let loader = common::open_loader(false).expect("loader");
        let entries = collect(loader.registry(), None);
        let int = entries
            .iter()
            .find(|entry| entry.name == "System.Int32")
            .expect("int32");
        assert_eq!(int.kind, "primitive");
        assert_eq!(int.base.as_deref(), Some("System.Object"));
        let panel = entries
            .iter()
            .find(|entry| entry.name.ends_with(".Panel"))
            .expect("panel");
        assert!(panel.is_abstract);
        assert_eq!(panel.content.as_deref(), Some("Children"));
    }
}
