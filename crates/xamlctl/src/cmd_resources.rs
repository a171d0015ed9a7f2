use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::info;

use xaml::types::Value;

use crate::common;

#[derive(Serialize)]
struct ResourceEntry {
    key: String,
    #[serde(rename = "type")]
    type_name: Option<String>,
    value: String,
}

pub fn run(file: &Path, lenient_keys: bool, json: bool) -> Result<()> {
    let loader = common::open_loader(lenient_keys)?;
    let root = common::load_document(&loader, file)?;
    let dictionary = xaml::resources(&root)
        .ok_or_else(|| anyhow!("{} declares no resource dictionary", file.display()))?;
    info!(count = dictionary.entries().len(), "resources found");

    let entries = summarize(dictionary.entries());
    if json {
        common::print_json(&entries)?;
        return Ok(());
    }

    if entries.is_empty() {
        println!("No resources.");
        return Ok(());
    }

    println!("{:<28} {:<40} {}", "KEY", "TYPE", "VALUE");
    for entry in &entries {
        println!(
            "{:<28} {:<40} {}",
            entry.key,
            entry.type_name.as_deref().unwrap_or("-"),
            entry.value
        );
    }
    Ok(())
}

fn summarize(entries: &[(Value, Value)]) -> Vec<ResourceEntry> {
    entries
        .iter()
        .map(|(key, value)| ResourceEntry {
            key: match key {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
            type_name: value.type_name().map(|name| name.to_string()),
            value: value.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_style_keys_are_type_literals() {
        let xml = r#"
            <ResourceDictionary xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation"
                                xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml">
                <x:Double x:Key="Spacing">6</x:Double>
                <Style TargetType="Button"/>
            </ResourceDictionary>
        "#;
        let loader = common::open_loader(false).expect("loader");
        let root = loader.parse(xml).expect("dictionary");
        let dictionary = xaml::resources(&root).expect("resources");
        let entries = summarize(dictionary.entries());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "Spacing");
        assert_eq!(entries[0].type_name.as_deref(), Some("System.Double"));
        assert_eq!(entries[0].value, "6");
        assert_eq!(entries[1].key, "{Type System.Windows.Controls.Button}");
        assert_eq!(entries[1].type_name.as_deref(), Some("System.Windows.Style"));
    }
}
