use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use xaml::types::{Object, Storage, Value};
use xaml::{Loader, MissingKeyPolicy, ReaderOptions};

/// Loader over the presentation vocabulary, optionally skipping keyless
/// dictionary entries.
pub fn open_loader(lenient_keys: bool) -> Result<Loader> {
    let policy = if lenient_keys {
        MissingKeyPolicy::Skip
    } else {
        MissingKeyPolicy::Error
    };
    let loader = Loader::new()
        .context("build presentation vocabulary")?
        .with_options(ReaderOptions::new().missing_key(policy));
    debug!(?policy, "loader ready");
    Ok(loader)
}

pub fn load_document(loader: &Loader, path: &Path) -> Result<Value> {
    loader
        .load_file(path)
        .with_context(|| format!("load {}", path.display()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}

/// Indented outline of an object graph, one node per line.
pub struct Outline<'v>(pub &'v Value);

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self.0, 0)
    }
}

pub fn render_tree(value: &Value) -> Outline<'_> {
    Outline(value)
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, depth: usize) -> fmt::Result {
    match value.as_object() {
        Some(object) => write_object(f, object, depth),
        None => writeln!(f, "{}{value}", indent(depth)),
    }
}

fn write_object(f: &mut fmt::Formatter<'_>, object: &Object, depth: usize) -> fmt::Result {
    writeln!(f, "{}{}", indent(depth), object.type_name().short_name())?;
    for (name, value) in object.properties() {
        match value.as_object() {
            Some(child) => {
                writeln!(f, "{}.{name}:", indent(depth + 1))?;
                write_object(f, child, depth + 2)?;
            }
            None => writeln!(f, "{}.{name} = {value}", indent(depth + 1))?,
        }
    }
    match object.storage() {
        Storage::Plain => Ok(()),
        Storage::List(items) => items
            .iter()
            .try_for_each(|item| write_value(f, item, depth + 1)),
        Storage::Dictionary(entries) => entries.iter().try_for_each(|(key, value)| {
            writeln!(f, "{}[{key}]", indent(depth + 1))?;
            write_value(f, value, depth + 2)
        }),
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}
