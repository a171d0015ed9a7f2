//! Prefix → namespace table of a document and qualified-name resolution.

use tracing::trace;
use xaml_dom::{MarkupNode, QualifiedName};
use xaml_types::TypeSystem;

use crate::ReadError;

/// Markup-extension namespace (`x:Key`, `{x:Null}`, `{x:Type …}`).
pub const SCHEMA_XAML: &str = "http://schemas.microsoft.com/winfx/2006/xaml";
/// Default presentation namespace; unprefixed names are looked up by short name.
pub const SCHEMA_PRESENTATION: &str = "http://schemas.microsoft.com/winfx/2006/xaml/presentation";

const CLR_NAMESPACE: &str = "clr-namespace:";
/// Namespace of the `x:String`, `x:Int32`, … built-ins.
const SYSTEM_NAMESPACE: &str = "System";

/// Namespace declarations of the root element. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable {
    entries: Vec<(String, String)>,
}

impl NamespaceTable {
    /// Collect `xmlns` / `xmlns:p` declarations of the root; the default
    /// namespace is stored under the empty prefix.
    pub fn from_root(root: MarkupNode<'_>) -> Self {
        let mut table = NamespaceTable::default();
        for attr in root.attributes() {
            if let Some(prefix) = attr.declared_prefix() {
                table.insert(prefix, &attr.value);
            }
        }
        table
    }

    /// Bind a prefix, replacing an earlier binding.
    pub fn insert(&mut self, prefix: &str, namespace: &str) {
        let namespace = namespace.trim().to_string();
        match self.entries.iter_mut().find(|(p, _)| p == prefix) {
            Some((_, slot)) => *slot = namespace,
            None => self.entries.push((prefix.to_string(), namespace)),
        }
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the presentation namespace is declared under any prefix.
    pub fn has_default_namespace(&self) -> bool {
        self.entries.iter().any(|(_, ns)| ns == SCHEMA_PRESENTATION)
    }

    /// Prefix bound to the markup-extension namespace, usually `x`.
    pub fn xaml_prefix(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, ns)| ns == SCHEMA_XAML)
            .map(|(p, _)| p.as_str())
    }

    /// `x:Key`, `x:Name`, … where `x` is bound to the markup-extension namespace.
    pub fn is_xaml_directive(&self, name: &QualifiedName, directive: &str) -> bool {
        name.local() == directive
            && name
                .prefix()
                .and_then(|prefix| self.get(prefix))
                .is_some_and(|ns| ns == SCHEMA_XAML)
    }

    /// Resolve `prefix:Local` or `Local` to a fully-qualified type name.
    ///
    /// A `clr-namespace:` mapping yields `<namespace>.Local` (any
    /// `;assembly=` suffix dropped). Unprefixed names are matched by short
    /// name against the visible types when the presentation namespace is
    /// declared, and returned unchanged otherwise.
    pub fn resolve_qualified_name(
        &self,
        raw: &str,
        types: &dyn TypeSystem,
    ) -> Result<String, ReadError> {
        let raw = raw.trim();
        let Some((prefix, local)) = raw.split_once(':') else {
            return Ok(self.resolve_unprefixed(raw, types));
        };
        let namespace = self
            .get(prefix)
            .ok_or_else(|| ReadError::UnknownPrefix(prefix.to_string()))?;
        match namespace {
            SCHEMA_PRESENTATION => Ok(self.resolve_by_short_name(local, types)),
            SCHEMA_XAML => Ok(qualify(SYSTEM_NAMESPACE, local)),
            other => Ok(qualify(clr_namespace(other), local)),
        }
    }

    fn resolve_unprefixed(&self, name: &str, types: &dyn TypeSystem) -> String {
        if self.has_default_namespace() {
            return self.resolve_by_short_name(name, types);
        }
        match self.get("") {
            Some(ns) if ns.starts_with(CLR_NAMESPACE) => qualify(clr_namespace(ns), name),
            _ => name.to_string(),
        }
    }

    fn resolve_by_short_name(&self, name: &str, types: &dyn TypeSystem) -> String {
        let found = types
            .types()
            .find(|desc| desc.name().short_name() == name)
            .map(|desc| desc.name().to_string());
        match found {
            Some(qualified) => qualified,
            None => {
                trace!(name, "no visible type with this short name");
                name.to_string()
            }
        }
    }
}

/// `clr-namespace:Foo.Bar;assembly=Baz` → `Foo.Bar`.
fn clr_namespace(namespace: &str) -> &str {
    let namespace = namespace.strip_prefix(CLR_NAMESPACE).unwrap_or(namespace);
    namespace
        .split_once(';')
        .map_or(namespace, |(ns, _)| ns)
        .trim()
}

fn qualify(namespace: &str, local: &str) -> String {
    if namespace.is_empty() {
        local.to_string()
    } else {
        format!("{namespace}.{local}")
    }
}
