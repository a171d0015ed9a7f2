#![cfg_attr(docsrs, feature(doc_cfg))]
//! High level facade that re-exports the workspace crates and bundles the
//! presentation vocabulary with the markup reader.
//!
//! ```rust,no_run
//! use xaml::{Loader, XamlError};
//!
//! # fn run() -> Result<(), XamlError> {
//! let loader = Loader::new()?;
//! let window = loader.load_file("main.xaml")?;
//! if let Some(resources) = xaml::resources(&window) {
//!     println!("{} resources", resources.entries().len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Custom element types are registered next to the built-in vocabulary:
//!
//! ```rust
//! use xaml::types::TypeDescriptor;
//! use xaml::Loader;
//!
//! let mut loader = Loader::new().expect("vocabulary");
//! loader
//!     .registry_mut()
//!     .register(
//!         TypeDescriptor::class("Demo.Gauge")
//!             .base(xaml::presentation::CONTROL)
//!             .dependency_property("Level", "System.Double"),
//!     )
//!     .expect("register");
//! let gauge = loader
//!     .parse(r#"<d:Gauge xmlns:d="clr-namespace:Demo" Level="0.5"/>"#)
//!     .expect("parse");
//! assert_eq!(gauge.type_name().map(|t| t.to_string()).as_deref(), Some("Demo.Gauge"));
//! ```

pub use xaml_dom as dom;
pub use xaml_presentation as presentation;
pub use xaml_reader as reader;
pub use xaml_types as types;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

pub use xaml_reader::{MissingKeyPolicy, ReadError, ReaderOptions, XamlReader};
pub use xaml_types::{Object, TypeRegistry, TypeSystem, Value};

/// Error type produced by the facade.
#[derive(Debug, Error)]
pub enum XamlError {
    /// The document could not be materialized.
    #[error(transparent)]
    Read(#[from] ReadError),
    /// Registering the vocabulary or a custom type failed.
    #[error(transparent)]
    Type(#[from] types::TypeError),
    /// Opening a markup file failed.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Presentation registry plus reader options.
#[derive(Debug)]
pub struct Loader {
    registry: TypeRegistry,
    options: ReaderOptions,
}

impl Loader {
    /// Loader over the built-in presentation vocabulary.
    pub fn new() -> Result<Self, XamlError> {
        Ok(Self::with_registry(presentation::registry()?))
    }

    /// Loader over a caller-built registry.
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self {
            registry,
            options: ReaderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Mutable access for registering custom types and converters.
    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn reader(&self) -> XamlReader<'_> {
        XamlReader::with_options(&self.registry, self.options.clone())
    }

    pub fn parse(&self, text: &str) -> Result<Value, XamlError> {
        Ok(self.reader().parse(text)?)
    }

    pub fn load<R: Read>(&self, reader: R) -> Result<Value, XamlError> {
        Ok(self.reader().load(reader)?)
    }

    /// Open and materialize a markup file.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value, XamlError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| XamlError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading markup file");
        let value = self.load(BufReader::new(file))?;
        info!(
            path = %path.display(),
            root = %value,
            "markup file loaded"
        );
        Ok(value)
    }
}

/// Resource dictionary of a document: the root itself when it is a
/// dictionary, otherwise the root's `Resources` property.
pub fn resources(root: &Value) -> Option<&Object> {
    let object = root.as_object()?;
    if object.is_dictionary() {
        return Some(object);
    }
    object
        .get("Resources")
        .and_then(Value::as_object)
        .filter(|resources| resources.is_dictionary())
}

/// First object in the graph (depth-first, document order) whose `Name`
/// property equals `name`.
pub fn find_name<'v>(root: &'v Value, name: &str) -> Option<&'v Object> {
    let object = root.as_object()?;
    if object.get("Name").and_then(Value::as_str) == Some(name) {
        return Some(object);
    }
    object
        .properties()
        .map(|(_, value)| value)
        .chain(object.items())
        .chain(object.entries().iter().map(|(_, value)| value))
        .find_map(|value| find_name(value, name))
}
