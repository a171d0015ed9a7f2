//! Markup reader: deserializes XAML-style documents into a typed object
//! graph, resolving element names to registered types, attributes to
//! properties, and collecting keyed resources, styles and triggers.
//!
//! ```no_run
//! # fn demo(types: &dyn xaml_types::TypeSystem) -> Result<(), xaml_reader::ReadError> {
//! let root = xaml_reader::parse(r#"<Root Title="hello"/>"#, types)?;
//! println!("{root}");
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod locator;
mod materializer;
pub mod namespaces;

use std::io::Read;

use thiserror::Error;
use tracing::debug;
use xaml_dom::{MarkupDocument, MarkupError};
use xaml_types::{ConvertError, TypeError, TypeSystem, Value};

pub use convert::{Converter, MarkupExtension};
pub use locator::Locator;
pub use namespaces::{NamespaceTable, SCHEMA_PRESENTATION, SCHEMA_XAML};

use crate::materializer::Materializer;

/// Error type produced while reading a document. Every error aborts the
/// whole document; unknown property names are skipped instead.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Missing input.
    #[error("invalid argument: {0}")]
    Argument(String),
    /// The text is not a well-formed document.
    #[error("markup: {0}")]
    Markup(#[from] MarkupError),
    #[error("unknown namespace prefix '{0}'")]
    UnknownPrefix(String),
    #[error("type not found: {0}")]
    TypeResolution(String),
    /// An element names a property its parent type does not have.
    #[error("property {property} not found on {type_name}")]
    PropertyNotFound { type_name: String, property: String },
    #[error("conversion failed: {0}")]
    Conversion(#[from] ConvertError),
    /// A setter or trigger names a property without a dependency-property field.
    #[error("dependency property {property} not found on {type_name}")]
    PropertyResolution { type_name: String, property: String },
    /// A resource dictionary child has no `x:Key`.
    #[error("resource <{0}> has no key")]
    MissingKey(String),
    #[error("type system: {0}")]
    Type(#[from] TypeError),
}

/// What to do with a keyless child of a resource dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingKeyPolicy {
    /// Fail with [`ReadError::MissingKey`].
    #[default]
    Error,
    /// Drop the child and keep reading.
    Skip,
}

/// Reader configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderOptions {
    pub missing_key: MissingKeyPolicy,
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing_key(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_key = policy;
        self
    }
}

/// Reads documents against one type system.
pub struct XamlReader<'a> {
    types: &'a dyn TypeSystem,
    options: ReaderOptions,
}

impl<'a> XamlReader<'a> {
    pub fn new(types: &'a dyn TypeSystem) -> Self {
        Self::with_options(types, ReaderOptions::default())
    }

    pub fn with_options(types: &'a dyn TypeSystem, options: ReaderOptions) -> Self {
        XamlReader { types, options }
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Parse a document held in memory and return its root value.
    pub fn parse(&self, text: &str) -> Result<Value, ReadError> {
        if text.trim().is_empty() {
            return Err(ReadError::Argument("empty document".into()));
        }
        let document = MarkupDocument::parse(text)?;
        self.read_document(&document)
    }

    /// Read a UTF-8 stream to its end (a leading BOM is dropped) and parse it.
    pub fn load<R: Read>(&self, reader: R) -> Result<Value, ReadError> {
        let text = xaml_dom::read_text(reader)?;
        self.parse(&text)
    }

    /// Materialize an already parsed document.
    pub fn read_document(&self, document: &MarkupDocument) -> Result<Value, ReadError> {
        let root = document.root();
        let namespaces = NamespaceTable::from_root(root);
        debug!(
            root = %root.name(),
            nodes = document.len(),
            namespaces = namespaces.len(),
            "materialize document"
        );
        let locator = Locator::new(self.types, &namespaces);
        Materializer::new(locator, &self.options).read_document(root)
    }
}

/// Parse `text` with default options.
pub fn parse(text: &str, types: &dyn TypeSystem) -> Result<Value, ReadError> {
    XamlReader::new(types).parse(text)
}

/// Read and parse a stream with default options.
pub fn load<R: Read>(reader: R, types: &dyn TypeSystem) -> Result<Value, ReadError> {
    XamlReader::new(types).load(reader)
}
