//! Attribute text → typed values, markup extensions included.

use tracing::trace;
use xaml_types::primitives::{OBJECT, TYPE};
use xaml_types::{Binding, ConvertError, TypeSystem, Value};

use crate::locator::Locator;
use crate::ReadError;

/// Brace expression recognized in attribute text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupExtension<'t> {
    /// `{x:Null}`
    Null,
    /// `{x:Type Name}` with the raw, possibly prefixed, name.
    Type(&'t str),
    /// `{Binding …}`, recorded but never evaluated.
    Binding(Binding),
    /// `{}literal`: text that would otherwise parse as an extension.
    Escaped(&'t str),
    /// Any other extension name.
    Unsupported(&'t str),
}

impl<'t> MarkupExtension<'t> {
    /// Recognize an extension; `None` for plain text. `xaml_prefix` is the
    /// prefix bound to the markup-extension namespace, if declared.
    pub fn parse(raw: &'t str, xaml_prefix: Option<&str>) -> Option<Self> {
        if let Some(literal) = raw.strip_prefix("{}") {
            return Some(MarkupExtension::Escaped(literal));
        }
        let inner = raw.trim().strip_prefix('{')?.strip_suffix('}')?.trim();
        let (name, args) = match inner.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (inner, ""),
        };
        let directive = |local: &str| match xaml_prefix {
            Some("") | None => name == local,
            Some(prefix) => name
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(|rest| rest == local),
        };
        if directive("Null") {
            Some(MarkupExtension::Null)
        } else if directive("Type") {
            Some(MarkupExtension::Type(args.strip_prefix("TypeName=").unwrap_or(args).trim()))
        } else if name == "Binding" {
            Some(MarkupExtension::Binding(parse_binding(args)))
        } else {
            Some(MarkupExtension::Unsupported(name))
        }
    }
}

/// `Path`, `Path=P` and further `Name=Value` pairs, comma separated.
fn parse_binding(args: &str) -> Binding {
    let mut binding = Binding::default();
    for part in args.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        match part.split_once('=') {
            Some((name, value)) if name.trim() == "Path" => {
                binding.path = Some(value.trim().to_string());
            }
            Some((name, value)) => binding
                .parameters
                .push((name.trim().to_string(), value.trim().to_string())),
            None => binding.path = Some(part.to_string()),
        }
    }
    binding
}

/// Value conversion against declared property types.
#[derive(Clone, Copy)]
pub struct Converter<'a> {
    locator: Locator<'a>,
}

impl<'a> Converter<'a> {
    pub fn new(locator: Locator<'a>) -> Self {
        Converter { locator }
    }

    fn types(&self) -> &'a dyn TypeSystem {
        self.locator.types()
    }

    /// Convert attribute text for a slot declared as `declared`.
    pub fn convert(&self, raw: &str, declared: &str) -> Result<Value, ReadError> {
        let xaml_prefix = self.locator.namespaces().xaml_prefix();
        let text = match MarkupExtension::parse(raw, xaml_prefix) {
            None => raw,
            Some(MarkupExtension::Escaped(literal)) => literal,
            Some(MarkupExtension::Null) => return Ok(Value::Null),
            Some(MarkupExtension::Type(name)) => {
                let desc = self.locator.resolve_type(name)?;
                return Ok(Value::Type(desc.name().clone()));
            }
            Some(MarkupExtension::Binding(binding)) => {
                trace!(path = ?binding.path, "binding recorded");
                return Ok(Value::Binding(binding));
            }
            Some(MarkupExtension::Unsupported(_)) if declared == OBJECT || declared == TYPE => {
                trace!(text = raw, "unsupported extension kept as text");
                return Ok(Value::String(raw.to_string()));
            }
            Some(MarkupExtension::Unsupported(name)) => {
                return Err(ConvertError::invalid(
                    raw,
                    declared,
                    format!("unsupported markup extension {name}"),
                )
                .into())
            }
        };
        if declared == OBJECT || declared == TYPE {
            return Ok(Value::String(text.to_string()));
        }
        Ok(self.types().convert_text(text, declared)?)
    }

    /// Fit an already materialized value into a slot declared as `declared`.
    /// Assignable values pass through; text is converted.
    pub fn convert_value(&self, value: Value, declared: &str) -> Result<Value, ReadError> {
        if self.types().is_assignable(declared, &value) {
            return Ok(value);
        }
        match value {
            Value::String(text) => self.convert(&text, declared),
            other => Err(ConvertError::Incompatible {
                found: other
                    .type_name()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "null".into()),
                target: declared.to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::{NamespaceTable, SCHEMA_PRESENTATION, SCHEMA_XAML};
    use xaml_dom::MarkupDocument;
    use xaml_presentation as wpf;
    use xaml_types::primitives::{BOOLEAN, DOUBLE, INT32, STRING};

    fn with_converter(check: impl FnOnce(&Converter<'_>)) {
        let registry = wpf::registry().expect("vocabulary");
        let xml = format!(r#"<Root xmlns="{SCHEMA_PRESENTATION}" xmlns:x="{SCHEMA_XAML}"/>"#);
        let doc = MarkupDocument::parse(&xml).expect("parse");
        let namespaces = NamespaceTable::from_root(doc.root());
        let converter = Converter::new(Locator::new(&registry, &namespaces));
        check(&converter);
    }

    #[test]
    fn extension_syntax() {
        assert_eq!(MarkupExtension::parse("Red", Some("x")), None);
        assert_eq!(MarkupExtension::parse("{x:Null}", Some("x")), Some(MarkupExtension::Null));
        assert_eq!(
            MarkupExtension::parse("{x:Type  local:Widget }", Some("x")),
            Some(MarkupExtension::Type("local:Widget"))
        );
        assert_eq!(
            MarkupExtension::parse("{}{literal}", Some("x")),
            Some(MarkupExtension::Escaped("{literal}"))
        );
        assert_eq!(
            MarkupExtension::parse("{StaticResource Accent}", Some("x")),
            Some(MarkupExtension::Unsupported("StaticResource"))
        );
        assert_eq!(
            MarkupExtension::parse("{y:Null}", Some("x")),
            Some(MarkupExtension::Unsupported("y:Null"))
        );
    }

    #[test]
    fn binding_stub() {
        let Some(MarkupExtension::Binding(binding)) =
            MarkupExtension::parse("{Binding Title, Mode=OneWay}", Some("x"))
        else {
            panic!("binding expected");
        };
        assert_eq!(binding.path.as_deref(), Some("Title"));
        assert_eq!(binding.parameter("Mode"), Some("OneWay"));

        let Some(MarkupExtension::Binding(binding)) =
            MarkupExtension::parse("{Binding Path=Items.Count}", Some("x"))
        else {
            panic!("binding expected");
        };
        assert_eq!(binding.path.as_deref(), Some("Items.Count"));
    }

    #[test]
    fn null_for_every_declared_type() {
        with_converter(|converter| {
            for declared in [OBJECT, STRING, INT32, DOUBLE, BOOLEAN, TYPE, wpf::BRUSH, wpf::BUTTON] {
                assert_eq!(converter.convert("{x:Null}", declared).expect(declared), Value::Null);
            }
        });
    }

    #[test]
    fn type_literals() {
        with_converter(|converter| {
            let value = converter.convert("{x:Type Button}", TYPE).expect("type");
            assert_eq!(value, Value::Type(wpf::BUTTON.into()));
            let err = converter.convert("{x:Type Missing}", TYPE).unwrap_err();
            assert!(matches!(err, ReadError::TypeResolution(_)));
        });
    }

    #[test]
    fn declared_types_drive_conversion() {
        with_converter(|converter| {
            assert_eq!(
                converter.convert("5", OBJECT).expect("object"),
                Value::String("5".into())
            );
            assert_eq!(converter.convert("5", INT32).expect("int"), Value::Int(5));
            assert_eq!(
                converter.convert("{}{5}", STRING).expect("escaped"),
                Value::String("{5}".into())
            );
            let brush = converter.convert("Red", wpf::BRUSH).expect("brush");
            assert!(brush.type_name().is_some_and(|t| t.is(wpf::SOLID_COLOR_BRUSH)));
            let err = converter.convert("five", INT32).unwrap_err();
            assert!(matches!(err, ReadError::Conversion(ConvertError::Invalid { .. })));
            let err = converter.convert("{StaticResource Accent}", wpf::BRUSH).unwrap_err();
            assert!(matches!(err, ReadError::Conversion(_)));
            assert_eq!(
                converter.convert("{StaticResource Accent}", OBJECT).expect("object slot"),
                Value::String("{StaticResource Accent}".into())
            );
            assert_eq!(
                converter.convert("{Foo}", TYPE).expect("type slot"),
                Value::String("{Foo}".into())
            );
        });
    }

    #[test]
    fn materialized_values() {
        with_converter(|converter| {
            let text = Value::String("True".into());
            assert_eq!(
                converter.convert_value(text, BOOLEAN).expect("bool"),
                Value::Bool(true)
            );
            let brush = converter.convert("Blue", wpf::BRUSH).expect("brush");
            let same = converter.convert_value(brush.clone(), wpf::BRUSH).expect("assignable");
            assert_eq!(same, brush);
            let err = converter.convert_value(brush, wpf::THICKNESS).unwrap_err();
            assert!(matches!(
                err,
                ReadError::Conversion(ConvertError::Incompatible { .. })
            ));
        });
    }
}
