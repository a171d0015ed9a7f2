//! Text converters for the structured value types of the vocabulary.

use xaml_types::{ConvertError, Object, Storage, TypeName, Value};

use crate::{COLOR, POINT, SOLID_COLOR_BRUSH, THICKNESS};

/// 8-bit ARGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba { a: 0xFF, r, g, b }
    }

    /// Parse `#RGB`, `#ARGB`, `#RRGGBB`, `#AARRGGBB` or a known color name
    /// (case-insensitive).
    pub fn parse(text: &str) -> Option<Rgba> {
        let text = text.trim();
        match text.strip_prefix('#') {
            Some(hex) => parse_hex(hex),
            None => NAMED_COLORS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(text))
                .map(|(_, color)| *color),
        }
    }

    /// Read back a color object produced by [`Rgba::to_object`].
    pub fn from_object(object: &Object) -> Option<Rgba> {
        if !object.type_name().is(COLOR) {
            return None;
        }
        let channel = |name: &str| {
            object
                .get(name)
                .and_then(Value::as_int)
                .and_then(|value| u8::try_from(value).ok())
        };
        Some(Rgba {
            a: channel("A")?,
            r: channel("R")?,
            g: channel("G")?,
            b: channel("B")?,
        })
    }

    pub fn to_object(self) -> Object {
        let mut object = Object::new(TypeName::from(COLOR), Storage::Plain);
        object.set("A", Value::Int(i64::from(self.a)));
        object.set("R", Value::Int(i64::from(self.r)));
        object.set("G", Value::Int(i64::from(self.g)));
        object.set("B", Value::Int(i64::from(self.b)));
        object
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |idx: usize| u8::from_str_radix(&hex[idx..idx + 1], 16).ok().map(|v| v * 0x11);
    let byte = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba {
            a: nibble(0)?,
            r: nibble(1)?,
            g: nibble(2)?,
            b: nibble(3)?,
        }),
        6 => Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba {
            a: byte(0)?,
            r: byte(2)?,
            g: byte(4)?,
            b: byte(6)?,
        }),
        _ => None,
    }
}

const NAMED_COLORS: &[(&str, Rgba)] = &[
    ("Transparent", Rgba { a: 0, r: 0xFF, g: 0xFF, b: 0xFF }),
    ("Black", Rgba::opaque(0, 0, 0)),
    ("White", Rgba::opaque(0xFF, 0xFF, 0xFF)),
    ("Red", Rgba::opaque(0xFF, 0, 0)),
    ("Green", Rgba::opaque(0, 0x80, 0)),
    ("Lime", Rgba::opaque(0, 0xFF, 0)),
    ("Blue", Rgba::opaque(0, 0, 0xFF)),
    ("Yellow", Rgba::opaque(0xFF, 0xFF, 0)),
    ("Cyan", Rgba::opaque(0, 0xFF, 0xFF)),
    ("Aqua", Rgba::opaque(0, 0xFF, 0xFF)),
    ("Magenta", Rgba::opaque(0xFF, 0, 0xFF)),
    ("Fuchsia", Rgba::opaque(0xFF, 0, 0xFF)),
    ("Gray", Rgba::opaque(0x80, 0x80, 0x80)),
    ("DarkGray", Rgba::opaque(0xA9, 0xA9, 0xA9)),
    ("LightGray", Rgba::opaque(0xD3, 0xD3, 0xD3)),
    ("Silver", Rgba::opaque(0xC0, 0xC0, 0xC0)),
    ("Orange", Rgba::opaque(0xFF, 0xA5, 0)),
    ("Purple", Rgba::opaque(0x80, 0, 0x80)),
    ("Navy", Rgba::opaque(0, 0, 0x80)),
    ("Maroon", Rgba::opaque(0x80, 0, 0)),
    ("Olive", Rgba::opaque(0x80, 0x80, 0)),
    ("Teal", Rgba::opaque(0, 0x80, 0x80)),
    ("Brown", Rgba::opaque(0xA5, 0x2A, 0x2A)),
    ("Pink", Rgba::opaque(0xFF, 0xC0, 0xCB)),
    ("CornflowerBlue", Rgba::opaque(0x64, 0x95, 0xED)),
    ("DarkOrange", Rgba::opaque(0xFF, 0x8C, 0)),
    ("DarkRed", Rgba::opaque(0x8B, 0, 0)),
    ("DarkGreen", Rgba::opaque(0, 0x64, 0)),
    ("DarkBlue", Rgba::opaque(0, 0, 0x8B)),
    ("LightBlue", Rgba::opaque(0xAD, 0xD8, 0xE6)),
    ("SteelBlue", Rgba::opaque(0x46, 0x82, 0xB4)),
    ("Gold", Rgba::opaque(0xFF, 0xD7, 0)),
    ("Indigo", Rgba::opaque(0x4B, 0, 0x82)),
    ("DimGray", Rgba::opaque(0x69, 0x69, 0x69)),
    ("WhiteSmoke", Rgba::opaque(0xF5, 0xF5, 0xF5)),
];

pub fn convert_color(text: &str) -> Result<Value, ConvertError> {
    Rgba::parse(text)
        .map(|color| Value::from(color.to_object()))
        .ok_or_else(|| ConvertError::invalid(text, COLOR, "unknown color"))
}

/// Brush text is a color; the result is a solid color brush.
pub fn convert_brush(text: &str) -> Result<Value, ConvertError> {
    let color = Rgba::parse(text)
        .ok_or_else(|| ConvertError::invalid(text, SOLID_COLOR_BRUSH, "unknown color"))?;
    let mut brush = Object::new(TypeName::from(SOLID_COLOR_BRUSH), Storage::Plain);
    brush.set("Color", Value::from(color.to_object()));
    Ok(Value::from(brush))
}

/// `uniform`, `horizontal,vertical` or `left,top,right,bottom`.
pub fn convert_thickness(text: &str) -> Result<Value, ConvertError> {
    let parts = parse_lengths(text, THICKNESS)?;
    let [left, top, right, bottom] = match parts.as_slice() {
        [uniform] => [*uniform; 4],
        [horizontal, vertical] => [*horizontal, *vertical, *horizontal, *vertical],
        [left, top, right, bottom] => [*left, *top, *right, *bottom],
        _ => {
            return Err(ConvertError::invalid(
                text,
                THICKNESS,
                format!("expected 1, 2 or 4 lengths, got {}", parts.len()),
            ))
        }
    };
    let mut thickness = Object::new(TypeName::from(THICKNESS), Storage::Plain);
    thickness.set("Left", Value::Float(left));
    thickness.set("Top", Value::Float(top));
    thickness.set("Right", Value::Float(right));
    thickness.set("Bottom", Value::Float(bottom));
    Ok(Value::from(thickness))
}

pub fn convert_point(text: &str) -> Result<Value, ConvertError> {
    let parts = parse_lengths(text, POINT)?;
    let [x, y] = parts.as_slice() else {
        return Err(ConvertError::invalid(text, POINT, "expected x,y"));
    };
    let mut point = Object::new(TypeName::from(POINT), Storage::Plain);
    point.set("X", Value::Float(*x));
    point.set("Y", Value::Float(*y));
    Ok(Value::from(point))
}

/// Comma- or whitespace-separated invariant-culture numbers.
fn parse_lengths(text: &str, target: &str) -> Result<Vec<f64>, ConvertError> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|err| ConvertError::invalid(text, target, err))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_named_colors() {
        assert_eq!(Rgba::parse("#F00"), Some(Rgba::opaque(0xFF, 0, 0)));
        assert_eq!(
            Rgba::parse("#80FF0000"),
            Some(Rgba { a: 0x80, r: 0xFF, g: 0, b: 0 })
        );
        assert_eq!(Rgba::parse("#00FF00"), Some(Rgba::opaque(0, 0xFF, 0)));
        assert_eq!(Rgba::parse(" red "), Some(Rgba::opaque(0xFF, 0, 0)));
        assert_eq!(Rgba::parse("darkorange"), Some(Rgba::opaque(0xFF, 0x8C, 0)));
        assert_eq!(Rgba::parse("#12345"), None);
        assert_eq!(Rgba::parse("#GGG"), None);
        assert_eq!(Rgba::parse("Chartreuse-ish"), None);
    }

    #[test]
    fn brush_wraps_color() {
        let brush = convert_brush("Blue").expect("brush");
        let brush = brush.as_object().expect("object");
        assert!(brush.type_name().is(SOLID_COLOR_BRUSH));
        let color = brush
            .get("Color")
            .and_then(Value::as_object)
            .and_then(Rgba::from_object);
        assert_eq!(color, Some(Rgba::opaque(0, 0, 0xFF)));
        assert!(matches!(
            convert_brush("NotAColor"),
            Err(ConvertError::Invalid { .. })
        ));
    }

    #[test]
    fn thickness_forms() {
        let side = |value: &Value, name: &str| {
            value
                .as_object()
                .and_then(|object| object.get(name))
                .and_then(Value::as_float)
        };
        let uniform = convert_thickness("4").expect("uniform");
        assert_eq!(side(&uniform, "Bottom"), Some(4.0));
        let pair = convert_thickness("1,2").expect("pair");
        assert_eq!(side(&pair, "Right"), Some(1.0));
        assert_eq!(side(&pair, "Bottom"), Some(2.0));
        let full = convert_thickness("9 0 0 1.5").expect("full");
        assert_eq!(side(&full, "Left"), Some(9.0));
        assert_eq!(side(&full, "Bottom"), Some(1.5));
        assert!(convert_thickness("1,2,3").is_err());
        assert!(convert_thickness("a").is_err());
    }

    #[test]
    fn point_needs_two_coordinates() {
        let point = convert_point("0.5,1").expect("point");
        let point = point.as_object().expect("object");
        assert_eq!(point.get("X"), Some(&Value::Float(0.5)));
        assert!(convert_point("1").is_err());
    }
}
