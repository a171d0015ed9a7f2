//! Presentation vocabulary: the element, brush, style and resource types a
//! markup document can instantiate, registered as type descriptors together
//! with their text converters.

pub mod converters;

use tracing::debug;
use xaml_types::primitives::{BOOLEAN, DEPENDENCY_PROPERTY, DOUBLE, INT32, OBJECT, STRING, TYPE};
use xaml_types::{TypeDescriptor, TypeError, TypeRegistry, TypeRole, Value};

pub use converters::Rgba;

/// Base of every element carrying dependency properties.
pub const DEPENDENCY_OBJECT: &str = "System.Windows.DependencyObject";
pub const UI_ELEMENT: &str = "System.Windows.UIElement";
pub const FRAMEWORK_ELEMENT: &str = "System.Windows.FrameworkElement";
/// Style type name (`Style`); setters inside resolve against its `TargetType`.
pub const STYLE: &str = "System.Windows.Style";
pub const SETTER_BASE: &str = "System.Windows.SetterBase";
/// Setter type name (`Setter`).
pub const SETTER: &str = "System.Windows.Setter";
pub const SETTER_BASE_COLLECTION: &str = "System.Windows.SetterBaseCollection";
pub const TRIGGER_BASE: &str = "System.Windows.TriggerBase";
/// Property trigger type name (`Trigger`).
pub const TRIGGER: &str = "System.Windows.Trigger";
pub const TRIGGER_COLLECTION: &str = "System.Windows.TriggerCollection";
/// Keyed resource table (`ResourceDictionary`).
pub const RESOURCE_DICTIONARY: &str = "System.Windows.ResourceDictionary";
pub const WINDOW: &str = "System.Windows.Window";
pub const THICKNESS: &str = "System.Windows.Thickness";
pub const POINT: &str = "System.Windows.Point";
pub const VISIBILITY: &str = "System.Windows.Visibility";
pub const HORIZONTAL_ALIGNMENT: &str = "System.Windows.HorizontalAlignment";
pub const VERTICAL_ALIGNMENT: &str = "System.Windows.VerticalAlignment";

pub const COLOR: &str = "System.Windows.Media.Color";
/// Abstract brush; text converts to a [`SOLID_COLOR_BRUSH`].
pub const BRUSH: &str = "System.Windows.Media.Brush";
pub const SOLID_COLOR_BRUSH: &str = "System.Windows.Media.SolidColorBrush";
pub const LINEAR_GRADIENT_BRUSH: &str = "System.Windows.Media.LinearGradientBrush";
pub const GRADIENT_STOP: &str = "System.Windows.Media.GradientStop";
pub const GRADIENT_STOP_COLLECTION: &str = "System.Windows.Media.GradientStopCollection";

pub const PANEL: &str = "System.Windows.Controls.Panel";
pub const STACK_PANEL: &str = "System.Windows.Controls.StackPanel";
pub const GRID: &str = "System.Windows.Controls.Grid";
pub const UI_ELEMENT_COLLECTION: &str = "System.Windows.Controls.UIElementCollection";
pub const ORIENTATION: &str = "System.Windows.Controls.Orientation";
pub const CONTROL: &str = "System.Windows.Controls.Control";
pub const CONTENT_CONTROL: &str = "System.Windows.Controls.ContentControl";
/// Button type name (`Button`).
pub const BUTTON: &str = "System.Windows.Controls.Button";
pub const TEXT_BLOCK: &str = "System.Windows.Controls.TextBlock";
pub const BORDER: &str = "System.Windows.Controls.Border";
pub const ITEM_COLLECTION: &str = "System.Windows.Controls.ItemCollection";
pub const ITEMS_CONTROL: &str = "System.Windows.Controls.ItemsControl";
pub const SELECTOR: &str = "System.Windows.Controls.Primitives.Selector";
/// Drop-down selector (`ComboBox`).
pub const COMBO_BOX: &str = "System.Windows.Controls.ComboBox";
pub const COMBO_BOX_ITEM: &str = "System.Windows.Controls.ComboBoxItem";
pub const LIST_BOX: &str = "System.Windows.Controls.ListBox";
pub const LIST_BOX_ITEM: &str = "System.Windows.Controls.ListBoxItem";

/// Registry holding the primitives and the whole presentation vocabulary.
pub fn registry() -> Result<TypeRegistry, TypeError> {
    let mut registry = TypeRegistry::new();
    register(&mut registry)?;
    Ok(registry)
}

/// Add the vocabulary and its converters to an existing registry.
pub fn register(registry: &mut TypeRegistry) -> Result<(), TypeError> {
    registry.register_all(descriptors())?;
    registry.register_converter(COLOR, converters::convert_color);
    registry.register_converter(BRUSH, converters::convert_brush);
    registry.register_converter(THICKNESS, converters::convert_thickness);
    registry.register_converter(POINT, converters::convert_point);
    debug!(types = registry.len(), "presentation vocabulary registered");
    Ok(())
}

fn descriptors() -> Vec<TypeDescriptor> {
    let mut types = Vec::new();
    types.extend(enumerations());
    types.extend(values());
    types.extend(styling());
    types.extend(elements());
    types.extend(controls());
    types
}

fn enumerations() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::enumeration(VISIBILITY, ["Visible", "Hidden", "Collapsed"]).base(OBJECT),
        TypeDescriptor::enumeration(HORIZONTAL_ALIGNMENT, ["Stretch", "Left", "Center", "Right"])
            .base(OBJECT),
        TypeDescriptor::enumeration(VERTICAL_ALIGNMENT, ["Stretch", "Top", "Center", "Bottom"])
            .base(OBJECT),
        TypeDescriptor::enumeration(ORIENTATION, ["Vertical", "Horizontal"]).base(OBJECT),
    ]
}

fn values() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::class(THICKNESS)
            .base(OBJECT)
            .property("Left", DOUBLE)
            .property("Top", DOUBLE)
            .property("Right", DOUBLE)
            .property("Bottom", DOUBLE),
        TypeDescriptor::class(POINT)
            .base(OBJECT)
            .property("X", DOUBLE)
            .property("Y", DOUBLE),
        TypeDescriptor::class(COLOR)
            .base(OBJECT)
            .property("A", INT32)
            .property("R", INT32)
            .property("G", INT32)
            .property("B", INT32),
        TypeDescriptor::class(DEPENDENCY_OBJECT).base(OBJECT),
        TypeDescriptor::class(BRUSH)
            .base(DEPENDENCY_OBJECT)
            .abstract_type()
            .dependency_property_with_default("Opacity", DOUBLE, Value::Float(1.0)),
        TypeDescriptor::class(SOLID_COLOR_BRUSH)
            .base(BRUSH)
            .dependency_property("Color", COLOR),
        TypeDescriptor::class(GRADIENT_STOP)
            .base(DEPENDENCY_OBJECT)
            .dependency_property("Color", COLOR)
            .dependency_property_with_default("Offset", DOUBLE, Value::Float(0.0)),
        TypeDescriptor::list(GRADIENT_STOP_COLLECTION, GRADIENT_STOP).base(OBJECT),
        TypeDescriptor::class(LINEAR_GRADIENT_BRUSH)
            .base(BRUSH)
            .dependency_property("StartPoint", POINT)
            .dependency_property("EndPoint", POINT)
            .dependency_property("GradientStops", GRADIENT_STOP_COLLECTION)
            .content_property("GradientStops"),
    ]
}

fn styling() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::dictionary(RESOURCE_DICTIONARY).base(OBJECT),
        TypeDescriptor::class(SETTER_BASE).base(OBJECT).abstract_type(),
        TypeDescriptor::class(SETTER)
            .base(SETTER_BASE)
            .property("Property", DEPENDENCY_PROPERTY)
            .property("Value", OBJECT)
            .property("TargetName", STRING)
            .role(TypeRole::ValueCarrier {
                property: "Property".into(),
                value: "Value".into(),
            }),
        TypeDescriptor::list(SETTER_BASE_COLLECTION, SETTER_BASE).base(OBJECT),
        TypeDescriptor::class(TRIGGER_BASE)
            .base(DEPENDENCY_OBJECT)
            .abstract_type(),
        TypeDescriptor::class(TRIGGER)
            .base(TRIGGER_BASE)
            .property("Property", DEPENDENCY_PROPERTY)
            .property("Value", OBJECT)
            .property("SourceName", STRING)
            .property("Setters", SETTER_BASE_COLLECTION)
            .content_property("Setters")
            .role(TypeRole::ValueCarrier {
                property: "Property".into(),
                value: "Value".into(),
            }),
        TypeDescriptor::list(TRIGGER_COLLECTION, TRIGGER_BASE).base(OBJECT),
        TypeDescriptor::class(STYLE)
            .base(OBJECT)
            .property("TargetType", TYPE)
            .property("BasedOn", STYLE)
            .property("Setters", SETTER_BASE_COLLECTION)
            .property("Triggers", TRIGGER_COLLECTION)
            .property("Resources", RESOURCE_DICTIONARY)
            .content_property("Setters")
            .role(TypeRole::Style {
                target_property: "TargetType".into(),
            }),
    ]
}

fn elements() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::class(UI_ELEMENT)
            .base(DEPENDENCY_OBJECT)
            .dependency_property_with_default(
                "Visibility",
                VISIBILITY,
                Value::Enum {
                    type_name: VISIBILITY.into(),
                    name: "Visible".into(),
                },
            )
            .dependency_property_with_default("Opacity", DOUBLE, Value::Float(1.0))
            .dependency_property_with_default("IsEnabled", BOOLEAN, Value::Bool(true))
            .dependency_property_with_default("IsMouseOver", BOOLEAN, Value::Bool(false)),
        TypeDescriptor::class(FRAMEWORK_ELEMENT)
            .base(UI_ELEMENT)
            .dependency_property_with_default("Width", DOUBLE, Value::Float(f64::NAN))
            .dependency_property_with_default("Height", DOUBLE, Value::Float(f64::NAN))
            .dependency_property("Margin", THICKNESS)
            .dependency_property_with_default(
                "HorizontalAlignment",
                HORIZONTAL_ALIGNMENT,
                Value::Enum {
                    type_name: HORIZONTAL_ALIGNMENT.into(),
                    name: "Stretch".into(),
                },
            )
            .dependency_property_with_default(
                "VerticalAlignment",
                VERTICAL_ALIGNMENT,
                Value::Enum {
                    type_name: VERTICAL_ALIGNMENT.into(),
                    name: "Stretch".into(),
                },
            )
            .dependency_property("Style", STYLE)
            .dependency_property("DataContext", OBJECT)
            .property("Name", STRING)
            .property("Tag", OBJECT)
            .property("Resources", RESOURCE_DICTIONARY),
        TypeDescriptor::list(UI_ELEMENT_COLLECTION, UI_ELEMENT).base(OBJECT),
        TypeDescriptor::class(PANEL)
            .base(FRAMEWORK_ELEMENT)
            .abstract_type()
            .dependency_property("Background", BRUSH)
            .property("Children", UI_ELEMENT_COLLECTION)
            .content_property("Children"),
        TypeDescriptor::class(STACK_PANEL)
            .base(PANEL)
            .dependency_property_with_default(
                "Orientation",
                ORIENTATION,
                Value::Enum {
                    type_name: ORIENTATION.into(),
                    name: "Vertical".into(),
                },
            ),
        TypeDescriptor::class(GRID)
            .base(PANEL)
            .dependency_property_with_default("ShowGridLines", BOOLEAN, Value::Bool(false)),
        TypeDescriptor::class(TEXT_BLOCK)
            .base(FRAMEWORK_ELEMENT)
            .dependency_property_with_default("Text", STRING, Value::String(String::new()))
            .dependency_property("Foreground", BRUSH)
            .dependency_property("Background", BRUSH)
            .dependency_property("FontSize", DOUBLE)
            .dependency_property("Padding", THICKNESS)
            .content_property("Text"),
        TypeDescriptor::class(BORDER)
            .base(FRAMEWORK_ELEMENT)
            .dependency_property("Background", BRUSH)
            .dependency_property("BorderBrush", BRUSH)
            .dependency_property("BorderThickness", THICKNESS)
            .dependency_property("Padding", THICKNESS)
            .property("Child", UI_ELEMENT)
            .content_property("Child"),
    ]
}

fn controls() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::class(CONTROL)
            .base(FRAMEWORK_ELEMENT)
            .dependency_property("Background", BRUSH)
            .dependency_property("Foreground", BRUSH)
            .dependency_property("BorderBrush", BRUSH)
            .dependency_property("BorderThickness", THICKNESS)
            .dependency_property("Padding", THICKNESS)
            .dependency_property("FontSize", DOUBLE)
            .dependency_property("HorizontalContentAlignment", HORIZONTAL_ALIGNMENT)
            .dependency_property("VerticalContentAlignment", VERTICAL_ALIGNMENT)
            .property("Triggers", TRIGGER_COLLECTION),
        TypeDescriptor::class(CONTENT_CONTROL)
            .base(CONTROL)
            .dependency_property("Content", OBJECT)
            .content_property("Content"),
        TypeDescriptor::class(BUTTON).base(CONTENT_CONTROL),
        TypeDescriptor::class(WINDOW)
            .base(CONTENT_CONTROL)
            .dependency_property("Title", STRING)
            .property("Left", DOUBLE)
            .property("Top", DOUBLE),
        TypeDescriptor::list(ITEM_COLLECTION, OBJECT).base(OBJECT),
        TypeDescriptor::class(ITEMS_CONTROL)
            .base(CONTROL)
            .property("Items", ITEM_COLLECTION)
            .property("ItemsPanel", PANEL)
            .content_property("Items"),
        TypeDescriptor::class(SELECTOR)
            .base(ITEMS_CONTROL)
            .abstract_type()
            .dependency_property_with_default("SelectedIndex", INT32, Value::Int(-1))
            .dependency_property("SelectedItem", OBJECT),
        TypeDescriptor::class(COMBO_BOX)
            .base(SELECTOR)
            .dependency_property_with_default("IsDropDownOpen", BOOLEAN, Value::Bool(false)),
        TypeDescriptor::class(COMBO_BOX_ITEM).base(CONTENT_CONTROL),
        TypeDescriptor::class(LIST_BOX).base(SELECTOR),
        TypeDescriptor::class(LIST_BOX_ITEM).base(CONTENT_CONTROL),
    ]
}
