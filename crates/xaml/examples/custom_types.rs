use std::error::Error;

use xaml::presentation::{self, converters::Rgba};
use xaml::types::{ConvertError, Object, Storage, TypeDescriptor, Value};
use xaml::Loader;

const RANGE: &str = "Demo.Gauges.Range";

const DASHBOARD_XAML: &str = include_str!("../demos/dashboard.xaml");

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let mut loader = Loader::new()?;
    let registry = loader.registry_mut();
    registry.register(
        TypeDescriptor::class(RANGE)
            .base("System.Object")
            .property("Low", "System.Int32")
            .property("High", "System.Int32"),
    )?;
    registry.register_converter(RANGE, parse_range);
    registry.register(
        TypeDescriptor::class("Demo.Gauges.Gauge")
            .base(presentation::CONTROL)
            .dependency_property("Level", "System.Double")
            .dependency_property("Range", RANGE)
            .dependency_property("Tint", presentation::COLOR),
    )?;

    let dashboard = loader.parse(DASHBOARD_XAML)?;
    let panel = dashboard.as_object().ok_or("root is not an object")?;
    let children = panel
        .get("Children")
        .and_then(Value::as_object)
        .ok_or("panel has no children")?;
    for gauge in children.items().iter().filter_map(Value::as_object) {
        let level = gauge.get("Level").and_then(Value::as_float).unwrap_or(0.0);
        let range = gauge.get("Range").and_then(Value::as_object).map(|range| {
            let bound = |name: &str| range.get(name).and_then(Value::as_int).unwrap_or(0);
            (bound("Low"), bound("High"))
        });
        let tint = gauge
            .get("Tint")
            .and_then(Value::as_object)
            .and_then(Rgba::from_object);
        println!("gauge level={level:.2} range={range:?} tint={tint:?}");
    }
    Ok(())
}

fn parse_range(text: &str) -> Result<Value, ConvertError> {
    let (low, high) = text
        .split_once("..")
        .ok_or_else(|| ConvertError::invalid(text, RANGE, "expected low..high"))?;
    let low: i64 = low
        .trim()
        .parse()
        .map_err(|err| ConvertError::invalid(text, RANGE, err))?;
    let high: i64 = high
        .trim()
        .parse()
        .map_err(|err| ConvertError::invalid(text, RANGE, err))?;
    let mut range = Object::new(RANGE.into(), Storage::Plain);
    range.set("Low", Value::Int(low));
    range.set("High", Value::Int(high));
    Ok(range.into())
}
