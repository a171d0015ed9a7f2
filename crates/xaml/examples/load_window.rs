use std::env;
use std::error::Error;

use xaml::types::{Object, Value};
use xaml::Loader;

const WINDOW_XAML: &str = include_str!("../demos/window.xaml");

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let loader = Loader::new()?;
    let window = match env::args().nth(1) {
        Some(path) => loader.load_file(path)?,
        None => loader.parse(WINDOW_XAML)?,
    };

    print_tree(&window, 0);

    if let Some(mode) = xaml::find_name(&window, "mode") {
        println!("mode selector has {} items", items_of(mode).len());
    }
    Ok(())
}

fn items_of(object: &Object) -> &[Value] {
    object
        .get("Items")
        .and_then(Value::as_object)
        .map(Object::items)
        .unwrap_or_default()
}

fn print_tree(value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    let Some(object) = value.as_object() else {
        println!("{indent}{value}");
        return;
    };
    println!("{indent}{}", object.type_name().short_name());
    for (name, property) in object.properties() {
        match property {
            Value::Object(_) => {
                println!("{indent}  .{name}");
                print_tree(property, depth + 2);
            }
            other => println!("{indent}  .{name} = {other}"),
        }
    }
    for item in object.items() {
        print_tree(item, depth + 1);
    }
}
