use std::error::Error;

use xaml::types::Value;
use xaml::{Loader, MissingKeyPolicy, ReaderOptions};

const THEME_XAML: &str = include_str!("../demos/theme.xaml");

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let loader = Loader::new()?
        .with_options(ReaderOptions::new().missing_key(MissingKeyPolicy::Skip));
    let theme = loader.parse(THEME_XAML)?;
    let resources = xaml::resources(&theme).ok_or("theme root is not a dictionary")?;

    for (key, value) in resources.entries() {
        println!("{key} => {value}");
        let Some(style) = value.as_object() else {
            continue;
        };
        for setter in style
            .get("Setters")
            .and_then(Value::as_object)
            .map(|setters| setters.items())
            .unwrap_or_default()
        {
            if let Some(setter) = setter.as_object() {
                let property = setter.get("Property").unwrap_or(&Value::Null);
                let value = setter.get("Value").unwrap_or(&Value::Null);
                println!("    {property} <- {value}");
            }
        }
    }
    Ok(())
}
