use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::common;

pub fn run(file: &Path, lenient_keys: bool, json: bool) -> Result<()> {
    let loader = common::open_loader(lenient_keys)?;
    let root = common::load_document(&loader, file)?;
    info!(file = %file.display(), root = %root, "document materialized");

    if json {
        common::print_json(&root)?;
    } else {
        print!("{}", common::render_tree(&root));
    }
    Ok(())
}
