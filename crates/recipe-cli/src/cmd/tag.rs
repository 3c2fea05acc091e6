use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use recipe_core::config::Config;
use recipe_core::tagger::{KyteaTagger, Tagger};

use crate::output::print_json;

/// Tag `text` (or stdin when absent) and print the annotated text and segmentation.
pub fn run(root: &Path, text: Option<String>, json: bool) -> Result<()> {
    let text = match text {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read recipe text from stdin")?;
            buf
        }
    };

    let config = Config::load(root)?;
    let tagger = KyteaTagger::from_config(root, &config.tagger);
    let output = tagger.tag(&text)?;

    if json {
        print_json(&output)?;
    } else {
        println!("{}", output.annotated());
        println!("{}", output.wakati);
    }
    Ok(())
}
