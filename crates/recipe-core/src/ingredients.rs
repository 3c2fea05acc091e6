use serde_json::{Map, Value};

use crate::error::{RecipeError, Result};

/// Separator between an ingredient name and its quantity.
pub const QUANTITY_SEPARATOR: char = '\u{3000}';

/// Parse ingredient text, one `name　quantity` per line, into name → quantity.
///
/// Empty lines are skipped; a repeated name keeps its last quantity. Only the
/// first separator splits, so the quantity may itself contain U+3000.
pub fn parse_ingredients(text: &str) -> Result<Vec<(String, String)>> {
    let mut entries: Vec<(String, String)> = Vec::new();
    for line in text.split('\n') {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let (name, quantity) = line
            .split_once(QUANTITY_SEPARATOR)
            .ok_or_else(|| RecipeError::MalformedIngredient(line.to_string()))?;
        match entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = quantity.to_string(),
            None => entries.push((name.to_string(), quantity.to_string())),
        }
    }
    Ok(entries)
}

/// [`parse_ingredients`] as a JSON object.
pub fn ingredients_to_json(text: &str) -> Result<Value> {
    let map: Map<String, Value> = parse_ingredients(text)?
        .into_iter()
        .map(|(name, quantity)| (name, Value::String(quantity)))
        .collect();
    Ok(Value::Object(map))
}
