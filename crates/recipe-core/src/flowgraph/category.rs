use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{RecipeError, Result};

/// Bidirectional map between entity labels and integer category codes.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    to_code: HashMap<String, i64>,
    to_label: BTreeMap<i64, String>,
}

impl CategoryMap {
    /// Codes follow the order of `labels`.
    pub fn from_labels(labels: &[&str]) -> Self {
        let mut map = Self::default();
        for (code, label) in labels.iter().enumerate() {
            map.to_code.insert(label.to_string(), code as i64);
            map.to_label.insert(code as i64, label.to_string());
        }
        map
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, path)
    }

    /// One label per line, optionally followed by an explicit code
    /// (`Ac<TAB>4`). Without a code, the code is the index among non-empty lines.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut map = Self::default();
        let mut index = 0i64;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let label = fields.next().unwrap_or_default().to_string();
            let code = match fields.next() {
                Some(raw) => raw
                    .parse::<i64>()
                    .map_err(|_| RecipeError::malformed(path, format!("invalid code '{raw}'")))?,
                None => index,
            };
            if fields.next().is_some() {
                return Err(RecipeError::malformed(path, format!("extra fields in '{line}'")));
            }
            if map.to_code.contains_key(&label) {
                return Err(RecipeError::malformed(path, format!("duplicate label '{label}'")));
            }
            if map.to_label.contains_key(&code) {
                return Err(RecipeError::malformed(path, format!("duplicate code {code}")));
            }
            map.to_code.insert(label.clone(), code);
            map.to_label.insert(code, label);
            index += 1;
        }
        Ok(map)
    }

    pub fn code(&self, label: &str) -> Result<i64> {
        self.to_code
            .get(label)
            .copied()
            .ok_or_else(|| RecipeError::MissingCategory(label.to_string()))
    }

    pub fn label(&self, code: i64) -> Result<&str> {
        self.to_label
            .get(&code)
            .map(String::as_str)
            .ok_or(RecipeError::MissingCategoryCode(code))
    }

    pub fn len(&self) -> usize {
        self.to_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_label.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_codes_follow_line_order() {
        let map = CategoryMap::parse("F\nT\n\nD\n", Path::new("rne_category.txt")).unwrap();
        assert_eq!(map.code("F").unwrap(), 0);
        assert_eq!(map.code("D").unwrap(), 2);
        assert_eq!(map.label(1).unwrap(), "T");
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn explicit_codes_are_used() {
        let map = CategoryMap::parse("Ac\t4\nF\t0\n", Path::new("c.txt")).unwrap();
        assert_eq!(map.code("Ac").unwrap(), 4);
        assert_eq!(map.label(0).unwrap(), "F");
    }

    #[test]
    fn unknown_entries_fail() {
        let map = CategoryMap::from_labels(&["F", "T"]);
        assert!(matches!(map.code("Ac"), Err(RecipeError::MissingCategory(_))));
        assert!(matches!(map.label(9), Err(RecipeError::MissingCategoryCode(9))));
    }

    #[test]
    fn duplicates_are_malformed() {
        let path = Path::new("c.txt");
        assert!(CategoryMap::parse("F\nF\n", path).is_err());
        assert!(CategoryMap::parse("F\t1\nT\t1\n", path).is_err());
        assert!(CategoryMap::parse("F\tx\n", path).is_err());
    }
}
