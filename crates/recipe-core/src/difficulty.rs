//! Five-axis recipe difficulty.
//!
//! Each axis is a raw count scaled against the largest count seen in a
//! reference corpus: `score = raw / max * 5.0`, unclamped. The overall level is
//! the maximum axis score, so one dominant axis sets the difficulty.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RecipeError, Result};
use crate::ingredients::parse_ingredients;
use crate::io;

pub const HEAT: &str = "加熱";
pub const MIX: &str = "混ぜる";
pub const CUT: &str = "切る";

const SCALE: f64 = 5.0;

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// Category label → action surface forms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionCategories(BTreeMap<String, Vec<String>>);

impl ActionCategories {
    pub fn load(path: &Path) -> Result<Self> {
        io::read_json(path)
    }

    pub fn from_map(map: BTreeMap<String, Vec<String>>) -> Self {
        Self(map)
    }

    /// Number of wakati tokens belonging to `category`.
    pub fn count_in(&self, category: &str, wakati: &str) -> Result<usize> {
        let forms: BTreeSet<&str> = self
            .0
            .get(category)
            .ok_or_else(|| RecipeError::MissingActionCategory(category.to_string()))?
            .iter()
            .map(String::as_str)
            .collect();
        Ok(wakati
            .split_whitespace()
            .filter(|word| forms.contains(word))
            .count())
    }
}

/// Per-axis score distributions; element `i` (1..=5) holds the counts for axis `i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceTable(Vec<serde_json::Value>);

impl ReferenceTable {
    pub fn load(path: &Path) -> Result<Self> {
        io::read_json(path)
    }

    pub fn from_values(values: Vec<serde_json::Value>) -> Self {
        Self(values)
    }

    /// Largest value recorded for `axis`.
    pub fn max_for(&self, axis: usize) -> Result<f64> {
        let element = self
            .0
            .get(axis)
            .ok_or_else(|| RecipeError::InvalidReference(format!("axis {axis} missing")))?;
        let values: Vec<&serde_json::Value> = match element {
            serde_json::Value::Object(map) => map.values().collect(),
            serde_json::Value::Array(items) => items.iter().collect(),
            _ => {
                return Err(RecipeError::InvalidReference(format!(
                    "axis {axis} is not an object"
                )))
            }
        };
        let mut max: Option<f64> = None;
        for value in values {
            let n = value.as_f64().ok_or_else(|| {
                RecipeError::InvalidReference(format!("axis {axis} has non-numeric value {value}"))
            })?;
            max = Some(max.map_or(n, |m| m.max(n)));
        }
        match max {
            Some(m) if m > 0.0 => Ok(m),
            Some(m) => Err(RecipeError::InvalidReference(format!(
                "axis {axis} maximum {m} is not positive"
            ))),
            None => Err(RecipeError::InvalidReference(format!("axis {axis} is empty"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelRecord {
    pub key: &'static str,
    pub name: &'static str,
    pub target: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawCounts {
    pub ingredients: usize,
    pub characters: usize,
    pub heat: usize,
    pub mix: usize,
    pub cut: usize,
}

impl RawCounts {
    pub fn collect(ingredients: &str, wakati: &str, categories: &ActionCategories) -> Result<Self> {
        Ok(Self {
            ingredients: parse_ingredients(ingredients)?.len(),
            characters: ingredients.chars().count(),
            heat: categories.count_in(HEAT, wakati)?,
            mix: categories.count_in(MIX, wakati)?,
            cut: categories.count_in(CUT, wakati)?,
        })
    }
}

pub fn axis_score(raw: usize, max: f64) -> f64 {
    raw as f64 / max * SCALE
}

/// Axis records in display order, followed by the overall level.
pub fn score(counts: RawCounts, reference: &ReferenceTable) -> Result<Vec<LevelRecord>> {
    let axes = [
        ("食材", "ingredients", counts.ingredients),
        ("文字数", "sentences", counts.characters),
        ("加熱", "heat", counts.heat),
        ("混ぜる", "mix", counts.mix),
        ("切る", "cut", counts.cut),
    ];

    let mut records = Vec::with_capacity(axes.len() + 1);
    for (index, (key, name, count)) in axes.into_iter().enumerate() {
        let max = reference.max_for(index + 1)?;
        records.push(LevelRecord {
            key,
            name,
            target: axis_score(count, max),
            count,
        });
    }

    let level = records
        .iter()
        .map(|r| r.target)
        .fold(f64::NEG_INFINITY, f64::max);
    records.push(LevelRecord {
        key: "レベル",
        name: "level",
        target: level,
        count: 0,
    });
    Ok(records)
}

pub fn evaluate(
    ingredients: &str,
    wakati: &str,
    categories: &ActionCategories,
    reference: &ReferenceTable,
) -> Result<Vec<LevelRecord>> {
    let counts = RawCounts::collect(ingredients, wakati, categories)?;
    tracing::debug!(?counts, "difficulty raw counts");
    score(counts, reference)
}
