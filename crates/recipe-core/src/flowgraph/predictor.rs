//! Relation labeling for dependency pairs.
//!
//! The frozen classifier is a one-vs-rest linear model over sparse word
//! features. A pair's feature vector is the dependent's feature row followed
//! by the governor's feature row.

use std::collections::HashMap;
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::Deserialize;

use crate::error::{RecipeError, Result};
use crate::io;
use crate::paths;
use crate::token::TaggedToken;

pub trait DependencyPredictor {
    fn predict(&self, dependent: &TaggedToken, governor: &TaggedToken) -> Result<String>;
}

// ---------------------------------------------------------------------------
// On-disk artifact shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SparseMatrixFile {
    rows: usize,
    cols: usize,
    entries: Vec<(usize, usize, f64)>,
}

#[derive(Debug, Deserialize)]
struct SvcFile {
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    classes: Vec<i64>,
}

// ---------------------------------------------------------------------------
// LinearSvcPredictor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LinearSvcPredictor {
    vocabulary: HashMap<String, usize>,
    /// Sparse feature rows, indexed by word id: `(column, value)` pairs.
    features: Vec<Vec<(usize, f64)>>,
    cols: usize,
    coef: Array2<f64>,
    intercept: Array1<f64>,
    labels: Vec<String>,
}

impl LinearSvcPredictor {
    /// Load `word_to_id.json`, `matrix.json`, `svc.json` and `prediction_map.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let vocabulary: HashMap<String, usize> = io::read_json(&dir.join(paths::WORD_TO_ID_FILE))?;
        let matrix_path = dir.join(paths::MATRIX_FILE);
        let matrix: SparseMatrixFile = io::read_json(&matrix_path)?;
        let svc_path = dir.join(paths::SVC_FILE);
        let svc: SvcFile = io::read_json(&svc_path)?;
        let map_path = dir.join(paths::PREDICTION_MAP_FILE);
        let raw_map: HashMap<String, String> = io::read_json(&map_path)?;

        let mut prediction_map = HashMap::with_capacity(raw_map.len());
        for (key, label) in raw_map {
            let class = key
                .trim()
                .parse::<i64>()
                .map_err(|_| RecipeError::malformed(&map_path, format!("invalid class id '{key}'")))?;
            prediction_map.insert(class, label);
        }

        let mut features = vec![Vec::new(); matrix.rows];
        for (row, col, value) in matrix.entries {
            if row >= matrix.rows || col >= matrix.cols {
                return Err(RecipeError::malformed(
                    &matrix_path,
                    format!("entry ({row}, {col}) outside {}x{}", matrix.rows, matrix.cols),
                ));
            }
            features[row].push((col, value));
        }

        let n_classes = svc.classes.len();
        let width = matrix.cols * 2;
        if svc.intercept.len() != n_classes || svc.coef.len() != n_classes {
            return Err(RecipeError::malformed(
                &svc_path,
                format!(
                    "{} classes but {} coefficient rows and {} intercepts",
                    n_classes,
                    svc.coef.len(),
                    svc.intercept.len()
                ),
            ));
        }
        if let Some(bad) = svc.coef.iter().position(|row| row.len() != width) {
            return Err(RecipeError::malformed(
                &svc_path,
                format!("coefficient row {bad} has length {}, expected {width}", svc.coef[bad].len()),
            ));
        }
        let flat: Vec<f64> = svc.coef.into_iter().flatten().collect();
        let coef = Array2::from_shape_vec((n_classes, width), flat)
            .map_err(|e| RecipeError::malformed(&svc_path, e.to_string()))?;

        let labels = svc
            .classes
            .iter()
            .map(|class| {
                prediction_map.get(class).cloned().ok_or_else(|| {
                    RecipeError::malformed(&map_path, format!("class {class} has no relation label"))
                })
            })
            .collect::<Result<Vec<String>>>()?;

        let word_path = dir.join(paths::WORD_TO_ID_FILE);
        if let Some((word, id)) = vocabulary.iter().find(|(_, id)| **id >= matrix.rows) {
            return Err(RecipeError::malformed(
                &word_path,
                format!("word '{word}' maps to row {id} beyond {} rows", matrix.rows),
            ));
        }

        Ok(Self {
            vocabulary,
            features,
            cols: matrix.cols,
            coef,
            intercept: Array1::from(svc.intercept),
            labels,
        })
    }

    fn feature_row(&self, word: &str) -> Result<&[(usize, f64)]> {
        let id = self
            .vocabulary
            .get(word)
            .ok_or_else(|| RecipeError::UnknownVocabulary(word.to_string()))?;
        Ok(&self.features[*id])
    }

    fn decision(&self, class: usize, dependent: &[(usize, f64)], governor: &[(usize, f64)]) -> f64 {
        let dep: f64 = dependent
            .iter()
            .map(|(col, value)| self.coef[[class, *col]] * value)
            .sum();
        let gov: f64 = governor
            .iter()
            .map(|(col, value)| self.coef[[class, self.cols + col]] * value)
            .sum();
        self.intercept[class] + dep + gov
    }
}

impl DependencyPredictor for LinearSvcPredictor {
    fn predict(&self, dependent: &TaggedToken, governor: &TaggedToken) -> Result<String> {
        let dep = self.feature_row(&dependent.surface)?;
        let gov = self.feature_row(&governor.surface)?;

        let mut best: Option<(usize, f64)> = None;
        for class in 0..self.labels.len() {
            let score = self.decision(class, dep, gov);
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((class, score)),
            }
        }
        best.map(|(class, _)| self.labels[class].clone())
            .ok_or_else(|| RecipeError::malformed(paths::SVC_FILE, "classifier has no classes"))
    }
}
