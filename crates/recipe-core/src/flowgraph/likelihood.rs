use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{RecipeError, Result};

/// Dependent category codes that carry an attachment prior.
pub const RELATION_ROWS: [i64; 5] = [0, 2, 4, 5, 8];

/// Attachment priors: `row[j]` is the likelihood that a dependent of the row's
/// category attaches to a governor of category `j`.
#[derive(Debug, Clone, Default)]
pub struct Likelihood {
    rows: BTreeMap<i64, Vec<f64>>,
}

impl Likelihood {
    pub fn from_rows(rows: impl IntoIterator<Item = (i64, Vec<f64>)>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .filter(|(code, _)| RELATION_ROWS.contains(code))
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, path)
    }

    /// Parse CSV with a header line and rows `code,p0,p1,...`. Rows outside
    /// [`RELATION_ROWS`] are dropped after validation.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let header = lines
            .next()
            .ok_or_else(|| RecipeError::malformed(path, "empty likelihood table"))?;
        let width = header.split(',').count().saturating_sub(1);
        if width == 0 {
            return Err(RecipeError::malformed(path, "header has no category columns"));
        }

        let mut rows = Vec::new();
        for line in lines {
            let mut fields = line.split(',').map(str::trim);
            let raw_code = fields.next().unwrap_or_default();
            let code = raw_code
                .parse::<i64>()
                .map_err(|_| RecipeError::malformed(path, format!("invalid row index '{raw_code}'")))?;
            let values = fields
                .map(|f| {
                    f.parse::<f64>()
                        .map_err(|_| RecipeError::malformed(path, format!("invalid value '{f}' in row {code}")))
                })
                .collect::<Result<Vec<f64>>>()?;
            if values.len() != width {
                return Err(RecipeError::malformed(
                    path,
                    format!("row {code} has {} values, expected {width}", values.len()),
                ));
            }
            rows.push((code, values));
        }
        Ok(Self::from_rows(rows))
    }

    pub fn row(&self, code: i64) -> Option<&[f64]> {
        self.rows.get(&code).map(Vec::as_slice)
    }

    /// Governor category codes for a dependent of `code`, most likely first.
    /// Zero priors are skipped; ties keep the lower code first.
    pub fn ranked_governors(&self, code: i64) -> Option<Vec<i64>> {
        let row = self.row(code)?;
        let mut ranked: Vec<(usize, f64)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, p)| *p > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        Some(ranked.into_iter().map(|(j, _)| j as i64).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
index,0,1,2,3
0,0.0,0.2,0.5,0.3
1,0.1,0.1,0.1,0.7
2,0.4,0.0,0.4,0.2
";

    #[test]
    fn keeps_only_relation_rows() {
        let l = Likelihood::parse(CSV, Path::new("likelihood.csv")).unwrap();
        assert!(l.row(0).is_some());
        assert!(l.row(1).is_none());
        assert_eq!(l.row(2).unwrap(), &[0.4, 0.0, 0.4, 0.2]);
    }

    #[test]
    fn ranking_orders_by_prior_then_code() {
        let l = Likelihood::parse(CSV, Path::new("likelihood.csv")).unwrap();
        assert_eq!(l.ranked_governors(0).unwrap(), vec![2, 3, 1]);
        assert_eq!(l.ranked_governors(2).unwrap(), vec![0, 2, 3]);
        assert!(l.ranked_governors(1).is_none());
    }

    #[test]
    fn malformed_tables_fail() {
        let path = Path::new("likelihood.csv");
        assert!(Likelihood::parse("", path).is_err());
        assert!(Likelihood::parse("index,0,1\n0,0.5\n", path).is_err());
        assert!(Likelihood::parse("index,0,1\n0,0.5,abc\n", path).is_err());
        assert!(Likelihood::parse("index,0,1\nx,0.5,0.5\n", path).is_err());
    }
}
