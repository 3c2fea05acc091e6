use crate::error::{RecipeError, Result};
use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Default locations (relative to the project root)
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "recipe.yaml";

pub const ACTION_TIME_FILE: &str = "action_time/orangepage/action_time.json";
pub const ACTION_TIME_MASTER_FILE: &str = "action_time/orangepage/action_time_master.json";
pub const ACTION_CATEGORY_FILE: &str = "action_category/orangepage/action_category.json";
pub const REFERENCE_FILE: &str = "num_of_params/radar-chart-orgparams.json";

pub const GRAPH_DATA_DIR: &str = "graph_data";
pub const IMPORT_DATA_DIR: &str = "import_data";
pub const EXPORT_DATA_DIR: &str = "build/dest";
pub const STATIC_DIR: &str = "build";

pub const LIKELIHOOD_FILE: &str = "likelihood.csv";
pub const CATEGORY_FILE: &str = "rne_category.txt";
pub const WORD_TO_ID_FILE: &str = "word_to_id.json";
pub const MATRIX_FILE: &str = "matrix.json";
pub const SVC_FILE: &str = "svc.json";
pub const PREDICTION_MAP_FILE: &str = "prediction_map.json";

#[cfg(windows)]
pub const KYTEA_BINARY: &str = "kytea-win-0.4.2/kytea.exe";
#[cfg(windows)]
pub const KYTEA_MORPHOLOGY_MODEL: &str = "kytea-win-0.4.2/model/jp-0.4.7-1.mod";
#[cfg(windows)]
pub const KYTEA_NER_MODEL: &str = "kytea-win-0.4.2/RecipeNE-sample/recipe416.knm";

#[cfg(not(windows))]
pub const KYTEA_BINARY: &str = "kytea";
#[cfg(not(windows))]
pub const KYTEA_MORPHOLOGY_MODEL: &str = "kytea-0.4.7/model/jp-0.4.7-1.mod";
#[cfg(not(windows))]
pub const KYTEA_NER_MODEL: &str = "kytea-0.4.7/RecipeNE-sample/recipe416.knm";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path against the project root. Absolute paths pass through.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

// ---------------------------------------------------------------------------
// Caller-supplied segment validation
// ---------------------------------------------------------------------------

/// Accept a single, plain path segment coming from a request body.
///
/// Rejects empty strings, `.`/`..`, separators, NUL and anything that parses
/// to more than one normal component (drive prefixes, root dirs).
pub fn validate_segment(segment: &str) -> Result<&str> {
    let invalid = || RecipeError::InvalidPathSegment(segment.to_string());
    if segment.is_empty() || segment.contains(['/', '\\', '\0']) {
        return Err(invalid());
    }
    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(segment),
        _ => Err(invalid()),
    }
}

/// Join validated segments onto `base`.
pub fn join_segments(base: &Path, segments: &[&str]) -> Result<PathBuf> {
    let mut path = base.to_path_buf();
    for segment in segments {
        path.push(validate_segment(segment)?);
    }
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_segments() {
        for seg in ["recipe.json", "orangepage", "肉じゃが.json", "a b", "..json"] {
            validate_segment(seg).unwrap_or_else(|_| panic!("expected valid: {seg}"));
        }
    }

    #[test]
    fn invalid_segments() {
        for seg in ["", ".", "..", "../etc", "a/b", "a\\b", "/abs", "nul\0"] {
            assert!(validate_segment(seg).is_err(), "expected invalid: {seg:?}");
        }
    }

    #[test]
    fn join_segments_builds_nested_path() {
        let base = Path::new("/srv/import_data");
        assert_eq!(
            join_segments(base, &["orangepage", "curry.json"]).unwrap(),
            PathBuf::from("/srv/import_data/orangepage/curry.json")
        );
        assert!(join_segments(base, &["..", "secret"]).is_err());
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            resolve(root, Path::new("graph_data")),
            PathBuf::from("/tmp/proj/graph_data")
        );
        assert_eq!(resolve(root, Path::new("/opt/models")), PathBuf::from("/opt/models"));
    }
}
