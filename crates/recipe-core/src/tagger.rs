//! Morphological and named-entity tagging through the KyTea binary.
//!
//! Tagging runs the binary twice over stdin/stdout:
//! 1. segmentation with the morphology model, producing `surface/pos/reading` units;
//! 2. entity scoring with the recipe-NE model over the space-separated surfaces
//!    (`-out full -nows`), producing per-token IOB candidates with scores.
//!
//! The two outputs are merged into labeled tokens. Callers go through the
//! [`Tagger`] trait so tests can substitute fixed token sequences.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::config::TaggerConfig;
use crate::error::{RecipeError, Result};
use crate::paths;
use crate::token::{render_annotated, TaggedToken};

// ---------------------------------------------------------------------------
// Tagger capability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggingOutput {
    pub tokens: Vec<TaggedToken>,
    /// Segmentation of the text: surfaces joined by single spaces.
    pub wakati: String,
}

impl TaggingOutput {
    pub fn annotated(&self) -> String {
        render_annotated(&self.tokens)
    }
}

pub trait Tagger: Send + Sync {
    fn tag(&self, text: &str) -> Result<TaggingOutput>;
}

/// Drop every whitespace character; the tagger treats the input as one unbroken text.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

// ---------------------------------------------------------------------------
// KyTea output parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Morpheme {
    pub surface: String,
    pub pos: String,
    pub reading: String,
}

/// Parse default KyTea output: space-separated `surface/pos/reading` units.
pub fn parse_morphology(output: &str) -> Result<Vec<Morpheme>> {
    let mut morphemes = Vec::new();
    for unit in output.split_whitespace() {
        let mut parts = unit.rsplitn(3, '/');
        let (Some(reading), Some(pos), Some(surface)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(RecipeError::Tagging(format!(
                "unparseable morphology unit '{unit}'"
            )));
        };
        if surface.is_empty() {
            return Err(RecipeError::Tagging(format!(
                "empty surface in morphology unit '{unit}'"
            )));
        }
        morphemes.push(Morpheme {
            surface: surface.to_string(),
            pos: pos.to_string(),
            reading: reading.to_string(),
        });
    }
    Ok(morphemes)
}

pub fn to_wakati(morphemes: &[Morpheme]) -> String {
    morphemes
        .iter()
        .map(|m| m.surface.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityCandidates {
    pub surface: String,
    pub candidates: Vec<(String, f64)>,
}

impl EntityCandidates {
    /// Highest-scoring tag; ties keep the earliest candidate.
    pub fn best(&self) -> &str {
        let mut best: Option<&(String, f64)> = None;
        for candidate in &self.candidates {
            match best {
                Some(b) if candidate.1 <= b.1 => {}
                _ => best = Some(candidate),
            }
        }
        best.map(|(tag, _)| tag.as_str()).unwrap_or("O")
    }
}

/// Parse `-out full` KyTea output: one token per line,
/// `surface<TAB>TAG/score<TAB>TAG/score...`. The first tag level ends at the
/// first empty field.
pub fn parse_entity_scores(output: &str) -> Result<Vec<EntityCandidates>> {
    let mut rows = Vec::new();
    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let surface = fields.next().unwrap_or_default();
        let mut candidates = Vec::new();
        for field in fields {
            let field = field.trim();
            if field.is_empty() {
                break;
            }
            let (tag, score) = field.rsplit_once('/').ok_or_else(|| {
                RecipeError::Tagging(format!("unparseable tag candidate '{field}'"))
            })?;
            let score: f64 = score.parse().map_err(|_| {
                RecipeError::Tagging(format!("invalid score in tag candidate '{field}'"))
            })?;
            candidates.push((tag.to_string(), score));
        }
        if candidates.is_empty() {
            return Err(RecipeError::Tagging(format!(
                "no tag candidates for '{surface}'"
            )));
        }
        rows.push(EntityCandidates {
            surface: surface.to_string(),
            candidates,
        });
    }
    Ok(rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Iob<'a> {
    Begin(&'a str),
    Inside(&'a str),
    Outside,
}

fn parse_iob(tag: &str) -> Iob<'_> {
    match tag.rsplit_once('-') {
        Some((label, "B")) if !label.is_empty() => Iob::Begin(label),
        Some((label, "I")) if !label.is_empty() => Iob::Inside(label),
        _ => Iob::Outside,
    }
}

/// Merge segmentation with entity candidates into labeled tokens.
///
/// An inside tag that does not continue an open span of the same label starts
/// a new span.
pub fn merge_entities(
    morphemes: &[Morpheme],
    scores: &[EntityCandidates],
) -> Result<Vec<TaggedToken>> {
    if morphemes.len() != scores.len() {
        return Err(RecipeError::Tagging(format!(
            "segmentation has {} tokens but entity pass returned {}",
            morphemes.len(),
            scores.len()
        )));
    }

    let mut tokens = Vec::new();
    let mut open: Option<(String, Vec<String>)> = None;

    fn flush(open: &mut Option<(String, Vec<String>)>, tokens: &mut Vec<TaggedToken>) {
        if let Some((label, pieces)) = open.take() {
            let position = tokens.len();
            tokens.push(TaggedToken::entity(pieces, label, position));
        }
    }

    for (morpheme, row) in morphemes.iter().zip(scores) {
        if morpheme.surface != row.surface {
            return Err(RecipeError::Tagging(format!(
                "token mismatch: '{}' vs '{}'",
                morpheme.surface, row.surface
            )));
        }
        let surface = morpheme.surface.clone();
        match parse_iob(row.best()) {
            Iob::Inside(label) if open.as_ref().is_some_and(|(l, _)| l == label) => {
                if let Some((_, pieces)) = open.as_mut() {
                    pieces.push(surface);
                }
            }
            Iob::Begin(label) | Iob::Inside(label) => {
                flush(&mut open, &mut tokens);
                open = Some((label.to_string(), vec![surface]));
            }
            Iob::Outside => {
                flush(&mut open, &mut tokens);
                let position = tokens.len();
                tokens.push(TaggedToken::plain(surface, position));
            }
        }
    }
    flush(&mut open, &mut tokens);
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// KyteaTagger
// ---------------------------------------------------------------------------

/// Runs the KyTea binary as a blocking subprocess, once per pass.
#[derive(Debug, Clone)]
pub struct KyteaTagger {
    binary: PathBuf,
    morphology_model: PathBuf,
    ner_model: PathBuf,
}

impl KyteaTagger {
    pub fn new(binary: PathBuf, morphology_model: PathBuf, ner_model: PathBuf) -> Self {
        Self {
            binary,
            morphology_model,
            ner_model,
        }
    }

    /// Build from config, resolving relative paths against `root`. A bare
    /// binary name stays as-is and is looked up on PATH at call time.
    pub fn from_config(root: &Path, config: &TaggerConfig) -> Self {
        let binary = if config.binary.components().count() == 1 {
            config.binary.clone()
        } else {
            paths::resolve(root, &config.binary)
        };
        Self::new(
            binary,
            paths::resolve(root, &config.morphology_model),
            paths::resolve(root, &config.ner_model),
        )
    }

    fn locate(&self) -> Result<PathBuf> {
        if self.binary.components().count() == 1 {
            return which::which(&self.binary)
                .map_err(|_| RecipeError::TaggerNotFound(self.binary.display().to_string()));
        }
        if self.binary.exists() {
            Ok(self.binary.clone())
        } else {
            Err(RecipeError::TaggerNotFound(self.binary.display().to_string()))
        }
    }

    fn run(&self, args: Vec<OsString>, input: &str) -> Result<String> {
        let binary = self.locate()?;
        let mut child = Command::new(&binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RecipeError::Tagging(format!("failed to spawn tagger: {e}")))?;

        // Feed stdin from a separate thread so a full stdout pipe cannot stall the write.
        let writer = child.stdin.take().map(|mut stdin| {
            let mut payload = input.to_string();
            payload.push('\n');
            std::thread::spawn(move || stdin.write_all(payload.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| RecipeError::Tagging(format!("tagger wait failed: {e}")))?;

        if let Some(handle) = writer {
            handle
                .join()
                .map_err(|_| RecipeError::Tagging("stdin writer panicked".into()))?
                .map_err(|e| RecipeError::Tagging(format!("failed to write stdin: {e}")))?;
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            let hint = stderr.chars().take(500).collect::<String>();
            return Err(RecipeError::Tagging(format!(
                "tagger exited with {}: {hint}",
                output.status
            )));
        }
        if !stderr.trim().is_empty() {
            tracing::warn!(stderr = %stderr.trim(), "tagger wrote to stderr");
        }

        String::from_utf8(output.stdout)
            .map_err(|_| RecipeError::Tagging("tagger produced non-UTF-8 output".into()))
    }

    fn segment(&self, text: &str) -> Result<Vec<Morpheme>> {
        let args = vec![
            OsString::from("-model"),
            self.morphology_model.clone().into_os_string(),
        ];
        parse_morphology(&self.run(args, text)?)
    }

    fn score_entities(&self, wakati: &str) -> Result<Vec<EntityCandidates>> {
        let args = vec![
            OsString::from("-model"),
            self.ner_model.clone().into_os_string(),
            OsString::from("-out"),
            OsString::from("full"),
            OsString::from("-nows"),
            OsString::from("-tagmax"),
            OsString::from("0"),
            OsString::from("-unktag"),
            OsString::from("/UNK"),
        ];
        parse_entity_scores(&self.run(args, wakati)?)
    }
}

impl Tagger for KyteaTagger {
    fn tag(&self, text: &str) -> Result<TaggingOutput> {
        let text = strip_whitespace(text);
        if text.is_empty() {
            return Ok(TaggingOutput {
                tokens: Vec::new(),
                wakati: String::new(),
            });
        }
        let morphemes = self.segment(&text)?;
        let wakati = to_wakati(&morphemes);
        let scores = self.score_entities(&wakati)?;
        let tokens = merge_entities(&morphemes, &scores)?;
        tracing::debug!(
            chars = text.chars().count(),
            tokens = tokens.len(),
            "tagged recipe text"
        );
        Ok(TaggingOutput { tokens, wakati })
    }
}
